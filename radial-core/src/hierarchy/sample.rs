//! Demo dataset: five segments, each split into sub-segments holding
//! generated company leaves.

use super::WeightedNode;

/// (segment weight, [(sub-segment weight, company count)])
const SEGMENTS: [(f64, &[(f64, usize)]); 5] = [
    (30.0, &[(10.0, 25), (8.0, 20), (7.0, 18), (5.0, 15)]),
    (25.0, &[(12.0, 30), (8.0, 20), (5.0, 15)]),
    (20.0, &[(10.0, 25), (10.0, 25)]),
    (15.0, &[(8.0, 20), (7.0, 18)]),
    (10.0, &[(5.0, 15), (5.0, 15)]),
];

/// Build the sample tree. Company weights fall in [0.5, 2.5) and come from a
/// fixed LCG so repeated calls yield the same data.
pub fn segment_tree() -> WeightedNode {
    let mut rng = Lcg::new(0x5eed);
    let segments = SEGMENTS
        .iter()
        .enumerate()
        .map(|(si, &(weight, subs))| {
            let s = si + 1;
            let children = subs
                .iter()
                .enumerate()
                .map(|(ui, &(sub_weight, count))| {
                    let prefix = format!("{}-{}", s, ui + 1);
                    WeightedNode::branch(
                        format!("segment-{prefix}"),
                        format!("Segment {s}.{}", ui + 1),
                        companies(count, &prefix, &mut rng),
                    )
                    .with_weight(sub_weight)
                })
                .collect();
            WeightedNode::branch(format!("segment-{s}"), format!("Segment {s}"), children)
                .with_weight(weight)
        })
        .collect();

    WeightedNode::branch("", "root", segments)
}

fn companies(count: usize, prefix: &str, rng: &mut Lcg) -> Vec<WeightedNode> {
    (1..=count)
        .map(|i| {
            WeightedNode::leaf(
                format!("company-{prefix}-{i}"),
                format!("Company {prefix}.{i}"),
                rng.next_f64() * 2.0 + 0.5,
            )
        })
        .collect()
}

struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::WeightPolicy;

    #[test]
    fn test_shape() {
        let tree = segment_tree();
        assert_eq!(tree.children.len(), 5);
        assert_eq!(tree.children[0].id, "segment-1");
        assert_eq!(tree.children[0].children.len(), 4);
        assert_eq!(tree.children[0].children[0].id, "segment-1-1");
        assert_eq!(tree.children[0].children[0].children.len(), 25);
        assert_eq!(tree.children[0].children[0].children[0].id, "company-1-1-1");
        let companies = [25, 20, 18, 15, 30, 20, 15, 25, 25, 20, 18, 15, 15];
        assert_eq!(tree.leaf_count(), companies.iter().sum::<usize>());
    }

    #[test]
    fn test_company_weights_in_range_and_stable() {
        let a = segment_tree();
        let b = segment_tree();
        assert_eq!(a, b);
        assert!(a.validate().is_ok());
        for seg in &a.children {
            for sub in &seg.children {
                for company in &sub.children {
                    let w = company.weight.unwrap();
                    assert!((0.5..2.5).contains(&w), "{w}");
                }
            }
        }
        assert_eq!(a.children[4].effective_weight(WeightPolicy::PreferExplicit).unwrap(), 10.0);
    }
}
