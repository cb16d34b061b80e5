// Hierarchical circle packing.
//
// Each node's children become circles with radius proportional to
// sqrt(weight), placed by front-chain packing: circles are added one at a time
// tangent to two neighbours on the chain that bounds the arrangement, next to
// the chain node closest to the center. The arrangement is then rescaled so its
// smallest enclosing circle matches the parent's radius, and each child is
// packed the same way inside its own circle.
//
// Properties:
// - Pure: the input tree is never touched; results form a parallel tree.
// - Deterministic: placement order is descending weight, ties by index.
// - Siblings never overlap except where `min_radius` inflates tiny circles.

use serde::{Deserialize, Serialize};

use super::enclose::enclose;
use super::geometry::{Circle, PointF};
use crate::error::LayoutError;
use crate::hierarchy::{WeightPolicy, WeightedNode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackConfig {
    /// Gap left between neighbouring siblings, as a fraction of the parent radius.
    pub padding: f64,
    /// Radii below this are clamped up so every leaf stays visible.
    pub min_radius: f64,
    pub weight_policy: WeightPolicy,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            padding: 0.01,
            min_radius: 0.5,
            weight_policy: WeightPolicy::SumOfChildren,
        }
    }
}

/// Packing result for one node, in its parent's frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackedCircle {
    pub id: String,
    pub label: String,
    /// Effective weight under the configured policy.
    pub weight: f64,
    pub radius: f64,
    /// Center relative to the parent's center. The root sits at the origin.
    pub local_position: PointF,
    /// Same order as the input children.
    pub children: Vec<PackedCircle>,
}

impl PackedCircle {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Every descendant (not self) with its center composed into this node's
    /// frame, in pre-order. The `usize` is the depth below this node (children
    /// are at depth 1).
    pub fn descendants(&self) -> Vec<(&PackedCircle, Circle, usize)> {
        fn walk<'a>(
            node: &'a PackedCircle,
            origin: PointF,
            depth: usize,
            out: &mut Vec<(&'a PackedCircle, Circle, usize)>,
        ) {
            for child in &node.children {
                let center = origin.add(child.local_position);
                out.push((child, Circle::at(center, child.radius), depth));
                walk(child, center, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        walk(self, PointF::ORIGIN, 1, &mut out);
        out
    }
}

/// Pack `node` into a circle of `bounding_radius` centered at the origin.
pub fn pack(
    node: &WeightedNode,
    bounding_radius: f64,
    cfg: &PackConfig,
) -> Result<PackedCircle, LayoutError> {
    pack_at(node, PointF::ORIGIN, bounding_radius.max(0.0), cfg)
}

fn pack_at(
    node: &WeightedNode,
    position: PointF,
    radius: f64,
    cfg: &PackConfig,
) -> Result<PackedCircle, LayoutError> {
    let weight = node.effective_weight(cfg.weight_policy)?;

    let children = match node.children.as_slice() {
        [] => Vec::new(),
        [only] => vec![pack_at(only, PointF::ORIGIN, radius, cfg)?],
        many => {
            let weights = many
                .iter()
                .map(|c| c.effective_weight(cfg.weight_policy))
                .collect::<Result<Vec<_>, _>>()?;
            let circles = arrange_siblings(&weights, radius, cfg.padding);
            many.iter()
                .zip(circles)
                .map(|(child, c)| pack_at(child, c.center(), c.r.max(cfg.min_radius), cfg))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    Ok(PackedCircle {
        id: node.id.clone(),
        label: node.label.clone(),
        weight,
        radius,
        local_position: position,
        children,
    })
}

/// Place sibling circles for `weights` inside a circle of `radius` at the
/// origin. Returned in input order. Zero-weight siblings get a zero circle at
/// the origin.
pub fn arrange_siblings(weights: &[f64], radius: f64, padding: f64) -> Vec<Circle> {
    let mut out = vec![Circle::default(); weights.len()];

    let mut order: Vec<usize> = (0..weights.len()).collect();
    order.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]).then(a.cmp(&b)));
    let placed: Vec<usize> = order.into_iter().filter(|&i| weights[i] > 0.0).collect();

    match placed.as_slice() {
        [] => return out,
        [only] => {
            out[*only] = Circle::new(0.0, 0.0, radius);
            return out;
        }
        _ => {}
    }
    if radius <= 0.0 {
        return out;
    }

    // Radii relative to the largest sibling; packing is scale invariant and
    // this keeps the chain arithmetic away from underflow and overflow.
    let largest = weights[placed[0]].sqrt();
    let base: Vec<f64> = placed.iter().map(|&i| weights[i].sqrt() / largest).collect();

    // First pass finds the scale so the padding can be expressed in
    // unscaled units; the second pass packs the padded circles.
    let mut circles: Vec<Circle> = base.iter().map(|&r| Circle::new(0.0, 0.0, r)).collect();
    let unpadded = pack_siblings(&mut circles);
    let half_pad = padding.max(0.0) * unpadded / 2.0;

    if half_pad > 0.0 {
        circles = base.iter().map(|&r| Circle::new(0.0, 0.0, r + half_pad)).collect();
    }
    let enclosing = if half_pad > 0.0 { pack_siblings(&mut circles) } else { unpadded };
    let k = radius / enclosing;

    for (slot, &i) in placed.iter().enumerate() {
        let c = circles[slot];
        out[i] = Circle::new(c.x * k, c.y * k, base[slot] * k);
    }
    out
}

/// Front-chain packing of `circles` (radii given, positions overwritten).
/// Leaves the arrangement centered on its smallest enclosing circle and
/// returns that circle's radius. Radii must be positive.
pub fn pack_siblings(circles: &mut [Circle]) -> f64 {
    let n = circles.len();
    if n == 0 {
        return 0.0;
    }

    circles[0].x = 0.0;
    circles[0].y = 0.0;
    if n == 1 {
        return circles[0].r;
    }

    let (ra, rb) = (circles[0].r, circles[1].r);
    circles[0].x = -rb;
    circles[1].x = ra;
    circles[1].y = 0.0;
    if n == 2 {
        return ra + rb;
    }

    let p = place(&circles[1], &circles[0], circles[2].r);
    circles[2].x = p.x;
    circles[2].y = p.y;

    // Doubly linked front chain over circle indices.
    let mut next = vec![0usize; n];
    let mut prev = vec![0usize; n];
    next[0] = 1;
    prev[2] = 1;
    next[1] = 2;
    prev[0] = 2;
    next[2] = 0;
    prev[1] = 0;

    let (mut a, mut b) = (0usize, 1usize);
    let mut i = 3;

    'pack: while i < n {
        let p = place(&circles[a], &circles[b], circles[i].r);
        circles[i].x = p.x;
        circles[i].y = p.y;
        let c = i;

        // Walk the chain outward from a and b, always advancing the side
        // with less accumulated radius, looking for a blocking circle.
        let (mut j, mut k) = (next[b], prev[a]);
        let (mut sj, mut sk) = (circles[b].r, circles[a].r);
        loop {
            if sj <= sk {
                if intersects(&circles[j], &circles[c]) {
                    b = j;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sj += circles[j].r;
                j = next[j];
            } else {
                if intersects(&circles[k], &circles[c]) {
                    a = k;
                    next[a] = b;
                    prev[b] = a;
                    continue 'pack;
                }
                sk += circles[k].r;
                k = prev[k];
            }
            if j == next[k] {
                break;
            }
        }

        // Splice c between a and b.
        prev[c] = a;
        next[c] = b;
        next[a] = c;
        prev[b] = c;
        b = c;

        // Next insertion happens after the chain node closest to the center.
        let mut best = score(circles, a, next[a]);
        let mut cur = next[c];
        while cur != b {
            let s = score(circles, cur, next[cur]);
            if s < best {
                a = cur;
                best = s;
            }
            cur = next[cur];
        }
        b = next[a];
        i += 1;
    }

    let Some(e) = enclose(circles) else {
        return 0.0;
    };
    for c in circles.iter_mut() {
        c.x -= e.x;
        c.y -= e.y;
    }
    e.r
}

/// Center for a circle of radius `r` tangent to both `b` and `a`.
fn place(b: &Circle, a: &Circle, r: f64) -> PointF {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;
    if d2 == 0.0 {
        return PointF::new(a.x + r, a.y);
    }

    let a2 = (a.r + r) * (a.r + r);
    let b2 = (b.r + r) * (b.r + r);
    if a2 > b2 {
        let x = (d2 + b2 - a2) / (2.0 * d2);
        let y = (b2 / d2 - x * x).max(0.0).sqrt();
        PointF::new(b.x - x * dx - y * dy, b.y - x * dy + y * dx)
    } else {
        let x = (d2 + a2 - b2) / (2.0 * d2);
        let y = (a2 / d2 - x * x).max(0.0).sqrt();
        PointF::new(a.x + x * dx - y * dy, a.y + x * dy + y * dx)
    }
}

/// Overlap test with a tolerance relative to the pair's radii.
fn intersects(a: &Circle, b: &Circle) -> bool {
    let dr = (a.r + b.r) * (1.0 - 1e-6);
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

/// Squared distance from the origin to the weighted midpoint of the chain
/// segment `node -> next`.
fn score(circles: &[Circle], node: usize, next: usize) -> f64 {
    let (a, b) = (&circles[node], &circles[next]);
    let ab = a.r + b.r;
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}
