use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// How an internal node's weight is derived.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Internal nodes weigh the sum of their children. Authored values on
    /// internal nodes are validated but otherwise ignored.
    #[default]
    SumOfChildren,
    /// An authored weight on an internal node wins over the sum.
    PreferExplicit,
}

/// A node of the input hierarchy.
///
/// Deserializes from the `{ id, name, value, children }` shape the chart data
/// is authored in. Never carries layout results; see `PackedCircle` for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedNode {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(default, alias = "value", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WeightedNode>,
}

impl WeightedNode {
    pub fn leaf(id: impl Into<String>, label: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight: Some(weight),
            children: Vec::new(),
        }
    }

    pub fn branch(
        id: impl Into<String>,
        label: impl Into<String>,
        children: Vec<WeightedNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            weight: None,
            children,
        }
    }

    /// Attach an authored weight (used by `WeightPolicy::PreferExplicit`).
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Weight used for sizing this node under `policy`.
    ///
    /// Leaves must carry their own weight. Every weight met along the way must
    /// be finite and non-negative.
    pub fn effective_weight(&self, policy: WeightPolicy) -> Result<f64, LayoutError> {
        let explicit = match self.weight {
            Some(w) => Some(checked_weight(&self.id, w)?),
            None => None,
        };

        if self.children.is_empty() {
            return explicit.ok_or_else(|| LayoutError::MissingWeight { id: self.id.clone() });
        }

        if let (Some(w), WeightPolicy::PreferExplicit) = (explicit, policy) {
            return Ok(w);
        }

        let mut total = 0.0;
        for child in &self.children {
            total += child.effective_weight(policy)?;
        }
        if !total.is_finite() {
            return Err(LayoutError::InvalidWeight { id: self.id.clone(), weight: total });
        }
        Ok(total)
    }

    /// Validate every weight in the subtree, regardless of policy.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if let Some(w) = self.weight {
            checked_weight(&self.id, w)?;
        } else if self.children.is_empty() {
            return Err(LayoutError::MissingWeight { id: self.id.clone() });
        }
        self.children.iter().try_for_each(WeightedNode::validate)
    }

    /// Depth-first search for a node by id (including self).
    pub fn find(&self, id: &str) -> Option<&WeightedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn leaf_count(&self) -> usize {
        if self.children.is_empty() {
            1
        } else {
            self.children.iter().map(WeightedNode::leaf_count).sum()
        }
    }
}

fn checked_weight(id: &str, weight: f64) -> Result<f64, LayoutError> {
    if weight.is_finite() && weight >= 0.0 {
        Ok(weight)
    } else {
        Err(LayoutError::InvalidWeight { id: id.to_string(), weight })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> WeightedNode {
        WeightedNode::branch(
            "s1",
            "Segment 1",
            vec![
                WeightedNode::leaf("a", "A", 2.0),
                WeightedNode::branch(
                    "s1-1",
                    "Sub",
                    vec![WeightedNode::leaf("b", "B", 1.5), WeightedNode::leaf("c", "C", 0.5)],
                )
                .with_weight(10.0),
            ],
        )
        .with_weight(30.0)
    }

    #[test]
    fn test_sum_of_children_ignores_authored_internal_weights() {
        let w = segment().effective_weight(WeightPolicy::SumOfChildren).unwrap();
        assert_eq!(w, 4.0);
    }

    #[test]
    fn test_prefer_explicit_uses_authored_weight() {
        let node = segment();
        assert_eq!(node.effective_weight(WeightPolicy::PreferExplicit).unwrap(), 30.0);
        assert_eq!(
            node.children[1].effective_weight(WeightPolicy::PreferExplicit).unwrap(),
            10.0
        );
    }

    #[test]
    fn test_negative_weight_is_rejected() {
        let node = WeightedNode::branch("p", "P", vec![WeightedNode::leaf("x", "X", -1.0)]);
        let err = node.effective_weight(WeightPolicy::SumOfChildren).unwrap_err();
        assert_eq!(err, LayoutError::InvalidWeight { id: "x".to_string(), weight: -1.0 });
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_overflowing_sum_is_rejected() {
        let node = WeightedNode::branch(
            "p",
            "P",
            vec![WeightedNode::leaf("a", "A", f64::MAX), WeightedNode::leaf("b", "B", f64::MAX)],
        );
        let err = node.effective_weight(WeightPolicy::SumOfChildren).unwrap_err();
        assert!(matches!(err, LayoutError::InvalidWeight { ref id, .. } if id == "p"));
    }

    #[test]
    fn test_nan_weight_is_rejected() {
        let node = WeightedNode::leaf("x", "X", f64::NAN);
        assert!(matches!(
            node.effective_weight(WeightPolicy::SumOfChildren),
            Err(LayoutError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_leaf_without_weight() {
        let node = WeightedNode::branch("p", "P", vec![WeightedNode::branch("x", "X", vec![])]);
        assert_eq!(
            node.effective_weight(WeightPolicy::PreferExplicit),
            Err(LayoutError::MissingWeight { id: "x".to_string() })
        );
        assert_eq!(node.validate(), Err(LayoutError::MissingWeight { id: "x".to_string() }));
    }

    #[test]
    fn test_deserialize_source_shape() {
        let json = r#"{
            "name": "root",
            "children": [
                { "name": "Segment 1", "id": "segment-1", "value": 30,
                  "children": [ { "name": "Company", "id": "c-1", "value": 1.25 } ] }
            ]
        }"#;
        let root: WeightedNode = serde_json::from_str(json).unwrap();
        assert_eq!(root.id, "");
        assert_eq!(root.label, "root");
        assert_eq!(root.children[0].weight, Some(30.0));
        assert_eq!(root.children[0].children[0].label, "Company");
        assert_eq!(root.find("c-1").map(|n| n.weight), Some(Some(1.25)));
        assert_eq!(root.leaf_count(), 1);
    }
}
