use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::WeightedNode;

/// Which top-level segments are drawn, and which of those are split into
/// their sub-segments.
///
/// A snapshot value: every toggle returns a new state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityState {
    #[serde(default)]
    visible: BTreeSet<String>,
    #[serde(default)]
    expanded: BTreeSet<String>,
}

impl VisibilityState {
    pub fn new<V, E, S>(visible: V, expanded: E) -> Self
    where
        V: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            visible: visible.into_iter().map(Into::into).collect(),
            expanded: expanded.into_iter().map(Into::into).collect(),
        }
    }

    /// Initial state: every top-level segment of `raw` visible, none expanded.
    pub fn all_visible(raw: &WeightedNode) -> Self {
        Self {
            visible: raw.children.iter().map(|c| c.id.clone()).collect(),
            expanded: BTreeSet::new(),
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn visible(&self) -> impl Iterator<Item = &str> {
        self.visible.iter().map(String::as_str)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &str> {
        self.expanded.iter().map(String::as_str)
    }

    /// Show or hide a segment. Hiding also collapses it.
    pub fn with_visible(&self, id: &str, visible: bool) -> Self {
        let mut next = self.clone();
        if visible {
            next.visible.insert(id.to_string());
        } else {
            next.visible.remove(id);
            next.expanded.remove(id);
        }
        next
    }

    pub fn with_expanded(&self, id: &str, expanded: bool) -> Self {
        let mut next = self.clone();
        if expanded {
            next.expanded.insert(id.to_string());
        } else {
            next.expanded.remove(id);
        }
        next
    }

    pub fn toggle_expanded(&self, id: &str) -> Self {
        self.with_expanded(id, !self.is_expanded(id))
    }
}
