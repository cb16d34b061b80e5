//! Turns the static data tree plus a visibility snapshot into the tree the
//! layout engine works on.
//!
//! The result is a synthetic root whose children are the top-level nodes that
//! each get their own sector:
//! - hidden segments are dropped,
//! - expanded segments are replaced by their sub-segments, in order,
//! - everything else is kept whole and sized by its aggregate weight.

use tracing::debug;

use super::{VisibilityState, WeightedNode};
use crate::error::LayoutError;

pub const ROOT_ID: &str = "root";

pub fn build(
    raw: &WeightedNode,
    visibility: &VisibilityState,
) -> Result<WeightedNode, LayoutError> {
    // Every id the state refers to has to exist at the top level.
    for id in visibility.visible().chain(visibility.expanded()) {
        if !raw.children.iter().any(|c| c.id == id) {
            return Err(LayoutError::UnknownNode { id: id.to_string() });
        }
    }

    let mut children = Vec::new();
    for segment in &raw.children {
        if !visibility.is_visible(&segment.id) {
            continue;
        }
        if visibility.is_expanded(&segment.id) && !segment.children.is_empty() {
            debug!(segment = %segment.id, count = segment.children.len(), "promoting sub-segments");
            children.extend(segment.children.iter().cloned());
        } else {
            children.push(segment.clone());
        }
    }

    Ok(WeightedNode {
        id: ROOT_ID.to_string(),
        label: raw.label.clone(),
        weight: None,
        children,
    })
}
