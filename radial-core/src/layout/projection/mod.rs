//! Projections from a packing's local frame into a sector of the chart.
//!
//! Two interchangeable strategies:
//! - `rotated_transplant`: keep the packing as a rigid disc, move it onto the
//!   sector centroid and turn its "up" axis onto the bisector.
//! - `polar_stretch`: read local (x, y) as (angle, radius) fractions of the
//!   padded wedge and bend the packing to follow the arc.

mod polar_stretch;
mod rotated_transplant;

pub use polar_stretch::PolarStretch;
pub use rotated_transplant::RotatedTransplant;

use serde::{Deserialize, Serialize};

use super::geometry::Circle;
use super::pack::PackedCircle;
use super::sector::Sector;

/// A sector plus what a projection needs to place circles inside it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SectorFrame {
    pub sector: Sector,
    /// Local frame radius whose edge corresponds to the sector bounds.
    pub frame_radius: f64,
    /// Angular padding in radians, already clamped for this sector.
    pub padding: f64,
}

impl SectorFrame {
    pub fn new(sector: Sector, projection: &impl SectorProjection, angular_padding: f64) -> Self {
        Self {
            sector,
            frame_radius: projection.frame_radius(&sector),
            padding: sector.effective_padding(angular_padding),
        }
    }

    /// Usable angular range after padding.
    pub fn padded_bounds(&self) -> (f64, f64) {
        (
            self.sector.start_angle + self.padding,
            self.sector.end_angle - self.padding,
        )
    }
}

pub trait SectorProjection {
    /// Radius of the local frame the packing is laid out against.
    fn frame_radius(&self, sector: &Sector) -> f64;

    /// Map one circle from the packing's root frame to chart coordinates.
    fn project(&self, frame: &SectorFrame, local: &Circle) -> Circle;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    #[default]
    RotatedTransplant,
    PolarStretch,
}

impl SectorProjection for ProjectionMode {
    fn frame_radius(&self, sector: &Sector) -> f64 {
        match self {
            ProjectionMode::RotatedTransplant => RotatedTransplant.frame_radius(sector),
            ProjectionMode::PolarStretch => PolarStretch.frame_radius(sector),
        }
    }

    fn project(&self, frame: &SectorFrame, local: &Circle) -> Circle {
        match self {
            ProjectionMode::RotatedTransplant => RotatedTransplant.project(frame, local),
            ProjectionMode::PolarStretch => PolarStretch.project(frame, local),
        }
    }
}

/// One packed circle placed on the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedCircle {
    pub id: String,
    pub label: String,
    pub circle: Circle,
    /// Depth below the sector's top-level node (its children are 1).
    pub depth: usize,
    pub is_leaf: bool,
}

/// Project every descendant of `packed` into the sector, in pre-order.
pub fn map_to_sector(
    packed: &PackedCircle,
    frame: &SectorFrame,
    projection: &impl SectorProjection,
) -> Vec<MappedCircle> {
    packed
        .descendants()
        .into_iter()
        .map(|(node, local, depth)| MappedCircle {
            id: node.id.clone(),
            label: node.label.clone(),
            circle: projection.project(frame, &local),
            depth,
            is_leaf: node.is_leaf(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::WeightedNode;
    use crate::layout::pack::{pack, PackConfig};
    use std::f64::consts::PI;

    #[test]
    fn test_mode_dispatch_matches_strategies() {
        let sector = Sector::new(0.0, PI / 2.0, 20.0, 100.0).unwrap();
        let c = Circle::new(3.0, -4.0, 2.0);
        for mode in [ProjectionMode::RotatedTransplant, ProjectionMode::PolarStretch] {
            let frame = SectorFrame::new(sector, &mode, 0.05);
            let direct = match mode {
                ProjectionMode::RotatedTransplant => RotatedTransplant.project(&frame, &c),
                ProjectionMode::PolarStretch => PolarStretch.project(&frame, &c),
            };
            assert_eq!(mode.project(&frame, &c), direct);
        }
    }

    #[test]
    fn test_map_to_sector_flags_leaves() {
        let node = WeightedNode::branch(
            "seg",
            "Seg",
            vec![
                WeightedNode::branch(
                    "sub",
                    "Sub",
                    vec![WeightedNode::leaf("a", "A", 1.0), WeightedNode::leaf("b", "B", 1.0)],
                ),
                WeightedNode::leaf("c", "C", 2.0),
            ],
        );
        let packed = pack(&node, 10.0, &PackConfig::default()).unwrap();
        let sector = Sector::new(0.0, PI, 30.0, 100.0).unwrap();
        let mode = ProjectionMode::RotatedTransplant;
        let frame = SectorFrame::new(sector, &mode, 0.02);
        let mapped = map_to_sector(&packed, &frame, &mode);

        let ids: Vec<(&str, usize, bool)> =
            mapped.iter().map(|m| (m.id.as_str(), m.depth, m.is_leaf)).collect();
        assert_eq!(ids, vec![("sub", 1, false), ("a", 2, true), ("b", 2, true), ("c", 1, true)]);
    }
}
