use std::f64::consts::{PI, TAU};

use serde::{Deserialize, Serialize};

use super::geometry::{polar, PointF};
use crate::error::LayoutError;

/// Angular span tolerance used to recognize a full-circle sector.
const FULL_CIRCLE_EPS: f64 = 1e-9;

/// Annular wedge assigned to one visible top-level node.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl Sector {
    pub fn new(
        start_angle: f64,
        end_angle: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> Result<Self, LayoutError> {
        let valid = [start_angle, end_angle, inner_radius, outer_radius]
            .iter()
            .all(|v| v.is_finite())
            && start_angle < end_angle
            && 0.0 <= inner_radius
            && inner_radius < outer_radius;
        if !valid {
            return Err(LayoutError::DegenerateSector {
                start_angle,
                end_angle,
                inner_radius,
                outer_radius,
            });
        }
        Ok(Self { start_angle, end_angle, inner_radius, outer_radius })
    }

    pub fn span(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    pub fn bisector(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    pub fn radial_span(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    pub fn is_full_circle(&self) -> bool {
        self.span() >= TAU - FULL_CIRCLE_EPS
    }

    /// A full circle with no hole: the single-segment chart.
    pub fn is_full_disc(&self) -> bool {
        self.is_full_circle() && self.inner_radius == 0.0
    }

    /// Center of the arc band: mid radius on the bisector. The full disc is
    /// centered on the chart origin.
    pub fn centroid(&self) -> PointF {
        if self.is_full_disc() {
            return PointF::ORIGIN;
        }
        polar(self.bisector(), (self.inner_radius + self.outer_radius) / 2.0)
    }

    /// Angular padding actually applied: never more than a quarter of the span,
    /// and none for a full circle.
    pub fn effective_padding(&self, padding: f64) -> f64 {
        if self.is_full_circle() {
            0.0
        } else {
            padding.clamp(0.0, self.span() / 4.0)
        }
    }

    /// Side of the square a packing may start at, before any fitting: the
    /// smaller of the chord across the wedge and its radial depth.
    pub fn inscribed_extent(&self) -> f64 {
        let width = if self.span() < PI {
            2.0 * self.outer_radius * (self.span() / 2.0).sin()
        } else {
            2.0 * self.outer_radius
        };
        let height = if self.is_full_disc() {
            2.0 * self.outer_radius
        } else {
            self.radial_span()
        };
        width.min(height)
    }
}

/// How the full turn is split between visible top-level nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorShare {
    /// Proportional to each node's weight.
    #[default]
    Weighted,
    /// Same span for every node.
    Equal,
}

/// Split [0, 2π) into consecutive spans, one per weight, in input order.
///
/// With `Weighted`, spans follow the weights; a zero weight yields `None`. If
/// every weight is zero, spans fall back to equal shares. The last span ends at
/// exactly 2π.
pub fn partition(weights: &[f64], share: SectorShare) -> Vec<Option<(f64, f64)>> {
    // Shares are taken relative to the largest weight so the sum stays finite.
    let largest = weights.iter().copied().filter(|w| w.is_finite()).fold(0.0, f64::max);
    let weights: Vec<f64> = match largest > 0.0 {
        true => weights.iter().map(|&w| w / largest).collect(),
        false => weights.to_vec(),
    };
    let total: f64 = weights.iter().sum();
    let equal = share == SectorShare::Equal || total <= 0.0;
    let last = match equal {
        true => weights.len().checked_sub(1),
        false => weights.iter().rposition(|&w| w > 0.0),
    };

    let mut angle = 0.0;
    weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let fraction = if equal { 1.0 / weights.len() as f64 } else { w / total };
            if fraction <= 0.0 {
                return None;
            }
            let start = angle;
            let end = if Some(i) == last { TAU } else { start + TAU * fraction };
            angle = end;
            Some((start, end))
        })
        .collect()
}
