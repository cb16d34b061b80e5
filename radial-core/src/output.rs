//! Output types for the chart host.
//!
//! These structs are serialized to JSON and handed to the renderer, which
//! draws the sector arcs, labels and bubbles.

use serde::Serialize;

use crate::error::LayoutError;
use crate::layout::{Bubble, ChartLayout, FitStatus, SectorLayout};

/// A bubble ready to draw, in chart coordinates (center at the origin, y down)
#[derive(Debug, Clone, Serialize)]
pub struct BubbleOutput {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub depth: usize,
}

impl From<Bubble> for BubbleOutput {
    fn from(b: Bubble) -> Self {
        Self { id: b.id, label: b.label, x: b.x, y: b.y, r: b.r, depth: b.depth }
    }
}

/// One sector of the ring
#[derive(Debug, Clone, Serialize)]
pub struct SectorOutput {
    pub id: String,
    pub label: String,
    pub weight: f64,
    /// Radians, 0 at 12 o'clock, clockwise
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub bubbles: Vec<BubbleOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub clusters: Vec<BubbleOutput>,
    pub fit: FitStatus,
}

impl From<SectorLayout> for SectorOutput {
    fn from(s: SectorLayout) -> Self {
        Self {
            id: s.id,
            label: s.label,
            weight: s.weight,
            start_angle: s.sector.start_angle,
            end_angle: s.sector.end_angle,
            inner_radius: s.sector.inner_radius,
            outer_radius: s.sector.outer_radius,
            bubbles: s.bubbles.into_iter().map(BubbleOutput::from).collect(),
            clusters: s.clusters.into_iter().map(BubbleOutput::from).collect(),
            fit: s.fit,
        }
    }
}

/// Error details for the host
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Stable machine-readable kind, e.g. "invalid_weight"
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl From<&LayoutError> for ErrorInfo {
    fn from(e: &LayoutError) -> Self {
        Self {
            kind: e.kind().to_string(),
            message: e.to_string(),
            node_id: e.node_id().map(str::to_string),
        }
    }
}

/// The combined output sent to the host
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChartOutput {
    pub outer_radius: f64,
    pub inner_radius: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sectors: Vec<SectorOutput>,
    /// Some sector (or cluster) hit the iteration cap and may overflow its bounds
    pub fit_exhausted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ChartOutput {
    pub fn from_error(e: &LayoutError) -> Self {
        Self { error: Some(ErrorInfo::from(e)), ..Self::default() }
    }
}

impl From<ChartLayout> for ChartOutput {
    fn from(layout: ChartLayout) -> Self {
        let fit_exhausted = layout.fit_exhausted();
        Self {
            outer_radius: layout.outer_radius,
            inner_radius: layout.inner_radius,
            sectors: layout.sectors.into_iter().map(SectorOutput::from).collect(),
            fit_exhausted,
            error: None,
        }
    }
}
