// Radial bubble layout.
//
// One pass, from an immutable snapshot:
// - build the visible hierarchy (hierarchy::build),
// - split the turn into one sector per top-level node,
// - per sector: pack the node's subtree, project it into the sector, and
//   shrink-and-repack until every circle sits inside the sector bounds,
// - optionally re-fit each cluster's children inside its own circle,
// - flatten into chart-space bubbles.
//
// Sectors are laid out independently of each other.
//
// Submodules:
// - geometry: points, circles, chart angle convention
// - enclose: smallest enclosing circle
// - pack: front-chain circle packing
// - sector: sector type and partitioning of the turn
// - projection: local frame -> sector mappings
// - fit: bounded boundary-fit solver

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LayoutError;
use crate::hierarchy::{self, VisibilityState, WeightedNode};

mod enclose;
pub mod fit;
pub mod geometry;
pub mod pack;
pub mod projection;
pub mod sector;

pub use enclose::enclose;
pub use fit::{fit_within_circle, FitConfig, FitOutcome, FitStatus};
pub use geometry::{Circle, PointF};
pub use pack::{pack, PackConfig, PackedCircle};
pub use projection::{map_to_sector, ProjectionMode, SectorFrame, SectorProjection};
pub use sector::{partition, Sector, SectorShare};

use fit::{fit, SectorBoundary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Space between the chart edge and the outer radius.
    pub margin: f64,
    /// Inner radius as a fraction of the outer one when several sectors show.
    pub inner_radius_ratio: f64,
    /// Angular padding at each sector edge, in radians.
    pub angular_padding: f64,
    pub projection: ProjectionMode,
    pub share: SectorShare,
    pub pack: PackConfig,
    pub fit: FitConfig,
    /// Re-run the solver inside each cluster circle after the sector pass.
    pub nested_fit: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 50.0,
            inner_radius_ratio: 0.3,
            angular_padding: 0.02,
            projection: ProjectionMode::RotatedTransplant,
            share: SectorShare::Weighted,
            pack: PackConfig::default(),
            fit: FitConfig::default(),
            nested_fit: true,
        }
    }
}

/// How big the chart is.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSize {
    /// Viewport size; the outer radius is half the smaller side minus the margin.
    Dimensions { width: f64, height: f64 },
    OuterRadius(f64),
}

impl ChartSize {
    pub fn outer_radius(&self, margin: f64) -> f64 {
        match *self {
            ChartSize::Dimensions { width, height } => width.min(height) / 2.0 - margin,
            ChartSize::OuterRadius(r) => r,
        }
    }
}

/// A packed circle in chart coordinates (chart center at the origin).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub r: f64,
    /// Depth below the sector's node.
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorLayout {
    pub id: String,
    pub label: String,
    pub weight: f64,
    pub sector: Sector,
    /// Leaf circles, the ones drawn as bubbles.
    pub bubbles: Vec<Bubble>,
    /// Internal circles (sub-segment clusters), for labels.
    pub clusters: Vec<Bubble>,
    /// Pack radius the sector settled at.
    pub pack_radius: f64,
    pub fit: FitStatus,
    /// Clusters whose nested solve ran out of iterations.
    pub nested_exhausted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub outer_radius: f64,
    pub inner_radius: f64,
    pub sectors: Vec<SectorLayout>,
}

impl ChartLayout {
    pub fn fit_exhausted(&self) -> bool {
        self.sectors
            .iter()
            .any(|s| s.fit.fit_exhausted() || s.nested_exhausted > 0)
    }
}

/// Full pass from raw data and visibility.
pub fn layout_chart(
    raw: &WeightedNode,
    visibility: &VisibilityState,
    size: ChartSize,
    cfg: &LayoutConfig,
) -> Result<ChartLayout, LayoutError> {
    let root = hierarchy::build(raw, visibility)?;
    layout_hierarchy(&root, size, cfg)
}

/// Lay out an already-built hierarchy: one sector per child of `root`.
pub fn layout_hierarchy(
    root: &WeightedNode,
    size: ChartSize,
    cfg: &LayoutConfig,
) -> Result<ChartLayout, LayoutError> {
    let outer_radius = size.outer_radius(cfg.margin);

    let weights = root
        .children
        .iter()
        .map(|c| c.effective_weight(cfg.pack.weight_policy))
        .collect::<Result<Vec<_>, _>>()?;
    let spans = partition(&weights, cfg.share);
    let drawn = spans.iter().filter(|s| s.is_some()).count();
    let inner_radius = if drawn > 1 { outer_radius * cfg.inner_radius_ratio } else { 0.0 };

    debug!(sectors = drawn, outer_radius, inner_radius, "laying out chart");

    let mut sectors = Vec::with_capacity(drawn);
    for (node, span) in root.children.iter().zip(spans) {
        let Some((start, end)) = span else {
            debug!(node = %node.id, "skipping zero-share node");
            continue;
        };
        let sector = Sector::new(start, end, inner_radius, outer_radius)?;
        sectors.push(layout_sector(node, sector, cfg)?);
    }

    Ok(ChartLayout { outer_radius, inner_radius, sectors })
}

/// Pack, project and fit one top-level node into `sector`.
pub fn layout_sector(
    node: &WeightedNode,
    sector: Sector,
    cfg: &LayoutConfig,
) -> Result<SectorLayout, LayoutError> {
    let projection = cfg.projection;
    let frame = SectorFrame::new(sector, &projection, cfg.angular_padding);
    let anchor = projection.project(&frame, &Circle::default()).center();
    let boundary = SectorBoundary::new(sector, anchor, frame.padding);

    let initial = frame.frame_radius * cfg.fit.initial_fill;
    let outcome = fit(&boundary, initial, &cfg.fit, |size| {
        let packed = pack(node, size, &cfg.pack)?;
        let circles = map_to_sector(&packed, &frame, &projection)
            .into_iter()
            .map(|m| m.circle)
            .collect();
        Ok((packed, circles))
    })?;

    let mut packed = outcome.value;
    let nested_exhausted = if cfg.nested_fit {
        refit_clusters(&mut packed, node, cfg)?
    } else {
        0
    };

    let mut bubbles = Vec::new();
    let mut clusters = Vec::new();
    for m in map_to_sector(&packed, &frame, &projection) {
        let bubble = Bubble {
            id: m.id,
            label: m.label,
            x: m.circle.x,
            y: m.circle.y,
            r: m.circle.r,
            depth: m.depth,
        };
        if m.is_leaf {
            bubbles.push(bubble);
        } else {
            clusters.push(bubble);
        }
    }

    Ok(SectorLayout {
        id: node.id.clone(),
        label: node.label.clone(),
        weight: packed.weight,
        sector,
        bubbles,
        clusters,
        pack_radius: outcome.size,
        fit: outcome.status,
        nested_exhausted,
    })
}

/// Re-pack every cluster's subtree inside its settled circle. Returns how many
/// clusters hit the iteration cap.
fn refit_clusters(
    packed: &mut PackedCircle,
    source: &WeightedNode,
    cfg: &LayoutConfig,
) -> Result<usize, LayoutError> {
    let mut exhausted = 0;
    for (cluster, node) in packed.children.iter_mut().zip(&source.children) {
        if node.children.is_empty() {
            continue;
        }
        let outcome = fit_within_circle(node, cluster.radius, &cfg.pack, &cfg.fit)?;
        if outcome.status.fit_exhausted() {
            exhausted += 1;
        }
        cluster.children = outcome.value.children;
    }
    Ok(exhausted)
}
