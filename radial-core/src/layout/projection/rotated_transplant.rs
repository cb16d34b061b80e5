//! Rigid projection: the packing keeps its shape and chart-unit scale.
//!
//! The local frame is centered on the sector centroid and rotated by the
//! bisector angle. The frame radius is half the sector's inscribed extent, so
//! a packing sized against it starts out roughly inside the wedge; the fit
//! solver takes care of the rest, including the angular padding.

use super::{SectorFrame, SectorProjection};
use crate::layout::geometry::Circle;
use crate::layout::sector::Sector;

pub struct RotatedTransplant;

impl SectorProjection for RotatedTransplant {
    fn frame_radius(&self, sector: &Sector) -> f64 {
        sector.inscribed_extent() / 2.0
    }

    fn project(&self, frame: &SectorFrame, local: &Circle) -> Circle {
        let sector = &frame.sector;
        let center = sector.centroid().add(local.center().rotate(sector.bisector()));
        Circle::at(center, local.r)
    }
}
