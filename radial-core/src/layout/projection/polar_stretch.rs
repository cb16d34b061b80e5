//! Bent projection: the packing is read in polar terms.
//!
//! With `F` the frame radius, a local center (x, y) becomes
//! - angle fraction `0.5 + x / 2F`, spread over the padded angular range,
//! - radius fraction `0.5 - y / 2F` ("up" is outward), spread over
//!   [inner, outer].
//!
//! Radii scale by `(outer - inner) / 2F`; with `F` set to half the radial span
//! that factor is 1.

use super::{SectorFrame, SectorProjection};
use crate::layout::geometry::{polar, Circle};
use crate::layout::sector::Sector;

pub struct PolarStretch;

impl SectorProjection for PolarStretch {
    fn frame_radius(&self, sector: &Sector) -> f64 {
        sector.radial_span() / 2.0
    }

    fn project(&self, frame: &SectorFrame, local: &Circle) -> Circle {
        let sector = &frame.sector;
        let span = 2.0 * frame.frame_radius;
        let angle_fraction = 0.5 + local.x / span;
        let radius_fraction = 0.5 - local.y / span;

        let (a0, a1) = frame.padded_bounds();
        let angle = a0 + angle_fraction * (a1 - a0);
        let radius = sector.inner_radius + radius_fraction * sector.radial_span();
        let scale = sector.radial_span() / span;

        Circle::at(polar(angle, radius), local.r * scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::angle_of;
    use std::f64::consts::PI;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn frame() -> SectorFrame {
        let sector = Sector::new(0.0, PI / 2.0, 20.0, 100.0).unwrap();
        SectorFrame::new(sector, &PolarStretch, 0.1)
    }

    #[test]
    fn test_center_maps_to_mid_radius_on_bisector() {
        let f = frame();
        let c = PolarStretch.project(&f, &Circle::new(0.0, 0.0, 4.0));
        assert!(close(c.center().norm(), 60.0));
        assert!(close(angle_of(c.center()), PI / 4.0));
        assert!(close(c.r, 4.0));
    }

    #[test]
    fn test_frame_edges_map_to_padded_bounds() {
        let f = frame();
        let r = f.frame_radius;
        let left = PolarStretch.project(&f, &Circle::new(-r, 0.0, 1.0));
        let right = PolarStretch.project(&f, &Circle::new(r, 0.0, 1.0));
        assert!(close(angle_of(left.center()), 0.1));
        assert!(close(angle_of(right.center()), PI / 2.0 - 0.1));

        let top = PolarStretch.project(&f, &Circle::new(0.0, -r, 1.0));
        let bottom = PolarStretch.project(&f, &Circle::new(0.0, r, 1.0));
        assert!(close(top.center().norm(), 100.0));
        assert!(close(bottom.center().norm(), 20.0));
    }
}
