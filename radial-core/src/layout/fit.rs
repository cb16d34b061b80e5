// Boundary-fit solver.
//
// Bounded shrink-and-repack loop:
//
//   Mapped  --check: no violations------------------------> Fit (Clean | Fitted)
//   Mapped  --check: violations, iterations < cap--> Rescale --> Mapped
//   Mapped  --check: violations, iterations == cap---------> Fit (Exhausted)
//
// Each violating circle yields the largest shrink factor that would bring it
// back inside, assuming the whole arrangement scales toward the boundary's
// anchor (true for a repack at a smaller size, since packing is scale
// invariant). The strictest factor times a safety margin becomes the next
// size multiplier.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::geometry::{Circle, PointF};
use super::pack::{pack, PackConfig, PackedCircle};
use super::sector::Sector;
use crate::error::LayoutError;
use crate::hierarchy::WeightedNode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Starting pack radius as a fraction of the projection's frame radius.
    pub initial_fill: f64,
    pub max_iterations: usize,
    /// Applied on top of the computed factor so circles do not land exactly on
    /// a boundary.
    pub safety_margin: f64,
    /// Used when the computed factor is unusable (not in (0, 1)).
    pub fallback_shrink: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            initial_fill: 0.75,
            max_iterations: 10,
            safety_margin: 0.98,
            fallback_shrink: 0.9,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitStatus {
    /// Fit at the initial size.
    Clean,
    /// Fit after shrinking `iterations` times.
    Fitted { iterations: usize },
    /// Gave up after `iterations` shrinks with `violations` circles still out.
    Exhausted { iterations: usize, violations: usize },
}

impl FitStatus {
    pub fn iterations(&self) -> usize {
        match *self {
            FitStatus::Clean => 0,
            FitStatus::Fitted { iterations } | FitStatus::Exhausted { iterations, .. } => {
                iterations
            }
        }
    }

    pub fn fit_exhausted(&self) -> bool {
        matches!(self, FitStatus::Exhausted { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome<T> {
    pub value: T,
    /// Size the final layout was produced at.
    pub size: f64,
    pub status: FitStatus,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Outer,
    Inner,
    Angular,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Largest shrink factor (toward the anchor) that resolves it.
    pub scale: f64,
}

impl Violation {
    fn stricter(self, other: Option<Violation>) -> Violation {
        match other {
            Some(o) if o.scale < self.scale => o,
            _ => self,
        }
    }
}

pub trait Boundary {
    /// The strictest violation of `circle`, or `None` when it is inside.
    fn violation(&self, circle: &Circle) -> Option<Violation>;
}

/// Run the solver. `layout` produces a value at a given size together with the
/// circles to check, in the boundary's coordinate space.
pub fn fit<T, B, F>(
    boundary: &B,
    initial_size: f64,
    cfg: &FitConfig,
    mut layout: F,
) -> Result<FitOutcome<T>, LayoutError>
where
    B: Boundary,
    F: FnMut(f64) -> Result<(T, Vec<Circle>), LayoutError>,
{
    let mut size = initial_size;
    let mut iterations = 0;

    loop {
        let (value, circles) = layout(size)?;

        let mut violations = 0;
        let mut factor = 1.0_f64;
        for c in &circles {
            if let Some(v) = boundary.violation(c) {
                violations += 1;
                factor = factor.min(v.scale);
            }
        }

        if violations == 0 {
            let status = match iterations {
                0 => FitStatus::Clean,
                n => FitStatus::Fitted { iterations: n },
            };
            return Ok(FitOutcome { value, size, status });
        }

        if iterations >= cfg.max_iterations {
            warn!(iterations, violations, size, "fit iteration cap reached");
            return Ok(FitOutcome {
                value,
                size,
                status: FitStatus::Exhausted { iterations, violations },
            });
        }

        let mut shrink = factor * cfg.safety_margin;
        if !(shrink > 0.0 && shrink < 1.0) {
            shrink = cfg.fallback_shrink;
        }
        iterations += 1;
        debug!(iteration = iterations, violations, shrink, "shrinking layout");
        size *= shrink;
    }
}

/// Radial and angular bounds of a sector, seen from the chart origin.
#[derive(Debug, Clone)]
pub struct SectorBoundary {
    sector: Sector,
    anchor: PointF,
    /// (ray direction, inward normal) for the padded start and end angles.
    rays: Option<[(PointF, PointF); 2]>,
    convex: bool,
    tolerance: f64,
}

impl SectorBoundary {
    /// `anchor` is where the local packing origin lands; `padding` is the
    /// angular padding already clamped for this sector.
    pub fn new(sector: Sector, anchor: PointF, padding: f64) -> Self {
        let a0 = sector.start_angle + padding;
        let a1 = sector.end_angle - padding;
        let rays = (!sector.is_full_circle()).then(|| {
            let (s0, c0) = a0.sin_cos();
            let (s1, c1) = a1.sin_cos();
            [
                (PointF::new(s0, -c0), PointF::new(c0, s0)),
                (PointF::new(s1, -c1), PointF::new(-c1, -s1)),
            ]
        });
        Self {
            sector,
            anchor,
            rays,
            convex: a1 - a0 < PI,
            tolerance: 1e-9 * sector.outer_radius.max(1.0),
        }
    }

    fn outer(&self, c: &Circle, distance: f64) -> Option<Violation> {
        let outer = self.sector.outer_radius;
        if distance + c.r <= outer + self.tolerance {
            return None;
        }
        // |C + s v| + s r = outer
        let v = c.center().sub(self.anchor);
        let scale = first_positive_root(
            v.dot(v) - c.r * c.r,
            2.0 * (self.anchor.dot(v) + c.r * outer),
            self.anchor.dot(self.anchor) - outer * outer,
        );
        Some(Violation { kind: ViolationKind::Outer, scale })
    }

    fn inner(&self, c: &Circle, distance: f64) -> Option<Violation> {
        let inner = self.sector.inner_radius;
        if inner <= 0.0 || distance - c.r >= inner - self.tolerance {
            return None;
        }
        // |C + s v| - s r = inner
        let v = c.center().sub(self.anchor);
        let scale = first_positive_root(
            v.dot(v) - c.r * c.r,
            2.0 * (self.anchor.dot(v) - c.r * inner),
            self.anchor.dot(self.anchor) - inner * inner,
        );
        Some(Violation { kind: ViolationKind::Inner, scale })
    }

    fn angular(&self, c: &Circle) -> Option<Violation> {
        let rays = self.rays.as_ref()?;
        let p = c.center();
        let v = p.sub(self.anchor);
        let mut worst: Option<Violation> = None;
        for (dir, normal) in rays {
            let signed = p.dot(*normal);
            let crosses = signed < c.r - self.tolerance && (self.convex || p.dot(*dir) > 0.0);
            if !crosses {
                continue;
            }
            // n.(C + s v) = s r
            let denom = c.r - normal.dot(v);
            let scale = if denom > 0.0 { (normal.dot(self.anchor) / denom).max(0.0) } else { 0.0 };
            let violation = Violation { kind: ViolationKind::Angular, scale };
            worst = Some(violation.stricter(worst));
        }
        worst
    }
}

impl Boundary for SectorBoundary {
    fn violation(&self, circle: &Circle) -> Option<Violation> {
        let distance = circle.center().norm();
        [
            self.outer(circle, distance),
            self.inner(circle, distance),
            self.angular(circle),
        ]
        .into_iter()
        .flatten()
        .reduce(|a, b| a.stricter(Some(b)))
    }
}

/// A circle of `radius` centered at the local origin.
#[derive(Debug, Copy, Clone)]
pub struct CircleBoundary {
    pub radius: f64,
}

impl Boundary for CircleBoundary {
    fn violation(&self, circle: &Circle) -> Option<Violation> {
        let reach = circle.center().norm() + circle.r;
        if reach <= self.radius * (1.0 + 1e-9) {
            return None;
        }
        Some(Violation { kind: ViolationKind::Outer, scale: self.radius / reach })
    }
}

/// Pack `node` so its whole subtree stays inside a circle of `radius`.
///
/// The nested instance of the solver, run per cluster once its bounding circle
/// is fixed by the enclosing pass.
pub fn fit_within_circle(
    node: &WeightedNode,
    radius: f64,
    pack_cfg: &PackConfig,
    fit_cfg: &FitConfig,
) -> Result<FitOutcome<PackedCircle>, LayoutError> {
    let boundary = CircleBoundary { radius };
    fit(&boundary, radius, fit_cfg, |size| {
        let packed = pack(node, size, pack_cfg)?;
        let circles = packed.descendants().into_iter().map(|(_, c, _)| c).collect();
        Ok((packed, circles))
    })
}

/// Smallest positive root of `a s^2 + b s + c`, or 0 when there is none.
fn first_positive_root(a: f64, b: f64, c: f64) -> f64 {
    let roots: [Option<f64>; 2] = if a.abs() < 1e-12 {
        [(b != 0.0).then(|| -c / b), None]
    } else {
        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            [None, None]
        } else {
            let sq = disc.sqrt();
            [Some((-b - sq) / (2.0 * a)), Some((-b + sq) / (2.0 * a))]
        }
    };
    roots
        .into_iter()
        .flatten()
        .filter(|s| *s > 0.0 && s.is_finite())
        .reduce(f64::min)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::polar;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    /// Scales a fixed arrangement toward `anchor`, like a repack would.
    fn scaled(
        anchor: PointF,
        circles: &[Circle],
        initial: f64,
    ) -> impl FnMut(f64) -> Result<(Vec<Circle>, Vec<Circle>), LayoutError> + '_ {
        move |size| {
            let k = size / initial;
            let out: Vec<Circle> = circles
                .iter()
                .map(|c| Circle::at(anchor.add(c.center().sub(anchor).scale(k)), c.r * k))
                .collect();
            Ok((out.clone(), out))
        }
    }

    #[test]
    fn test_first_positive_root() {
        // (s - 2)(s - 3)
        assert!(close(first_positive_root(1.0, -5.0, 6.0), 2.0, 1e-12));
        // (s + 1)(s - 4)
        assert!(close(first_positive_root(1.0, -3.0, -4.0), 4.0, 1e-12));
        assert!(close(first_positive_root(0.0, 2.0, -1.0), 0.5, 1e-12));
        assert_eq!(first_positive_root(1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_outer_violation_resolves_in_one_iteration() {
        // inner 30, outer 100; a leaf at distance 105 with r = 10.
        let sector = Sector::new(0.0, PI, 30.0, 100.0).unwrap();
        let anchor = sector.centroid();
        let boundary = SectorBoundary::new(sector, anchor, 0.0);
        let leaf = Circle::at(polar(FRAC_PI_2, 105.0), 10.0);

        let v = boundary.violation(&leaf).unwrap();
        assert_eq!(v.kind, ViolationKind::Outer);

        let circles = [leaf];
        let cfg = FitConfig::default();
        let outcome = fit(&boundary, 50.0, &cfg, scaled(anchor, &circles, 50.0)).unwrap();
        assert_eq!(outcome.status, FitStatus::Fitted { iterations: 1 });
        let c = outcome.value[0];
        assert!(c.center().norm() + c.r <= 100.0);
    }

    fn shrink_toward(anchor: PointF, c: &Circle, scale: f64) -> Circle {
        Circle::at(anchor.add(c.center().sub(anchor).scale(scale)), c.r * scale)
    }

    #[test]
    fn test_off_axis_outer_violation_is_exact() {
        let sector = Sector::new(0.0, PI, 30.0, 100.0).unwrap();
        let anchor = sector.centroid();
        let boundary = SectorBoundary::new(sector, anchor, 0.0);
        let leaf = Circle::at(polar(1.0, 98.0), 6.0);
        let v = boundary.violation(&leaf).unwrap();
        let shrunk = shrink_toward(anchor, &leaf, v.scale);
        assert!(close(shrunk.center().norm() + shrunk.r, 100.0, 1e-9));
    }

    #[test]
    fn test_inner_violation() {
        let sector = Sector::new(0.0, PI, 30.0, 100.0).unwrap();
        let anchor = sector.centroid();
        let boundary = SectorBoundary::new(sector, anchor, 0.0);
        let leaf = Circle::at(polar(FRAC_PI_2, 35.0), 10.0);
        let v = boundary.violation(&leaf).unwrap();
        assert_eq!(v.kind, ViolationKind::Inner);
        let shrunk = shrink_toward(anchor, &leaf, v.scale);
        assert!(close(shrunk.center().norm() - shrunk.r, 30.0, 1e-9));
    }

    #[test]
    fn test_angular_violation() {
        let sector = Sector::new(0.0, FRAC_PI_2, 10.0, 100.0).unwrap();
        let anchor = sector.centroid();
        let boundary = SectorBoundary::new(sector, anchor, 0.0);
        // Close to the start ray (angle 0, pointing up), on the inside.
        let leaf = Circle::new(3.0, -60.0, 5.0);
        let v = boundary.violation(&leaf).unwrap();
        assert_eq!(v.kind, ViolationKind::Angular);
        let shrunk = shrink_toward(anchor, &leaf, v.scale);
        assert!(close(shrunk.x, shrunk.r, 1e-9));

        assert!(boundary.violation(&Circle::at(anchor, 5.0)).is_none());
    }

    #[test]
    fn test_reflex_sector_ignores_far_side_of_boundary_lines() {
        let sector = Sector::new(0.0, 1.5 * PI, 30.0, 100.0).unwrap();
        let boundary = SectorBoundary::new(sector, sector.centroid(), 0.0);
        // Inside the wedge, behind the start ray's line (x < 0 region below).
        let c = Circle::at(polar(PI, 60.0), 5.0);
        assert!(boundary.violation(&c).is_none());
        // Straddling the start ray.
        let c = Circle::at(polar(0.02, 60.0), 5.0);
        assert_eq!(boundary.violation(&c).map(|v| v.kind), Some(ViolationKind::Angular));
    }

    #[test]
    fn test_full_disc_checks_outer_only() {
        let sector = Sector::new(0.0, TAU, 0.0, 100.0).unwrap();
        let boundary = SectorBoundary::new(sector, PointF::ORIGIN, 0.0);
        assert!(boundary.violation(&Circle::new(0.0, 0.0, 100.0)).is_none());
        let v = boundary.violation(&Circle::new(60.0, 0.0, 50.0)).unwrap();
        assert!(close(v.scale, 100.0 / 110.0, 1e-12));
    }

    #[test]
    fn test_clean_when_already_inside() {
        let sector = Sector::new(0.0, PI, 30.0, 100.0).unwrap();
        let anchor = sector.centroid();
        let boundary = SectorBoundary::new(sector, anchor, 0.05);
        let circles = [Circle::at(anchor, 10.0)];
        let cfg = FitConfig::default();
        let outcome = fit(&boundary, 20.0, &cfg, scaled(anchor, &circles, 20.0)).unwrap();
        assert_eq!(outcome.status, FitStatus::Clean);
        assert_eq!(outcome.size, 20.0);
    }

    #[test]
    fn test_exhausted_when_nothing_helps() {
        struct Never;
        impl Boundary for Never {
            fn violation(&self, _: &Circle) -> Option<Violation> {
                Some(Violation { kind: ViolationKind::Outer, scale: 0.0 })
            }
        }
        let cfg = FitConfig { max_iterations: 4, ..FitConfig::default() };
        let mut calls = 0;
        let outcome = fit(&Never, 10.0, &cfg, |size| {
            calls += 1;
            Ok((size, vec![Circle::new(0.0, 0.0, 1.0)]))
        })
        .unwrap();
        assert_eq!(outcome.status, FitStatus::Exhausted { iterations: 4, violations: 1 });
        assert!(outcome.status.fit_exhausted());
        assert_eq!(calls, 5);
        // Unusable factors fall back to the fixed shrink.
        assert!(close(outcome.value, 10.0 * 0.9f64.powi(4), 1e-9));
    }

    #[test]
    fn test_layout_errors_propagate() {
        let boundary = CircleBoundary { radius: 1.0 };
        let result: Result<FitOutcome<()>, _> = fit(&boundary, 1.0, &FitConfig::default(), |_| {
            Err(LayoutError::MissingWeight { id: "x".to_string() })
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_fit_within_circle_keeps_floored_leaves_inside() {
        let node = WeightedNode::branch(
            "sub",
            "Sub",
            (0..12).map(|i| WeightedNode::leaf(format!("c{i}"), "C", 1.0 + i as f64)).collect(),
        );
        let pack_cfg = PackConfig { min_radius: 0.8, ..PackConfig::default() };
        let outcome = fit_within_circle(&node, 4.0, &pack_cfg, &FitConfig::default()).unwrap();
        assert!(!outcome.status.fit_exhausted(), "{:?}", outcome.status);
        let bound = Circle::new(0.0, 0.0, 4.0);
        for (_, c, _) in outcome.value.descendants() {
            assert!(bound.contains(&c, 1e-6), "{c:?}");
        }
    }
}
