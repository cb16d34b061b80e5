// Plain f64 geometry shared by the packing engine, the sector mapper and the
// fit solver.
//
// Chart convention (SVG, y grows downward): angle 0 points to 12 o'clock and
// angles grow clockwise, so `polar(a, r) = (r sin a, -r cos a)`. Rotating a
// local frame by `a` maps its "up" axis (0, -1) onto `polar(a, 1)`.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

impl PointF {
    pub const ORIGIN: PointF = PointF { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: PointF) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn add(&self, other: PointF) -> PointF {
        PointF::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(&self, other: PointF) -> PointF {
        PointF::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(&self, k: f64) -> PointF {
        PointF::new(self.x * k, self.y * k)
    }

    /// Rotate clockwise (on screen) by `angle` radians around the origin.
    pub fn rotate(&self, angle: f64) -> PointF {
        let (sin, cos) = angle.sin_cos();
        PointF::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

/// Point at `radius` along the ray at `angle`.
pub fn polar(angle: f64, radius: f64) -> PointF {
    let (sin, cos) = angle.sin_cos();
    PointF::new(radius * sin, -radius * cos)
}

/// Inverse of `polar` for the angle, normalized to [0, 2π).
pub fn angle_of(p: PointF) -> f64 {
    p.x.atan2(-p.y).rem_euclid(TAU)
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, r: f64) -> Self {
        Self { x, y, r }
    }

    pub fn at(center: PointF, r: f64) -> Self {
        Self { x: center.x, y: center.y, r }
    }

    pub fn center(&self) -> PointF {
        PointF::new(self.x, self.y)
    }

    pub fn center_distance(&self, other: &Circle) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Overlap depth (positive when the two discs overlap).
    pub fn overlap(&self, other: &Circle) -> f64 {
        self.r + other.r - self.center_distance(other)
    }

    /// Whether `other` lies inside this circle, up to `tolerance`.
    pub fn contains(&self, other: &Circle, tolerance: f64) -> bool {
        self.center_distance(other) + other.r <= self.r + tolerance
    }
}
