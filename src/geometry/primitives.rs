//! Planes, line segments and circles

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use super::{Frame, ParametricCurve};
use crate::math::Vec3;

/// An infinite plane through a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub point: Vec3,
    /// Unit normal
    pub normal: Vec3,
}

impl Plane {
    /// Create a plane, normalising the normal
    ///
    /// Returns `None` for a zero normal.
    pub fn new(point: Vec3, normal: Vec3) -> Option<Self> {
        Some(Self {
            point,
            normal: normal.try_normalize(1e-12)?,
        })
    }

    /// The XY plane of a frame
    pub fn from_frame(frame: &Frame) -> Self {
        Self {
            point: frame.origin,
            normal: frame.zaxis,
        }
    }

    /// Orthogonal projection of a point onto the plane
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        point - self.normal * (point - self.point).dot(&self.normal)
    }
}

/// A bounded line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Vec3,
    pub end: Vec3,
}

impl Line {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    /// Vector from start to end
    pub fn vector(&self) -> Vec3 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.vector().norm()
    }

    /// Unit direction from start to end (zero for a degenerate segment)
    pub fn direction(&self) -> Vec3 {
        self.vector().try_normalize(1e-12).unwrap_or_else(Vec3::zeros)
    }

    /// Closest point on the bounded segment
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        let v = self.vector();
        let l2 = v.norm_squared();
        if l2 == 0.0 {
            return self.start;
        }
        let t = ((point - self.start).dot(&v) / l2).clamp(0.0, 1.0);
        self.start + v * t
    }

    /// Whether a point lies on the segment within `tol`
    pub fn contains(&self, point: &Vec3, tol: f64) -> bool {
        (self.closest_point(point) - point).norm() <= tol
    }
}

/// A circle lying in the XY plane of a frame, centred at its origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub frame: Frame,
    pub radius: f64,
}

impl Circle {
    pub fn new(frame: Frame, radius: f64) -> Self {
        Self { frame, radius }
    }
}

impl ParametricCurve for Circle {
    fn point_at(&self, t: f64) -> Vec3 {
        let (s, c) = t.sin_cos();
        self.frame.origin + (self.frame.xaxis * c + self.frame.yaxis * s) * self.radius
    }

    fn tangent_at(&self, t: f64) -> Vec3 {
        let (s, c) = t.sin_cos();
        (self.frame.yaxis * c - self.frame.xaxis * s) * self.radius
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, TAU)
    }

    fn closest_point(&self, point: &Vec3) -> (f64, Vec3) {
        let v = point - self.frame.origin;
        let (x, y) = (v.dot(&self.frame.xaxis), v.dot(&self.frame.yaxis));
        // Any point of the circle is closest to its axis; take t = 0
        let t = if x == 0.0 && y == 0.0 {
            0.0
        } else {
            y.atan2(x).rem_euclid(TAU)
        };
        (t, self.point_at(t))
    }
}
