//! Parametric curves and closest-point queries

use std::fmt::Debug;

use super::{de_casteljau, hodograph};
use crate::math::Vec3;

/// Number of Newton starts spread over the curve domain
const NUM_STARTS: usize = 10;
/// Newton iterations per start
const MAX_NEWTON_ITER: usize = 20;

/// A curve `C(t)` over a bounded parameter domain
pub trait ParametricCurve: Debug + Send + Sync {
    /// Evaluate the curve at parameter `t`
    fn point_at(&self, t: f64) -> Vec3;

    /// First derivative `C'(t)` (not normalised)
    fn tangent_at(&self, t: f64) -> Vec3;

    /// Parameter domain `(t_min, t_max)`
    fn domain(&self) -> (f64, f64);

    /// Second derivative `C''(t)`, by central differences unless overridden
    fn second_derivative_at(&self, t: f64) -> Vec3 {
        let (t0, t1) = self.domain();
        let h = 1e-6 * (t1 - t0).abs().max(1.0);
        (self.tangent_at(t + h) - self.tangent_at(t - h)) / (2.0 * h)
    }

    /// Closest point on the curve and its parameter
    ///
    /// Multi-start Newton iteration on `(C(t) - p)·C'(t) = 0`, keeping the
    /// start with the smallest distance.
    fn closest_point(&self, point: &Vec3) -> (f64, Vec3) {
        let (t0, t1) = self.domain();
        let mut best = (t0, f64::INFINITY);

        for start in 0..=NUM_STARTS {
            let mut t = t0 + (t1 - t0) * start as f64 / NUM_STARTS as f64;
            for _ in 0..MAX_NEWTON_ITER {
                let d = self.point_at(t) - point;
                let d1 = self.tangent_at(t);
                let f = d.dot(&d1);
                let df = d1.norm_squared() + d.dot(&self.second_derivative_at(t));
                if df.abs() < 1e-15 {
                    break;
                }
                let next = (t - f / df).clamp(t0, t1);
                let step = (next - t).abs();
                t = next;
                if step < 1e-12 {
                    break;
                }
            }
            let dist_sq = (self.point_at(t) - point).norm_squared();
            if dist_sq < best.1 {
                best = (t, dist_sq);
            }
        }

        (best.0, self.point_at(best.0))
    }
}

/// A Bézier curve over `t ∈ [0, 1]`
#[derive(Debug, Clone)]
pub struct BezierCurve {
    control_points: Vec<Vec3>,
    derivative: Vec<Vec3>,
    second_derivative: Vec<Vec3>,
}

impl BezierCurve {
    /// Create a curve from its control polygon
    pub fn new(control_points: Vec<Vec3>) -> Self {
        let derivative = hodograph(&control_points);
        let second_derivative = hodograph(&derivative);
        Self {
            control_points,
            derivative,
            second_derivative,
        }
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.control_points
    }
}

impl ParametricCurve for BezierCurve {
    fn point_at(&self, t: f64) -> Vec3 {
        de_casteljau(&self.control_points, t)
    }

    fn tangent_at(&self, t: f64) -> Vec3 {
        de_casteljau(&self.derivative, t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn second_derivative_at(&self, t: f64) -> Vec3 {
        de_casteljau(&self.second_derivative, t)
    }
}
