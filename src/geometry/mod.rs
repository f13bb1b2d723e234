//! Geometric primitives used by node constraints and face frames
//!
//! Curves and surfaces are consumed through the [`ParametricCurve`] and
//! [`ParametricSurface`] traits so any geometry kernel can back a constraint;
//! Bézier implementations are provided.

mod curve;
mod frame;
mod primitives;
mod surface;

pub use curve::{BezierCurve, ParametricCurve};
pub use frame::Frame;
pub use primitives::{Circle, Line, Plane};
pub use surface::{BezierSurface, ParametricSurface};

use crate::math::Vec3;

/// Evaluate a Bézier polygon at `t` by de Casteljau's algorithm
pub(crate) fn de_casteljau(points: &[Vec3], t: f64) -> Vec3 {
    let mut work = points.to_vec();
    let n = work.len();
    for level in 1..n {
        for i in 0..n - level {
            work[i] = work[i] * (1.0 - t) + work[i + 1] * t;
        }
    }
    work.first().copied().unwrap_or_else(Vec3::zeros)
}

/// Control polygon of the derivative (hodograph) of a Bézier polygon
pub(crate) fn hodograph(points: &[Vec3]) -> Vec<Vec3> {
    let degree = points.len().saturating_sub(1) as f64;
    points.windows(2).map(|w| (w[1] - w[0]) * degree).collect()
}
