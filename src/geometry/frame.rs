//! Orthonormal coordinate frames

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// A right-handed orthonormal frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Vec3,
    pub xaxis: Vec3,
    pub yaxis: Vec3,
    pub zaxis: Vec3,
}

impl Frame {
    /// Frame from an origin and two (not necessarily orthogonal) in-plane axes
    ///
    /// Returns `None` when the axes are degenerate or parallel.
    pub fn new(origin: Vec3, xaxis: Vec3, yaxis: Vec3) -> Option<Self> {
        let x = xaxis.try_normalize(1e-12)?;
        let z = x.cross(&yaxis).try_normalize(1e-12)?;
        let y = z.cross(&x);
        Some(Self {
            origin,
            xaxis: x,
            yaxis: y,
            zaxis: z,
        })
    }

    /// Frame at `origin` with x-axis towards `a` and `b` on the positive y side
    pub fn from_points(origin: Vec3, a: Vec3, b: Vec3) -> Option<Self> {
        Self::new(origin, a - origin, b - origin)
    }

    /// The global XY frame
    pub fn world_xy() -> Self {
        Self {
            origin: Vec3::zeros(),
            xaxis: Vec3::x(),
            yaxis: Vec3::y(),
            zaxis: Vec3::z(),
        }
    }

    /// Rotation from frame coordinates to global coordinates (axes as columns)
    pub fn rotation(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[self.xaxis, self.yaxis, self.zaxis])
    }

    /// Express a frame-local vector in global coordinates
    pub fn to_global_vector(&self, local: &Vec3) -> Vec3 {
        self.rotation() * local
    }
}
