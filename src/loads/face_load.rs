//! Distributed loads on membrane faces

use serde::{Deserialize, Serialize};

use crate::geometry::Frame;
use crate::math::Vec3;

/// Load per unit area on a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FaceLoad {
    /// Force per unit area in global XYZ
    Global([f64; 3]),
    /// Force per unit area in the face frame
    Local([f64; 3]),
    /// Pressure along the face normal
    Normal(f64),
    /// Downward force per unit plan area
    Projected(f64),
}

impl FaceLoad {
    /// Global force per unit of face area
    ///
    /// `normal` is the unit normal of the face.
    pub fn intensity(&self, frame: &Frame, normal: &Vec3) -> Vec3 {
        match *self {
            Self::Global(v) => Vec3::from(v),
            Self::Local(v) => frame.to_global_vector(&Vec3::from(v)),
            Self::Normal(p) => normal * p,
            Self::Projected(p) => Vec3::new(0.0, 0.0, -p * normal.z.abs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projected_load_scales_with_slope() {
        let frame = Frame::world_xy();
        let sloped = Vec3::new(0.0, 1.0, 1.0).normalize();
        let w = FaceLoad::Projected(2.0).intensity(&frame, &sloped);
        assert_relative_eq!(w, Vec3::new(0.0, 0.0, -2.0_f64.sqrt()), epsilon = 1e-12);

        let w = FaceLoad::Normal(3.0).intensity(&frame, &sloped);
        assert_relative_eq!(w.norm(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_local_load_follows_frame() {
        let frame = Frame::new(Vec3::zeros(), Vec3::y(), -Vec3::x()).unwrap();
        let w = FaceLoad::Local([1.0, 0.0, 0.0]).intensity(&frame, &frame.zaxis);
        assert_relative_eq!(w, Vec3::y(), epsilon = 1e-12);
    }
}
