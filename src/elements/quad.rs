//! Quadrilateral membrane face built from four overlapping triangles

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{check_stress_goal, local_stress_goal, TriFace};
use crate::error::{check_index, FDError, FDResult};
use crate::geometry::Frame;
use crate::math::{
    angle_signed, planar_rotation, principal_stresses, row3, transform_stress, Mat, Vec2, Vec3,
};

/// Vertex positions of the sub-triangles a, b, c and d
const SUBFACES: [[usize; 3]; 4] = [[1, 3, 0], [3, 1, 2], [2, 0, 1], [0, 2, 3]];

/// A quad face averaging the four triangles spanned by its diagonals
///
/// The six force densities are ordered as edges `(0,1)`, `(1,2)`, `(2,3)`,
/// `(3,0)` followed by the diagonals `(1,3)` and `(0,2)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadFace {
    id: usize,
    nodes: [usize; 4],
    goal: Vec3,
    reference: Option<Vec3>,
    subfaces: [TriFace; 4],
    points: [Vec3; 4],
    frame: Frame,
    area: f64,
}

impl QuadFace {
    pub fn new(
        id: usize,
        nodes: [usize; 4],
        goal: Vec3,
        reference: Option<Vec3>,
        positions: &Mat,
    ) -> FDResult<Self> {
        for &v in &nodes {
            check_index("nodes", v, positions.nrows())?;
        }
        check_stress_goal(id, &goal, reference.as_ref())?;

        let sub = |s: [usize; 3]| {
            TriFace::new(id, s.map(|i| nodes[i]), goal, reference, positions)
        };
        let subfaces = [
            sub(SUBFACES[0])?,
            sub(SUBFACES[1])?,
            sub(SUBFACES[2])?,
            sub(SUBFACES[3])?,
        ];
        let mut face = Self {
            id,
            nodes,
            goal,
            reference,
            subfaces,
            points: [Vec3::zeros(); 4],
            frame: Frame::world_xy(),
            area: 0.0,
        };
        face.update_geometry(positions)?;
        Ok(face)
    }

    /// Recompute the sub-triangles, area and frame from node positions
    pub fn update_geometry(&mut self, positions: &Mat) -> FDResult<()> {
        for tri in &mut self.subfaces {
            tri.update_geometry(positions)?;
        }
        let [v0, v1, v2, v3] = self.nodes.map(|v| row3(positions, v));
        let centroid = (v0 + v1 + v2 + v3) / 4.0;
        self.frame = Frame::from_points(centroid, (v1 + v2) / 2.0, (v2 + v3) / 2.0)
            .ok_or(FDError::SingularTransformation(self.id))?;
        self.area = self.subfaces.iter().map(TriFace::area).sum::<f64>() / 2.0;
        self.points = [v0, v1, v2, v3];
        Ok(())
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn nodes(&self) -> &[usize; 4] {
        &self.nodes
    }

    pub fn points(&self) -> &[Vec3; 4] {
        &self.points
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn subfaces(&self) -> &[TriFace; 4] {
        &self.subfaces
    }

    /// Stress goal in the quad frame
    pub fn local_stress_goal(&self) -> Vec3 {
        local_stress_goal(&self.goal, self.reference.as_ref(), &self.frame)
    }

    /// Natural force densities for the current geometry and stress goal
    pub fn compute_force_densities(&mut self) -> FDResult<[f64; 6]> {
        for tri in &mut self.subfaces {
            tri.compute_force_densities()?;
        }
        Ok(self.force_densities())
    }

    /// Force densities of the last computation
    pub fn force_densities(&self) -> [f64; 6] {
        let [na, nb, nc, nd] = [0, 1, 2, 3].map(|i| *self.subfaces[i].force_densities());
        [
            (na[1] + nc[0]) / 2.0,
            (nb[0] + nc[1]) / 2.0,
            (nb[1] + nd[0]) / 2.0,
            (na[0] + nd[1]) / 2.0,
            (na[2] + nb[2]) / 2.0,
            (nc[2] + nd[2]) / 2.0,
        ]
    }

    /// In-plane angles from the quad frame to each sub-triangle frame
    fn subface_angles(&self) -> [f64; 4] {
        let [v0, v1, _, _] = self.points;
        let d_theta = angle_signed(&(v1 - v0), &self.frame.xaxis, &self.frame.zaxis);
        let beta_a = self.subfaces[0].angles().y;
        let gamma_c = self.subfaces[2].angles().z;
        [
            PI - beta_a - d_theta,
            -beta_a - d_theta,
            gamma_c - d_theta,
            PI + gamma_c - d_theta,
        ]
    }

    /// Area weighted stress of the sub-triangles in the quad frame
    pub fn stress(&self) -> Vec3 {
        let total: Vec3 = self
            .subfaces
            .iter()
            .zip(self.subface_angles())
            .map(|(tri, theta)| transform_stress(&tri.stress(), &planar_rotation(theta)) * tri.area())
            .sum();
        total / (2.0 * self.area)
    }

    pub fn principal_stress(&self) -> ([f64; 2], [Vec2; 2]) {
        principal_stresses(&self.stress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numdata::rows_to_mat;
    use approx::assert_relative_eq;

    fn unit_square() -> Mat {
        rows_to_mat(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn test_square_force_densities_are_symmetric() {
        let mut quad =
            QuadFace::new(0, [0, 1, 2, 3], Vec3::new(1.0, 1.0, 0.0), None, &unit_square()).unwrap();
        let n = quad.compute_force_densities().unwrap();

        for edge in &n[..4] {
            assert_relative_eq!(*edge, 0.5, epsilon = 1e-10);
        }
        assert_relative_eq!(n[4], n[5], epsilon = 1e-10);
        assert_relative_eq!(n[4], 0.0, epsilon = 1e-10);
        assert_relative_eq!(quad.area(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(quad.stress(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-10);
    }

    #[test]
    fn test_anisotropic_goal_is_recovered_in_quad_frame() {
        let mut quad = QuadFace::new(
            0,
            [0, 1, 2, 3],
            Vec3::new(2.0, 1.0, 0.0),
            Some(Vec3::x()),
            &unit_square(),
        )
        .unwrap();
        quad.compute_force_densities().unwrap();
        assert_relative_eq!(quad.local_stress_goal(), Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-10);
        assert_relative_eq!(quad.stress(), quad.local_stress_goal(), epsilon = 1e-8);
    }

    #[test]
    fn test_sub_triangles_share_the_quad_id() {
        let quad =
            QuadFace::new(7, [0, 1, 2, 3], Vec3::new(1.0, 1.0, 0.0), None, &unit_square()).unwrap();
        assert!(quad.subfaces().iter().all(|t| t.id() == 7));
        assert_eq!(quad.subfaces()[0].nodes(), &[1, 3, 0]);
    }
}
