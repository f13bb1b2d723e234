//! Triangular membrane face

use std::f64::consts::PI;

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use super::{check_stress_goal, local_stress_goal};
use crate::error::{check_index, FDError, FDResult};
use crate::geometry::Frame;
use crate::math::{arc_cos, principal_stresses, row3, Mat, Vec2, Vec3};

/// Smallest face area treated as non-degenerate
const MIN_AREA: f64 = 1e-12;

/// A constant stress triangle
///
/// Lengths and force densities are ordered by the edge opposite each
/// vertex: `l0 = |p1 p2|`, `l1 = |p2 p0|`, `l2 = |p0 p1|`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriFace {
    id: usize,
    nodes: [usize; 3],
    goal: Vec3,
    reference: Option<Vec3>,
    points: [Vec3; 3],
    frame: Frame,
    lengths: Vec3,
    angles: Vec3,
    area: f64,
    force_densities: Vec3,
}

impl TriFace {
    /// Build a face over three nodes of `positions`
    ///
    /// `goal` is the target `(σx, σy, τxy)`; a non-isotropic goal needs a
    /// reference vector to orient it.
    pub fn new(
        id: usize,
        nodes: [usize; 3],
        goal: Vec3,
        reference: Option<Vec3>,
        positions: &Mat,
    ) -> FDResult<Self> {
        for &v in &nodes {
            check_index("nodes", v, positions.nrows())?;
        }
        check_stress_goal(id, &goal, reference.as_ref())?;
        let mut face = Self {
            id,
            nodes,
            goal,
            reference,
            points: [Vec3::zeros(); 3],
            frame: Frame::world_xy(),
            lengths: Vec3::zeros(),
            angles: Vec3::zeros(),
            area: 0.0,
            force_densities: Vec3::zeros(),
        };
        face.update_geometry(positions)?;
        Ok(face)
    }

    /// Recompute lengths, angles, area and frame from node positions
    pub fn update_geometry(&mut self, positions: &Mat) -> FDResult<()> {
        let [p0, p1, p2] = self.nodes.map(|v| row3(positions, v));
        let l = Vec3::new((p2 - p1).norm(), (p0 - p2).norm(), (p1 - p0).norm());
        if l.min() <= f64::EPSILON {
            return Err(FDError::SingularTransformation(self.id));
        }
        let (l0, l1, l2) = (l.x, l.y, l.z);
        let alpha = arc_cos((l0 * l0 + l1 * l1 - l2 * l2) / (2.0 * l0 * l1));
        let beta = arc_cos((l1 * l1 + l2 * l2 - l0 * l0) / (2.0 * l1 * l2));
        let gamma = PI - alpha - beta;
        let area = l1 * l2 * beta.sin() / 2.0;

        let frame =
            Frame::from_points(p0, p1, p2).ok_or(FDError::SingularTransformation(self.id))?;
        if area < MIN_AREA {
            return Err(FDError::SingularTransformation(self.id));
        }

        self.points = [p0, p1, p2];
        self.lengths = l;
        self.angles = Vec3::new(alpha, beta, gamma);
        self.area = area;
        self.frame = frame;
        Ok(())
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn nodes(&self) -> &[usize; 3] {
        &self.nodes
    }

    pub fn points(&self) -> &[Vec3; 3] {
        &self.points
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Edge lengths `(l0, l1, l2)`
    pub fn lengths(&self) -> &Vec3 {
        &self.lengths
    }

    /// Interior angles `(α, β, γ)`, with β at p0 and γ at p1
    pub fn angles(&self) -> &Vec3 {
        &self.angles
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    /// Stress goal as given, before orienting it to the face frame
    pub fn stress_goal(&self) -> &Vec3 {
        &self.goal
    }

    /// Stress goal in the face frame
    pub fn local_stress_goal(&self) -> Vec3 {
        local_stress_goal(&self.goal, self.reference.as_ref(), &self.frame)
    }

    /// Map from edge stresses `n·l²/A` to local stresses `(σx, σy, τxy)`
    pub fn transformation(&self) -> Matrix3<f64> {
        let (sb, cb) = self.angles.y.sin_cos();
        let (sg, cg) = self.angles.z.sin_cos();
        Matrix3::new(
            cg * cg, cb * cb, 1.0,
            sg * sg, sb * sb, 0.0,
            sg * cg, -sb * cb, 0.0,
        )
    }

    /// Natural force densities for the current geometry and stress goal
    ///
    /// The result is kept for the stress evaluation after the next
    /// geometry update.
    pub fn compute_force_densities(&mut self) -> FDResult<Vec3> {
        let t_inv = self
            .transformation()
            .try_inverse()
            .ok_or(FDError::SingularTransformation(self.id))?;
        let l2 = self.lengths.component_mul(&self.lengths);
        let n = (t_inv * self.local_stress_goal()).component_div(&l2) * self.area;
        self.force_densities = n;
        Ok(n)
    }

    /// Force densities of the last computation
    pub fn force_densities(&self) -> &Vec3 {
        &self.force_densities
    }

    /// Local stresses from the last force densities at the current geometry
    pub fn stress(&self) -> Vec3 {
        let l2 = self.lengths.component_mul(&self.lengths);
        self.transformation() * l2.component_mul(&self.force_densities) / self.area
    }

    /// Distance between the local stress goal and the current stress
    pub fn stress_residual(&self) -> f64 {
        (self.local_stress_goal() - self.stress()).norm()
    }

    /// Principal stresses in descending order with their local directions
    pub fn principal_stress(&self) -> ([f64; 2], [Vec2; 2]) {
        principal_stresses(&self.stress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numdata::rows_to_mat;
    use approx::assert_relative_eq;

    fn right_triangle() -> Mat {
        rows_to_mat(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
    }

    #[test]
    fn test_geometry_of_right_triangle() {
        let face = TriFace::new(0, [0, 1, 2], Vec3::new(1.0, 1.0, 0.0), None, &right_triangle())
            .unwrap();
        assert_relative_eq!(face.area(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(face.lengths().x, 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(face.angles().y, PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(face.angles().sum(), PI, epsilon = 1e-12);
        assert_relative_eq!(face.frame().zaxis, Vec3::z(), epsilon = 1e-12);
    }

    #[test]
    fn test_isotropic_goal_is_recovered() {
        let mut face =
            TriFace::new(0, [0, 1, 2], Vec3::new(2.0, 2.0, 0.0), None, &right_triangle()).unwrap();
        let n = face.compute_force_densities().unwrap();
        // hypotenuse carries no force under isotropic stress on a right angle
        assert_relative_eq!(n.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(n.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.z, 1.0, epsilon = 1e-12);
        assert_relative_eq!(face.stress(), Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-10);
        assert!(face.stress_residual() < 1e-10);
    }

    #[test]
    fn test_reference_orients_anisotropic_goal() {
        let mut face = TriFace::new(
            0,
            [0, 1, 2],
            Vec3::new(2.0, 1.0, 0.0),
            Some(Vec3::x()),
            &right_triangle(),
        )
        .unwrap();
        assert_relative_eq!(face.local_stress_goal(), Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-12);

        face.compute_force_densities().unwrap();
        assert_relative_eq!(face.stress(), Vec3::new(1.0, 2.0, 0.0), epsilon = 1e-10);
        let (values, _) = face.principal_stress();
        assert_relative_eq!(values[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(values[1], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_anisotropic_goal_without_reference_fails() {
        let result = TriFace::new(4, [0, 1, 2], Vec3::new(2.0, 1.0, 0.0), None, &right_triangle());
        assert!(matches!(result, Err(FDError::NonIsotropicStressWithoutReference(4))));
    }

    #[test]
    fn test_collinear_face_is_singular() {
        let x = rows_to_mat(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let result = TriFace::new(2, [0, 1, 2], Vec3::new(1.0, 1.0, 0.0), None, &x);
        assert!(matches!(result, Err(FDError::SingularTransformation(2))));
    }
}
