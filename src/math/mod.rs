//! Mathematical utilities for force density calculations
//!
//! Planar stresses are carried as pseudo-vectors `(σx, σy, τxy)`.

pub mod sparse;

use nalgebra::{DMatrix, DVector, Matrix2, SymmetricEigen, Vector2, Vector3};

// Re-export sparse utilities
pub use sparse::{
    connectivity_matrix, partition, LinearSystem, SparseCholeskySolver, SparseMatrixBuilder,
};

pub type Mat = DMatrix<f64>;
pub type DVec = DVector<f64>;
pub type Mat2 = Matrix2<f64>;
pub type Vec2 = Vector2<f64>;
pub type Vec3 = Vector3<f64>;

/// Bound for inverse trigonometric arguments
const TRIG_BOUND: f64 = 0.9999;

/// Inverse cosine with the argument clamped to ±0.9999
#[inline]
pub fn arc_cos(num: f64) -> f64 {
    num.clamp(-TRIG_BOUND, TRIG_BOUND).acos()
}

/// Planar rotation matrix for an angle in radians
pub fn planar_rotation(angle: f64) -> Mat2 {
    let (s, c) = angle.sin_cos();
    Mat2::new(c, -s, s, c)
}

/// Whether a planar stress pseudo-vector is isotropic
pub fn is_isotropic(stress: &Vec3) -> bool {
    stress[0] == stress[1] && stress[2] == 0.0
}

/// Convert planar stresses from pseudo-vector to tensor form
pub fn stress_vec_to_tensor(stress: &Vec3) -> Mat2 {
    Mat2::new(stress[0], stress[2], stress[2], stress[1])
}

/// Convert planar stresses from tensor to pseudo-vector form
pub fn stress_tensor_to_vec(tensor: &Mat2) -> Vec3 {
    Vec3::new(tensor[(0, 0)], tensor[(1, 1)], tensor[(0, 1)])
}

/// Transform a stress pseudo-vector by a planar rotation, `Rᵀ·S·R`
pub fn transform_stress(stress: &Vec3, rotation: &Mat2) -> Vec3 {
    let s = stress_vec_to_tensor(stress);
    stress_tensor_to_vec(&(rotation.transpose() * s * rotation))
}

/// Transform a stress pseudo-vector by an angle in radians
pub fn transform_stress_angle(stress: &Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    let (s2, c2, sc) = (s * s, c * c, s * c);
    let t = nalgebra::Matrix3::new(
        c2, s2, 2.0 * sc,
        s2, c2, -2.0 * sc,
        -sc, sc, c2 - s2,
    );
    t * stress
}

/// Principal stresses of a planar stress pseudo-vector
///
/// Returns the eigenvalues in descending order together with the matching
/// unit eigenvectors.
pub fn principal_stresses(stress: &Vec3) -> ([f64; 2], [Vec2; 2]) {
    let eigen = SymmetricEigen::new(stress_vec_to_tensor(stress));
    let mut order = [0, 1];
    if eigen.eigenvalues[1] > eigen.eigenvalues[0] {
        order = [1, 0];
    }
    let values = [eigen.eigenvalues[order[0]], eigen.eigenvalues[order[1]]];
    let vectors = [
        eigen.eigenvectors.column(order[0]).into_owned(),
        eigen.eigenvectors.column(order[1]).into_owned(),
    ];
    (values, vectors)
}

/// Component of `u` along the direction of `v`
///
/// A zero `v` yields a zero component.
pub fn vector_component(u: &Vec3, v: &Vec3) -> Vec3 {
    let l2 = v.norm_squared();
    if l2 == 0.0 {
        return Vec3::zeros();
    }
    v * (u.dot(v) / l2)
}

/// Signed angle from `u` to `v`, positive counter-clockwise about `normal`
pub fn angle_signed(u: &Vec3, v: &Vec3, normal: &Vec3) -> f64 {
    u.cross(v).dot(normal).atan2(u.dot(v))
}

/// Maximum row norm of an n×3 matrix
pub fn max_row_norm(m: &Mat) -> f64 {
    m.row_iter().map(|r| r.norm()).fold(0.0, f64::max)
}

/// Row `i` of an n×3 matrix as a vector
#[inline]
pub fn row3(m: &Mat, i: usize) -> Vec3 {
    Vec3::new(m[(i, 0)], m[(i, 1)], m[(i, 2)])
}

/// Overwrite row `i` of an n×3 matrix
#[inline]
pub fn set_row3(m: &mut Mat, i: usize, v: &Vec3) {
    for k in 0..3 {
        m[(i, k)] = v[k];
    }
}
