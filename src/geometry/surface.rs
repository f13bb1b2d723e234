//! Parametric surfaces and closest-point queries

use std::fmt::Debug;

use nalgebra::{Matrix2, Vector2};

use super::{de_casteljau, hodograph};
use crate::math::Vec3;

/// Starts per parameter direction
const NUM_STARTS: usize = 5;
/// Gauss-Newton iterations per start
const MAX_ITER: usize = 30;

/// A surface `S(u, v)` over a rectangular parameter domain
pub trait ParametricSurface: Debug + Send + Sync {
    /// Evaluate the surface at `(u, v)`
    fn point_at(&self, u: f64, v: f64) -> Vec3;

    /// Partial derivatives `(∂S/∂u, ∂S/∂v)`
    fn derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3);

    /// Parameter domain `((u_min, u_max), (v_min, v_max))`
    fn domain(&self) -> ((f64, f64), (f64, f64));

    /// Unit normal at `(u, v)`, zero where the surface is singular
    fn normal_at(&self, u: f64, v: f64) -> Vec3 {
        let (su, sv) = self.derivatives_at(u, v);
        su.cross(&sv).try_normalize(1e-12).unwrap_or_else(Vec3::zeros)
    }

    /// Closest point on the surface and its `(u, v)` parameters
    ///
    /// Gauss-Newton on the distance from a grid of starts, clamped to the
    /// domain.
    fn closest_point(&self, point: &Vec3) -> ([f64; 2], Vec3) {
        let ((u0, u1), (v0, v1)) = self.domain();
        let mut best = ([u0, v0], f64::INFINITY);

        for i in 0..NUM_STARTS {
            for j in 0..NUM_STARTS {
                let mut u = u0 + (u1 - u0) * (i as f64 + 0.5) / NUM_STARTS as f64;
                let mut v = v0 + (v1 - v0) * (j as f64 + 0.5) / NUM_STARTS as f64;

                for _ in 0..MAX_ITER {
                    let d = self.point_at(u, v) - point;
                    let (su, sv) = self.derivatives_at(u, v);
                    let jtj = Matrix2::new(su.dot(&su), su.dot(&sv), sv.dot(&su), sv.dot(&sv));
                    let jtd = Vector2::new(su.dot(&d), sv.dot(&d));
                    let Some(step) = jtj.lu().solve(&(-jtd)) else {
                        break;
                    };
                    let nu = (u + step[0]).clamp(u0, u1);
                    let nv = (v + step[1]).clamp(v0, v1);
                    let moved = (nu - u).abs() + (nv - v).abs();
                    u = nu;
                    v = nv;
                    if moved < 1e-12 {
                        break;
                    }
                }

                let dist_sq = (self.point_at(u, v) - point).norm_squared();
                if dist_sq < best.1 {
                    best = ([u, v], dist_sq);
                }
            }
        }

        let [u, v] = best.0;
        (best.0, self.point_at(u, v))
    }
}

/// A tensor-product Bézier surface over `[0, 1]²`
///
/// `net[i][j]` runs along `u` with `i` and along `v` with `j`.
#[derive(Debug, Clone)]
pub struct BezierSurface {
    net: Vec<Vec<Vec3>>,
}

impl BezierSurface {
    /// Create a surface from a rectangular control net
    ///
    /// Returns `None` if the net is empty or its rows differ in length.
    pub fn new(net: Vec<Vec<Vec3>>) -> Option<Self> {
        let cols = net.first()?.len();
        if cols == 0 || net.iter().any(|row| row.len() != cols) {
            return None;
        }
        Some(Self { net })
    }

    fn column(&self, j: usize) -> Vec<Vec3> {
        self.net.iter().map(|row| row[j]).collect()
    }
}

impl ParametricSurface for BezierSurface {
    fn point_at(&self, u: f64, v: f64) -> Vec3 {
        let along_u: Vec<Vec3> = self.net.iter().map(|row| de_casteljau(row, v)).collect();
        de_casteljau(&along_u, u)
    }

    fn derivatives_at(&self, u: f64, v: f64) -> (Vec3, Vec3) {
        let along_u: Vec<Vec3> = self.net.iter().map(|row| de_casteljau(row, v)).collect();
        let along_v: Vec<Vec3> = (0..self.net[0].len())
            .map(|j| de_casteljau(&self.column(j), u))
            .collect();
        (
            de_casteljau(&hodograph(&along_u), u),
            de_casteljau(&hodograph(&along_v), v),
        )
    }

    fn domain(&self) -> ((f64, f64), (f64, f64)) {
        ((0.0, 1.0), (0.0, 1.0))
    }
}
