//! Result types for form finding

use serde::{Deserialize, Serialize};

use crate::error::FDResult;
use crate::math::Mat;
use crate::numdata::{mat_to_rows, NumericalState};

/// Equilibrium state returned by every solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResult {
    /// Node positions
    pub positions: Vec<[f64; 3]>,
    /// Residual force per node; the reaction at fixed nodes
    pub residuals: Vec<[f64; 3]>,
    /// Force per edge
    pub forces: Vec<f64>,
    /// Length per edge
    pub lengths: Vec<f64>,
    /// Face stresses, if requested
    pub stresses: Option<FaceStresses>,
    /// Convergence report of iterative solvers
    pub convergence: Option<ConvergenceReport>,
}

impl FormResult {
    /// Collect positions, edge forces and lengths from a solved state
    pub fn from_state(state: &NumericalState, residuals: &Mat) -> Self {
        Self {
            positions: mat_to_rows(state.positions()),
            residuals: mat_to_rows(residuals),
            forces: state.forces(),
            lengths: state.lengths(),
            stresses: None,
            convergence: None,
        }
    }

    /// Largest residual force over the given nodes
    pub fn max_residual(&self, nodes: &[usize]) -> f64 {
        nodes
            .iter()
            .filter_map(|&i| self.residuals.get(i))
            .map(|r| (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt())
            .fold(0.0, f64::max)
    }

    /// Whether an iterative solver reached its tolerances
    ///
    /// One-pass solves always count as converged.
    pub fn converged(&self) -> bool {
        self.convergence.as_ref().map_or(true, |c| c.converged)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> FDResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Stresses per face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FaceStresses {
    /// `(σx, σy, τxy)` in each face frame
    Local(Vec<[f64; 3]>),
    /// Principal values (descending) and unit directions per face
    ///
    /// Directions are expressed in the face frame (z = 0) or in global
    /// coordinates, depending on the requested mode.
    Principal {
        values: Vec<[f64; 2]>,
        vectors: Vec<[[f64; 3]; 2]>,
    },
}

/// Convergence data of an iterative solve
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub converged: bool,
    /// Number of iterations run
    pub iterations: usize,
    /// Residual measure of the last iteration
    pub residual: f64,
    /// Largest node displacement of the last iteration
    pub displacement: f64,
    pub history: Vec<IterationRecord>,
}

/// Residual and displacement of one iteration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: usize,
    pub residual: f64,
    pub displacement: f64,
}

impl ConvergenceReport {
    pub(crate) fn record(&mut self, residual: f64, displacement: f64) {
        self.iterations += 1;
        self.residual = residual;
        self.displacement = displacement;
        self.history.push(IterationRecord {
            iteration: self.iterations,
            residual,
            displacement,
        });
    }
}
