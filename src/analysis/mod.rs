//! Solvers and their options

pub mod constrained;
pub mod linear;
pub mod nfd;
pub mod stiffness;

pub use constrained::ConstrainedSolver;
pub use linear::LinearFdSolver;
pub use nfd::NfdSolver;
pub use stiffness::NaturalStiffnessAssembler;

use serde::{Deserialize, Serialize};

use crate::constraints::DEFAULT_DAMPING;

/// Options for the constrained iterative solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstrainedOptions {
    /// Maximum number of iterations
    pub kmax: usize,
    /// Tolerance on the largest tangent residual of constrained nodes
    pub tol_res: f64,
    /// Tolerance on the largest node displacement between iterations
    pub tol_disp: f64,
    /// Fraction of the tangent residual applied to constrained nodes
    pub damping: f64,
}

impl Default for ConstrainedOptions {
    fn default() -> Self {
        Self {
            kmax: 100,
            tol_res: 1e-3,
            tol_disp: 1e-3,
            damping: DEFAULT_DAMPING,
        }
    }
}

impl ConstrainedOptions {
    /// Set maximum iterations
    pub fn with_max_iter(mut self, kmax: usize) -> Self {
        self.kmax = kmax;
        self
    }

    /// Set residual and displacement tolerances
    pub fn with_tolerances(mut self, tol_res: f64, tol_disp: f64) -> Self {
        self.tol_res = tol_res;
        self.tol_disp = tol_disp;
        self
    }

    /// Set damping
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }
}

/// Face stress output of the natural force density solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StressMode {
    /// Do not report stresses
    None,
    /// `(σx, σy, τxy)` in each face frame
    #[default]
    Local,
    /// Principal stresses with directions in the face frame
    PrincipalLocal,
    /// Principal stresses with directions in global coordinates
    PrincipalGlobal,
}

/// Options for the natural force density solver
///
/// An iteration converges when either the stress residual or the displacement
/// falls below its tolerance, looser than [`ConstrainedOptions`] which needs both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NfdOptions {
    /// Maximum number of iterations; 1 solves once without updating the reference
    pub kmax: usize,
    /// Tolerance on the average stress residual of triangle (sub)faces
    pub stress_tol: f64,
    /// Tolerance on the largest node displacement between iterations
    pub xyz_tol: f64,
    pub stress_mode: StressMode,
}

impl Default for NfdOptions {
    fn default() -> Self {
        Self {
            kmax: 10,
            stress_tol: 1e-2,
            xyz_tol: 1e-2,
            stress_mode: StressMode::Local,
        }
    }
}

impl NfdOptions {
    /// Single pass without reference update
    pub fn single_pass() -> Self {
        Self {
            kmax: 1,
            ..Self::default()
        }
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, kmax: usize) -> Self {
        self.kmax = kmax;
        self
    }

    /// Set stress and displacement tolerances
    pub fn with_tolerances(mut self, stress_tol: f64, xyz_tol: f64) -> Self {
        self.stress_tol = stress_tol;
        self.xyz_tol = xyz_tol;
        self
    }

    /// Set the stress output
    pub fn with_stress_mode(mut self, mode: StressMode) -> Self {
        self.stress_mode = mode;
        self
    }
}
