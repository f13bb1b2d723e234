//! Natural force density solve for membranes and cables

use super::linear::solve_pass;
use super::{NaturalStiffnessAssembler, NfdOptions, StressMode};
use crate::elements::{NaturalEdge, NaturalFace};
use crate::error::FDResult;
use crate::loads::LoadAssembler;
use crate::math::{max_row_norm, LinearSystem, Mat};
use crate::numdata::NumericalState;
use crate::results::{ConvergenceReport, FaceStresses, FormResult};

/// Iterative natural force density solver
///
/// Each iteration assembles the natural stiffness for the current geometry,
/// updates the face loads, solves the free positions and refreshes the
/// element geometry. Iteration stops when either the average stress
/// residual of the triangles or the largest displacement is within
/// tolerance.
#[derive(Debug, Clone, Default)]
pub struct NfdSolver {
    options: NfdOptions,
}

impl NfdSolver {
    pub fn new(options: NfdOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NfdOptions {
        &self.options
    }

    /// Solve in place
    ///
    /// The forces and lengths of the result belong to `edges`, in order.
    /// Stresses are reported per face according to the stress mode.
    pub fn solve(
        &self,
        state: &mut NumericalState,
        faces: &mut [NaturalFace],
        edges: &mut [NaturalEdge],
        loads: &mut LoadAssembler,
    ) -> FDResult<FormResult> {
        let opts = &self.options;
        let assembler = NaturalStiffnessAssembler::new();
        let n = state.node_count();
        let mut report = ConvergenceReport::default();
        let mut residuals = Mat::zeros(n, 3);

        for k in 0..opts.kmax {
            let previous = state.positions().clone();

            state.set_stiffness(assembler.assemble(n, faces, edges)?)?;
            let p = loads.update(faces)?.clone();
            let system = LinearSystem::factorize(state.free_stiffness())?;
            residuals = solve_pass(state, &system, &p)?;

            let x = state.positions();
            for face in faces.iter_mut() {
                face.update_geometry(x)?;
            }
            for edge in edges.iter_mut() {
                edge.update_geometry(x);
            }

            let stress_residual = mean_stress_residual(faces);
            let displacement = max_row_norm(&(x - &previous));
            report.record(stress_residual, displacement);
            log::debug!(
                "NFD iteration {}: stress residual {:.3e}, displacement {:.3e}",
                k + 1,
                stress_residual,
                displacement
            );

            if stress_residual < opts.stress_tol || displacement < opts.xyz_tol {
                report.converged = true;
                break;
            }
        }

        if opts.kmax == 1 {
            log::info!("Single natural force density pass done");
        } else if report.converged {
            log::info!("Convergence reached after {} iterations", report.iterations);
        } else {
            log::warn!(
                "No convergence reached after {} iterations: stress residual {:.5}, displacement {:.5}",
                report.iterations,
                report.residual,
                report.displacement
            );
        }

        let mut result = FormResult::from_state(state, &residuals);
        result.forces = edges.iter().map(NaturalEdge::force).collect();
        result.lengths = edges.iter().map(NaturalEdge::length).collect();
        result.stresses = face_stresses(faces, opts.stress_mode);
        result.convergence = Some(report);
        Ok(result)
    }
}

/// Average distance between goal and stress over all triangles and quad subfaces
fn mean_stress_residual(faces: &[NaturalFace]) -> f64 {
    let (sum, count) = faces
        .iter()
        .flat_map(NaturalFace::tri_faces)
        .fold((0.0, 0usize), |(s, c), tri| (s + tri.stress_residual(), c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn face_stresses(faces: &[NaturalFace], mode: StressMode) -> Option<FaceStresses> {
    match mode {
        StressMode::None => None,
        StressMode::Local => Some(FaceStresses::Local(
            faces.iter().map(|f| f.stress().into()).collect(),
        )),
        StressMode::PrincipalLocal | StressMode::PrincipalGlobal => {
            let to_global = mode == StressMode::PrincipalGlobal;
            let (values, vectors): (Vec<[f64; 2]>, Vec<[[f64; 3]; 2]>) = faces
                .iter()
                .map(|f| {
                    let (values, [v0, v1]) = f.principal_stress(to_global);
                    (values, [v0.into(), v1.into()])
                })
                .unzip();
            Some(FaceStresses::Principal { values, vectors })
        }
    }
}
