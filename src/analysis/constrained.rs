//! Iterative force density solve with node constraints

use super::linear::solve_pass;
use super::ConstrainedOptions;
use crate::constraints::Constraint;
use crate::error::{FDError, FDResult};
use crate::loads::SelfWeight;
use crate::math::{max_row_norm, row3, set_row3, LinearSystem, Mat};
use crate::numdata::NumericalState;
use crate::results::{ConvergenceReport, FormResult};

/// Force density solver that slides constrained nodes along their geometry
///
/// Each iteration solves the linear system, then moves every constrained
/// node by its damped tangent residual. The solve has converged when both
/// the largest tangent residual and the largest node displacement are
/// within tolerance.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedSolver {
    options: ConstrainedOptions,
}

impl ConstrainedSolver {
    pub fn new(options: ConstrainedOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConstrainedOptions {
        &self.options
    }

    /// Solve in place
    ///
    /// `constraints` holds one optional constraint per node. Running out of
    /// iterations is not an error; check [`FormResult::converged`].
    pub fn solve(
        &self,
        state: &mut NumericalState,
        constraints: &mut [Option<Constraint>],
        selfweight: Option<&dyn SelfWeight>,
    ) -> FDResult<FormResult> {
        let n = state.node_count();
        if constraints.len() != n {
            return Err(FDError::InvalidInput(format!(
                "{} constraints given for {n} nodes",
                constraints.len()
            )));
        }

        let opts = &self.options;
        let system = LinearSystem::factorize(state.free_stiffness())?;
        let base_loads = state.loads().clone();
        let mut report = ConvergenceReport::default();
        let mut residuals = state.residuals();

        for k in 0..opts.kmax {
            let previous = state.positions().clone();
            let loads = match selfweight {
                Some(sw) => apply_selfweight(&base_loads, &sw.weights(&previous))?,
                None => base_loads.clone(),
            };

            residuals = solve_pass(state, &system, &loads)?;

            let mut max_tangent = 0.0_f64;
            for (node, slot) in constraints.iter_mut().enumerate() {
                let Some(constraint) = slot else { continue };
                constraint.set_location(row3(state.positions(), node));
                constraint.set_residual(row3(&residuals, node));
                constraint.update(opts.damping);
                set_row3(state.positions_mut(), node, &constraint.location());
                max_tangent = max_tangent.max(constraint.tangent().norm());
            }

            let displacement = max_row_norm(&(state.positions() - &previous));
            report.record(max_tangent, displacement);
            log::debug!(
                "Constrained iteration {}: tangent residual {:.3e}, displacement {:.3e}",
                k + 1,
                max_tangent,
                displacement
            );

            if max_tangent < opts.tol_res && displacement < opts.tol_disp {
                report.converged = true;
                break;
            }
        }

        if report.converged {
            log::info!("Convergence reached after {} iterations", report.iterations);
        } else {
            log::warn!(
                "No convergence reached after {} iterations: tangent residual {:.5}, displacement {:.5}",
                report.iterations,
                report.residual,
                report.displacement
            );
        }

        let mut result = FormResult::from_state(state, &residuals);
        result.convergence = Some(report);
        Ok(result)
    }
}

/// Subtract per-node weights from the z column of the loads
fn apply_selfweight(loads: &Mat, weights: &[f64]) -> FDResult<Mat> {
    if weights.len() != loads.nrows() {
        return Err(FDError::InvalidInput(format!(
            "self-weight returned {} values for {} nodes",
            weights.len(),
            loads.nrows()
        )));
    }
    let mut loads = loads.clone();
    for (i, w) in weights.iter().enumerate() {
        loads[(i, 2)] -= w;
    }
    Ok(loads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{ConstraintRegistry, Geometry};
    use crate::geometry::{Line, Plane};
    use crate::math::Vec3;
    use approx::assert_relative_eq;

    /// Free node between a fixed anchor and an anchor sliding on z = 0
    fn sliding_anchor() -> (NumericalState, Vec<Option<Constraint>>) {
        let state = NumericalState::new(
            &[[0.0, 0.0, 1.0], [0.5, 0.0, 0.5], [1.0, 0.0, 0.0]],
            &[0, 2],
            &[(0, 1), (1, 2)],
            &[1.0, 1.0],
            None,
        )
        .unwrap();
        let plane = Plane::new(Vec3::zeros(), Vec3::z()).unwrap();
        let c = ConstraintRegistry::default().build(Geometry::Plane(plane)).unwrap();
        (state, vec![None, None, Some(c)])
    }

    #[test]
    fn test_sliding_anchor_converges_below_fixed_anchor() {
        let (mut state, mut constraints) = sliding_anchor();
        let solver = ConstrainedSolver::new(ConstrainedOptions::default().with_damping(0.5));
        let result = solver.solve(&mut state, &mut constraints, None).unwrap();

        assert!(result.converged());
        assert_relative_eq!(result.positions[2][0], 0.0, epsilon = 1e-2);
        assert_relative_eq!(result.positions[2][2], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.positions[1][2], 0.5, epsilon = 1e-2);
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let (mut state, mut constraints) = sliding_anchor();
        let solver = ConstrainedSolver::new(ConstrainedOptions::default().with_max_iter(3));
        let result = solver.solve(&mut state, &mut constraints, None).unwrap();

        let report = result.convergence.unwrap();
        assert!(!report.converged);
        assert_eq!(report.iterations, 3);
        assert_eq!(report.history.len(), 3);
    }

    #[test]
    fn test_selfweight_is_subtracted_from_z() {
        let mut state = NumericalState::new(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            &[0, 2],
            &[(0, 1), (1, 2)],
            &[1.0, 1.0],
            None,
        )
        .unwrap();
        let mut constraints: Vec<Option<Constraint>> = vec![None, None, None];
        let weight = |x: &Mat| {
            let mut w = vec![0.0; x.nrows()];
            w[1] = 1.0;
            w
        };

        let solver = ConstrainedSolver::default();
        let result = solver
            .solve(&mut state, &mut constraints, Some(&weight as &dyn SelfWeight))
            .unwrap();
        assert_relative_eq!(result.positions[1][2], -0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_line_constrained_free_node_stays_on_line() {
        let mut state = NumericalState::new(
            &[[0.0, 0.0, 0.0], [1.0, 0.5, 0.0], [2.0, 0.0, 0.0]],
            &[0, 2],
            &[(0, 1), (1, 2)],
            &[1.0, 1.0],
            Some(&[[0.0; 3], [0.0, 0.0, -1.0], [0.0; 3]]),
        )
        .unwrap();
        let line = Line::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0));
        let c = ConstraintRegistry::default().build(Geometry::Line(line)).unwrap();
        let mut constraints = vec![None, Some(c), None];

        let result = ConstrainedSolver::default()
            .solve(&mut state, &mut constraints, None)
            .unwrap();
        let p = Vec3::from(result.positions[1]);
        assert!((line.closest_point(&p) - p).norm() < 1e-6);
    }

    #[test]
    fn test_constraint_count_must_match_nodes() {
        let (mut state, _) = sliding_anchor();
        let result = ConstrainedSolver::default().solve(&mut state, &mut [], None);
        assert!(matches!(result, Err(FDError::InvalidInput(_))));
    }
}
