//! Single pass force density solve

use crate::error::FDResult;
use crate::math::{sparse::sparse_matmul, LinearSystem, Mat};
use crate::numdata::NumericalState;
use crate::results::FormResult;

/// One-shot linear force density solver
///
/// Solves `Ai·x_free = p_free - Af·x_fixed` for the three coordinate
/// columns at once.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearFdSolver;

impl LinearFdSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve the free node positions in place and collect the result
    pub fn solve(&self, state: &mut NumericalState) -> FDResult<FormResult> {
        let system = LinearSystem::factorize(state.free_stiffness())?;
        let loads = state.loads().clone();
        let residuals = solve_pass(state, &system, &loads)?;
        log::debug!(
            "Linear solve: {} free / {} fixed nodes, max free residual {:.3e}",
            state.free().len(),
            state.fixed().len(),
            state
                .free()
                .iter()
                .map(|&i| residuals.row(i).norm())
                .fold(0.0, f64::max)
        );
        Ok(FormResult::from_state(state, &residuals))
    }
}

/// Solve free positions for `loads` with a factorised `Ai`, returning `p - A·x`
pub(crate) fn solve_pass(
    state: &mut NumericalState,
    system: &LinearSystem,
    loads: &Mat,
) -> FDResult<Mat> {
    let free = state.free().to_vec();
    let fixed = state.fixed();

    let x = state.positions();
    let x_fixed = Mat::from_fn(fixed.len(), 3, |i, k| x[(fixed[i], k)]);
    let p_free = Mat::from_fn(free.len(), 3, |i, k| loads[(free[i], k)]);
    let rhs = p_free - sparse_matmul(state.fixed_stiffness(), &x_fixed);

    let x_free = system.solve(&rhs)?;

    let positions = state.positions_mut();
    for (i, &node) in free.iter().enumerate() {
        for k in 0..3 {
            positions[(node, k)] = x_free[(i, k)];
        }
    }

    Ok(state.residuals_for(loads))
}
