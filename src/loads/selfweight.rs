//! Self-weight callback

use crate::math::Mat;

/// Vertical self-weight per node for the current geometry
///
/// Implemented for any `Fn(&Mat) -> Vec<f64>`, so a closure over a mesh and
/// its material data can be passed directly. Values are magnitudes of the
/// downward load; they are subtracted from the z column of the loads.
pub trait SelfWeight {
    fn weights(&self, positions: &Mat) -> Vec<f64>;
}

impl<F> SelfWeight for F
where
    F: Fn(&Mat) -> Vec<f64>,
{
    fn weights(&self, positions: &Mat) -> Vec<f64> {
        self(positions)
    }
}
