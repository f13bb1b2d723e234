//! Cable edges of the natural force density method

use serde::{Deserialize, Serialize};

use crate::error::{check_index, FDError, FDResult};
use crate::math::{row3, Mat};

/// Target of an edge: a fixed force density or a fixed force
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeGoal {
    ForceDensity(f64),
    Force(f64),
}

/// A cable edge between two nodes
///
/// Edges without a goal take no part in the stiffness and report zero force.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NaturalEdge {
    id: usize,
    nodes: (usize, usize),
    goal: Option<EdgeGoal>,
    length: f64,
    force_density: f64,
}

impl NaturalEdge {
    pub fn new(
        id: usize,
        nodes: (usize, usize),
        goal: Option<EdgeGoal>,
        positions: &Mat,
    ) -> FDResult<Self> {
        check_index("nodes", nodes.0, positions.nrows())?;
        check_index("nodes", nodes.1, positions.nrows())?;
        let mut edge = Self {
            id,
            nodes,
            goal,
            length: 0.0,
            force_density: 0.0,
        };
        edge.update_geometry(positions);
        Ok(edge)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn nodes(&self) -> (usize, usize) {
        self.nodes
    }

    pub fn goal(&self) -> Option<EdgeGoal> {
        self.goal
    }

    pub fn has_goal(&self) -> bool {
        self.goal.is_some()
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Force density of the last stiffness assembly
    pub fn force_density(&self) -> f64 {
        self.force_density
    }

    /// Force from the last assembled force density and the current length
    pub fn force(&self) -> f64 {
        self.force_density * self.length
    }

    /// Recompute the length from node positions
    pub fn update_geometry(&mut self, positions: &Mat) {
        let (u, v) = self.nodes;
        self.length = (row3(positions, v) - row3(positions, u)).norm();
    }

    /// Force density for the current geometry, stored for force output
    pub fn compute_force_density(&mut self) -> FDResult<f64> {
        self.force_density = match self.goal {
            Some(EdgeGoal::ForceDensity(q)) => q,
            Some(EdgeGoal::Force(f)) => {
                if self.length <= f64::EPSILON {
                    return Err(FDError::InvalidInput(format!(
                        "edge {} has a force goal but zero length",
                        self.id
                    )));
                }
                f / self.length
            }
            None => 0.0,
        };
        Ok(self.force_density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numdata::rows_to_mat;
    use approx::assert_relative_eq;

    #[test]
    fn test_force_goal_gives_force_over_length() {
        let x = rows_to_mat(&[[0.0, 0.0, 0.0], [3.0, 4.0, 0.0]]);
        let mut edge = NaturalEdge::new(0, (0, 1), Some(EdgeGoal::Force(10.0)), &x).unwrap();
        assert_relative_eq!(edge.compute_force_density().unwrap(), 2.0);
        assert_relative_eq!(edge.force(), 10.0);

        // force follows the new length until the next assembly
        edge.update_geometry(&rows_to_mat(&[[0.0, 0.0, 0.0], [6.0, 8.0, 0.0]]));
        assert_relative_eq!(edge.force(), 20.0);
    }

    #[test]
    fn test_edge_without_goal_is_inert() {
        let x = rows_to_mat(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let mut edge = NaturalEdge::new(0, (0, 1), None, &x).unwrap();
        assert_eq!(edge.compute_force_density().unwrap(), 0.0);
        assert_eq!(edge.force(), 0.0);
        assert!(NaturalEdge::new(1, (0, 5), None, &x).is_err());
    }
}
