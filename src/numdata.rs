//! Numerical state shared by the force density solvers

use nalgebra_sparse::CsrMatrix;

use crate::error::{check_index, FDError, FDResult};
use crate::math::{connectivity_matrix, partition, sparse::sparse_matmul, Mat, SparseMatrixBuilder};

/// Positions, topology and system matrices of a form finding problem
///
/// Nodes are split into free nodes, whose positions are solved for, and
/// fixed (anchor) nodes. The stiffness matrix `A = Cᵀ·Q·C` and its
/// free×free (`Ai`) and free×fixed (`Af`) blocks are rebuilt whenever the
/// force densities change.
#[derive(Debug, Clone)]
pub struct NumericalState {
    positions: Mat,
    free: Vec<usize>,
    fixed: Vec<usize>,
    edges: Vec<(usize, usize)>,
    connectivity: CsrMatrix<f64>,
    force_densities: Vec<f64>,
    stiffness: CsrMatrix<f64>,
    free_stiffness: CsrMatrix<f64>,
    fixed_stiffness: CsrMatrix<f64>,
    loads: Mat,
}

impl NumericalState {
    /// Build the state from solver input
    ///
    /// `loads` default to zero. Duplicate fixed indices are ignored.
    pub fn new(
        positions: &[[f64; 3]],
        fixed: &[usize],
        edges: &[(usize, usize)],
        force_densities: &[f64],
        loads: Option<&[[f64; 3]]>,
    ) -> FDResult<Self> {
        let n = positions.len();

        let mut fixed = fixed.to_vec();
        fixed.sort_unstable();
        fixed.dedup();
        for &i in &fixed {
            check_index("nodes", i, n)?;
        }
        let free: Vec<usize> = (0..n).filter(|i| fixed.binary_search(i).is_err()).collect();

        for &(u, v) in edges {
            check_index("nodes", u, n)?;
            check_index("nodes", v, n)?;
            if u == v {
                return Err(FDError::InvalidInput(format!(
                    "edge ({u}, {v}) connects a node to itself"
                )));
            }
        }
        if force_densities.len() != edges.len() {
            return Err(FDError::InvalidInput(format!(
                "{} force densities given for {} edges",
                force_densities.len(),
                edges.len()
            )));
        }

        let loads = match loads {
            Some(l) if l.len() != n => {
                return Err(FDError::InvalidInput(format!(
                    "{} loads given for {} nodes",
                    l.len(),
                    n
                )))
            }
            Some(l) => rows_to_mat(l),
            None => Mat::zeros(n, 3),
        };

        let connectivity = connectivity_matrix(edges, n);
        let mut state = Self {
            positions: rows_to_mat(positions),
            free,
            fixed,
            edges: edges.to_vec(),
            connectivity,
            force_densities: force_densities.to_vec(),
            stiffness: CsrMatrix::zeros(n, n),
            free_stiffness: CsrMatrix::zeros(0, 0),
            fixed_stiffness: CsrMatrix::zeros(0, 0),
            loads,
        };
        state.rebuild_stiffness();
        Ok(state)
    }

    /// Replace the force densities of the given edges and rebuild the matrices
    pub fn update_force_densities(&mut self, edge_indices: &[usize], values: &[f64]) -> FDResult<()> {
        if edge_indices.len() != values.len() {
            return Err(FDError::InvalidInput(format!(
                "{} values given for {} edges",
                values.len(),
                edge_indices.len()
            )));
        }
        for &e in edge_indices {
            check_index("edges", e, self.edges.len())?;
        }
        for (&e, &q) in edge_indices.iter().zip(values) {
            self.force_densities[e] = q;
        }
        self.rebuild_stiffness();
        Ok(())
    }

    /// Replace the stiffness matrix with an externally assembled one
    pub fn set_stiffness(&mut self, stiffness: CsrMatrix<f64>) -> FDResult<()> {
        let n = self.node_count();
        if stiffness.nrows() != n || stiffness.ncols() != n {
            return Err(FDError::InvalidInput(format!(
                "stiffness matrix is {}x{}, expected {n}x{n}",
                stiffness.nrows(),
                stiffness.ncols()
            )));
        }
        let (ai, af) = partition(&stiffness, &self.free, &self.fixed);
        self.stiffness = stiffness;
        self.free_stiffness = ai;
        self.fixed_stiffness = af;
        Ok(())
    }

    /// Replace the load matrix (n×3)
    pub fn set_loads(&mut self, loads: Mat) -> FDResult<()> {
        check_shape("loads", &loads, self.node_count())?;
        self.loads = loads;
        Ok(())
    }

    /// Replace the node positions (n×3)
    pub fn set_positions(&mut self, positions: Mat) -> FDResult<()> {
        check_shape("positions", &positions, self.node_count())?;
        self.positions = positions;
        Ok(())
    }

    fn rebuild_stiffness(&mut self) {
        let n = self.node_count();
        let mut builder = SparseMatrixBuilder::new(n);
        for (&(u, v), &q) in self.edges.iter().zip(&self.force_densities) {
            builder.add_element_matrix(&[u, v], &[[q, -q], [-q, q]]);
        }
        let stiffness = builder.to_csr();
        let (ai, af) = partition(&stiffness, &self.free, &self.fixed);
        self.stiffness = stiffness;
        self.free_stiffness = ai;
        self.fixed_stiffness = af;
    }

    /// Edge lengths `‖C·x‖` at the current positions
    pub fn lengths(&self) -> Vec<f64> {
        let cx = sparse_matmul(&self.connectivity, &self.positions);
        cx.row_iter().map(|r| r.norm()).collect()
    }

    /// Edge forces `q·l` at the current positions
    pub fn forces(&self) -> Vec<f64> {
        self.lengths()
            .iter()
            .zip(&self.force_densities)
            .map(|(l, q)| q * l)
            .collect()
    }

    /// Residual forces `p - A·x` for a load matrix
    pub fn residuals_for(&self, loads: &Mat) -> Mat {
        loads - sparse_matmul(&self.stiffness, &self.positions)
    }

    /// Residual forces `p - A·x` for the stored loads
    pub fn residuals(&self) -> Mat {
        self.residuals_for(&self.loads)
    }

    pub fn node_count(&self) -> usize {
        self.positions.nrows()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn positions(&self) -> &Mat {
        &self.positions
    }

    pub(crate) fn positions_mut(&mut self) -> &mut Mat {
        &mut self.positions
    }

    pub fn free(&self) -> &[usize] {
        &self.free
    }

    pub fn fixed(&self) -> &[usize] {
        &self.fixed
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn connectivity(&self) -> &CsrMatrix<f64> {
        &self.connectivity
    }

    pub fn force_densities(&self) -> &[f64] {
        &self.force_densities
    }

    /// Full stiffness matrix `A`
    pub fn stiffness(&self) -> &CsrMatrix<f64> {
        &self.stiffness
    }

    /// Free×free block `Ai`
    pub fn free_stiffness(&self) -> &CsrMatrix<f64> {
        &self.free_stiffness
    }

    /// Free×fixed block `Af`
    pub fn fixed_stiffness(&self) -> &CsrMatrix<f64> {
        &self.fixed_stiffness
    }

    pub fn loads(&self) -> &Mat {
        &self.loads
    }
}

/// Stack `[x, y, z]` rows into an n×3 matrix
pub fn rows_to_mat(rows: &[[f64; 3]]) -> Mat {
    Mat::from_fn(rows.len(), 3, |i, j| rows[i][j])
}

/// Split an n×3 matrix into `[x, y, z]` rows
pub fn mat_to_rows(m: &Mat) -> Vec<[f64; 3]> {
    m.row_iter().map(|r| [r[0], r[1], r[2]]).collect()
}

fn check_shape(what: &str, m: &Mat, n: usize) -> FDResult<()> {
    if m.nrows() != n || m.ncols() != 3 {
        return Err(FDError::InvalidInput(format!(
            "{what} matrix is {}x{}, expected {n}x3",
            m.nrows(),
            m.ncols()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn chain() -> NumericalState {
        NumericalState::new(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
            &[0, 2],
            &[(0, 1), (1, 2)],
            &[1.0, 2.0],
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_partition_of_nodes() {
        let state = chain();
        assert_eq!(state.free(), &[1]);
        assert_eq!(state.fixed(), &[0, 2]);
        assert_eq!(state.free_stiffness().nrows(), 1);
        assert_eq!(state.fixed_stiffness().ncols(), 2);
        assert_relative_eq!(state.free_stiffness().get_entry(0, 0).unwrap().into_value(), 3.0);
    }

    #[test]
    fn test_stiffness_is_ct_q_c() {
        let state = chain();
        let c = state.connectivity();
        let mut dense_c = Mat::zeros(c.nrows(), c.ncols());
        for (i, j, &v) in c.triplet_iter() {
            dense_c[(i, j)] = v;
        }
        let q = Mat::from_diagonal(&nalgebra::DVector::from_column_slice(state.force_densities()));
        let expected = dense_c.transpose() * q * &dense_c;

        let mut a = Mat::zeros(3, 3);
        for (i, j, &v) in state.stiffness().triplet_iter() {
            a[(i, j)] = v;
        }
        assert_relative_eq!(a, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_update_force_densities_rebuilds() {
        let mut state = chain();
        state.update_force_densities(&[1], &[5.0]).unwrap();
        assert_eq!(state.force_densities(), &[1.0, 5.0]);
        assert_relative_eq!(state.free_stiffness().get_entry(0, 0).unwrap().into_value(), 6.0);
        assert_relative_eq!(state.forces()[1], 10.0);
    }

    #[test]
    fn test_invalid_input() {
        let p = [[0.0; 3]; 2];
        assert!(matches!(
            NumericalState::new(&p, &[0], &[(0, 2)], &[1.0], None),
            Err(FDError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            NumericalState::new(&p, &[0], &[(1, 1)], &[1.0], None),
            Err(FDError::InvalidInput(_))
        ));
        assert!(matches!(
            NumericalState::new(&p, &[0], &[(0, 1)], &[], None),
            Err(FDError::InvalidInput(_))
        ));
        assert!(matches!(
            NumericalState::new(&p, &[0], &[(0, 1)], &[1.0], Some(&[[0.0; 3]])),
            Err(FDError::InvalidInput(_))
        ));
    }
}
