//! Sparse matrix utilities for force density systems
//!
//! Connectivity and stiffness matrices of cable nets and membranes are
//! extremely sparse: every node couples only to its direct neighbours.

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

use crate::error::{FDError, FDResult};

/// Sparse matrix builder using COO format
/// More efficient for incremental assembly
pub struct SparseMatrixBuilder {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl SparseMatrixBuilder {
    /// Create a new square sparse matrix builder
    pub fn new(size: usize) -> Self {
        Self::rectangular(size, size)
    }

    /// Create a builder for an `nrows × ncols` matrix
    pub fn rectangular(nrows: usize, ncols: usize) -> Self {
        // A node of a regular quad mesh couples to about 8 neighbours
        let estimated_nnz = nrows * 9;
        Self {
            nrows,
            ncols,
            entries: Vec::with_capacity(estimated_nnz),
        }
    }

    /// Add a value to the matrix (accumulates if already exists)
    #[inline]
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() > 1e-15 {
            self.entries.push((row, col, value));
        }
    }

    /// Add values from a small fixed-size element matrix
    pub fn add_element_matrix<const N: usize>(
        &mut self,
        nodes: &[usize; N],
        k_elem: &[[f64; N]; N],
    ) {
        for (i, &ni) in nodes.iter().enumerate() {
            for (j, &nj) in nodes.iter().enumerate() {
                self.add(ni, nj, k_elem[i][j]);
            }
        }
    }

    /// Convert to CSR format, summing duplicate entries
    pub fn to_csr(&self) -> CsrMatrix<f64> {
        let mut coo = CooMatrix::new(self.nrows, self.ncols);

        for &(row, col, val) in &self.entries {
            coo.push(row, col, val);
        }

        CsrMatrix::from(&coo)
    }

    /// Convert to dense matrix (for comparison/debugging)
    pub fn to_dense(&self) -> DMatrix<f64> {
        let mut mat = DMatrix::zeros(self.nrows, self.ncols);

        for &(row, col, val) in &self.entries {
            mat[(row, col)] += val;
        }

        mat
    }

    /// Get estimated non-zero count
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }
}

/// Edge-node connectivity matrix
///
/// Row `e` holds `-1` at the start node and `+1` at the end node of edge `e`.
pub fn connectivity_matrix(edges: &[(usize, usize)], node_count: usize) -> CsrMatrix<f64> {
    let mut builder = SparseMatrixBuilder::rectangular(edges.len(), node_count);
    for (e, &(u, v)) in edges.iter().enumerate() {
        builder.add(e, u, -1.0);
        builder.add(e, v, 1.0);
    }
    builder.to_csr()
}

/// Split a square node matrix into its free×free and free×fixed blocks
pub fn partition(
    matrix: &CsrMatrix<f64>,
    free: &[usize],
    fixed: &[usize],
) -> (CsrMatrix<f64>, CsrMatrix<f64>) {
    let n = matrix.nrows();
    let mut free_pos = vec![None; n];
    let mut fixed_pos = vec![None; n];
    for (i, &node) in free.iter().enumerate() {
        free_pos[node] = Some(i);
    }
    for (i, &node) in fixed.iter().enumerate() {
        fixed_pos[node] = Some(i);
    }

    let mut ai = SparseMatrixBuilder::new(free.len());
    let mut af = SparseMatrixBuilder::rectangular(free.len(), fixed.len());
    for (row, col, &val) in matrix.triplet_iter() {
        let Some(r) = free_pos[row] else { continue };
        if let Some(c) = free_pos[col] {
            ai.add(r, c, val);
        } else if let Some(c) = fixed_pos[col] {
            af.add(r, c, val);
        }
    }
    (ai.to_csr(), af.to_csr())
}

/// Sparse matrix times dense matrix
pub fn sparse_matmul(csr: &CsrMatrix<f64>, x: &DMatrix<f64>) -> DMatrix<f64> {
    let mut y = DMatrix::zeros(csr.nrows(), x.ncols());

    let row_offsets = csr.row_offsets();
    let col_indices = csr.col_indices();
    let values = csr.values();

    for row in 0..csr.nrows() {
        for idx in row_offsets[row]..row_offsets[row + 1] {
            let col = col_indices[idx];
            for k in 0..x.ncols() {
                y[(row, k)] += values[idx] * x[(col, k)];
            }
        }
    }

    y
}

/// Sparse Cholesky solver for symmetric positive definite matrices
///
/// Skyline (profile) storage of the lower triangle. Positive force
/// densities give an SPD free block.
pub struct SparseCholeskySolver {
    size: usize,
    // Skyline storage: for each row, store from first non-zero to diagonal
    skyline: Vec<Vec<f64>>,
    // Row heights (distance from diagonal to first non-zero on the left)
    heights: Vec<usize>,
}

impl SparseCholeskySolver {
    /// Create solver from CSR matrix
    pub fn new(csr: &CsrMatrix<f64>) -> Self {
        let size = csr.nrows();

        let mut heights = vec![0usize; size];
        for (row, col, _val) in csr.triplet_iter() {
            if col < row {
                heights[row] = heights[row].max(row - col);
            }
        }

        let mut skyline: Vec<Vec<f64>> = heights.iter().map(|&h| vec![0.0; h + 1]).collect();

        for (row, col, &val) in csr.triplet_iter() {
            if col <= row {
                let idx = col - (row - heights[row]);
                skyline[row][idx] += val;
            }
        }

        Self {
            size,
            skyline,
            heights,
        }
    }

    /// Factorize the matrix in place (L·Lᵀ)
    pub fn factorize(&mut self) -> Result<(), &'static str> {
        for i in 0..self.size {
            let hi = self.heights[i];
            let start_i = i - hi;

            for j in start_i..i {
                let start_j = j - self.heights[j];
                let start = start_i.max(start_j);

                let mut sum = 0.0;
                for k in start..j {
                    sum += self.get(i, k) * self.get(j, k);
                }

                let diag_j = self.get(j, j);
                if diag_j.abs() < 1e-15 {
                    return Err("Zero pivot in Cholesky factorization");
                }

                let idx = j - start_i;
                self.skyline[i][idx] = (self.skyline[i][idx] - sum) / diag_j;
            }

            let mut sum = 0.0;
            for j in start_i..i {
                let val = self.get(i, j);
                sum += val * val;
            }

            let diag = self.skyline[i][hi] - sum;
            if diag <= 0.0 {
                return Err("Matrix not positive definite");
            }
            self.skyline[i][hi] = diag.sqrt();
        }

        Ok(())
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> f64 {
        if col > row {
            return self.get(col, row);
        }
        let start = row - self.heights[row];
        if col < start {
            return 0.0;
        }
        self.skyline[row][col - start]
    }

    /// Solve L * L^T * x = b
    pub fn solve(&self, b: &DVector<f64>) -> DVector<f64> {
        let mut x = b.clone();

        // Forward substitution: L * y = b
        for i in 0..self.size {
            let start = i - self.heights[i];
            let mut sum = 0.0;
            for j in start..i {
                sum += self.get(i, j) * x[j];
            }
            x[i] = (x[i] - sum) / self.get(i, i);
        }

        // Backward substitution: L^T * x = y
        for i in (0..self.size).rev() {
            x[i] /= self.get(i, i);
            let start = i - self.heights[i];
            for j in start..i {
                x[j] -= self.get(i, j) * x[i];
            }
        }

        x
    }
}

/// Factorised free×free block, reused for every coordinate column
pub enum LinearSystem {
    Cholesky(SparseCholeskySolver),
    Lu(LU<f64, Dyn, Dyn>),
}

impl LinearSystem {
    /// Factorise a square system
    ///
    /// Tries the skyline Cholesky first and falls back to dense LU for
    /// indefinite systems (e.g. negative force densities).
    pub fn factorize(matrix: &CsrMatrix<f64>) -> FDResult<Self> {
        let mut cholesky = SparseCholeskySolver::new(matrix);
        match cholesky.factorize() {
            Ok(()) => Ok(Self::Cholesky(cholesky)),
            Err(reason) => {
                log::debug!("Cholesky factorization failed ({reason}), falling back to LU");
                let mut dense = DMatrix::zeros(matrix.nrows(), matrix.ncols());
                for (row, col, &val) in matrix.triplet_iter() {
                    dense[(row, col)] += val;
                }
                let lu = dense.lu();
                if lu.is_invertible() {
                    Ok(Self::Lu(lu))
                } else {
                    Err(FDError::SingularSystem)
                }
            }
        }
    }

    /// Solve for every column of `b`
    pub fn solve(&self, b: &DMatrix<f64>) -> FDResult<DMatrix<f64>> {
        let x = match self {
            Self::Cholesky(solver) => {
                let mut x = DMatrix::zeros(b.nrows(), b.ncols());
                for k in 0..b.ncols() {
                    let col = solver.solve(&b.column(k).into_owned());
                    x.set_column(k, &col);
                }
                x
            }
            Self::Lu(lu) => lu.solve(b).ok_or(FDError::SingularSystem)?,
        };

        if x.iter().all(|v| v.is_finite()) {
            Ok(x)
        } else {
            Err(FDError::SingularSystem)
        }
    }
}
