//! Global stiffness assembly from natural force densities

use nalgebra_sparse::CsrMatrix;

use crate::elements::{NaturalEdge, NaturalFace};
use crate::error::FDResult;
use crate::math::SparseMatrixBuilder;

/// Assembles the n×n stiffness matrix of faces and edges
///
/// Every call recomputes the natural force densities of all elements for
/// their current geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalStiffnessAssembler;

impl NaturalStiffnessAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(
        &self,
        node_count: usize,
        faces: &mut [NaturalFace],
        edges: &mut [NaturalEdge],
    ) -> FDResult<CsrMatrix<f64>> {
        let mut builder = SparseMatrixBuilder::new(node_count);

        for face in faces.iter_mut() {
            match face {
                NaturalFace::Tri(tri) => {
                    let n = tri.compute_force_densities()?;
                    builder.add_element_matrix(tri.nodes(), &tri_block(&[n.x, n.y, n.z]));
                }
                NaturalFace::Quad(quad) => {
                    let n = quad.compute_force_densities()?;
                    builder.add_element_matrix(quad.nodes(), &quad_block(&n));
                }
            }
        }

        for edge in edges.iter_mut().filter(|e| e.has_goal()) {
            let q = edge.compute_force_density()?;
            let (u, v) = edge.nodes();
            builder.add_element_matrix(&[u, v], &[[q, -q], [-q, q]]);
        }

        log::debug!(
            "Assembled natural stiffness: {} faces, {} edges, {} non-zeros",
            faces.len(),
            edges.len(),
            builder.nnz()
        );
        Ok(builder.to_csr())
    }
}

/// Element block of a triangle, force densities by opposite vertex
fn tri_block(n: &[f64; 3]) -> [[f64; 3]; 3] {
    [
        [n[1] + n[2], -n[2], -n[1]],
        [-n[2], n[0] + n[2], -n[0]],
        [-n[1], -n[0], n[0] + n[1]],
    ]
}

/// Element block of a quad, four sides then diagonals (1,3) and (0,2)
fn quad_block(n: &[f64; 6]) -> [[f64; 4]; 4] {
    [
        [n[0] + n[3] + n[5], -n[0], -n[5], -n[3]],
        [-n[0], n[0] + n[1] + n[4], -n[1], -n[4]],
        [-n[5], -n[1], n[1] + n[2] + n[5], -n[2]],
        [-n[3], -n[4], -n[2], n[2] + n[3] + n[4]],
    ]
}
