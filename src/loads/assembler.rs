//! Global load matrix from node and face loads

use crate::elements::NaturalFace;
use crate::error::{FDError, FDResult};
use crate::math::{Mat, Vec3};

use super::FaceLoad;

/// Keeps static node loads and recomputes face loads for the current geometry
///
/// Face loads are spread to the face nodes by tributary area: the face is
/// split into a fan of triangles around its centroid and each triangle
/// gives half its area to each of its two face nodes.
#[derive(Debug, Clone)]
pub struct LoadAssembler {
    node_loads: Mat,
    face_loads: Vec<(usize, FaceLoad)>,
    loads: Mat,
}

impl LoadAssembler {
    /// `node_loads` is n×3; `face_loads` pairs a face index with its load
    pub fn new(node_loads: Mat, face_loads: Vec<(usize, FaceLoad)>) -> FDResult<Self> {
        if node_loads.ncols() != 3 {
            return Err(FDError::InvalidInput(format!(
                "node loads must have 3 columns, got {}",
                node_loads.ncols()
            )));
        }
        Ok(Self {
            loads: node_loads.clone(),
            node_loads,
            face_loads,
        })
    }

    /// Node loads only
    pub fn node_loads(node_count: usize, loads: Option<&Mat>) -> FDResult<Self> {
        match loads {
            Some(l) if l.nrows() != node_count => Err(FDError::InvalidInput(format!(
                "{} node loads given for {node_count} nodes",
                l.nrows()
            ))),
            Some(l) => Self::new(l.clone(), Vec::new()),
            None => Self::new(Mat::zeros(node_count, 3), Vec::new()),
        }
    }

    pub fn has_face_loads(&self) -> bool {
        !self.face_loads.is_empty()
    }

    /// Load matrix of the last update
    pub fn loads(&self) -> &Mat {
        &self.loads
    }

    /// Reassemble the load matrix for the current face geometry
    pub fn update(&mut self, faces: &[NaturalFace]) -> FDResult<&Mat> {
        if !self.has_face_loads() {
            return Ok(&self.loads);
        }
        let mut loads = self.node_loads.clone();
        for &(index, load) in &self.face_loads {
            let face = faces.get(index).ok_or(FDError::IndexOutOfRange {
                what: "faces",
                index,
                len: faces.len(),
            })?;
            let (areas, normal) = tributary_areas(face.points());
            let w = load.intensity(face.frame(), &normal);
            for (&node, area) in face.nodes().iter().zip(areas) {
                if node >= loads.nrows() {
                    return Err(FDError::IndexOutOfRange {
                        what: "nodes",
                        index: node,
                        len: loads.nrows(),
                    });
                }
                for k in 0..3 {
                    loads[(node, k)] += w[k] * area;
                }
            }
        }
        self.loads = loads;
        Ok(&self.loads)
    }
}

/// Tributary area per vertex and the unit normal of a polygon
fn tributary_areas(points: &[Vec3]) -> (Vec<f64>, Vec3) {
    let n = points.len();
    let centroid = points.iter().sum::<Vec3>() / n as f64;
    let arms: Vec<Vec3> = points.iter().map(|p| p - centroid).collect();

    let mut normal = Vec3::zeros();
    let mut parts = Vec::with_capacity(n);
    for i in 0..n {
        let c = arms[i].cross(&arms[(i + 1) % n]);
        normal += c;
        parts.push(0.25 * c.norm());
    }
    let areas = (0..n).map(|i| parts[(i + n - 1) % n] + parts[i]).collect();
    (areas, normal.try_normalize(1e-12).unwrap_or_else(Vec3::z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::StressGoal;
    use crate::numdata::rows_to_mat;
    use approx::assert_relative_eq;

    fn square(size: f64) -> (Mat, Vec<NaturalFace>) {
        let x = rows_to_mat(&[
            [0.0, 0.0, 0.0],
            [size, 0.0, 0.0],
            [size, size, 0.0],
            [0.0, size, 0.0],
        ]);
        let faces =
            NaturalFace::from_mesh(&[vec![0, 1, 2, 3]], &[StressGoal::default()], &x).unwrap();
        (x, faces)
    }

    #[test]
    fn test_square_shares_load_equally() {
        let (_, faces) = square(2.0);
        let mut assembler =
            LoadAssembler::new(Mat::zeros(4, 3), vec![(0, FaceLoad::Global([0.0, 0.0, -1.0]))])
                .unwrap();
        let loads = assembler.update(&faces).unwrap();
        for i in 0..4 {
            assert_relative_eq!(loads[(i, 2)], -1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(loads.column(2).sum(), -4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_triangle_total_equals_area() {
        let x = rows_to_mat(&[[0.0, 0.0, 0.0], [3.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        let faces =
            NaturalFace::from_mesh(&[vec![0, 1, 2]], &[StressGoal::default()], &x).unwrap();
        let mut assembler =
            LoadAssembler::new(Mat::zeros(3, 3), vec![(0, FaceLoad::Normal(2.0))]).unwrap();
        let loads = assembler.update(&faces).unwrap();
        assert_relative_eq!(loads.column(2).sum(), 3.0, epsilon = 1e-12);
        assert_relative_eq!(loads.column(0).sum(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_node_loads_are_kept() {
        let (_, faces) = square(1.0);
        let mut node_loads = Mat::zeros(4, 3);
        node_loads[(2, 0)] = 5.0;
        let mut assembler =
            LoadAssembler::new(node_loads, vec![(0, FaceLoad::Projected(1.0))]).unwrap();
        let loads = assembler.update(&faces).unwrap().clone();
        assert_relative_eq!(loads[(2, 0)], 5.0);
        assert_relative_eq!(loads[(2, 2)], -0.25, epsilon = 1e-12);

        // a second update does not accumulate
        let again = assembler.update(&faces).unwrap();
        assert_relative_eq!(again[(2, 2)], -0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_unknown_face_is_rejected() {
        let (_, faces) = square(1.0);
        let mut assembler =
            LoadAssembler::new(Mat::zeros(4, 3), vec![(3, FaceLoad::Normal(1.0))]).unwrap();
        assert!(matches!(
            assembler.update(&faces),
            Err(FDError::IndexOutOfRange { what: "faces", .. })
        ));
    }
}
