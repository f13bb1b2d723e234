//! Membrane faces and cable edges of the natural force density method

mod edge;
mod quad;
mod tri;

pub use edge::{EdgeGoal, NaturalEdge};
pub use quad::QuadFace;
pub use tri::TriFace;

use serde::{Deserialize, Serialize};

use crate::error::{FDError, FDResult};
use crate::geometry::Frame;
use crate::math::{angle_signed, is_isotropic, transform_stress_angle, Mat, Vec2, Vec3};

/// Goal stresses `(σx, σy, τxy)` of a face
///
/// Non-isotropic goals are oriented by a reference vector: the goal x-axis
/// lies in the face, perpendicular to the reference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressGoal {
    pub stress: [f64; 3],
    pub reference: Option<[f64; 3]>,
}

impl Default for StressGoal {
    fn default() -> Self {
        Self::isotropic(1.0)
    }
}

impl StressGoal {
    pub fn isotropic(stress: f64) -> Self {
        Self {
            stress: [stress, stress, 0.0],
            reference: None,
        }
    }

    pub fn oriented(stress: [f64; 3], reference: [f64; 3]) -> Self {
        Self {
            stress,
            reference: Some(reference),
        }
    }
}

/// A triangular or quadrilateral membrane face
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NaturalFace {
    Tri(TriFace),
    Quad(QuadFace),
}

impl NaturalFace {
    /// Face over 3 or 4 nodes of `positions`
    pub fn new(id: usize, nodes: &[usize], goal: &StressGoal, positions: &Mat) -> FDResult<Self> {
        let stress = Vec3::from(goal.stress);
        let reference = goal.reference.map(Vec3::from);
        match *nodes {
            [a, b, c] => Ok(Self::Tri(TriFace::new(id, [a, b, c], stress, reference, positions)?)),
            [a, b, c, d] => Ok(Self::Quad(QuadFace::new(
                id,
                [a, b, c, d],
                stress,
                reference,
                positions,
            )?)),
            _ => Err(FDError::InvalidFace(id)),
        }
    }

    /// Faces of a mesh, numbered by position
    ///
    /// `goals` holds one goal per face, or a single goal shared by all faces.
    pub fn from_mesh(
        faces: &[Vec<usize>],
        goals: &[StressGoal],
        positions: &Mat,
    ) -> FDResult<Vec<Self>> {
        if goals.len() != 1 && goals.len() != faces.len() {
            return Err(FDError::InvalidInput(format!(
                "{} stress goals given for {} faces",
                goals.len(),
                faces.len()
            )));
        }
        faces
            .iter()
            .enumerate()
            .map(|(i, nodes)| {
                let goal = goals.get(i).unwrap_or(&goals[0]);
                Self::new(i, nodes, goal, positions)
            })
            .collect()
    }

    pub fn id(&self) -> usize {
        match self {
            Self::Tri(f) => f.id(),
            Self::Quad(f) => f.id(),
        }
    }

    pub fn nodes(&self) -> &[usize] {
        match self {
            Self::Tri(f) => f.nodes(),
            Self::Quad(f) => f.nodes(),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Self::Tri(f) => f.area(),
            Self::Quad(f) => f.area(),
        }
    }

    pub fn frame(&self) -> &Frame {
        match self {
            Self::Tri(f) => f.frame(),
            Self::Quad(f) => f.frame(),
        }
    }

    /// Vertex positions at the last geometry update
    pub fn points(&self) -> &[Vec3] {
        match self {
            Self::Tri(f) => f.points(),
            Self::Quad(f) => f.points(),
        }
    }

    /// Triangles carrying the stress: the face itself or the quad subfaces
    pub fn tri_faces(&self) -> &[TriFace] {
        match self {
            Self::Tri(f) => std::slice::from_ref(f),
            Self::Quad(f) => f.subfaces(),
        }
    }

    pub fn update_geometry(&mut self, positions: &Mat) -> FDResult<()> {
        match self {
            Self::Tri(f) => f.update_geometry(positions),
            Self::Quad(f) => f.update_geometry(positions),
        }
    }

    pub fn local_stress_goal(&self) -> Vec3 {
        match self {
            Self::Tri(f) => f.local_stress_goal(),
            Self::Quad(f) => f.local_stress_goal(),
        }
    }

    /// Local stresses `(σx, σy, τxy)` in the face frame
    pub fn stress(&self) -> Vec3 {
        match self {
            Self::Tri(f) => f.stress(),
            Self::Quad(f) => f.stress(),
        }
    }

    /// Principal stresses in descending order with their directions
    ///
    /// Directions are in the face frame (z = 0) unless `to_global` is set.
    pub fn principal_stress(&self, to_global: bool) -> ([f64; 2], [Vec3; 2]) {
        let (values, vectors): ([f64; 2], [Vec2; 2]) = match self {
            Self::Tri(f) => f.principal_stress(),
            Self::Quad(f) => f.principal_stress(),
        };
        let lift = |v: Vec2| {
            let local = Vec3::new(v.x, v.y, 0.0);
            if to_global {
                self.frame().to_global_vector(&local)
            } else {
                local
            }
        };
        (values, vectors.map(lift))
    }
}

/// Reject non-isotropic goals that cannot be oriented
pub(crate) fn check_stress_goal(id: usize, goal: &Vec3, reference: Option<&Vec3>) -> FDResult<()> {
    if reference.is_none() && !is_isotropic(goal) {
        return Err(FDError::NonIsotropicStressWithoutReference(id));
    }
    Ok(())
}

/// Express a goal in `frame`, rotating it by the angle between the frame
/// x-axis and the in-plane direction perpendicular to the reference
pub(crate) fn local_stress_goal(goal: &Vec3, reference: Option<&Vec3>, frame: &Frame) -> Vec3 {
    match reference {
        Some(r) if !is_isotropic(goal) => {
            let x_ref = frame.zaxis.cross(r);
            let theta = angle_signed(&frame.xaxis, &x_ref, &frame.zaxis);
            transform_stress_angle(goal, theta)
        }
        _ => *goal,
    }
}
