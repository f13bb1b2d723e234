use super::{Geometry, GeometryKind, Parameter, Projector};
use crate::error::{FDError, FDResult};
use crate::math::{vector_component, Vec3};

/// Restricts movement to a direction; positions are never projected
#[derive(Debug, Clone)]
pub struct VectorConstraint {
    direction: Vec3,
}

impl VectorConstraint {
    /// Create from a direction, which is normalised
    pub fn new(direction: Vec3) -> FDResult<Self> {
        let direction = direction
            .try_normalize(1e-12)
            .ok_or_else(|| FDError::InvalidInput("vector constraint with zero direction".into()))?;
        Ok(Self { direction })
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Vector(v) => Ok(Box::new(Self::new(v)?)),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }
}

impl Projector for VectorConstraint {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Vector
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        (*point, None)
    }

    fn tangent(&self, residual: &Vec3, _location: &Vec3, _param: Option<Parameter>) -> Vec3 {
        vector_component(residual, &self.direction)
    }

    fn needs_projection(&self, _point: &Vec3) -> bool {
        false
    }
}
