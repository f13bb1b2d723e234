use super::{Geometry, GeometryKind, Parameter, Projector};
use crate::error::{FDError, FDResult};
use crate::geometry::{Frame, Plane};
use crate::math::{vector_component, Vec3};

/// Restricts movement to a plane
#[derive(Debug, Clone)]
pub struct PlaneConstraint {
    plane: Plane,
}

impl PlaneConstraint {
    pub fn new(plane: Plane) -> Self {
        Self { plane }
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Plane(plane) => Ok(Box::new(Self::new(plane))),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }
}

impl Projector for PlaneConstraint {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Plane
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        (self.plane.closest_point(point), None)
    }

    fn tangent(&self, residual: &Vec3, _location: &Vec3, _param: Option<Parameter>) -> Vec3 {
        residual - vector_component(residual, &self.plane.normal)
    }
}

/// Restricts movement to the XY plane of a frame
#[derive(Debug, Clone)]
pub struct FrameConstraint {
    frame: Frame,
    plane: PlaneConstraint,
}

impl FrameConstraint {
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            plane: PlaneConstraint::new(Plane::from_frame(&frame)),
        }
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Frame(frame) => Ok(Box::new(Self::new(frame))),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }
}

impl Projector for FrameConstraint {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Frame
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        self.plane.closest_point(point)
    }

    fn tangent(&self, residual: &Vec3, location: &Vec3, param: Option<Parameter>) -> Vec3 {
        self.plane.tangent(residual, location, param)
    }
}
