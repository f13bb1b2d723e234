use super::{Geometry, GeometryKind, Parameter, Projector};
use crate::error::{FDError, FDResult};
use crate::geometry::Line;
use crate::math::{vector_component, Vec3};

/// Tolerance for a point to count as lying on the segment
const ON_SEGMENT_TOLERANCE: f64 = 1e-6;

/// Restricts movement to a bounded line segment
#[derive(Debug, Clone)]
pub struct LineConstraint {
    line: Line,
}

impl LineConstraint {
    pub fn new(line: Line) -> Self {
        Self { line }
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Line(line) => Ok(Box::new(Self::new(line))),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }

    /// Signed distance of a point from the start, along the line direction
    fn signed_distance(&self, point: &Vec3) -> f64 {
        let v = point - self.line.start;
        let d = v.dot(&self.line.vector());
        if d < 0.0 {
            -v.norm()
        } else {
            v.norm()
        }
    }
}

impl Projector for LineConstraint {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Line
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        let p = self.line.closest_point(point);
        (p, Some(Parameter::Curve(self.signed_distance(&p))))
    }

    fn tangent(&self, residual: &Vec3, _location: &Vec3, _param: Option<Parameter>) -> Vec3 {
        vector_component(residual, &self.line.direction())
    }

    fn needs_projection(&self, point: &Vec3) -> bool {
        !self.line.contains(point, ON_SEGMENT_TOLERANCE)
    }

    fn parameter(&self, point: &Vec3) -> Option<Parameter> {
        Some(Parameter::Curve(self.signed_distance(point)))
    }

    fn point_at(&self, param: Parameter) -> Option<Vec3> {
        match param {
            Parameter::Curve(t) => Some(self.line.start + self.line.direction() * t),
            Parameter::Surface(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::Constraint;
    use approx::assert_relative_eq;

    fn segment() -> Constraint {
        let line = Line::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        Constraint::new(Box::new(LineConstraint::new(line)))
    }

    #[test]
    fn test_update_past_end_is_clamped() {
        let mut c = segment();
        c.set_location(Vec3::new(0.9, 0.9, 0.0));
        c.set_residual(Vec3::new(10.0, 10.0, 5.0));
        c.update(0.1);
        assert_relative_eq!(c.location(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_parameter_is_signed_distance() {
        let mut c = segment();
        c.set_location(Vec3::new(0.5, 0.5, 3.0));
        match c.parameter() {
            Some(Parameter::Curve(t)) => assert_relative_eq!(t, 0.5f64.sqrt(), epsilon = 1e-12),
            other => panic!("unexpected parameter {other:?}"),
        }
    }
}
