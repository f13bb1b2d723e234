use std::sync::Arc;

use super::{Geometry, GeometryKind, Parameter, Projector};
use crate::error::{FDError, FDResult};
use crate::geometry::ParametricCurve;
use crate::math::{vector_component, Vec3};

/// Restricts movement to a curve or a circle
///
/// The curve parameter of the last projection is cached by the owning
/// constraint and used to evaluate the tangent direction.
#[derive(Debug, Clone)]
pub struct CurveConstraint {
    curve: Arc<dyn ParametricCurve>,
    kind: GeometryKind,
}

impl CurveConstraint {
    pub fn new(curve: Arc<dyn ParametricCurve>) -> Self {
        Self {
            curve,
            kind: GeometryKind::Curve,
        }
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Curve(curve) => Ok(Box::new(Self::new(curve))),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }

    pub fn build_circle(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Circle(circle) => Ok(Box::new(Self {
                curve: Arc::new(circle),
                kind: GeometryKind::Circle,
            })),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }
}

impl Projector for CurveConstraint {
    fn kind(&self) -> GeometryKind {
        self.kind
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        let (t, p) = self.curve.closest_point(point);
        (p, Some(Parameter::Curve(t)))
    }

    fn tangent(&self, residual: &Vec3, location: &Vec3, param: Option<Parameter>) -> Vec3 {
        let t = match param {
            Some(Parameter::Curve(t)) => t,
            _ => self.curve.closest_point(location).0,
        };
        vector_component(residual, &self.curve.tangent_at(t))
    }

    fn reprojects_on_set(&self) -> bool {
        true
    }

    fn point_at(&self, param: Parameter) -> Option<Vec3> {
        match param {
            Parameter::Curve(t) => Some(self.curve.point_at(t)),
            Parameter::Surface(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::{Constraint, ConstraintRegistry};
    use crate::geometry::{BezierCurve, Circle, Frame};
    use approx::assert_relative_eq;

    #[test]
    fn test_circle_location_is_reprojected_on_every_set() {
        let registry = ConstraintRegistry::default();
        let circle = Circle::new(Frame::world_xy(), 1.0);
        let mut c = registry.build(Geometry::Circle(circle)).unwrap();

        c.set_location(Vec3::new(2.0, 0.0, 1.0));
        assert_relative_eq!(c.location(), Vec3::x(), epsilon = 1e-12);
        c.set_location(Vec3::new(0.0, -3.0, 0.0));
        assert_relative_eq!(c.location(), -Vec3::y(), epsilon = 1e-12);

        c.set_residual(Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(c.tangent(), Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_curve_update_drifting_off_is_projected() {
        let curve = BezierCurve::new(vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, 0.0),
        ]);
        let mut c = Constraint::new(Box::new(CurveConstraint::new(Arc::new(curve.clone()))));
        c.set_location(Vec3::new(0.4, 0.0, 2.0));
        c.set_residual(Vec3::new(5.0, 0.0, 0.0));
        c.update(0.1);

        let (_, on_curve) = curve.closest_point(&c.location());
        assert!((on_curve - c.location()).norm() <= 1e-3);
    }
}
