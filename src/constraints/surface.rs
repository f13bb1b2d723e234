use std::sync::Arc;

use super::{Geometry, GeometryKind, Parameter, Projector};
use crate::error::{FDError, FDResult};
use crate::geometry::ParametricSurface;
use crate::math::{vector_component, Vec3};

/// Restricts movement to a surface
#[derive(Debug, Clone)]
pub struct SurfaceConstraint {
    surface: Arc<dyn ParametricSurface>,
}

impl SurfaceConstraint {
    pub fn new(surface: Arc<dyn ParametricSurface>) -> Self {
        Self { surface }
    }

    pub fn build(geometry: Geometry) -> FDResult<Box<dyn Projector>> {
        match geometry {
            Geometry::Surface(surface) => Ok(Box::new(Self::new(surface))),
            other => Err(FDError::UnsupportedGeometry(other.kind())),
        }
    }
}

impl Projector for SurfaceConstraint {
    fn kind(&self) -> GeometryKind {
        GeometryKind::Surface
    }

    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>) {
        let (uv, p) = self.surface.closest_point(point);
        (p, Some(Parameter::Surface(uv)))
    }

    fn tangent(&self, residual: &Vec3, location: &Vec3, param: Option<Parameter>) -> Vec3 {
        let [u, v] = match param {
            Some(Parameter::Surface(uv)) => uv,
            _ => self.surface.closest_point(location).0,
        };
        residual - vector_component(residual, &self.surface.normal_at(u, v))
    }

    fn reprojects_on_set(&self) -> bool {
        true
    }

    fn point_at(&self, param: Parameter) -> Option<Vec3> {
        match param {
            Parameter::Surface([u, v]) => Some(self.surface.point_at(u, v)),
            Parameter::Curve(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::ConstraintRegistry;
    use crate::geometry::BezierSurface;
    use approx::assert_relative_eq;

    #[test]
    fn test_surface_normal_split() {
        let flat = BezierSurface::new(vec![
            vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 2.0, 1.0)],
            vec![Vec3::new(2.0, 0.0, 1.0), Vec3::new(2.0, 2.0, 1.0)],
        ])
        .unwrap();
        let registry = ConstraintRegistry::default();
        let mut c = registry.build(Geometry::Surface(Arc::new(flat))).unwrap();

        c.set_location(Vec3::new(0.5, 1.5, 4.0));
        assert_relative_eq!(c.location(), Vec3::new(0.5, 1.5, 1.0), epsilon = 1e-9);
        match c.parameter() {
            Some(Parameter::Surface([u, v])) => {
                assert_relative_eq!(u, 0.25, epsilon = 1e-9);
                assert_relative_eq!(v, 0.75, epsilon = 1e-9);
            }
            other => panic!("unexpected parameter {other:?}"),
        }

        c.set_residual(Vec3::new(1.0, -2.0, 3.0));
        assert_relative_eq!(c.normal(), Vec3::new(0.0, 0.0, 3.0), epsilon = 1e-9);
        assert_relative_eq!(c.tangent(), Vec3::new(1.0, -2.0, 0.0), epsilon = 1e-9);
    }
}
