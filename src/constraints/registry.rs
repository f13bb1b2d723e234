//! Geometry kinds and the geometry → constraint registration table

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    Constraint, CurveConstraint, FrameConstraint, LineConstraint, PlaneConstraint, Projector,
    SurfaceConstraint, VectorConstraint,
};
use crate::error::{FDError, FDResult};
use crate::geometry::{Circle, Frame, Line, ParametricCurve, ParametricSurface, Plane};
use crate::math::Vec3;

/// Kind of constraint geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Vector,
    Frame,
    Plane,
    Line,
    Circle,
    Curve,
    Surface,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Vector => "vector",
            Self::Frame => "frame",
            Self::Plane => "plane",
            Self::Line => "line",
            Self::Circle => "circle",
            Self::Curve => "curve",
            Self::Surface => "surface",
        };
        f.write_str(name)
    }
}

/// Geometry a node can be constrained to
#[derive(Debug, Clone)]
pub enum Geometry {
    /// Free movement along a direction through the node
    Vector(Vec3),
    /// Movement in the XY plane of a frame
    Frame(Frame),
    Plane(Plane),
    Line(Line),
    Circle(Circle),
    Curve(Arc<dyn ParametricCurve>),
    Surface(Arc<dyn ParametricSurface>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Vector(_) => GeometryKind::Vector,
            Self::Frame(_) => GeometryKind::Frame,
            Self::Plane(_) => GeometryKind::Plane,
            Self::Line(_) => GeometryKind::Line,
            Self::Circle(_) => GeometryKind::Circle,
            Self::Curve(_) => GeometryKind::Curve,
            Self::Surface(_) => GeometryKind::Surface,
        }
    }
}

/// Builds the projector for one geometry kind
///
/// A builder handed a geometry of another kind fails with
/// [`FDError::UnsupportedGeometry`].
pub type ConstraintBuilder = fn(Geometry) -> FDResult<Box<dyn Projector>>;

/// Registration table mapping geometry kinds to constraint builders
///
/// Built once and passed by reference wherever constraints are created.
#[derive(Debug, Clone)]
pub struct ConstraintRegistry {
    builders: HashMap<GeometryKind, ConstraintBuilder>,
}

impl Default for ConstraintRegistry {
    /// Registry with all built-in constraint kinds
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(GeometryKind::Vector, VectorConstraint::build);
        registry.register(GeometryKind::Frame, FrameConstraint::build);
        registry.register(GeometryKind::Plane, PlaneConstraint::build);
        registry.register(GeometryKind::Line, LineConstraint::build);
        registry.register(GeometryKind::Circle, CurveConstraint::build_circle);
        registry.register(GeometryKind::Curve, CurveConstraint::build);
        registry.register(GeometryKind::Surface, SurfaceConstraint::build);
        registry
    }
}

impl ConstraintRegistry {
    /// Registry without any registered kinds
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register a builder, returning the one it replaces
    pub fn register(
        &mut self,
        kind: GeometryKind,
        builder: ConstraintBuilder,
    ) -> Option<ConstraintBuilder> {
        self.builders.insert(kind, builder)
    }

    pub fn is_registered(&self, kind: GeometryKind) -> bool {
        self.builders.contains_key(&kind)
    }

    /// Create a constraint for a geometry
    pub fn build(&self, geometry: Geometry) -> FDResult<Constraint> {
        let kind = geometry.kind();
        let builder = self
            .builders
            .get(&kind)
            .ok_or(FDError::UnsupportedGeometry(kind))?;
        Ok(Constraint::new(builder(geometry)?))
    }
}
