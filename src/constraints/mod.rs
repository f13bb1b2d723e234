//! Geometric constraints on node positions
//!
//! A [`Constraint`] restricts the movement of one node to a geometry. Each
//! iteration of the constrained solver hands it the node's position and
//! residual force; the constraint splits the residual into a part tangent to
//! the geometry (which moves the node) and a normal part (which the geometry
//! absorbs as a reaction).
//!
//! The geometry-specific behaviour lives behind the [`Projector`] trait.
//! Constraints are created from a [`Geometry`] through a
//! [`ConstraintRegistry`], which maps each [`GeometryKind`] to a builder.

mod curve;
mod line;
mod plane;
mod registry;
mod surface;
mod vector;

pub use curve::CurveConstraint;
pub use line::LineConstraint;
pub use plane::{FrameConstraint, PlaneConstraint};
pub use registry::{ConstraintBuilder, ConstraintRegistry, Geometry, GeometryKind};
pub use surface::SurfaceConstraint;
pub use vector::VectorConstraint;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// Default fraction of the tangent residual applied per update
pub const DEFAULT_DAMPING: f64 = 0.1;

/// Distance beyond which an updated location is projected back
pub const PROJECTION_TOLERANCE: f64 = 0.001;

/// Parameter of a location on the constraint geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Parameter {
    /// Curve parameter (signed distance from the start for lines)
    Curve(f64),
    /// Surface `(u, v)` parameters
    Surface([f64; 2]),
}

/// Geometry-specific part of a constraint
pub trait Projector: Debug + Send + Sync {
    /// Kind of geometry this projector works on
    fn kind(&self) -> GeometryKind;

    /// Closest point on the geometry and, where meaningful, its parameter
    fn closest_point(&self, point: &Vec3) -> (Vec3, Option<Parameter>);

    /// Component of `residual` along the directions of allowed movement
    fn tangent(&self, residual: &Vec3, location: &Vec3, param: Option<Parameter>) -> Vec3;

    /// Whether an updated location has drifted off the geometry
    fn needs_projection(&self, point: &Vec3) -> bool {
        (self.closest_point(point).0 - point).norm() > PROJECTION_TOLERANCE
    }

    /// Whether every new location is projected, refreshing the parameter
    fn reprojects_on_set(&self) -> bool {
        false
    }

    /// Parameter of a location, used when none is cached
    fn parameter(&self, point: &Vec3) -> Option<Parameter> {
        self.closest_point(point).1
    }

    /// Point on the geometry at a parameter
    fn point_at(&self, _param: Parameter) -> Option<Vec3> {
        None
    }
}

/// Constraint state of a single node
#[derive(Debug)]
pub struct Constraint {
    projector: Box<dyn Projector>,
    location: Vec3,
    residual: Vec3,
    tangent: Option<Vec3>,
    param: Option<Parameter>,
    projected: bool,
}

impl Constraint {
    /// Create a constraint around a projector
    pub fn new(projector: Box<dyn Projector>) -> Self {
        Self {
            projector,
            location: Vec3::zeros(),
            residual: Vec3::zeros(),
            tangent: None,
            param: None,
            projected: false,
        }
    }

    /// Kind of the constraint geometry
    pub fn kind(&self) -> GeometryKind {
        self.projector.kind()
    }

    /// Current location of the constrained node
    pub fn location(&self) -> Vec3 {
        self.location
    }

    /// Set the node location
    ///
    /// The first location is projected onto the geometry; curve and surface
    /// constraints project every location to keep their parameter current.
    pub fn set_location(&mut self, point: Vec3) {
        self.tangent = None;
        self.location = point;
        if !self.projected || self.projector.reprojects_on_set() {
            self.project();
            self.projected = true;
        }
    }

    /// Last residual force at the node
    pub fn residual(&self) -> Vec3 {
        self.residual
    }

    /// Set the residual force, invalidating the cached tangent
    pub fn set_residual(&mut self, residual: Vec3) {
        self.tangent = None;
        self.residual = residual;
    }

    /// Tangential part of the residual (cached until the residual changes)
    pub fn tangent(&mut self) -> Vec3 {
        if let Some(t) = self.tangent {
            return t;
        }
        let t = self
            .projector
            .tangent(&self.residual, &self.location, self.param);
        self.tangent = Some(t);
        t
    }

    /// Normal part of the residual
    pub fn normal(&mut self) -> Vec3 {
        self.residual - self.tangent()
    }

    /// Move the location along the tangent residual scaled by `damping`
    ///
    /// The moved location is projected back if it leaves the geometry.
    pub fn update(&mut self, damping: f64) {
        let tangent = self.tangent();
        self.location += tangent * damping;
        if self.projector.needs_projection(&self.location) {
            self.project();
        } else {
            self.param = None;
        }
    }

    /// Project the location onto the geometry
    pub fn project(&mut self) {
        let (point, param) = self.projector.closest_point(&self.location);
        self.location = point;
        if param.is_some() {
            self.param = param;
        }
    }

    /// Parameter of the current location
    pub fn parameter(&mut self) -> Option<Parameter> {
        if self.param.is_none() {
            self.param = self.projector.parameter(&self.location);
        }
        self.param
    }

    /// Move the location to the point at the cached parameter
    ///
    /// Returns `false` when the geometry has no parameterisation.
    pub fn relocate_at_parameter(&mut self) -> bool {
        let Some(param) = self.parameter() else {
            return false;
        };
        match self.projector.point_at(param) {
            Some(point) => {
                self.location = point;
                true
            }
            None => false,
        }
    }
}
