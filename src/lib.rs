//! FD Solver - force density form finding for cable nets and membranes
//!
//! This library finds equilibrium shapes of tension structures:
//! - Linear force density solves of cable nets
//! - Iterative solves with nodes sliding on planes, lines, curves and surfaces
//! - Natural force density solves of triangle and quad membranes with cables
//! - Node loads, face loads and a self-weight callback
//!
//! ## Example
//! ```rust
//! use fd_solver::prelude::*;
//!
//! let mut net = Network::new();
//!
//! // Add anchors
//! let anchors = [
//!     net.add_anchor([0.0, 0.0, 1.0]),
//!     net.add_anchor([1.0, 0.0, 0.0]),
//!     net.add_anchor([1.0, 1.0, 1.0]),
//!     net.add_anchor([0.0, 1.0, 0.0]),
//! ];
//!
//! // Add a free node tied to every anchor
//! let centre = net.add_node([0.0, 0.0, 0.0]);
//! for anchor in anchors {
//!     net.add_edge(centre, anchor, Some(EdgeGoal::ForceDensity(1.0)))?;
//! }
//!
//! // Solve
//! let result = net.solve_linear()?;
//! assert!((result.positions[centre][2] - 0.5).abs() < 1e-9);
//! # Ok::<(), FDError>(())
//! ```

pub mod analysis;
pub mod constraints;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod loads;
pub mod math;
pub mod model;
pub mod numdata;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        ConstrainedOptions, ConstrainedSolver, LinearFdSolver, NaturalStiffnessAssembler,
        NfdOptions, NfdSolver, StressMode,
    };
    pub use crate::constraints::{Constraint, ConstraintRegistry, Geometry, GeometryKind};
    pub use crate::elements::{EdgeGoal, NaturalEdge, NaturalFace, QuadFace, StressGoal, TriFace};
    pub use crate::error::{FDError, FDResult};
    pub use crate::geometry::{
        BezierCurve, BezierSurface, Circle, Frame, Line, ParametricCurve, ParametricSurface, Plane,
    };
    pub use crate::loads::{FaceLoad, LoadAssembler, SelfWeight};
    pub use crate::model::Network;
    pub use crate::numdata::NumericalState;
    pub use crate::results::{ConvergenceReport, FaceStresses, FormResult};
}
