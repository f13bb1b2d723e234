//! Error types for form finding

use thiserror::Error;

use crate::constraints::GeometryKind;

/// Main error type for form finding operations
#[derive(Error, Debug)]
pub enum FDError {
    #[error("Singular system - the free nodes may not be connected to any anchor")]
    SingularSystem,

    #[error("Singular stress transformation - face {0} is degenerate")]
    SingularTransformation(usize),

    #[error("No constraint registered for geometry of kind '{0}'")]
    UnsupportedGeometry(GeometryKind),

    #[error("Face {0} has a non-isotropic stress goal but no reference vector")]
    NonIsotropicStressWithoutReference(usize),

    #[error("Face {0} must have 3 or 4 vertices")]
    InvalidFace(usize),

    #[error("Index {index} out of range for {what} of length {len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for form finding operations
pub type FDResult<T> = Result<T, FDError>;

/// Check that `index` addresses an element of a collection of length `len`.
pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> FDResult<()> {
    if index < len {
        Ok(())
    } else {
        Err(FDError::IndexOutOfRange { what, index, len })
    }
}
