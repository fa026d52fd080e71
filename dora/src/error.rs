//! Error types used by the crate.

use dora_types::DoraTypesError;
use thiserror::Error;

/// Dora error type.
///
/// Validation errors are raised synchronously to the caller; nothing here is
/// fatal to the process, every failure is scoped to a single geometry or
/// operation.
#[derive(Debug, Error)]
pub enum DoraError {
    /// The input shape is malformed or does not describe a valid geometry.
    #[error("invalid input geometry: {0}")]
    InvalidGeometry(String),
    /// A GeoJSON/WKT geometry of one kind was fed into a shape of another.
    #[error("expected {expected} geometry, got {actual}")]
    GeometryTypeMismatch {
        /// The kind the target shape accepts.
        expected: &'static str,
        /// The kind that was actually supplied.
        actual: String,
    },
    /// Error from the primitives layer (rings, WKT, positions).
    #[error(transparent)]
    Types(#[from] DoraTypesError),
    /// The native engine does not implement the requested capability.
    #[error("operation not supported by the {engine} engine: {operation}")]
    NotSupported {
        /// Engine that rejected the operation.
        engine: &'static str,
        /// The operation that is missing.
        operation: &'static str,
    },
    /// `finish_edit`/`cancel_edit` was called without a matching begin.
    #[error("geometry is not being edited")]
    NotEditing,
}

impl DoraError {
    /// A short message suitable for showing to an end user, as opposed to the
    /// diagnostic `Display` output.
    pub fn user_message(&self) -> &'static str {
        match self {
            DoraError::InvalidGeometry(_) | DoraError::Types(_) => {
                "The shape data is invalid and cannot be drawn."
            }
            DoraError::GeometryTypeMismatch { .. } => {
                "The shape data does not match the selected shape type."
            }
            DoraError::NotSupported { .. } => "This action is not available on the current map.",
            DoraError::NotEditing => "There is no active edit to complete.",
        }
    }
}
