//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum DoraTypesError {
    /// A linear ring was constructed from too few points.
    #[error("a linear ring requires at least 3 points, got {0}")]
    RingTooSmall(usize),
    /// A WKT string could not be parsed.
    #[error("invalid WKT: {0}")]
    InvalidWkt(String),
    /// A GeoJSON position or geometry could not be converted.
    #[error("invalid input geometry: {0}")]
    Conversion(String),
}
