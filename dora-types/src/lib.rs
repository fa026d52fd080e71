//! Geometric primitives shared by all Dora crates.
//!
//! This crate contains the engine-agnostic building blocks of the Dora
//! geometry model: [`Coordinate`], [`LinearRing`], [`ViewBounds`], geodesic
//! helpers and the WKT codec. It knows nothing about map engines or
//! rendering; everything here is plain value types and pure functions.

pub mod bounds;
pub mod coordinate;
pub mod error;
pub mod geodesic;
pub mod linear_ring;
pub mod smoothing;
pub mod wkt;

pub use bounds::ViewBounds;
pub use coordinate::Coordinate;
pub use error::DoraTypesError;
pub use linear_ring::LinearRing;
pub use wkt::WktGeometry;
