//! Dora is a unified geometry layer over browser map engines. It lets an
//! application define points, lines, polygons, double lines and arrows once,
//! with a single design model, and draw them on Leaflet, Google Maps, Google
//! Earth or Cesium through one API.
//!
//! # Quick start
//!
//! Inject an engine adapter into a [`GeometryBuilder`] and build shapes from
//! coordinates, WKT or GeoJSON:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use dora::{Geometry, GeometryBuilder, GeometryDesign};
//! use dora::engines::leaflet::{LeafletEngine, LeafletFacade};
//!
//! # fn facade() -> Arc<dyn LeafletFacade> { unimplemented!() }
//! let engine = Arc::new(LeafletEngine::new(facade()));
//! let builder = GeometryBuilder::new(engine);
//!
//! let mut line = builder
//!     .build_from_wkt("LINESTRING(32 35, 33 36)", GeometryDesign::default(), None)
//!     .unwrap();
//! line.as_geometry_mut().add_to_map().unwrap();
//! ```
//!
//! # Main components
//!
//! * [`GeometryBuilder`] is the entry point. It holds the one [`MapEngine`]
//!   in play and creates geometries bound to it.
//! * The [`Geometry`] trait is the whole client surface of a shape:
//!   map/layer membership, visibility, design updates, marking, events,
//!   editing and serialization.
//! * [`GeometryDesign`] describes how a shape is drawn. Partial
//!   [`DesignUpdate`]s route automatically: cosmetic changes restyle the
//!   existing natives in place, structural ones rebuild them.
//! * The [`engines`] module contains one adapter per supported map engine.
//!   Each adapter talks to its JavaScript side through an injected facade
//!   trait, so the model layer stays engine-agnostic and testable.
//!
//! Native objects are created lazily on the first attach, shared between the
//! map and any number of [`Layer`]s, and destroyed when the last membership
//! is removed.
//!
//! [`MapEngine`]: engines::MapEngine

mod arrow_math;
mod builder;
pub mod design;
pub mod engines;
mod error;
mod geometry;
mod icon_position;
mod layer;
pub mod patterns;
pub mod shapes;

#[cfg(test)]
mod test_utils;

pub use builder::{AnyGeometry, GeometryBuilder, GeometryKind};
pub use design::{
    ArrowDesign, ArrowKind, Color, DesignUpdate, FillDesign, FillPatternName, GeometryDesign,
    IconAlignment, IconDesign, LineDesign, LinePatternName, SmoothingMode,
};
pub use error::DoraError;
pub use geometry::events::{DetachFn, EventListener, GeometryEvent, MouseEventArgs};
pub use geometry::{Geometry, GeometryCore, GeometryId};
pub use layer::{Layer, LayerId};
