//! Layers group geometries on the map.
//!
//! A layer is an opaque grouping: it owns a native group handle and tracks
//! which geometries belong to it, but it does not own the geometries
//! themselves and never inspects their internals. Geometries notify the layer
//! on membership changes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::engines::{LayerHandle, MapEngine};
use crate::error::DoraError;
use crate::geometry::{Geometry, GeometryId};

/// Identifier of a layer, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct LayerShared {
    id: LayerId,
    name: String,
    native: LayerHandle,
    geometries: RwLock<Vec<GeometryId>>,
}

/// A grouping of geometries backed by a native engine group (layer group,
/// folder or data source, depending on the engine).
///
/// Cloning a `Layer` clones a reference to the same group.
#[derive(Clone)]
pub struct Layer {
    shared: Arc<LayerShared>,
}

impl Layer {
    /// Creates a new layer with a native group in the given engine.
    pub fn new(engine: &dyn MapEngine, name: impl Into<String>) -> Self {
        let name = name.into();
        let native = engine.create_layer(&name);
        log::debug!("created layer {name:?} on {}", engine.name());
        Self {
            shared: Arc::new(LayerShared {
                id: LayerId::next(),
                name,
                native,
                geometries: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Identifier of the layer.
    pub fn id(&self) -> LayerId {
        self.shared.id
    }

    /// Display name of the layer.
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The native group handle backing the layer.
    pub fn native_handle(&self) -> LayerHandle {
        self.shared.native
    }

    /// Identifiers of the geometries currently in the layer.
    pub fn geometries(&self) -> Vec<GeometryId> {
        self.shared.geometries.read().clone()
    }

    /// Adds a geometry to the layer. Delegates to
    /// [`Geometry::add_to_layer`], which records the membership and prepares
    /// the geometry if needed.
    pub fn add_geometry(&self, geometry: &mut dyn Geometry) -> Result<(), DoraError> {
        geometry.add_to_layer(self)
    }

    /// Removes a geometry from the layer. Delegates to
    /// [`Geometry::remove_from_layer`].
    pub fn remove_geometry(&self, geometry: &mut dyn Geometry) {
        geometry.remove_from_layer(self);
    }

    pub(crate) fn attach(&self, geometry: GeometryId) {
        let mut geometries = self.shared.geometries.write();
        if !geometries.contains(&geometry) {
            geometries.push(geometry);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<LayerShared> {
        Arc::downgrade(&self.shared)
    }
}

impl LayerShared {
    pub(crate) fn detach(&self, geometry: GeometryId) {
        self.geometries.write().retain(|id| *id != geometry);
    }

    pub(crate) fn id(&self) -> LayerId {
        self.id
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("geometries", &self.shared.geometries.read().len())
            .finish()
    }
}
