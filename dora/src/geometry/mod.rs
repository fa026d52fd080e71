//! The shared geometry model: lifecycle, events, design application.
//!
//! Every shape kind owns a [`GeometryCore`] carrying the engine-agnostic
//! state (design, visibility, memberships, listeners) and a renderer trait
//! object doing the engine-specific work. The [`Geometry`] trait implements
//! the lifecycle on top of those two, so the state machine lives in exactly
//! one place.
//!
//! Lifecycle: a geometry is constructed detached. The first `add_to_map` or
//! `add_to_layer` generates the native objects (lazy generation, generate
//! once); the same native objects then serve the map and every layer the
//! geometry is added to. When the last membership is removed the native
//! objects are disposed.

pub mod events;
pub(crate) mod path;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use dora_types::{Coordinate, ViewBounds};

use crate::design::{DesignUpdate, GeometryDesign};
use crate::engines::{GeometryRenderer, LayerHandle};
use crate::error::DoraError;
use crate::layer::{Layer, LayerId, LayerShared};
use events::{EventListener, EventRegistry, GeometryEvent};

/// Identifier of a geometry, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(u64);

impl GeometryId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One recorded layer membership of a geometry.
///
/// The layer itself is held weakly: the geometry tracks membership but does
/// not own the layer's lifetime.
#[derive(Clone)]
pub(crate) struct LayerMembership {
    pub id: LayerId,
    pub handle: LayerHandle,
    pub layer: Weak<LayerShared>,
}

impl LayerMembership {
    pub(crate) fn of(layer: &Layer) -> Self {
        Self {
            id: layer.id(),
            handle: layer.native_handle(),
            layer: layer.downgrade(),
        }
    }
}

/// Snapshot of a geometry's current attachments, used to mirror them onto
/// child geometries (icon points).
#[derive(Clone)]
pub(crate) struct Attachments {
    pub added_to_map: bool,
    pub visible: bool,
    pub layers: Vec<LayerMembership>,
}

/// Engine-agnostic state shared by all shape kinds.
pub struct GeometryCore {
    id: GeometryId,
    pub(crate) design: GeometryDesign,
    pub(crate) renderer: Box<dyn GeometryRenderer>,
    pub(crate) added_to_map: bool,
    pub(crate) layers: Vec<LayerMembership>,
    pub(crate) visible: bool,
    original_design: Option<GeometryDesign>,
    events: EventRegistry,
}

impl GeometryCore {
    pub(crate) fn new(renderer: Box<dyn GeometryRenderer>, design: GeometryDesign) -> Self {
        Self {
            id: GeometryId::next(),
            design,
            renderer,
            added_to_map: false,
            layers: Vec::new(),
            visible: true,
            original_design: None,
            events: EventRegistry::default(),
        }
    }

    /// Identifier of the geometry.
    pub fn id(&self) -> GeometryId {
        self.id
    }

    /// The current design of the geometry.
    pub fn design(&self) -> &GeometryDesign {
        &self.design
    }

    pub(crate) fn has_membership(&self, layer: LayerId) -> bool {
        self.layers.iter().any(|m| m.id == layer)
    }

    pub(crate) fn take_membership(&mut self, layer: LayerId) -> Option<LayerMembership> {
        let index = self.layers.iter().position(|m| m.id == layer)?;
        Some(self.layers.remove(index))
    }

    pub(crate) fn attachments(&self) -> Attachments {
        Attachments {
            added_to_map: self.added_to_map,
            visible: self.visible,
            layers: self.layers.clone(),
        }
    }

    /// Registers a listener, attaching it natively when the geometry is
    /// prepared and queueing it otherwise. Duplicate registrations of the
    /// same listener are suppressed.
    pub(crate) fn register_listener(
        &mut self,
        event: GeometryEvent,
        listener: EventListener,
    ) -> Result<(), DoraError> {
        if self.events.contains(event, &listener) {
            return Ok(());
        }

        if self.renderer.is_generated() {
            let detach = self.renderer.attach_event(event, listener.clone())?;
            self.events.bind(event, listener, detach);
        } else {
            self.events.queue(event, listener);
        }

        Ok(())
    }

    pub(crate) fn remove_listener(
        &mut self,
        event: GeometryEvent,
        listener: Option<&EventListener>,
    ) {
        self.events.remove(event, listener);
    }

    /// Re-applies owners, visibility and event listeners after the native
    /// objects were (re)built. Every `generate_on_map` implementation must
    /// end with this call so all simultaneous attachments stay consistent.
    pub(crate) fn sync_after_generation(&mut self) -> Result<(), DoraError> {
        for (event, listener) in self.events.drain_for_rebind() {
            let detach = self.renderer.attach_event(event, listener.clone())?;
            self.events.bind(event, listener, detach);
        }

        if self.added_to_map {
            self.renderer.add_to_map()?;
        }
        for membership in &self.layers {
            self.renderer.add_to_layer(membership.handle)?;
        }
        self.renderer.set_visibility(self.visible);

        Ok(())
    }

    /// Pushes the cosmetic attributes present in the update to the native
    /// objects. Structural attributes (pattern, smoothing) are not handled
    /// here; the caller regenerates for those.
    pub(crate) fn apply_cosmetics(&mut self, update: &DesignUpdate) {
        if let Some(line) = &update.line {
            if let Some(color) = line.color {
                self.renderer.set_line_color(color);
            }
            if let Some(opacity) = line.opacity {
                self.renderer.set_line_opacity(opacity);
            }
            if let Some(width) = line.width {
                self.renderer.set_line_width(width);
            }
        }
        if let Some(fill) = &update.fill {
            if let Some(color) = fill.color {
                self.renderer.set_fill_color(color);
            }
            if let Some(opacity) = fill.opacity {
                self.renderer.set_fill_opacity(opacity);
            }
        }
    }

    pub(crate) fn dispose(&mut self) {
        self.events.clear();
        self.renderer.dispose();
    }

    #[cfg(test)]
    pub(crate) fn active_listener_count(&self) -> usize {
        self.events.active_count()
    }
}

/// The public surface of every Dora geometry.
///
/// The lifecycle methods are provided; concrete shapes supply their state
/// accessors, generation and serialization.
pub trait Geometry {
    /// The shared lifecycle state.
    fn core(&self) -> &GeometryCore;

    /// The shared lifecycle state, mutably.
    fn core_mut(&mut self) -> &mut GeometryCore;

    /// Applies the pattern pipeline and builds the native objects from the
    /// resulting drafts.
    ///
    /// Implementations must finish with
    /// [`GeometryCore::sync_after_generation`] so memberships, visibility and
    /// listeners survive regeneration.
    fn generate_on_map(&mut self) -> Result<(), DoraError>;

    /// Serializes the authored coordinates to WKT.
    fn get_wkt(&self) -> String;

    /// Replaces the authored coordinates from WKT. The geometry kind must
    /// match.
    fn set_wkt(&mut self, wkt: &str) -> Result<(), DoraError>;

    /// Serializes the authored coordinates to a GeoJSON geometry.
    fn get_geojson(&self) -> geojson::Geometry;

    /// Replaces the authored coordinates from a GeoJSON geometry. The
    /// geometry kind must match.
    fn set_geojson(&mut self, geometry: &geojson::Geometry) -> Result<(), DoraError>;

    /// Replaces the authored coordinates after an edit interaction.
    fn apply_edited_coordinates(&mut self, coordinates: Vec<Coordinate>) -> Result<(), DoraError>;

    /// The coordinates the viewport should fit when focusing this geometry.
    fn focus_coordinates(&self) -> Vec<Coordinate>;

    /// Whether the update requires full regeneration for this shape kind.
    fn is_structural_change(&self, update: &DesignUpdate) -> bool {
        update.changes_line_structure(&self.core().design)
    }

    /// Re-evaluates icon positions and designs without regenerating natives.
    fn refresh_icons(&mut self) -> Result<(), DoraError> {
        Ok(())
    }

    /// Visits the owned child geometries (icon points).
    fn for_each_child(&mut self, _visit: &mut dyn FnMut(&mut crate::shapes::Point)) {}

    /// Identifier of the geometry.
    fn id(&self) -> GeometryId {
        self.core().id()
    }

    /// The current design.
    fn get_design(&self) -> &GeometryDesign {
        self.core().design()
    }

    /// Merges a partial design update.
    ///
    /// Cosmetic changes (color, opacity, width) mutate the native objects in
    /// place when the geometry is prepared; structural changes (pattern,
    /// smoothing, icon cardinality) force full regeneration.
    fn set_design(&mut self, update: &DesignUpdate) -> Result<(), DoraError> {
        let structural =
            self.is_structural_change(update) || update.changes_icon_count(&self.core().design);
        let icons_changed = update.icons.is_some();

        self.core_mut().design.merge(update);

        if !self.core().renderer.is_generated() {
            return Ok(());
        }

        if structural {
            self.generate_on_map()?;
        } else {
            self.core_mut().apply_cosmetics(update);
            if icons_changed {
                self.refresh_icons()?;
            }
        }

        Ok(())
    }

    /// Whether the native objects have been generated.
    fn is_prepared(&self) -> bool {
        self.core().renderer.is_generated()
    }

    /// Whether the geometry is currently added to the map.
    fn is_added_to_map(&self) -> bool {
        self.core().added_to_map
    }

    /// Adds the geometry to the map, generating the native objects on first
    /// attachment. Idempotent.
    fn add_to_map(&mut self) -> Result<(), DoraError> {
        if self.core().added_to_map {
            return Ok(());
        }

        log::debug!("adding geometry {:?} to map", self.id());
        self.core_mut().added_to_map = true;
        if !self.core().renderer.is_generated() {
            self.generate_on_map()?;
        } else {
            self.core_mut().renderer.add_to_map()?;
            let visible = self.core().visible;
            self.core_mut().renderer.set_visibility(visible);
            let attachments = self.core().attachments();
            self.for_each_child(&mut |child| {
                if let Err(error) = child.mirror_attachments(&attachments) {
                    log::warn!("failed to attach icon point: {error}");
                }
            });
        }

        Ok(())
    }

    /// Adds the geometry to a layer, generating the native objects on first
    /// attachment. Adding to the same layer twice is a no-op.
    fn add_to_layer(&mut self, layer: &Layer) -> Result<(), DoraError> {
        if self.core().has_membership(layer.id()) {
            return Ok(());
        }

        log::debug!("adding geometry {:?} to layer {:?}", self.id(), layer.id());
        self.core_mut().layers.push(LayerMembership::of(layer));
        layer.attach(self.core().id());

        if !self.core().renderer.is_generated() {
            self.generate_on_map()?;
        } else {
            self.core_mut().renderer.add_to_layer(layer.native_handle())?;
            let visible = self.core().visible;
            self.core_mut().renderer.set_visibility(visible);
            let attachments = self.core().attachments();
            self.for_each_child(&mut |child| {
                if let Err(error) = child.mirror_attachments(&attachments) {
                    log::warn!("failed to attach icon point: {error}");
                }
            });
        }

        Ok(())
    }

    /// Detaches the geometry from the map and every layer, then disposes the
    /// native objects.
    fn remove(&mut self) {
        if self.core().added_to_map {
            self.core_mut().renderer.remove_from_map();
            self.core_mut().added_to_map = false;
        }

        while let Some(membership) = self.core_mut().layers.pop() {
            self.core_mut().renderer.remove_from_layer(membership.handle);
            if let Some(layer) = membership.layer.upgrade() {
                layer.detach(self.core().id());
            }
        }

        self.for_each_child(&mut |child| child.remove());
        self.core_mut().dispose();
    }

    /// Removes the geometry from one layer. When that was the last
    /// attachment, the native objects are disposed.
    fn remove_from_layer(&mut self, layer: &Layer) {
        let Some(membership) = self.core_mut().take_membership(layer.id()) else {
            return;
        };

        self.core_mut().renderer.remove_from_layer(membership.handle);
        if let Some(shared) = membership.layer.upgrade() {
            shared.detach(self.core().id());
        }
        let id = layer.id();
        self.for_each_child(&mut |child| child.detach_from_layer(id));

        if self.core().layers.is_empty() && !self.core().added_to_map {
            self.for_each_child(&mut |child| child.remove());
            self.core_mut().dispose();
        }
    }

    /// Current visibility flag.
    fn get_visibility(&self) -> bool {
        self.core().visible
    }

    /// Shows or hides the geometry. Applied natively once prepared.
    fn set_visibility(&mut self, visible: bool) {
        self.core_mut().visible = visible;
        if self.core().renderer.is_generated() {
            self.core_mut().renderer.set_visibility(visible);
        }
        self.for_each_child(&mut |child| child.set_visibility(visible));
    }

    /// Highlights the geometry, snapshotting the current design so
    /// [`Geometry::un_mark`] can restore it exactly.
    fn mark(&mut self) {
        if self.core().original_design.is_some() {
            return;
        }

        self.core_mut().original_design = Some(self.core().design.clone());
        let highlight = DesignUpdate::mark_highlight();
        self.core_mut().design.merge(&highlight);
        if self.core().renderer.is_generated() {
            self.core_mut().apply_cosmetics(&highlight);
        }
    }

    /// Restores the design snapshotted by [`Geometry::mark`].
    fn un_mark(&mut self) {
        let Some(original) = self.core_mut().original_design.take() else {
            return;
        };

        let restore = DesignUpdate::restore_cosmetics(&original);
        self.core_mut().design = original;
        if self.core().renderer.is_generated() {
            self.core_mut().apply_cosmetics(&restore);
        }
    }

    /// Whether the geometry is currently marked.
    fn is_marked(&self) -> bool {
        self.core().original_design.is_some()
    }

    /// Registers an event listener. Listeners registered before the geometry
    /// is prepared are queued and installed on first generation. Registering
    /// the identical listener twice is a no-op.
    fn on(&mut self, event: GeometryEvent, listener: EventListener) -> Result<(), DoraError> {
        self.core_mut().register_listener(event, listener)
    }

    /// Removes a specific listener, or every listener of the event when
    /// `listener` is `None`.
    fn off(&mut self, event: GeometryEvent, listener: Option<&EventListener>) {
        self.core_mut().remove_listener(event, listener);
    }

    /// Hides the geometry and starts a native edit interaction.
    fn begin_edit(&mut self) -> Result<(), DoraError> {
        if !self.core().renderer.is_generated() {
            return Err(DoraError::NotEditing);
        }

        let core = self.core_mut();
        core.renderer.begin_edit()?;
        core.renderer.set_visibility(false);
        Ok(())
    }

    /// Hides the geometry and starts a native drag interaction.
    fn begin_drag(&mut self) -> Result<(), DoraError> {
        if !self.core().renderer.is_generated() {
            return Err(DoraError::NotEditing);
        }

        let core = self.core_mut();
        core.renderer.begin_drag()?;
        core.renderer.set_visibility(false);
        Ok(())
    }

    /// Commits the active edit/drag: the edited coordinates replace the
    /// authored ones and the geometry regenerates.
    fn finish_edit(&mut self) -> Result<(), DoraError> {
        let coordinates = self.core_mut().renderer.finish_edit()?;
        self.apply_edited_coordinates(coordinates)?;
        self.generate_on_map()
    }

    /// Discards the active edit/drag and restores visibility.
    fn cancel_edit(&mut self) {
        let core = self.core_mut();
        core.renderer.cancel_edit();
        let visible = core.visible;
        core.renderer.set_visibility(visible);
    }

    /// Moves the engine viewport to fit this geometry.
    fn focus_view(&mut self) {
        if let Some(bounds) = ViewBounds::from_coordinates(&self.focus_coordinates()) {
            self.core_mut().renderer.focus_view(&bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::design::{DesignUpdate, GeometryDesign, LineDesignUpdate, LinePatternName};
    use crate::engines::MapEngine;
    use crate::shapes::Line;
    use crate::test_utils::{count_calls, SpyEngine};
    use crate::Color;

    use super::*;

    fn line(engine: &Arc<dyn MapEngine>) -> Line {
        Line::new(
            Arc::clone(engine),
            vec![Coordinate::new(32.0, 35.0), Coordinate::new(33.0, 36.0)],
            GeometryDesign::default(),
        )
        .unwrap()
    }

    fn listener() -> EventListener {
        Arc::new(|_args| {})
    }

    #[test]
    fn natives_are_generated_once() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);

        assert!(!line.is_prepared());
        line.add_to_map().unwrap();
        line.add_to_map().unwrap();

        assert!(line.is_prepared());
        assert_eq!(count_calls(&log, "generate"), 1);
        assert_eq!(count_calls(&log, "add_to_map"), 1);
    }

    #[test]
    fn map_and_layer_share_the_same_natives() {
        let (engine, log) = SpyEngine::create();
        let layer = Layer::new(engine.as_ref(), "drawings");
        let mut line = line(&engine);

        line.add_to_map().unwrap();
        line.add_to_layer(&layer).unwrap();

        assert_eq!(count_calls(&log, "generate"), 1);
        assert_eq!(count_calls(&log, "add_to_layer"), 1);
        assert_eq!(layer.geometries(), vec![line.id()]);

        line.remove();
        assert_eq!(count_calls(&log, "remove_from_map"), 1);
        assert_eq!(count_calls(&log, "remove_from_layer"), 1);
        assert_eq!(count_calls(&log, "dispose"), 1);
        assert!(layer.geometries().is_empty());
        assert!(!line.is_prepared());
    }

    #[test]
    fn removing_the_last_membership_disposes() {
        let (engine, log) = SpyEngine::create();
        let first = Layer::new(engine.as_ref(), "first");
        let second = Layer::new(engine.as_ref(), "second");
        let mut line = line(&engine);

        line.add_to_layer(&first).unwrap();
        line.add_to_layer(&second).unwrap();

        line.remove_from_layer(&first);
        assert_eq!(count_calls(&log, "dispose"), 0);
        assert!(line.is_prepared());

        line.remove_from_layer(&second);
        assert_eq!(count_calls(&log, "dispose"), 1);
        assert!(!line.is_prepared());
    }

    #[test]
    fn cosmetic_update_restyles_in_place() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();

        line.set_design(&DesignUpdate::line_color(Color::WHITE)).unwrap();

        assert_eq!(count_calls(&log, "generate"), 1);
        assert_eq!(count_calls(&log, "set_line_color #FFFFFF"), 1);
        assert_eq!(line.get_design().line.color, Color::WHITE);
    }

    #[test]
    fn structural_update_regenerates() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();

        let update = DesignUpdate {
            line: Some(LineDesignUpdate {
                pattern: Some(LinePatternName::Dashed),
                ..Default::default()
            }),
            ..Default::default()
        };
        line.set_design(&update).unwrap();

        assert_eq!(count_calls(&log, "generate"), 2);
        // Regeneration re-applies the map membership.
        assert_eq!(count_calls(&log, "add_to_map"), 2);
    }

    #[test]
    fn design_updates_before_preparation_stay_local() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);

        line.set_design(&DesignUpdate::line_color(Color::WHITE)).unwrap();

        assert!(log.lock().is_empty());
        assert_eq!(line.get_design().line.color, Color::WHITE);
    }

    #[test]
    fn queued_listeners_attach_on_first_generation() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);

        let handler = listener();
        line.on(GeometryEvent::Click, handler.clone()).unwrap();
        line.on(GeometryEvent::Click, handler.clone()).unwrap();
        assert_eq!(count_calls(&log, "attach"), 0);

        line.add_to_map().unwrap();

        // The duplicate registration was suppressed by listener identity.
        assert_eq!(count_calls(&log, "attach Click"), 1);
        assert_eq!(line.core().active_listener_count(), 1);
    }

    #[test]
    fn listeners_are_rebound_after_regeneration() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.on(GeometryEvent::Click, listener()).unwrap();
        line.add_to_map().unwrap();

        let update = DesignUpdate {
            line: Some(LineDesignUpdate {
                pattern: Some(LinePatternName::Dotted),
                ..Default::default()
            }),
            ..Default::default()
        };
        line.set_design(&update).unwrap();

        assert_eq!(count_calls(&log, "attach Click"), 2);
        assert_eq!(line.core().active_listener_count(), 1);
    }

    #[test]
    fn off_detaches_natively() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        let handler = listener();
        line.on(GeometryEvent::Click, handler.clone()).unwrap();
        line.add_to_map().unwrap();

        line.off(GeometryEvent::Click, Some(&handler));

        assert_eq!(count_calls(&log, "detach Click"), 1);
        assert_eq!(line.core().active_listener_count(), 0);
    }

    #[test]
    fn mark_and_un_mark_restore_the_design() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();
        let original = line.get_design().clone();

        line.mark();
        line.mark();
        assert!(line.is_marked());
        assert_eq!(line.get_design().line.color, Color::MARK_HIGHLIGHT);
        assert_eq!(
            count_calls(&log, &format!("set_line_color {}", Color::MARK_HIGHLIGHT.to_hex())),
            1
        );

        line.un_mark();
        assert!(!line.is_marked());
        assert_eq!(line.get_design(), &original);
    }

    #[test]
    fn visibility_survives_regeneration() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();
        line.set_visibility(false);

        let update = DesignUpdate {
            line: Some(LineDesignUpdate {
                pattern: Some(LinePatternName::Dashed),
                ..Default::default()
            }),
            ..Default::default()
        };
        line.set_design(&update).unwrap();

        assert!(!line.get_visibility());
        assert_eq!(
            log.lock().last().map(String::as_str),
            Some("set_visibility false")
        );
    }

    #[test]
    fn finishing_an_edit_applies_the_coordinates_and_regenerates() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();

        line.begin_edit().unwrap();
        line.finish_edit().unwrap();

        assert_eq!(
            line.coordinates(),
            &[
                Coordinate::new(10.0, 10.0),
                Coordinate::new(11.0, 11.0),
                Coordinate::new(12.0, 12.0),
            ]
        );
        assert_eq!(count_calls(&log, "generate"), 2);
    }

    #[test]
    fn finish_without_begin_is_an_error() {
        let (engine, _log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();

        assert!(matches!(line.finish_edit(), Err(DoraError::NotEditing)));
    }

    #[test]
    fn edit_on_a_detached_geometry_is_rejected() {
        let (engine, _log) = SpyEngine::create();
        let mut line = line(&engine);

        assert!(matches!(line.begin_edit(), Err(DoraError::NotEditing)));
    }

    #[test]
    fn cancel_edit_restores_visibility() {
        let (engine, log) = SpyEngine::create();
        let mut line = line(&engine);
        line.add_to_map().unwrap();

        line.begin_edit().unwrap();
        line.cancel_edit();

        assert_eq!(count_calls(&log, "cancel_edit"), 1);
        assert_eq!(
            log.lock().last().map(String::as_str),
            Some("set_visibility true")
        );
    }
}
