//! Rendering adapter contract and the per-engine implementations.
//!
//! Every engine implements the same abstract contract: a [`MapEngine`] mints
//! shape renderers and native layer groups, and each [`GeometryRenderer`]
//! turns the drafts produced by the pattern pipeline into one or more native
//! engine objects. The geometry model never talks to a native SDK directly;
//! it only sees these traits, which are dependency-injected at construction.

pub mod cesium;
pub mod google_earth;
pub mod google_maps;
pub mod leaflet;

use dora_types::{Coordinate, LinearRing, ViewBounds};

use crate::design::{FillDesign, GeometryDesign, LineDesign};
use crate::error::DoraError;
use crate::geometry::events::{DetachFn, EventListener, GeometryEvent};
use crate::patterns::{FillDraft, PathDrafts};

/// Opaque identifier of a native shape object minted by an engine facade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeHandle(pub u64);

/// Opaque identifier of a native layer/group/folder object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(pub u64);

/// Identifier of a native event subscription, used to detach it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Stroke attributes passed to native shape constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    /// Stroke color.
    pub color: crate::design::Color,
    /// Stroke opacity in `[0, 1]`.
    pub opacity: f64,
    /// Stroke width in pixels.
    pub width: f64,
}

impl From<&LineDesign> for StrokeStyle {
    fn from(design: &LineDesign) -> Self {
        Self {
            color: design.color,
            opacity: design.opacity,
            width: design.width,
        }
    }
}

/// Fill attributes passed to native shape constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct FillStyle {
    /// Fill color.
    pub color: crate::design::Color,
    /// Fill opacity in `[0, 1]`.
    pub opacity: f64,
}

impl From<&FillDesign> for FillStyle {
    fn from(design: &FillDesign) -> Self {
        Self {
            color: design.color,
            opacity: design.opacity,
        }
    }
}

/// The native objects one renderer owns, grouped by role so style setters
/// can route to the right parts.
///
/// A polygon composite fills `background`, `fill` and `outline`; lines fill
/// `outline` only; points fill `marker`. The outline is always created last
/// so it draws on top.
#[derive(Debug, Default)]
pub(crate) struct NativeSet {
    pub marker: Option<NativeHandle>,
    pub background: Option<NativeHandle>,
    pub fill: Vec<NativeHandle>,
    pub outline: Vec<NativeHandle>,
}

impl NativeSet {
    pub(crate) fn is_empty(&self) -> bool {
        self.marker.is_none()
            && self.background.is_none()
            && self.fill.is_empty()
            && self.outline.is_empty()
    }

    pub(crate) fn all(&self) -> impl Iterator<Item = NativeHandle> + '_ {
        self.marker
            .iter()
            .chain(self.background.iter())
            .chain(self.fill.iter())
            .chain(self.outline.iter())
            .copied()
    }

    /// The handle interactions (events, editing) target: the marker for
    /// points, the topmost outline part otherwise.
    pub(crate) fn interactive(&self) -> Option<NativeHandle> {
        self.marker
            .or_else(|| self.outline.last().copied())
            .or(self.background)
            .or_else(|| self.fill.first().copied())
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

/// The transformed-coordinate drafts a renderer consumes to build native
/// objects.
#[derive(Debug)]
pub enum ShapeDraft<'a> {
    /// A single marker position.
    Point {
        /// Marker position.
        position: &'a Coordinate,
    },
    /// An open path; exactly one of the draft containers is populated.
    Line {
        /// Outline drafts produced by the line pattern.
        path: &'a PathDrafts,
    },
    /// An area; outline and fill drafts are produced independently.
    Polygon {
        /// The transformed rings of the area, used for the background fill
        /// that makes the whole shape interactive.
        area: &'a [LinearRing],
        /// Outline drafts produced by the line pattern.
        outline: &'a PathDrafts,
        /// Fill draft produced by the fill pattern.
        fill: &'a FillDraft,
    },
    /// Arrow flank lines plus an optional head polygon.
    Arrow {
        /// Flank/body line drafts.
        flanks: &'a PathDrafts,
        /// Head polygon for wide/expanded arrows.
        head: Option<&'a LinearRing>,
    },
}

/// The per-engine adapter backing one geometry instance.
///
/// A renderer owns the native handle(s) of its geometry. The handle is shared
/// across all simultaneous map/layer memberships; mutation through any
/// attachment point is visible to all of them.
///
/// [`GeometryRenderer::generate`] fully completes synchronously: no native
/// object is exposed for event attachment in a partially-built state. Calling
/// it when already generated discards the previous native objects; the caller
/// re-applies the current memberships, visibility and event listeners
/// afterwards.
pub trait GeometryRenderer {
    /// Name of the engine, used in diagnostics.
    fn engine_name(&self) -> &'static str;

    /// Builds native object(s) from the current drafts.
    fn generate(&mut self, draft: ShapeDraft<'_>, design: &GeometryDesign)
        -> Result<(), DoraError>;

    /// Whether native objects currently exist.
    fn is_generated(&self) -> bool;

    /// Adds the native objects to the map.
    fn add_to_map(&mut self) -> Result<(), DoraError>;

    /// Removes the native objects from the map.
    fn remove_from_map(&mut self);

    /// Adds the native objects to a native layer group.
    fn add_to_layer(&mut self, layer: LayerHandle) -> Result<(), DoraError>;

    /// Removes the native objects from a native layer group.
    fn remove_from_layer(&mut self, layer: LayerHandle);

    /// Changes the stroke color in place.
    fn set_line_color(&mut self, color: crate::design::Color);

    /// Changes the stroke opacity in place.
    fn set_line_opacity(&mut self, opacity: f64);

    /// Changes the stroke width in place.
    fn set_line_width(&mut self, width: f64);

    /// Changes the fill color in place.
    fn set_fill_color(&mut self, color: crate::design::Color);

    /// Changes the fill opacity in place.
    fn set_fill_opacity(&mut self, opacity: f64);

    /// Shows or hides the native objects without detaching them.
    fn set_visibility(&mut self, visible: bool);

    /// Attaches a native mouse event listener. Returns a closure that
    /// detaches it.
    fn attach_event(
        &mut self,
        event: GeometryEvent,
        listener: EventListener,
    ) -> Result<DetachFn, DoraError>;

    /// Hides the original geometry and creates a transient editable native
    /// shape.
    fn begin_edit(&mut self) -> Result<(), DoraError>;

    /// Commits the edit: destroys the transient shape and returns the edited
    /// coordinates.
    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError>;

    /// Discards the edit and restores the original geometry's visibility.
    fn cancel_edit(&mut self);

    /// Starts a drag interaction. Engines without a separate drag facility
    /// fall back to edit mode.
    fn begin_drag(&mut self) -> Result<(), DoraError> {
        self.begin_edit()
    }

    /// Moves the engine viewport to the given bounds.
    fn focus_view(&mut self, bounds: &ViewBounds);

    /// Destroys the native objects. The renderer may be regenerated later.
    fn dispose(&mut self);
}

/// Factory for renderers and native layer groups of one engine.
///
/// An instance wraps the opaque native map handle of its engine and is shared
/// by the builder, layers and geometries via `Arc`.
pub trait MapEngine {
    /// Name of the engine, used in diagnostics.
    fn name(&self) -> &'static str;

    /// Creates a renderer for a point geometry.
    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer>;

    /// Creates a renderer for a line geometry.
    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer>;

    /// Creates a renderer for a polygon geometry.
    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer>;

    /// Creates a renderer for an arrow geometry.
    fn create_arrow_renderer(&self) -> Box<dyn GeometryRenderer> {
        self.create_line_renderer()
    }

    /// Creates a native layer group.
    fn create_layer(&self, name: &str) -> LayerHandle;

    /// Destroys a native layer group.
    fn remove_layer(&self, layer: LayerHandle);
}
