//! Leaflet engine adapter.
//!
//! Leaflet is the most capable target: it has real layer groups, editable
//! polyline/polygon primitives and per-shape event subscriptions, so the
//! adapter maps the renderer contract onto the facade almost one to one.

use std::sync::Arc;

use dora_types::{Coordinate, LinearRing, ViewBounds};

use crate::design::{Color, GeometryDesign, IconDesign};
use crate::error::DoraError;
use crate::geometry::events::{DetachFn, EventListener, GeometryEvent};
use crate::patterns::{FillDraft, PathDrafts};

use super::{
    FillStyle, GeometryRenderer, LayerHandle, MapEngine, NativeHandle, NativeSet, ShapeDraft,
    StrokeStyle, SubscriptionId,
};

/// The seam to the Leaflet map instance.
///
/// Implementations wrap the actual `L.Map` bindings; the crate's tests use a
/// recording double.
pub trait LeafletFacade {
    /// Creates an `L.Marker`, with a custom icon when one is given.
    fn create_marker(&self, position: &Coordinate, icon: Option<&IconDesign>) -> NativeHandle;
    /// Creates an `L.Polyline` over one or more paths.
    fn create_polyline(&self, paths: &[Vec<Coordinate>], style: &StrokeStyle) -> NativeHandle;
    /// Creates an `L.Polygon` from rings (outer first, then holes).
    fn create_polygon(
        &self,
        rings: &[LinearRing],
        stroke: &StrokeStyle,
        fill: &FillStyle,
    ) -> NativeHandle;
    /// Adds a shape to the map pane.
    fn add_to_map(&self, shape: NativeHandle);
    /// Removes a shape from the map pane.
    fn remove_from_map(&self, shape: NativeHandle);
    /// Creates an `L.LayerGroup`.
    fn create_layer_group(&self, name: &str) -> LayerHandle;
    /// Destroys an `L.LayerGroup`.
    fn remove_layer_group(&self, layer: LayerHandle);
    /// Adds a shape to a layer group.
    fn add_to_layer_group(&self, shape: NativeHandle, layer: LayerHandle);
    /// Removes a shape from a layer group.
    fn remove_from_layer_group(&self, shape: NativeHandle, layer: LayerHandle);
    /// Restyles a shape's stroke in place.
    fn set_stroke(&self, shape: NativeHandle, style: &StrokeStyle);
    /// Restyles a shape's fill in place.
    fn set_fill(&self, shape: NativeHandle, style: &FillStyle);
    /// Toggles a shape's visibility without detaching it.
    fn set_visibility(&self, shape: NativeHandle, visible: bool);
    /// Attaches a mouse event listener to a shape.
    fn subscribe(
        &self,
        shape: NativeHandle,
        event: GeometryEvent,
        listener: EventListener,
    ) -> SubscriptionId;
    /// Detaches a previously attached listener.
    fn unsubscribe(&self, subscription: SubscriptionId);
    /// Puts a shape into Leaflet's editing mode.
    fn enable_editing(&self, shape: NativeHandle);
    /// Reads the vertices of a shape currently in editing mode.
    fn edited_coordinates(&self, shape: NativeHandle) -> Vec<Coordinate>;
    /// Takes a shape out of editing mode.
    fn disable_editing(&self, shape: NativeHandle);
    /// Moves the viewport to fit the bounds.
    fn fit_bounds(&self, bounds: &ViewBounds);
    /// Destroys a native shape.
    fn destroy(&self, shape: NativeHandle);
}

/// The Leaflet implementation of [`MapEngine`].
pub struct LeafletEngine {
    facade: Arc<dyn LeafletFacade>,
}

impl LeafletEngine {
    /// Wraps a Leaflet map facade.
    pub fn new(facade: Arc<dyn LeafletFacade>) -> Self {
        Self { facade }
    }
}

impl MapEngine for LeafletEngine {
    fn name(&self) -> &'static str {
        "leaflet"
    }

    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(LeafletRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(LeafletRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(LeafletRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_layer(&self, name: &str) -> LayerHandle {
        self.facade.create_layer_group(name)
    }

    fn remove_layer(&self, layer: LayerHandle) {
        self.facade.remove_layer_group(layer);
    }
}

/// One geometry's native Leaflet objects.
pub struct LeafletRenderer {
    facade: Arc<dyn LeafletFacade>,
    natives: NativeSet,
    // Dot outlines and stripe fills are drawn with the "wrong" primitive
    // kind, so style setters must route to the matching facade call.
    outline_is_polygons: bool,
    fill_is_lines: bool,
    line_style: StrokeStyle,
    fill_style: FillStyle,
    editing: Option<NativeHandle>,
}

impl LeafletRenderer {
    fn new(facade: Arc<dyn LeafletFacade>) -> Self {
        Self {
            facade,
            natives: NativeSet::default(),
            outline_is_polygons: false,
            fill_is_lines: false,
            line_style: StrokeStyle::from(&crate::design::LineDesign::default()),
            fill_style: FillStyle::from(&crate::design::FillDesign::default()),
            editing: None,
        }
    }

    /// Builds outline natives from path drafts, returning their handles.
    fn build_outline(&mut self, drafts: &PathDrafts) -> Vec<NativeHandle> {
        let mut handles = Vec::new();
        if let Some(single) = drafts.single() {
            handles.push(
                self.facade
                    .create_polyline(&[single.to_vec()], &self.line_style),
            );
        }
        if let Some(multiline) = drafts.multiline() {
            handles.push(self.facade.create_polyline(multiline, &self.line_style));
        }
        if let Some(dots) = drafts.multipolygon() {
            self.outline_is_polygons = true;
            let dot_fill = FillStyle {
                color: self.line_style.color,
                opacity: self.line_style.opacity,
            };
            for dot in dots {
                handles.push(self.facade.create_polygon(
                    std::slice::from_ref(dot),
                    &self.line_style,
                    &dot_fill,
                ));
            }
        }
        handles
    }

    fn destroy_natives(&mut self) {
        for handle in self.natives.all() {
            self.facade.destroy(handle);
        }
        self.natives.clear();
        self.outline_is_polygons = false;
        self.fill_is_lines = false;
    }

    fn apply_line_style(&self) {
        for handle in &self.natives.outline {
            self.facade.set_stroke(*handle, &self.line_style);
            if self.outline_is_polygons {
                let dot_fill = FillStyle {
                    color: self.line_style.color,
                    opacity: self.line_style.opacity,
                };
                self.facade.set_fill(*handle, &dot_fill);
            }
        }
    }

    fn apply_fill_style(&self) {
        for handle in &self.natives.fill {
            if self.fill_is_lines {
                let stripe_stroke = StrokeStyle {
                    color: self.fill_style.color,
                    opacity: self.fill_style.opacity,
                    width: 1.0,
                };
                self.facade.set_stroke(*handle, &stripe_stroke);
            } else {
                self.facade.set_fill(*handle, &self.fill_style);
            }
        }
    }
}

impl GeometryRenderer for LeafletRenderer {
    fn engine_name(&self) -> &'static str {
        "leaflet"
    }

    fn generate(
        &mut self,
        draft: ShapeDraft<'_>,
        design: &GeometryDesign,
    ) -> Result<(), DoraError> {
        self.destroy_natives();
        self.line_style = StrokeStyle::from(&design.line);
        self.fill_style = FillStyle::from(&design.fill);

        match draft {
            ShapeDraft::Point { position } => {
                self.natives.marker = Some(self.facade.create_marker(position, design.icons.first()));
            }
            ShapeDraft::Line { path } => {
                self.natives.outline = self.build_outline(path);
            }
            ShapeDraft::Polygon {
                area,
                outline,
                fill,
            } => {
                // Invisible background polygon makes the whole area
                // interactive even when the fill is hatched.
                let background_stroke = StrokeStyle {
                    color: Color::TRANSPARENT,
                    opacity: 0.0,
                    width: 0.0,
                };
                let background_fill = FillStyle {
                    color: self.fill_style.color,
                    opacity: 0.0,
                };
                self.natives.background =
                    Some(self.facade.create_polygon(area, &background_stroke, &background_fill));

                match fill {
                    FillDraft::Solid(rings) => {
                        self.natives.fill = vec![self.facade.create_polygon(
                            rings,
                            &background_stroke,
                            &self.fill_style,
                        )];
                    }
                    FillDraft::Stripes(segments) => {
                        self.fill_is_lines = true;
                        let stripe_stroke = StrokeStyle {
                            color: self.fill_style.color,
                            opacity: self.fill_style.opacity,
                            width: 1.0,
                        };
                        let paths: Vec<Vec<Coordinate>> =
                            segments.iter().map(|s| s.to_vec()).collect();
                        self.natives.fill =
                            vec![self.facade.create_polyline(&paths, &stripe_stroke)];
                    }
                }

                self.natives.outline = self.build_outline(outline);
            }
            ShapeDraft::Arrow { flanks, head } => {
                if let Some(head) = head {
                    let head_fill = FillStyle {
                        color: self.line_style.color,
                        opacity: self.line_style.opacity,
                    };
                    self.natives.fill = vec![self.facade.create_polygon(
                        std::slice::from_ref(head),
                        &self.line_style,
                        &head_fill,
                    )];
                }
                self.natives.outline = self.build_outline(flanks);
            }
        }

        Ok(())
    }

    fn is_generated(&self) -> bool {
        !self.natives.is_empty()
    }

    fn add_to_map(&mut self) -> Result<(), DoraError> {
        for handle in self.natives.all() {
            self.facade.add_to_map(handle);
        }
        Ok(())
    }

    fn remove_from_map(&mut self) {
        for handle in self.natives.all() {
            self.facade.remove_from_map(handle);
        }
    }

    fn add_to_layer(&mut self, layer: LayerHandle) -> Result<(), DoraError> {
        for handle in self.natives.all() {
            self.facade.add_to_layer_group(handle, layer);
        }
        Ok(())
    }

    fn remove_from_layer(&mut self, layer: LayerHandle) {
        for handle in self.natives.all() {
            self.facade.remove_from_layer_group(handle, layer);
        }
    }

    fn set_line_color(&mut self, color: Color) {
        self.line_style.color = color;
        self.apply_line_style();
    }

    fn set_line_opacity(&mut self, opacity: f64) {
        self.line_style.opacity = opacity;
        self.apply_line_style();
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_style.width = width;
        self.apply_line_style();
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_style.color = color;
        self.apply_fill_style();
    }

    fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_style.opacity = opacity;
        self.apply_fill_style();
    }

    fn set_visibility(&mut self, visible: bool) {
        for handle in self.natives.all() {
            self.facade.set_visibility(handle, visible);
        }
    }

    fn attach_event(
        &mut self,
        event: GeometryEvent,
        listener: EventListener,
    ) -> Result<DetachFn, DoraError> {
        let shape = self.natives.interactive().ok_or_else(|| {
            DoraError::InvalidGeometry("cannot attach events before generation".into())
        })?;
        let subscription = self.facade.subscribe(shape, event, listener);
        let facade = Arc::clone(&self.facade);
        Ok(Box::new(move || facade.unsubscribe(subscription)))
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        let shape = self
            .natives
            .interactive()
            .ok_or(DoraError::NotEditing)?;
        self.facade.enable_editing(shape);
        self.editing = Some(shape);
        Ok(())
    }

    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError> {
        let shape = self.editing.take().ok_or(DoraError::NotEditing)?;
        let coordinates = self.facade.edited_coordinates(shape);
        self.facade.disable_editing(shape);
        Ok(coordinates)
    }

    fn cancel_edit(&mut self) {
        if let Some(shape) = self.editing.take() {
            self.facade.disable_editing(shape);
        }
    }

    fn focus_view(&mut self, bounds: &ViewBounds) {
        self.facade.fit_bounds(bounds);
    }

    fn dispose(&mut self) {
        self.cancel_edit();
        self.destroy_natives();
    }
}
