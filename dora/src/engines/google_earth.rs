//! Google Earth engine adapter.
//!
//! Google Earth consumes KML: every shape is a placemark carrying a whole
//! style object, and layers are KML folders. KML styles cannot be mutated
//! field by field, so every cosmetic setter re-sends the full style. Editing
//! goes through an extension that operates on a parallel editable placemark;
//! dragging has no native support at all and reports
//! [`DoraError::NotSupported`].

use std::sync::Arc;

use dora_types::{Coordinate, LinearRing, ViewBounds};

use crate::design::{Color, GeometryDesign, IconDesign};
use crate::error::DoraError;
use crate::geometry::events::{DetachFn, EventListener, GeometryEvent};
use crate::patterns::{FillDraft, PathDrafts};

use super::{
    GeometryRenderer, LayerHandle, MapEngine, NativeHandle, NativeSet, ShapeDraft, SubscriptionId,
};

/// A complete KML style: stroke and fill with opacity baked into the colors,
/// the way KML `<color>` elements carry alpha.
#[derive(Debug, Clone, PartialEq)]
pub struct KmlStyle {
    /// Line color including alpha.
    pub line_color: Color,
    /// Line width in pixels.
    pub line_width: f64,
    /// Polygon fill color including alpha.
    pub fill_color: Color,
    /// Whether the polygon interior is painted.
    pub filled: bool,
    /// Whether the boundary is painted.
    pub outlined: bool,
}

/// The seam to the Google Earth plugin.
pub trait GoogleEarthFacade {
    /// Creates a point placemark.
    fn create_point_placemark(
        &self,
        position: &Coordinate,
        icon: Option<&IconDesign>,
    ) -> NativeHandle;
    /// Creates a `LineString` placemark.
    fn create_line_placemark(&self, path: &[Coordinate], style: &KmlStyle) -> NativeHandle;
    /// Creates a `Polygon` placemark with outer and inner boundaries.
    fn create_polygon_placemark(&self, rings: &[LinearRing], style: &KmlStyle) -> NativeHandle;
    /// Replaces a placemark's style wholesale.
    fn update_style(&self, placemark: NativeHandle, style: &KmlStyle);
    /// Adds a placemark to the document root.
    fn add_feature(&self, placemark: NativeHandle);
    /// Removes a placemark from the document root.
    fn remove_feature(&self, placemark: NativeHandle);
    /// Creates a KML folder.
    fn create_folder(&self, name: &str) -> LayerHandle;
    /// Destroys a KML folder.
    fn remove_folder(&self, folder: LayerHandle);
    /// Adds a placemark to a folder.
    fn add_to_folder(&self, placemark: NativeHandle, folder: LayerHandle);
    /// Removes a placemark from a folder.
    fn remove_from_folder(&self, placemark: NativeHandle, folder: LayerHandle);
    /// Toggles a placemark's KML visibility flag.
    fn set_feature_visibility(&self, placemark: NativeHandle, visible: bool);
    /// Attaches a mouse event listener to a placemark.
    fn attach_listener(
        &self,
        placemark: NativeHandle,
        event: GeometryEvent,
        listener: EventListener,
    ) -> SubscriptionId;
    /// Detaches a previously attached listener.
    fn detach_listener(&self, subscription: SubscriptionId);
    /// Creates the extension's editable copy of a placemark and starts the
    /// edit interaction on it.
    fn begin_placemark_edit(&self, placemark: NativeHandle) -> NativeHandle;
    /// Reads the current coordinates of an editable placemark.
    fn editable_coordinates(&self, editable: NativeHandle) -> Vec<Coordinate>;
    /// Destroys an editable placemark.
    fn destroy_editable(&self, editable: NativeHandle);
    /// Moves the camera to fit the bounds.
    fn set_view_bounds(&self, bounds: &ViewBounds);
    /// Destroys a placemark.
    fn destroy(&self, placemark: NativeHandle);
}

/// The Google Earth implementation of [`MapEngine`].
pub struct GoogleEarthEngine {
    facade: Arc<dyn GoogleEarthFacade>,
}

impl GoogleEarthEngine {
    /// Wraps a Google Earth facade.
    pub fn new(facade: Arc<dyn GoogleEarthFacade>) -> Self {
        Self { facade }
    }
}

impl MapEngine for GoogleEarthEngine {
    fn name(&self) -> &'static str {
        "google-earth"
    }

    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleEarthRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleEarthRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleEarthRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_layer(&self, name: &str) -> LayerHandle {
        self.facade.create_folder(name)
    }

    fn remove_layer(&self, layer: LayerHandle) {
        self.facade.remove_folder(layer);
    }
}

/// One geometry's placemarks.
pub struct GoogleEarthRenderer {
    facade: Arc<dyn GoogleEarthFacade>,
    natives: NativeSet,
    line_color: Color,
    line_opacity: f64,
    line_width: f64,
    fill_color: Color,
    fill_opacity: f64,
    editing: Option<NativeHandle>,
}

impl GoogleEarthRenderer {
    fn new(facade: Arc<dyn GoogleEarthFacade>) -> Self {
        let line = crate::design::LineDesign::default();
        let fill = crate::design::FillDesign::default();
        Self {
            facade,
            natives: NativeSet::default(),
            line_color: line.color,
            line_opacity: line.opacity,
            line_width: line.width,
            fill_color: fill.color,
            fill_opacity: fill.opacity,
            editing: None,
        }
    }

    fn with_alpha(color: Color, opacity: f64) -> Color {
        color.with_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    fn line_style(&self) -> KmlStyle {
        KmlStyle {
            line_color: Self::with_alpha(self.line_color, self.line_opacity),
            line_width: self.line_width,
            fill_color: Color::TRANSPARENT,
            filled: false,
            outlined: true,
        }
    }

    fn fill_style(&self) -> KmlStyle {
        KmlStyle {
            line_color: Color::TRANSPARENT,
            line_width: 0.0,
            fill_color: Self::with_alpha(self.fill_color, self.fill_opacity),
            filled: true,
            outlined: false,
        }
    }

    /// KML dots and arrow heads are painted in the line color.
    fn line_fill_style(&self) -> KmlStyle {
        KmlStyle {
            fill_color: Self::with_alpha(self.line_color, self.line_opacity),
            ..self.fill_style()
        }
    }

    fn build_outline(&mut self, drafts: &PathDrafts) -> Vec<NativeHandle> {
        let style = self.line_style();
        let mut handles = Vec::new();
        if let Some(single) = drafts.single() {
            handles.push(self.facade.create_line_placemark(single, &style));
        }
        if let Some(multiline) = drafts.multiline() {
            for line in multiline {
                handles.push(self.facade.create_line_placemark(line, &style));
            }
        }
        if let Some(dots) = drafts.multipolygon() {
            let dot_style = self.line_fill_style();
            for dot in dots {
                handles.push(
                    self.facade
                        .create_polygon_placemark(std::slice::from_ref(dot), &dot_style),
                );
            }
        }
        handles
    }

    fn destroy_natives(&mut self) {
        for handle in self.natives.all() {
            self.facade.destroy(handle);
        }
        self.natives.clear();
    }

    fn restyle_outline(&self) {
        let style = self.line_style();
        for handle in &self.natives.outline {
            self.facade.update_style(*handle, &style);
        }
    }

    fn restyle_fill(&self) {
        let style = self.fill_style();
        for handle in &self.natives.fill {
            self.facade.update_style(*handle, &style);
        }
    }
}

impl GeometryRenderer for GoogleEarthRenderer {
    fn engine_name(&self) -> &'static str {
        "google-earth"
    }

    fn generate(
        &mut self,
        draft: ShapeDraft<'_>,
        design: &GeometryDesign,
    ) -> Result<(), DoraError> {
        self.destroy_natives();
        self.line_color = design.line.color;
        self.line_opacity = design.line.opacity;
        self.line_width = design.line.width;
        self.fill_color = design.fill.color;
        self.fill_opacity = design.fill.opacity;

        match draft {
            ShapeDraft::Point { position } => {
                self.natives.marker = Some(
                    self.facade
                        .create_point_placemark(position, design.icons.first()),
                );
            }
            ShapeDraft::Line { path } => {
                self.natives.outline = self.build_outline(path);
            }
            ShapeDraft::Polygon {
                area,
                outline,
                fill,
            } => {
                let background = KmlStyle {
                    fill_color: Color::TRANSPARENT,
                    ..self.fill_style()
                };
                self.natives.background =
                    Some(self.facade.create_polygon_placemark(area, &background));

                match fill {
                    FillDraft::Solid(rings) => {
                        self.natives.fill = vec![self
                            .facade
                            .create_polygon_placemark(rings, &self.fill_style())];
                    }
                    FillDraft::Stripes(segments) => {
                        let stripe_style = KmlStyle {
                            line_color: Self::with_alpha(self.fill_color, self.fill_opacity),
                            line_width: 1.0,
                            fill_color: Color::TRANSPARENT,
                            filled: false,
                            outlined: true,
                        };
                        self.natives.fill = segments
                            .iter()
                            .map(|segment| {
                                self.facade.create_line_placemark(segment, &stripe_style)
                            })
                            .collect();
                    }
                }

                self.natives.outline = self.build_outline(outline);
            }
            ShapeDraft::Arrow { flanks, head } => {
                if let Some(head) = head {
                    self.natives.fill = vec![self.facade.create_polygon_placemark(
                        std::slice::from_ref(head),
                        &self.line_fill_style(),
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
            self.facade.add_feature(handle);
        }
        Ok(())
    }

    fn remove_from_map(&mut self) {
        for handle in self.natives.all() {
            self.facade.remove_feature(handle);
        }
    }

    fn add_to_layer(&mut self, layer: LayerHandle) -> Result<(), DoraError> {
        for handle in self.natives.all() {
            self.facade.add_to_folder(handle, layer);
        }
        Ok(())
    }

    fn remove_from_layer(&mut self, layer: LayerHandle) {
        for handle in self.natives.all() {
            self.facade.remove_from_folder(handle, layer);
        }
    }

    fn set_line_color(&mut self, color: Color) {
        self.line_color = color;
        self.restyle_outline();
    }

    fn set_line_opacity(&mut self, opacity: f64) {
        self.line_opacity = opacity;
        self.restyle_outline();
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.restyle_outline();
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
        self.restyle_fill();
    }

    fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_opacity = opacity;
        self.restyle_fill();
    }

    fn set_visibility(&mut self, visible: bool) {
        for handle in self.natives.all() {
            self.facade.set_feature_visibility(handle, visible);
        }
    }

    fn attach_event(
        &mut self,
        event: GeometryEvent,
        listener: EventListener,
    ) -> Result<DetachFn, DoraError> {
        let placemark = self.natives.interactive().ok_or_else(|| {
            DoraError::InvalidGeometry("cannot attach events before generation".into())
        })?;
        let subscription = self.facade.attach_listener(placemark, event, listener);
        let facade = Arc::clone(&self.facade);
        Ok(Box::new(move || facade.detach_listener(subscription)))
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        let placemark = self.natives.interactive().ok_or(DoraError::NotEditing)?;
        self.editing = Some(self.facade.begin_placemark_edit(placemark));
        Ok(())
    }

    fn begin_drag(&mut self) -> Result<(), DoraError> {
        Err(DoraError::NotSupported {
            engine: "google-earth",
            operation: "drag",
        })
    }

    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError> {
        let editable = self.editing.take().ok_or(DoraError::NotEditing)?;
        let coordinates = self.facade.editable_coordinates(editable);
        self.facade.destroy_editable(editable);
        Ok(coordinates)
    }

    fn cancel_edit(&mut self) {
        if let Some(editable) = self.editing.take() {
            self.facade.destroy_editable(editable);
        }
    }

    fn focus_view(&mut self, bounds: &ViewBounds) {
        self.facade.set_view_bounds(bounds);
    }

    fn dispose(&mut self) {
        self.cancel_edit();
        self.destroy_natives();
    }
}
