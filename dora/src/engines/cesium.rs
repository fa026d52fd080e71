//! Cesium engine adapter.
//!
//! Cesium entities belong to the viewer's entity collection from the moment
//! they are created; there is no attach/detach cycle. Map membership is
//! therefore expressed through the entity `show` flag, combined with the
//! geometry-level visibility. Layers map to data sources. Cesium has no
//! built-in vertex editing, so edit and drag report
//! [`DoraError::NotSupported`].

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

/// The seam to the Cesium viewer.
pub trait CesiumFacade {
    /// Creates a billboard/label entity.
    fn add_point_entity(&self, position: &Coordinate, icon: Option<&IconDesign>) -> NativeHandle;
    /// Creates a polyline entity.
    fn add_polyline_entity(&self, path: &[Coordinate], style: &StrokeStyle) -> NativeHandle;
    /// Creates a polygon entity with holes.
    fn add_polygon_entity(
        &self,
        rings: &[LinearRing],
        stroke: &StrokeStyle,
        fill: &FillStyle,
    ) -> NativeHandle;
    /// Toggles an entity's `show` flag.
    fn show_entity(&self, entity: NativeHandle, show: bool);
    /// Restyles an entity's stroke material in place.
    fn set_entity_stroke(&self, entity: NativeHandle, style: &StrokeStyle);
    /// Restyles an entity's fill material in place.
    fn set_entity_fill(&self, entity: NativeHandle, style: &FillStyle);
    /// Creates a data source grouping entities.
    fn create_data_source(&self, name: &str) -> LayerHandle;
    /// Destroys a data source.
    fn remove_data_source(&self, layer: LayerHandle);
    /// Moves an entity into a data source.
    fn add_to_data_source(&self, entity: NativeHandle, layer: LayerHandle);
    /// Removes an entity from a data source.
    fn remove_from_data_source(&self, entity: NativeHandle, layer: LayerHandle);
    /// Attaches a screen-space pick listener for one entity.
    fn pick_subscribe(
        &self,
        entity: NativeHandle,
        event: GeometryEvent,
        listener: EventListener,
    ) -> SubscriptionId;
    /// Detaches a pick listener.
    fn pick_unsubscribe(&self, subscription: SubscriptionId);
    /// Flies the camera to the bounds.
    fn fly_to(&self, bounds: &ViewBounds);
    /// Removes an entity from the viewer.
    fn remove_entity(&self, entity: NativeHandle);
}

/// The Cesium implementation of [`MapEngine`].
pub struct CesiumEngine {
    facade: Arc<dyn CesiumFacade>,
}

impl CesiumEngine {
    /// Wraps a Cesium viewer facade.
    pub fn new(facade: Arc<dyn CesiumFacade>) -> Self {
        Self { facade }
    }
}

impl MapEngine for CesiumEngine {
    fn name(&self) -> &'static str {
        "cesium"
    }

    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(CesiumRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(CesiumRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(CesiumRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_layer(&self, name: &str) -> LayerHandle {
        self.facade.create_data_source(name)
    }

    fn remove_layer(&self, layer: LayerHandle) {
        self.facade.remove_data_source(layer);
    }
}

/// One geometry's Cesium entities.
pub struct CesiumRenderer {
    facade: Arc<dyn CesiumFacade>,
    natives: NativeSet,
    // Entities exist in the viewer from creation; `show` stays off until the
    // geometry is added to the map or a layer, and reflects visibility only
    // while attached.
    attached: bool,
    visible: bool,
    fill_is_lines: bool,
    line_style: StrokeStyle,
    fill_style: FillStyle,
}

impl CesiumRenderer {
    fn new(facade: Arc<dyn CesiumFacade>) -> Self {
        Self {
            facade,
            natives: NativeSet::default(),
            attached: false,
            visible: true,
            fill_is_lines: false,
            line_style: StrokeStyle::from(&crate::design::LineDesign::default()),
            fill_style: FillStyle::from(&crate::design::FillDesign::default()),
        }
    }

    fn apply_show(&self) {
        let show = self.attached && self.visible;
        for handle in self.natives.all() {
            self.facade.show_entity(handle, show);
        }
    }

    fn build_outline(&mut self, drafts: &PathDrafts) -> Vec<NativeHandle> {
        let mut handles = Vec::new();
        if let Some(single) = drafts.single() {
            handles.push(self.facade.add_polyline_entity(single, &self.line_style));
        }
        if let Some(multiline) = drafts.multiline() {
            for line in multiline {
                handles.push(self.facade.add_polyline_entity(line, &self.line_style));
            }
        }
        if let Some(dots) = drafts.multipolygon() {
            let dot_fill = FillStyle {
                color: self.line_style.color,
                opacity: self.line_style.opacity,
            };
            for dot in dots {
                handles.push(self.facade.add_polygon_entity(
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
            self.facade.remove_entity(handle);
        }
        self.natives.clear();
        self.fill_is_lines = false;
    }
}

impl GeometryRenderer for CesiumRenderer {
    fn engine_name(&self) -> &'static str {
        "cesium"
    }

    fn generate(
        &mut self,
        draft: ShapeDraft<'_>,
        design: &GeometryDesign,
    ) -> Result<(), DoraError> {
        self.destroy_natives();
        self.attached = false;
        self.line_style = StrokeStyle::from(&design.line);
        self.fill_style = FillStyle::from(&design.fill);

        match draft {
            ShapeDraft::Point { position } => {
                self.natives.marker =
                    Some(self.facade.add_point_entity(position, design.icons.first()));
            }
            ShapeDraft::Line { path } => {
                self.natives.outline = self.build_outline(path);
            }
            ShapeDraft::Polygon {
                area,
                outline,
                fill,
            } => {
                let invisible_stroke = StrokeStyle {
                    color: Color::TRANSPARENT,
                    opacity: 0.0,
                    width: 0.0,
                };
                self.natives.background = Some(self.facade.add_polygon_entity(
                    area,
                    &invisible_stroke,
                    &FillStyle {
                        color: self.fill_style.color,
                        opacity: 0.0,
                    },
                ));

                match fill {
                    FillDraft::Solid(rings) => {
                        self.natives.fill = vec![self.facade.add_polygon_entity(
                            rings,
                            &invisible_stroke,
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
                        self.natives.fill = segments
                            .iter()
                            .map(|segment| {
                                self.facade.add_polyline_entity(segment, &stripe_stroke)
                            })
                            .collect();
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
                    self.natives.fill = vec![self.facade.add_polygon_entity(
                        std::slice::from_ref(head),
                        &self.line_style,
                        &head_fill,
                    )];
                }
                self.natives.outline = self.build_outline(flanks);
            }
        }

        // Fresh entities stay hidden until an attachment shows them.
        self.apply_show();
        Ok(())
    }

    fn is_generated(&self) -> bool {
        !self.natives.is_empty()
    }

    fn add_to_map(&mut self) -> Result<(), DoraError> {
        self.attached = true;
        self.apply_show();
        Ok(())
    }

    fn remove_from_map(&mut self) {
        self.attached = false;
        self.apply_show();
    }

    fn add_to_layer(&mut self, layer: LayerHandle) -> Result<(), DoraError> {
        for handle in self.natives.all() {
            self.facade.add_to_data_source(handle, layer);
        }
        self.attached = true;
        self.apply_show();
        Ok(())
    }

    fn remove_from_layer(&mut self, layer: LayerHandle) {
        for handle in self.natives.all() {
            self.facade.remove_from_data_source(handle, layer);
        }
    }

    fn set_line_color(&mut self, color: Color) {
        self.line_style.color = color;
        for handle in &self.natives.outline {
            self.facade.set_entity_stroke(*handle, &self.line_style);
        }
    }

    fn set_line_opacity(&mut self, opacity: f64) {
        self.line_style.opacity = opacity;
        for handle in &self.natives.outline {
            self.facade.set_entity_stroke(*handle, &self.line_style);
        }
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_style.width = width;
        for handle in &self.natives.outline {
            self.facade.set_entity_stroke(*handle, &self.line_style);
        }
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill_style.color = color;
        self.apply_fill();
    }

    fn set_fill_opacity(&mut self, opacity: f64) {
        self.fill_style.opacity = opacity;
        self.apply_fill();
    }

    fn set_visibility(&mut self, visible: bool) {
        self.visible = visible;
        self.apply_show();
    }

    fn attach_event(
        &mut self,
        event: GeometryEvent,
        listener: EventListener,
    ) -> Result<DetachFn, DoraError> {
        let entity = self.natives.interactive().ok_or_else(|| {
            DoraError::InvalidGeometry("cannot attach events before generation".into())
        })?;
        let subscription = self.facade.pick_subscribe(entity, event, listener);
        let facade = Arc::clone(&self.facade);
        Ok(Box::new(move || facade.pick_unsubscribe(subscription)))
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        Err(DoraError::NotSupported {
            engine: "cesium",
            operation: "edit",
        })
    }

    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError> {
        Err(DoraError::NotEditing)
    }

    fn cancel_edit(&mut self) {}

    fn focus_view(&mut self, bounds: &ViewBounds) {
        self.facade.fly_to(bounds);
    }

    fn dispose(&mut self) {
        self.destroy_natives();
        self.attached = false;
    }
}

impl CesiumRenderer {
    fn apply_fill(&self) {
        for handle in &self.natives.fill {
            if self.fill_is_lines {
                self.facade.set_entity_stroke(
                    *handle,
                    &StrokeStyle {
                        color: self.fill_style.color,
                        opacity: self.fill_style.opacity,
                        width: 1.0,
                    },
                );
            } else {
                self.facade.set_entity_fill(*handle, &self.fill_style);
            }
        }
    }
}
