//! Google Maps engine adapter.
//!
//! Google Maps has no native layer groups and its polylines are single-path,
//! so the adapter differs from the Leaflet one in two ways: multi-part drafts
//! become one native shape per part, and layer membership is tracked by
//! reference counting attachments onto the map (`setMap`), since there is no
//! group object to add shapes to.

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

/// The seam to the Google Maps instance.
pub trait GoogleMapsFacade {
    /// Creates a `google.maps.Marker`.
    fn create_marker(&self, position: &Coordinate, icon: Option<&IconDesign>) -> NativeHandle;
    /// Creates a single-path `google.maps.Polyline`.
    fn create_polyline(&self, path: &[Coordinate], style: &StrokeStyle) -> NativeHandle;
    /// Creates a `google.maps.Polygon`; rings map to the polygon's paths.
    fn create_polygon(
        &self,
        rings: &[LinearRing],
        stroke: &StrokeStyle,
        fill: &FillStyle,
    ) -> NativeHandle;
    /// Attaches the shape to the map (`setMap(map)`) or detaches it
    /// (`setMap(null)`).
    fn set_map(&self, shape: NativeHandle, attached: bool);
    /// Restyles a shape's stroke options in place.
    fn set_stroke(&self, shape: NativeHandle, style: &StrokeStyle);
    /// Restyles a shape's fill options in place.
    fn set_fill(&self, shape: NativeHandle, style: &FillStyle);
    /// Toggles a shape's visible option.
    fn set_visible(&self, shape: NativeHandle, visible: bool);
    /// Attaches a mouse event listener to a shape.
    fn add_listener(
        &self,
        shape: NativeHandle,
        event: GeometryEvent,
        listener: EventListener,
    ) -> SubscriptionId;
    /// Removes a previously attached listener.
    fn remove_listener(&self, subscription: SubscriptionId);
    /// Toggles the native editable option of a polyline/polygon.
    fn set_editable(&self, shape: NativeHandle, editable: bool);
    /// Toggles the native draggable option of a shape.
    fn set_draggable(&self, shape: NativeHandle, draggable: bool);
    /// Reads the current vertex path of a shape.
    fn shape_path(&self, shape: NativeHandle) -> Vec<Coordinate>;
    /// Moves the viewport to fit the bounds.
    fn fit_bounds(&self, bounds: &ViewBounds);
    /// Destroys a native shape.
    fn destroy(&self, shape: NativeHandle);
}

/// The Google Maps implementation of [`MapEngine`].
pub struct GoogleMapsEngine {
    facade: Arc<dyn GoogleMapsFacade>,
    next_layer: std::sync::atomic::AtomicU64,
}

impl GoogleMapsEngine {
    /// Wraps a Google Maps facade.
    pub fn new(facade: Arc<dyn GoogleMapsFacade>) -> Self {
        Self {
            facade,
            next_layer: std::sync::atomic::AtomicU64::new(1),
        }
    }
}

impl MapEngine for GoogleMapsEngine {
    fn name(&self) -> &'static str {
        "google-maps"
    }

    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleMapsRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleMapsRenderer::new(Arc::clone(&self.facade)))
    }

    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(GoogleMapsRenderer::new(Arc::clone(&self.facade)))
    }

    // Layers are synthetic: Google Maps has no group object, so a layer is
    // just an identity the model tracks memberships against.
    fn create_layer(&self, name: &str) -> LayerHandle {
        let handle = self
            .next_layer
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        log::debug!("created synthetic google-maps layer {name:?} ({handle})");
        LayerHandle(handle)
    }

    fn remove_layer(&self, _layer: LayerHandle) {}
}

enum EditMode {
    Vertices,
    Drag,
}

/// One geometry's native Google Maps objects.
pub struct GoogleMapsRenderer {
    facade: Arc<dyn GoogleMapsFacade>,
    natives: NativeSet,
    // Map attachment is shared by the map itself and every synthetic layer;
    // the shape stays on the map while any of them holds a reference.
    attachment_count: usize,
    fill_is_lines: bool,
    line_style: StrokeStyle,
    fill_style: FillStyle,
    editing: Option<(NativeHandle, EditMode)>,
}

impl GoogleMapsRenderer {
    fn new(facade: Arc<dyn GoogleMapsFacade>) -> Self {
        Self {
            facade,
            natives: NativeSet::default(),
            attachment_count: 0,
            fill_is_lines: false,
            line_style: StrokeStyle::from(&crate::design::LineDesign::default()),
            fill_style: FillStyle::from(&crate::design::FillDesign::default()),
            editing: None,
        }
    }

    fn attach(&mut self) {
        self.attachment_count += 1;
        if self.attachment_count == 1 {
            for handle in self.natives.all() {
                self.facade.set_map(handle, true);
            }
        }
    }

    fn detach(&mut self) {
        if self.attachment_count == 0 {
            return;
        }
        self.attachment_count -= 1;
        if self.attachment_count == 0 {
            for handle in self.natives.all() {
                self.facade.set_map(handle, false);
            }
        }
    }

    /// One polyline per part: Google Maps polylines carry a single path.
    fn build_outline(&mut self, drafts: &PathDrafts) -> Vec<NativeHandle> {
        let mut handles = Vec::new();
        if let Some(single) = drafts.single() {
            handles.push(self.facade.create_polyline(single, &self.line_style));
        }
        if let Some(multiline) = drafts.multiline() {
            for line in multiline {
                handles.push(self.facade.create_polyline(line, &self.line_style));
            }
        }
        if let Some(dots) = drafts.multipolygon() {
            let dot_fill = FillStyle {
                color: self.line_style.color,
                opacity: self.line_style.opacity,
            };
            handles.push(
                self.facade
                    .create_polygon(dots, &self.line_style, &dot_fill),
            );
        }
        handles
    }

    fn destroy_natives(&mut self) {
        for handle in self.natives.all() {
            self.facade.destroy(handle);
        }
        self.natives.clear();
        self.fill_is_lines = false;
    }
}

impl GeometryRenderer for GoogleMapsRenderer {
    fn engine_name(&self) -> &'static str {
        "google-maps"
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
                self.natives.marker =
                    Some(self.facade.create_marker(position, design.icons.first()));
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
                self.natives.background = Some(self.facade.create_polygon(
                    area,
                    &invisible_stroke,
                    &FillStyle {
                        color: self.fill_style.color,
                        opacity: 0.0,
                    },
                ));

                match fill {
                    FillDraft::Solid(rings) => {
                        self.natives.fill = vec![self.facade.create_polygon(
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
                                self.facade.create_polyline(segment, &stripe_stroke)
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
                    self.natives.fill = vec![self.facade.create_polygon(
                        std::slice::from_ref(head),
                        &self.line_style,
                        &head_fill,
                    )];
                }
                self.natives.outline = self.build_outline(flanks);
            }
        }

        // The caller re-adds the current memberships, which rebuilds the
        // attachment references against the fresh shapes.
        self.attachment_count = 0;
        Ok(())
    }

    fn is_generated(&self) -> bool {
        !self.natives.is_empty()
    }

    fn add_to_map(&mut self) -> Result<(), DoraError> {
        self.attach();
        Ok(())
    }

    fn remove_from_map(&mut self) {
        self.detach();
    }

    fn add_to_layer(&mut self, _layer: LayerHandle) -> Result<(), DoraError> {
        self.attach();
        Ok(())
    }

    fn remove_from_layer(&mut self, _layer: LayerHandle) {
        self.detach();
    }

    fn set_line_color(&mut self, color: Color) {
        self.line_style.color = color;
        for handle in &self.natives.outline {
            self.facade.set_stroke(*handle, &self.line_style);
        }
    }

    fn set_line_opacity(&mut self, opacity: f64) {
        self.line_style.opacity = opacity;
        for handle in &self.natives.outline {
            self.facade.set_stroke(*handle, &self.line_style);
        }
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_style.width = width;
        for handle in &self.natives.outline {
            self.facade.set_stroke(*handle, &self.line_style);
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
        for handle in self.natives.all() {
            self.facade.set_visible(handle, visible);
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
        let subscription = self.facade.add_listener(shape, event, listener);
        let facade = Arc::clone(&self.facade);
        Ok(Box::new(move || facade.remove_listener(subscription)))
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        let shape = self.natives.interactive().ok_or(DoraError::NotEditing)?;
        self.facade.set_editable(shape, true);
        self.editing = Some((shape, EditMode::Vertices));
        Ok(())
    }

    fn begin_drag(&mut self) -> Result<(), DoraError> {
        let shape = self.natives.interactive().ok_or(DoraError::NotEditing)?;
        self.facade.set_draggable(shape, true);
        self.editing = Some((shape, EditMode::Drag));
        Ok(())
    }

    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError> {
        let (shape, mode) = self.editing.take().ok_or(DoraError::NotEditing)?;
        let coordinates = self.facade.shape_path(shape);
        match mode {
            EditMode::Vertices => self.facade.set_editable(shape, false),
            EditMode::Drag => self.facade.set_draggable(shape, false),
        }
        Ok(coordinates)
    }

    fn cancel_edit(&mut self) {
        if let Some((shape, mode)) = self.editing.take() {
            match mode {
                EditMode::Vertices => self.facade.set_editable(shape, false),
                EditMode::Drag => self.facade.set_draggable(shape, false),
            }
        }
    }

    fn focus_view(&mut self, bounds: &ViewBounds) {
        self.facade.fit_bounds(bounds);
    }

    fn dispose(&mut self) {
        self.cancel_edit();
        self.destroy_natives();
        self.attachment_count = 0;
    }
}

impl GoogleMapsRenderer {
    fn apply_fill(&self) {
        for handle in &self.natives.fill {
            if self.fill_is_lines {
                self.facade.set_stroke(
                    *handle,
                    &StrokeStyle {
                        color: self.fill_style.color,
                        opacity: self.fill_style.opacity,
                        width: 1.0,
                    },
                );
            } else {
                self.facade.set_fill(*handle, &self.fill_style);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct RecordingFacade {
        next_handle: AtomicU64,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingFacade {
        fn mint(&self) -> u64 {
            self.next_handle.fetch_add(1, Ordering::Relaxed) + 1
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    impl GoogleMapsFacade for RecordingFacade {
        fn create_marker(&self, _: &Coordinate, _: Option<&IconDesign>) -> NativeHandle {
            let h = self.mint();
            self.record(format!("create_marker -> {h}"));
            NativeHandle(h)
        }

        fn create_polyline(&self, path: &[Coordinate], _: &StrokeStyle) -> NativeHandle {
            let h = self.mint();
            self.record(format!("create_polyline({}) -> {h}", path.len()));
            NativeHandle(h)
        }

        fn create_polygon(
            &self,
            rings: &[LinearRing],
            _: &StrokeStyle,
            _: &FillStyle,
        ) -> NativeHandle {
            let h = self.mint();
            self.record(format!("create_polygon({}) -> {h}", rings.len()));
            NativeHandle(h)
        }

        fn set_map(&self, shape: NativeHandle, attached: bool) {
            self.record(format!("set_map({}, {attached})", shape.0));
        }

        fn set_stroke(&self, shape: NativeHandle, _: &StrokeStyle) {
            self.record(format!("set_stroke({})", shape.0));
        }

        fn set_fill(&self, shape: NativeHandle, _: &FillStyle) {
            self.record(format!("set_fill({})", shape.0));
        }

        fn set_visible(&self, shape: NativeHandle, visible: bool) {
            self.record(format!("set_visible({}, {visible})", shape.0));
        }

        fn add_listener(
            &self,
            shape: NativeHandle,
            event: GeometryEvent,
            _: EventListener,
        ) -> SubscriptionId {
            let h = self.mint();
            self.record(format!("add_listener({}, {event:?}) -> {h}", shape.0));
            SubscriptionId(h)
        }

        fn remove_listener(&self, subscription: SubscriptionId) {
            self.record(format!("remove_listener({})", subscription.0));
        }

        fn set_editable(&self, shape: NativeHandle, editable: bool) {
            self.record(format!("set_editable({}, {editable})", shape.0));
        }

        fn set_draggable(&self, shape: NativeHandle, draggable: bool) {
            self.record(format!("set_draggable({}, {draggable})", shape.0));
        }

        fn shape_path(&self, _: NativeHandle) -> Vec<Coordinate> {
            vec![
                Coordinate::new(5.0, 5.0),
                Coordinate::new(6.0, 6.0),
                Coordinate::new(7.0, 7.0),
            ]
        }

        fn fit_bounds(&self, _: &ViewBounds) {
            self.record("fit_bounds");
        }

        fn destroy(&self, shape: NativeHandle) {
            self.record(format!("destroy({})", shape.0));
        }
    }

    fn dashed_line_drafts() -> PathDrafts {
        let mut drafts = PathDrafts::default();
        drafts.set_multiline(vec![
            vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 1.0)],
            vec![Coordinate::new(0.0, 2.0), Coordinate::new(0.0, 3.0)],
            vec![Coordinate::new(0.0, 4.0), Coordinate::new(0.0, 5.0)],
        ]);
        drafts
    }

    #[test]
    fn each_dash_becomes_its_own_polyline() {
        let facade = Arc::new(RecordingFacade::default());
        let mut renderer = GoogleMapsRenderer::new(facade.clone());
        let drafts = dashed_line_drafts();

        renderer
            .generate(ShapeDraft::Line { path: &drafts }, &GeometryDesign::default())
            .unwrap();

        assert_eq!(renderer.natives.outline.len(), 3);
        let creations = facade
            .calls()
            .iter()
            .filter(|c| c.starts_with("create_polyline"))
            .count();
        assert_eq!(creations, 3);
    }

    #[test]
    fn map_attachment_is_reference_counted() {
        let facade = Arc::new(RecordingFacade::default());
        let mut renderer = GoogleMapsRenderer::new(facade.clone());
        renderer
            .generate(
                ShapeDraft::Point {
                    position: &Coordinate::new(0.0, 0.0),
                },
                &GeometryDesign::default(),
            )
            .unwrap();

        renderer.add_to_map().unwrap();
        renderer.add_to_layer(LayerHandle(7)).unwrap();
        renderer.remove_from_map();

        // Still referenced by the layer, so no detach yet.
        let calls = facade.calls();
        assert_eq!(
            calls.iter().filter(|c| c.ends_with("true)")).count(),
            1,
            "only the first attachment touches the map: {calls:?}"
        );
        assert!(!calls.iter().any(|c| c.ends_with("false)")));

        renderer.remove_from_layer(LayerHandle(7));
        assert!(facade.calls().last().unwrap().ends_with("false)"));
    }

    #[test]
    fn drag_uses_the_native_draggable_option() {
        let facade = Arc::new(RecordingFacade::default());
        let mut renderer = GoogleMapsRenderer::new(facade.clone());
        renderer
            .generate(
                ShapeDraft::Point {
                    position: &Coordinate::new(0.0, 0.0),
                },
                &GeometryDesign::default(),
            )
            .unwrap();

        renderer.begin_drag().unwrap();
        let coordinates = renderer.finish_edit().unwrap();
        assert_eq!(coordinates.len(), 3);

        let calls = facade.calls();
        assert!(calls.iter().any(|c| c.contains("set_draggable") && c.ends_with("true)")));
        assert!(calls.iter().any(|c| c.contains("set_draggable") && c.ends_with("false)")));
        assert!(!calls.iter().any(|c| c.contains("set_editable")));
    }
}
