//! Recording doubles used by the model-level tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use dora_types::{Coordinate, ViewBounds};

use crate::design::{Color, GeometryDesign};
use crate::engines::{GeometryRenderer, LayerHandle, MapEngine, ShapeDraft};
use crate::error::DoraError;
use crate::geometry::events::{DetachFn, EventListener, GeometryEvent};

pub(crate) type CallLog = Arc<Mutex<Vec<String>>>;

pub(crate) fn count_calls(log: &CallLog, prefix: &str) -> usize {
    log.lock().iter().filter(|c| c.starts_with(prefix)).count()
}

/// An engine whose renderers record every call into a shared log.
pub(crate) struct SpyEngine {
    log: CallLog,
    next_layer: AtomicU64,
}

impl SpyEngine {
    pub(crate) fn create() -> (Arc<dyn MapEngine>, CallLog) {
        let log: CallLog = Arc::default();
        let engine = Arc::new(Self {
            log: Arc::clone(&log),
            next_layer: AtomicU64::new(1),
        });
        (engine, log)
    }
}

impl MapEngine for SpyEngine {
    fn name(&self) -> &'static str {
        "spy"
    }

    fn create_point_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(SpyRenderer::new(Arc::clone(&self.log)))
    }

    fn create_line_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(SpyRenderer::new(Arc::clone(&self.log)))
    }

    fn create_polygon_renderer(&self) -> Box<dyn GeometryRenderer> {
        Box::new(SpyRenderer::new(Arc::clone(&self.log)))
    }

    fn create_layer(&self, name: &str) -> LayerHandle {
        let handle = self.next_layer.fetch_add(1, Ordering::Relaxed);
        self.log.lock().push(format!("create_layer {name}"));
        LayerHandle(handle)
    }

    fn remove_layer(&self, layer: LayerHandle) {
        self.log.lock().push(format!("remove_layer {}", layer.0));
    }
}

pub(crate) struct SpyRenderer {
    log: CallLog,
    generated: bool,
    editing: bool,
}

impl SpyRenderer {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            generated: false,
            editing: false,
        }
    }

    fn record(&self, call: impl Into<String>) {
        self.log.lock().push(call.into());
    }
}

impl GeometryRenderer for SpyRenderer {
    fn engine_name(&self) -> &'static str {
        "spy"
    }

    fn generate(&mut self, draft: ShapeDraft<'_>, _: &GeometryDesign) -> Result<(), DoraError> {
        let kind = match draft {
            ShapeDraft::Point { .. } => "point",
            ShapeDraft::Line { .. } => "line",
            ShapeDraft::Polygon { .. } => "polygon",
            ShapeDraft::Arrow { .. } => "arrow",
        };
        self.record(format!("generate {kind}"));
        self.generated = true;
        Ok(())
    }

    fn is_generated(&self) -> bool {
        self.generated
    }

    fn add_to_map(&mut self) -> Result<(), DoraError> {
        self.record("add_to_map");
        Ok(())
    }

    fn remove_from_map(&mut self) {
        self.record("remove_from_map");
    }

    fn add_to_layer(&mut self, layer: LayerHandle) -> Result<(), DoraError> {
        self.record(format!("add_to_layer {}", layer.0));
        Ok(())
    }

    fn remove_from_layer(&mut self, layer: LayerHandle) {
        self.record(format!("remove_from_layer {}", layer.0));
    }

    fn set_line_color(&mut self, color: Color) {
        self.record(format!("set_line_color {}", color.to_hex()));
    }

    fn set_line_opacity(&mut self, opacity: f64) {
        self.record(format!("set_line_opacity {opacity}"));
    }

    fn set_line_width(&mut self, width: f64) {
        self.record(format!("set_line_width {width}"));
    }

    fn set_fill_color(&mut self, color: Color) {
        self.record(format!("set_fill_color {}", color.to_hex()));
    }

    fn set_fill_opacity(&mut self, opacity: f64) {
        self.record(format!("set_fill_opacity {opacity}"));
    }

    fn set_visibility(&mut self, visible: bool) {
        self.record(format!("set_visibility {visible}"));
    }

    fn attach_event(
        &mut self,
        event: GeometryEvent,
        _: EventListener,
    ) -> Result<DetachFn, DoraError> {
        self.record(format!("attach {event:?}"));
        let log = Arc::clone(&self.log);
        Ok(Box::new(move || {
            log.lock().push(format!("detach {event:?}"));
        }))
    }

    fn begin_edit(&mut self) -> Result<(), DoraError> {
        self.record("begin_edit");
        self.editing = true;
        Ok(())
    }

    fn finish_edit(&mut self) -> Result<Vec<Coordinate>, DoraError> {
        if !self.editing {
            return Err(DoraError::NotEditing);
        }
        self.editing = false;
        self.record("finish_edit");
        Ok(vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(11.0, 11.0),
            Coordinate::new(12.0, 12.0),
        ])
    }

    fn cancel_edit(&mut self) {
        self.editing = false;
        self.record("cancel_edit");
    }

    fn focus_view(&mut self, _: &ViewBounds) {
        self.record("focus_view");
    }

    fn dispose(&mut self) {
        self.record("dispose");
        self.generated = false;
    }
}
