//! Mouse event registration for geometries.
//!
//! Listeners can be registered before the native object exists: they are
//! queued and installed when the geometry is first prepared. Registering the
//! same listener twice for the same event is a no-op.

use std::sync::Arc;

use dora_types::Coordinate;

/// Mouse events a geometry can emit.
///
/// This is a closed set; every engine adapter handles all of them, so an
/// unsupported event is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryEvent {
    /// Single click / tap.
    Click,
    /// Double click.
    DblClick,
    /// Right click / context menu.
    ContextMenu,
    /// Pointer entered the shape.
    MouseOver,
    /// Pointer left the shape.
    MouseOut,
}

/// Data passed to geometry event listeners.
#[derive(Debug, Clone)]
pub struct MouseEventArgs {
    /// The event that fired.
    pub event: GeometryEvent,
    /// Geographic position of the pointer, when the engine reports one.
    pub position: Option<Coordinate>,
}

/// A geometry event listener.
///
/// Listeners are compared by identity ([`Arc::ptr_eq`]); registering the same
/// `Arc` twice is suppressed.
pub type EventListener = Arc<dyn Fn(&MouseEventArgs)>;

/// Closure returned by a native event attachment; calling it detaches the
/// listener.
pub type DetachFn = Box<dyn FnOnce()>;

struct BoundListener {
    listener: EventListener,
    detach: Option<DetachFn>,
}

/// Deferred and active listener registries of one geometry.
#[derive(Default)]
pub(crate) struct EventRegistry {
    pending: Vec<(GeometryEvent, EventListener)>,
    active: Vec<(GeometryEvent, BoundListener)>,
}

impl EventRegistry {
    /// Whether this exact listener is already registered for the event.
    pub(crate) fn contains(&self, event: GeometryEvent, listener: &EventListener) -> bool {
        self.pending
            .iter()
            .any(|(e, l)| *e == event && Arc::ptr_eq(l, listener))
            || self
                .active
                .iter()
                .any(|(e, b)| *e == event && Arc::ptr_eq(&b.listener, listener))
    }

    /// Queues a listener to be attached when the geometry is prepared.
    pub(crate) fn queue(&mut self, event: GeometryEvent, listener: EventListener) {
        self.pending.push((event, listener));
    }

    /// Records a natively attached listener together with its detacher.
    pub(crate) fn bind(&mut self, event: GeometryEvent, listener: EventListener, detach: DetachFn) {
        self.active.push((
            event,
            BoundListener {
                listener,
                detach: Some(detach),
            },
        ));
    }

    /// Takes every registered listener (pending and active) for re-attachment
    /// after the native objects were rebuilt. Old detachers are dropped; the
    /// objects they pointed at no longer exist.
    pub(crate) fn drain_for_rebind(&mut self) -> Vec<(GeometryEvent, EventListener)> {
        let mut listeners: Vec<_> = self.pending.drain(..).collect();
        listeners.extend(
            self.active
                .drain(..)
                .map(|(event, bound)| (event, bound.listener)),
        );
        listeners
    }

    /// Removes a specific listener, or all listeners of the event when
    /// `listener` is `None`. Active native attachments are detached.
    pub(crate) fn remove(&mut self, event: GeometryEvent, listener: Option<&EventListener>) {
        let matches = |e: GeometryEvent, l: &EventListener| {
            e == event && listener.is_none_or(|target| Arc::ptr_eq(l, target))
        };

        self.pending.retain(|(e, l)| !matches(*e, l));

        let mut kept = Vec::with_capacity(self.active.len());
        for (e, mut bound) in self.active.drain(..) {
            if matches(e, &bound.listener) {
                if let Some(detach) = bound.detach.take() {
                    detach();
                }
            } else {
                kept.push((e, bound));
            }
        }
        self.active = kept;
    }

    /// Drops all registrations without detaching; used on dispose, when the
    /// native objects are already gone.
    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        for (_, bound) in &mut self.active {
            bound.detach = None;
        }
        self.active.clear();
    }

    /// Number of natively attached listeners, for tests and diagnostics.
    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn listener() -> EventListener {
        Arc::new(|_args: &MouseEventArgs| {})
    }

    #[test]
    fn duplicate_detection_is_by_identity() {
        let mut registry = EventRegistry::default();
        let first = listener();
        let second = listener();

        registry.queue(GeometryEvent::Click, first.clone());
        assert!(registry.contains(GeometryEvent::Click, &first));
        assert!(!registry.contains(GeometryEvent::Click, &second));
        assert!(!registry.contains(GeometryEvent::DblClick, &first));
    }

    #[test]
    fn remove_without_listener_detaches_all_for_event() {
        static DETACHED: AtomicUsize = AtomicUsize::new(0);

        let mut registry = EventRegistry::default();
        registry.bind(
            GeometryEvent::Click,
            listener(),
            Box::new(|| {
                DETACHED.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.bind(
            GeometryEvent::Click,
            listener(),
            Box::new(|| {
                DETACHED.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.bind(
            GeometryEvent::MouseOver,
            listener(),
            Box::new(|| {
                DETACHED.fetch_add(1, Ordering::SeqCst);
            }),
        );

        registry.remove(GeometryEvent::Click, None);
        assert_eq!(DETACHED.load(Ordering::SeqCst), 2);
        assert_eq!(registry.active_count(), 1);
    }
}
