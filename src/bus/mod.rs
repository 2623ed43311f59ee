//! Intent Bus
//!
//! Publish/subscribe dispatcher decoupling gesture and mouse producers from
//! navigation consumers. Supports wildcard subscription, pause/resume, and
//! per-subscriber exception isolation: one misbehaving handler never
//! prevents its siblings from running.

mod intent;

pub use intent::{IntentEvent, IntentKind};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

type Handler = Arc<dyn Fn(&IntentEvent) + Send + Sync>;

/// Token returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    /// `None` subscribes to every kind (wildcard).
    kind: Option<IntentKind>,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    paused: bool,
    last: Option<IntentEvent>,
}

/// Session-scoped event dispatcher. Cheap to share via `Arc`.
#[derive(Default)]
pub struct IntentBus {
    inner: Mutex<BusInner>,
}

impl IntentBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one intent kind, or to all kinds with `None`.
    pub fn subscribe(
        &self,
        kind: Option<IntentKind>,
        handler: impl Fn(&IntentEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.subscribers.push(Subscriber {
            id,
            kind,
            handler: Arc::new(handler),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.retain(|s| s.id != id);
    }

    /// Broadcast an event: specific-kind subscribers first, then wildcards,
    /// each group in subscription order. While paused, events are dropped,
    /// not buffered.
    pub fn emit(&self, event: IntentEvent) {
        // Snapshot matching handlers, then release the lock so handlers
        // may re-enter the bus (emit, subscribe) without deadlocking.
        let handlers: Vec<Handler> = {
            let mut inner = self.inner.lock().unwrap();
            if inner.paused {
                return;
            }
            inner.last = Some(event.clone());

            let specific = inner
                .subscribers
                .iter()
                .filter(|s| s.kind == Some(event.kind));
            let wildcard = inner.subscribers.iter().filter(|s| s.kind.is_none());
            specific
                .chain(wildcard)
                .map(|s| Arc::clone(&s.handler))
                .collect()
        };

        for handler in handlers {
            // A panicking subscriber is isolated and logged; emission
            // continues to the remaining subscribers.
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic".to_string());
                tracing::error!(kind = ?event.kind, %message, "intent subscriber panicked");
            }
        }
    }

    /// Stop delivering events. Emits become no-ops until `resume`.
    pub fn pause(&self) {
        self.inner.lock().unwrap().paused = true;
    }

    pub fn resume(&self) {
        self.inner.lock().unwrap().paused = false;
    }

    /// Most recently delivered event, for introspection.
    pub fn last_event(&self) -> Option<IntentEvent> {
        self.inner.lock().unwrap().last.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_handler(counter: Arc<AtomicUsize>) -> impl Fn(&IntentEvent) + Send + Sync {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        let bus = IntentBus::new();
        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));
        assert_eq!(bus.last_event().unwrap().kind, IntentKind::Pan);
    }

    #[test]
    fn test_specific_and_wildcard_delivery() {
        let bus = IntentBus::new();
        let pan_count = Arc::new(AtomicUsize::new(0));
        let all_count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(Some(IntentKind::Pan), counter_handler(pan_count.clone()));
        bus.subscribe(None, counter_handler(all_count.clone()));

        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));
        bus.emit(IntentEvent::new(IntentKind::Zoom, "test"));

        assert_eq!(pan_count.load(Ordering::SeqCst), 1);
        assert_eq!(all_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_paused_bus_drops_events() {
        let bus = IntentBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(None, counter_handler(count.clone()));

        bus.pause();
        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));
        assert_eq!(count.load(Ordering::SeqCst), 0);

        bus.resume();
        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_siblings() {
        let bus = IntentBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        bus.subscribe(Some(IntentKind::Zoom), |_| panic!("boom"));
        bus.subscribe(Some(IntentKind::Zoom), counter_handler(count.clone()));

        bus.emit(IntentEvent::new(IntentKind::Zoom, "test"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = IntentBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let id = bus.subscribe(None, counter_handler(count.clone()));

        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));
        bus.unsubscribe(id);
        bus.emit(IntentEvent::new(IntentKind::Pan, "test"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reentrant_emit_does_not_deadlock() {
        let bus = Arc::new(IntentBus::new());
        let count = Arc::new(AtomicUsize::new(0));
        let inner_bus = Arc::clone(&bus);
        bus.subscribe(Some(IntentKind::Lock), move |_| {
            inner_bus.emit(IntentEvent::new(IntentKind::Pause, "relay"));
        });
        bus.subscribe(Some(IntentKind::Pause), counter_handler(count.clone()));

        bus.emit(IntentEvent::new(IntentKind::Lock, "test"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
