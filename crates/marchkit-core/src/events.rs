//! Change notification bus
//!
//! After a mutating store operation commits, a [`ChangeEvent`] is published
//! to every subscribed listener, synchronously and on the caller's thread.
//! The payload is minimal: entity kind plus affected primary keys.
//! Consumers decide for themselves whether to re-fetch or patch their
//! local state. Listeners for the UI refresh path and the undo/redo
//! history coexist on the same bus.
//!
//! Publication happens strictly after commit; a panicking listener is
//! caught and logged so the remaining listeners still run and the
//! already-committed write is unaffected.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::ids::EntityKind;

/// One committed change, described by kind and affected primary keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    /// Which entity kind changed
    pub kind: EntityKind,

    /// Primary keys of the affected rows, in commit order
    pub affected_ids: Vec<i64>,

    /// Owning page, when every affected row lies on a single page
    /// (coordinate edits, page-creation matrix completion, page cascades)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_id: Option<i64>,
}

impl ChangeEvent {
    /// Build an event with no owning page.
    pub fn new(kind: EntityKind, affected_ids: Vec<i64>) -> Self {
        Self {
            kind,
            affected_ids,
            page_id: None,
        }
    }

    /// Attach the single page all affected rows belong to.
    pub fn with_page(mut self, page_id: i64) -> Self {
        self.page_id = Some(page_id);
        self
    }
}

type Listener = Arc<dyn Fn(&ChangeEvent) + Send + Sync + 'static>;

/// Handle returned by [`ChangeBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

#[derive(Default)]
struct Registry {
    next_token: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Synchronous fan-out of [`ChangeEvent`]s to registered listeners.
///
/// Thread-safe: subscribers may register from any thread while the single
/// writer publishes. Dispatch clones the listener list out of the lock, so
/// a listener may subscribe or unsubscribe from inside its own callback.
#[derive(Default)]
pub struct ChangeBus {
    registry: Mutex<Registry>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays active until unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ChangeEvent) + Send + Sync + 'static,
    {
        let mut registry = self.lock_registry();
        let token = registry.next_token;
        registry.next_token += 1;
        registry.listeners.push((token, Arc::new(listener)));
        Subscription(token)
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut registry = self.lock_registry();
        let before = registry.listeners.len();
        registry.listeners.retain(|(token, _)| *token != subscription.0);
        registry.listeners.len() != before
    }

    /// Number of active listeners
    pub fn listener_count(&self) -> usize {
        self.lock_registry().listeners.len()
    }

    /// Deliver an event to every listener, in subscription order.
    ///
    /// A panic inside one listener is caught and logged; it never
    /// propagates to the publisher or suppresses later listeners.
    pub fn publish(&self, event: &ChangeEvent) {
        let listeners: Vec<(u64, Listener)> = self.lock_registry().listeners.clone();
        for (token, listener) in listeners {
            let outcome = catch_unwind(AssertUnwindSafe(|| listener(event)));
            if outcome.is_err() {
                tracing::error!(
                    token,
                    kind = %event.kind,
                    "change listener panicked; continuing with remaining listeners"
                );
            }
        }
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry> {
        // Listeners never run under this lock, so a poisoned guard is still valid.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn marcher_event(ids: Vec<i64>) -> ChangeEvent {
        ChangeEvent::new(EntityKind::Marcher, ids)
    }

    #[test]
    fn test_subscribe_and_publish() {
        let bus = ChangeBus::new();
        let seen: Arc<Mutex<Vec<ChangeEvent>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        bus.publish(&marcher_event(vec![1]));
        bus.publish(&marcher_event(vec![2]));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].affected_ids, vec![1]);
        assert_eq!(seen[1].affected_ids, vec![2]);
    }

    #[test]
    fn test_multiple_listeners_all_invoked() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            bus.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        bus.publish(&marcher_event(vec![1]));
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let subscription = bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&marcher_event(vec![1]));
        assert!(bus.unsubscribe(subscription));
        assert!(!bus.unsubscribe(subscription));
        bus.publish(&marcher_event(vec![2]));

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let bus = ChangeBus::new();
        let hits = Arc::new(AtomicUsize::new(0));

        bus.subscribe(|_| panic!("listener blew up"));
        let counter = Arc::clone(&hits);
        bus.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(&marcher_event(vec![1]));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // The bus stays usable after a listener panic
        bus.publish(&marcher_event(vec![2]));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_from_inside_listener_does_not_deadlock() {
        let bus = Arc::new(ChangeBus::new());

        let bus_handle = Arc::clone(&bus);
        bus.subscribe(move |_| {
            bus_handle.subscribe(|_| {});
        });

        bus.publish(&marcher_event(vec![1]));
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn test_event_json_shape() {
        let event = ChangeEvent::new(EntityKind::MarcherPage, vec![4, 5]).with_page(2);
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"kind":"marcherPage","affectedIds":[4,5],"pageId":2}"#
        );

        let bare = marcher_event(vec![1]);
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"{"kind":"marcher","affectedIds":[1]}"#
        );
    }
}
