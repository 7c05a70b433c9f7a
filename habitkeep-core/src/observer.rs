//! Change notification bus
//!
//! After every committed mutation the store fans out the fresh, full snapshot
//! of each affected entity type to its registered observers. Subscriptions
//! are non-owning: the bus holds `Weak` handles, so an observer's lifetime is
//! managed entirely by its caller and dropping it is always safe, including
//! mid-delivery.
//!
//! Delivery is synchronous with respect to the triggering write and happens
//! after the commit, outside the store's connection lock. Observers must only
//! read; calling back into a write path from inside a notification is
//! undefined by contract.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, Weak};

/// Receives the full snapshot of an entity type after each committed change.
pub trait Observer<T>: Send + Sync {
    fn store_did_update(&self, snapshot: &[T]);
}

/// Handle identifying a single subscription on a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fan-out point for one entity type.
pub struct ObserverBus<T> {
    next_id: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Weak<dyn Observer<T>>)>>,
}

impl<T> ObserverBus<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer. The bus keeps only a weak handle; the caller
    /// retains ownership and may drop the observer at any time.
    pub fn subscribe(&self, observer: Weak<dyn Observer<T>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().unwrap().push((id, observer));
        id
    }

    /// Remove a subscription. Unknown ids are ignored, so unsubscribing
    /// twice is harmless.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.observers.lock().unwrap().retain(|(sid, _)| *sid != id);
    }

    /// Deliver `snapshot` to every live observer.
    ///
    /// Dead weak handles are pruned first. Observers are upgraded under the
    /// lock but invoked outside it, so an observer may subscribe or
    /// unsubscribe during delivery without deadlocking; such changes take
    /// effect from the next notification on.
    pub fn notify(&self, snapshot: &[T]) {
        let live: Vec<_> = {
            let mut observers = self.observers.lock().unwrap();
            let before = observers.len();
            observers.retain(|(_, weak)| weak.strong_count() > 0);
            if observers.len() < before {
                tracing::debug!(pruned = before - observers.len(), "Pruned dead observers");
            }
            observers
                .iter()
                .filter_map(|(_, weak)| weak.upgrade())
                .collect()
        };

        for observer in live {
            observer.store_did_update(snapshot);
        }
    }

    /// Number of currently registered subscriptions (including not-yet-pruned
    /// dead ones).
    pub fn len(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for ObserverBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Recorder {
        seen: Mutex<Vec<Vec<u32>>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn snapshots(&self) -> Vec<Vec<u32>> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Observer<u32> for Recorder {
        fn store_did_update(&self, snapshot: &[u32]) {
            self.seen.lock().unwrap().push(snapshot.to_vec());
        }
    }

    fn weak(recorder: &Arc<Recorder>) -> Weak<dyn Observer<u32>> {
        let strong: Arc<dyn Observer<u32>> = recorder.clone();
        Arc::downgrade(&strong)
    }

    #[test]
    fn test_delivers_snapshot_to_all_observers() {
        let bus = ObserverBus::new();
        let a = Recorder::new();
        let b = Recorder::new();
        bus.subscribe(weak(&a));
        bus.subscribe(weak(&b));

        bus.notify(&[1, 2, 3]);

        assert_eq!(a.snapshots(), vec![vec![1, 2, 3]]);
        assert_eq!(b.snapshots(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_unsubscribed_observer_not_notified() {
        let bus = ObserverBus::new();
        let a = Recorder::new();
        let id = bus.subscribe(weak(&a));
        bus.notify(&[1]);

        bus.unsubscribe(id);
        bus.notify(&[2]);

        assert_eq!(a.snapshots(), vec![vec![1]]);
        // Unknown/stale id is a no-op
        bus.unsubscribe(id);
    }

    #[test]
    fn test_dropped_observer_is_pruned() {
        let bus = ObserverBus::new();
        let a = Recorder::new();
        bus.subscribe(weak(&a));
        drop(a);

        bus.notify(&[1]);
        assert!(bus.is_empty());
    }

    #[test]
    fn test_no_coalescing() {
        let bus = ObserverBus::new();
        let a = Recorder::new();
        bus.subscribe(weak(&a));

        bus.notify(&[1]);
        bus.notify(&[1, 2]);
        bus.notify(&[1, 2, 3]);

        assert_eq!(a.snapshots().len(), 3);
    }
}
