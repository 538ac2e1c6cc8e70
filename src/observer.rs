//! Observer fan-out registry
//!
//! Generic multi-subscriber notification used by the bank window for
//! selection and note events. Notification order is unspecified; listeners
//! must not rely on relative firing order. Dispatch snapshots the listener
//! list first, so a listener that subscribes or unsubscribes during a
//! notification only affects subsequent `notify` calls, never the one in
//! progress.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::trace;

type Listener<E> = Arc<dyn Fn(&E) -> Result<()> + Send + Sync>;

/// Handle returned by [`ObserverRegistry::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// Multi-subscriber registry for one event type.
pub struct ObserverRegistry<E> {
    listeners: RwLock<Vec<(SubscriptionId, Listener<E>)>>,
    next_id: AtomicUsize,
}

impl<E> ObserverRegistry<E> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Register a listener and return its subscription handle.
    ///
    /// Each call registers a distinct subscription; a listener is invoked at
    /// most once per event per subscription.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) -> Result<()> + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push((id, Arc::new(listener)));
        trace!("observer subscribed: {:?}", id);
        id
    }

    /// Remove a subscription. Returns false if the id was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write().unwrap();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    /// Notify all currently registered listeners.
    ///
    /// The listener list is snapshotted before dispatch. A listener error
    /// aborts the pass and propagates to the caller; listeners notified
    /// earlier in the pass are not rolled back.
    pub fn notify(&self, event: &E) -> Result<()> {
        let snapshot: Vec<Listener<E>> = self
            .listeners
            .read()
            .unwrap()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in snapshot {
            listener(event)?;
        }
        Ok(())
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.listeners.read().unwrap().len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_notify_reaches_all_listeners() {
        let registry: ObserverRegistry<u32> = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = count.clone();
            registry.subscribe(move |event: &u32| {
                count.fetch_add(*event as usize, Ordering::SeqCst);
                Ok(())
            });
        }

        registry.notify(&2).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let registry: ObserverRegistry<()> = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let count_a = count.clone();
        let id = registry.subscribe(move |_| {
            count_a.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        registry.notify(&()).unwrap();
        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));
        registry.notify(&()).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_during_notify_applies_next_pass() {
        let registry: Arc<ObserverRegistry<()>> = Arc::new(ObserverRegistry::new());
        let count = Arc::new(AtomicUsize::new(0));

        let registry_inner = registry.clone();
        let count_inner = count.clone();
        registry.subscribe(move |_| {
            let count_new = count_inner.clone();
            registry_inner.subscribe(move |_| {
                count_new.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        // First pass: only the original listener runs, the one it adds does not
        registry.notify(&()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Second pass: the listener added during the first pass now fires
        registry.notify(&()).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_error_aborts_pass() {
        let registry: ObserverRegistry<()> = ObserverRegistry::new();
        let reached = Arc::new(AtomicUsize::new(0));

        let reached_a = reached.clone();
        registry.subscribe(move |_| {
            reached_a.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("listener failure"))
        });
        let reached_b = reached.clone();
        registry.subscribe(move |_| {
            reached_b.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = registry.notify(&());
        assert!(result.is_err());
        // Only the failing listener ran; the pass was aborted
        assert_eq!(reached.load(Ordering::SeqCst), 1);
    }
}
