//! Typed broadcast hooks with scoped subscriptions

use std::sync::{Arc, Mutex, PoisonError, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// Broadcast hook for one kind of event.
///
/// Handlers run synchronously on whichever thread fires the event, in
/// registration order. The registry lock is not held while handlers run, so a
/// handler may subscribe, unsubscribe or call back into the session.
pub struct EventHook<T> {
    name: &'static str,
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> EventHook<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Attach a handler. It stays attached until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, handler: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.handlers.push((id, Arc::new(handler)));
            id
        };
        tracing::trace!(event = self.name, id, "Subscribed");

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            unsubscribe: Some(Box::new(move || {
                if let Some(registry) = registry.upgrade() {
                    let mut registry = registry.lock().unwrap_or_else(PoisonError::into_inner);
                    registry.handlers.retain(|(handler_id, _)| *handler_id != id);
                }
            })),
        }
    }

    pub fn fire(&self, payload: &T) {
        let handlers: Vec<Handler<T>> = {
            let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            registry.handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect()
        };
        tracing::debug!(event = self.name, subscribers = handlers.len(), "Firing event");
        for handler in handlers {
            handler(payload);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handlers
            .len()
    }
}

/// Keeps a handler attached to an [`EventHook`]; unsubscribes on drop.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Keep the handler attached for the lifetime of the hook.
    pub fn detach(mut self) {
        self.unsubscribe = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}
