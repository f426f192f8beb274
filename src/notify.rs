//! Subscriber registry with disposable handles.
//!
//! Handlers run in registration order on the thread that emits. Dropping the
//! returned [`Subscription`] unregisters the handler.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;

type Handler<E> = Box<dyn FnMut(&E) + Send>;

struct Registry<E> {
    next_id: u64,
    handlers: Vec<(u64, Handler<E>)>,
}

pub struct Subscribers<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    pub fn add(&self, handler: impl FnMut(&E) + Send + 'static) -> Subscription {
        self.register(Box::new(handler))
    }

    /// Register `handler` after first handing it `initial`.
    pub fn add_primed(&self, mut handler: impl FnMut(&E) + Send + 'static, initial: &E) -> Subscription {
        handler(initial);
        self.register(Box::new(handler))
    }

    fn register(&self, handler: Handler<E>) -> Subscription {
        let mut registry = self.inner.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, handler));
        drop(registry);

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().handlers.retain(|(h, _)| *h != id);
                }
            })),
        }
    }

    /// Deliver `event` to every live handler. Handlers must not subscribe or
    /// unsubscribe from inside the call.
    pub fn emit(&self, event: &E) {
        let mut registry = self.inner.lock();
        for (_, handler) in registry.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for a registered handler. Unsubscribes on drop or [`Subscription::cancel`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handlers_run_in_registration_order() {
        let subs: Subscribers<u32> = Subscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let a = seen.clone();
        let b = seen.clone();
        let _first = subs.add(move |e| a.lock().push(("first", *e)));
        let _second = subs.add(move |e| b.lock().push(("second", *e)));

        subs.emit(&7);
        assert_eq!(*seen.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn primed_handler_gets_initial_event_first() {
        let subs: Subscribers<u32> = Subscribers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = subs.add_primed(move |e| sink.lock().push(*e), &0);
        subs.emit(&1);
        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[test]
    fn cancel_unregisters() {
        let subs: Subscribers<u32> = Subscribers::new();
        let sub = subs.add(|_| {});
        assert_eq!(subs.len(), 1);
        sub.cancel();
        assert!(subs.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let subs: Subscribers<u32> = Subscribers::new();
        let sub = subs.add(|_| {});
        drop(subs);
        drop(sub);
    }
}
