//! Explicit subscription registry for sign-in / sign-out notifications.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, Weak},
};

use tracing::{debug, warn};

use crate::domain::AuthState;

type Handler = Arc<dyn Fn(&AuthState) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
    last_published: Option<AuthState>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A handler never runs while the lock is held, so a poisoned lock still holds consistent data.
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Fans auth state changes out to registered handlers.
#[derive(Clone, Default)]
pub struct AuthNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl AuthNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler`; it stays registered until the returned [`Subscription`] is released.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&AuthState) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.push((id, Arc::new(handler)));
        debug!(subscription = id, "auth handler registered");
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers `state` to every handler unless it equals the last published state.
    /// Returns whether a notification was sent.
    pub fn publish(&self, state: &AuthState) -> bool {
        let handlers = {
            let mut registry = lock(&self.registry);
            if registry.last_published.as_ref() == Some(state) {
                return false;
            }
            registry.last_published = Some(state.clone());
            registry
                .handlers
                .iter()
                .map(|(id, handler)| (*id, Arc::clone(handler)))
                .collect::<Vec<_>>()
        };
        for (id, handler) in handlers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(state)));
            if outcome.is_err() {
                warn!(subscription = id, "auth handler panicked; continuing delivery");
            }
        }
        true
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).handlers.len()
    }
}

/// Handle returned by [`AuthNotifier::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a subscription unregisters its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry)
                .handlers
                .retain(|(id, _)| *id != self.id);
            debug!(subscription = self.id, "auth handler released");
        }
    }
}
