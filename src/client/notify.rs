//! In-process publish/subscribe used to surface user-facing notifications.
//!
//! Handlers run synchronously on the publishing task, in registration order.
//! A panicking handler is logged and skipped; the remaining handlers still
//! run and `publish` itself never panics.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Event name carrying [`ToastEvent`] payloads
pub const TOAST_EVENT: &str = "toast";

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Registry<P> {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler<P>)>>,
}

fn lock<P>(registry: &Mutex<Registry<P>>) -> MutexGuard<'_, Registry<P>> {
    match registry.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Named-event observer list. Cloning yields another handle to the same
/// list.
pub struct EventBus<P> {
    registry: Arc<Mutex<Registry<P>>>,
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
        }
    }
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: 'static> EventBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                handlers: HashMap::new(),
            })),
        }
    }

    pub fn subscribe<F>(&self, event: &str, handler: F) -> Subscription<P>
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: event.to_string(),
            id,
        }
    }

    /// Deliver `payload` to the current handlers of `event`. Returns how many
    /// handlers completed without panicking.
    pub fn publish(&self, event: &str, payload: &P) -> usize {
        // Snapshot so handlers may subscribe/unsubscribe re-entrantly
        let handlers: Vec<Handler<P>> = match lock(&self.registry).handlers.get(event) {
            Some(entries) => entries.iter().map(|(_, h)| h.clone()).collect(),
            None => return 0,
        };

        let mut delivered = 0;
        for handler in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(()) => delivered += 1,
                Err(_) => tracing::error!("Handler for '{}' panicked; continuing", event),
            }
        }
        delivered
    }

    pub fn handler_count(&self, event: &str) -> usize {
        lock(&self.registry).handlers.get(event).map_or(0, Vec::len)
    }
}

/// Registration handle. Dropping it keeps the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription<P> {
    registry: Weak<Mutex<Registry<P>>>,
    event: String,
    id: u64,
}

impl<P> Subscription<P> {
    /// Remove exactly this handler. A no-op once the bus is gone.
    pub fn unsubscribe(self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let mut registry = lock(&registry);
        if let Some(entries) = registry.handlers.get_mut(&self.event) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                registry.handlers.remove(&self.event);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Success,
    Error,
    Info,
    Warning,
}

/// Payload of the `toast` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastEvent {
    pub message: String,
    pub variant: Variant,
}

pub type NotificationBus = EventBus<ToastEvent>;

static GLOBAL: Lazy<NotificationBus> = Lazy::new(NotificationBus::new);

impl EventBus<ToastEvent> {
    /// Process-wide bus for code that has no injected instance
    pub fn global() -> &'static NotificationBus {
        &GLOBAL
    }

    /// Publish a `toast` event
    pub fn show(&self, message: impl Into<String>, variant: Variant) -> usize {
        self.publish(
            TOAST_EVENT,
            &ToastEvent {
                message: message.into(),
                variant,
            },
        )
    }
}
