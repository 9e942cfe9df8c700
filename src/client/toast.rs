//! On-screen notification list fed from the bus; entries expire after five seconds.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::notify::{NotificationBus, Subscription, ToastEvent, Variant, TOAST_EVENT};

/// How long a notification stays visible unless dismissed
pub const TOAST_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub message: String,
    pub variant: Variant,
}

/// The visible notification list. Entries expire on their own after
/// [`TOAST_TTL`]; expiry of an already-dismissed entry does nothing.
#[derive(Debug, Clone)]
pub struct ToastCenter {
    toasts: Arc<Mutex<Vec<Toast>>>,
    ttl: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastCenter {
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    /// Add a notification and schedule its removal. Returns its id.
    pub fn show(&self, message: impl Into<String>, variant: Variant) -> String {
        let toast = Toast {
            id: uuid::Uuid::new_v4().simple().to_string(),
            message: message.into(),
            variant,
        };
        let id = toast.id.clone();
        self.lock().push(toast);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let center = self.clone();
                let expiring = id.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(center.ttl).await;
                    center.remove(&expiring);
                });
            }
            Err(_) => tracing::warn!("No async runtime; notification {} will not expire", id),
        }
        id
    }

    /// Dismiss a notification; `false` if it was already gone
    pub fn remove(&self, id: &str) -> bool {
        let mut toasts = self.lock();
        let before = toasts.len();
        toasts.retain(|t| t.id != id);
        toasts.len() != before
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().clone()
    }

    /// Mirror every `toast` event published on `bus`
    pub fn attach(&self, bus: &NotificationBus) -> Subscription<ToastEvent> {
        let center = self.clone();
        bus.subscribe(TOAST_EVENT, move |event: &ToastEvent| {
            center.show(event.message.clone(), event.variant);
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        match self.toasts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
