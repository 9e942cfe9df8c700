//! Admin client: typed API calls, the response interceptor, session
//! handling and user notifications.

pub mod api;
pub mod http;
pub mod notify;
pub mod session;
pub mod storage;
pub mod toast;

pub use http::{intercept, ClientError, Credentials, HttpClient};
pub use notify::{EventBus, NotificationBus, Subscription, ToastEvent, Variant, TOAST_EVENT};
pub use session::{RouteDecision, Session, SessionState};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore, TOKEN_KEY};
pub use toast::{Toast, ToastCenter, TOAST_TTL};

/// Default API origin for the client and CLI
pub const DEFAULT_API_URL: &str = "http://localhost:5000";
