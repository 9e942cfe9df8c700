//! Client-side authentication state.
//!
//! `Initializing` until [`Session::mount`] settles into `Anonymous` or
//! `Authenticated`. Login and logout are the only writers of the stored token
//! and the shared `Authorization` header.

use std::sync::{Arc, RwLock};

use super::api;
use super::http::{ClientError, HttpClient};
use super::storage::TokenStore;
use crate::models::Principal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Anonymous,
    Authenticated(Principal),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Outcome of guarding a protected view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Still loading; render a placeholder, never redirect
    Pending,
    Allowed,
    RedirectToLogin,
}

#[derive(Clone)]
pub struct Session {
    http: HttpClient,
    store: Arc<dyn TokenStore>,
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    pub fn new(http: HttpClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            http,
            store,
            state: Arc::new(RwLock::new(SessionState::Initializing)),
        }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn state(&self) -> SessionState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state() == SessionState::Initializing
    }

    pub fn principal(&self) -> Option<Principal> {
        match self.state() {
            SessionState::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    /// Restore a session from the stored token, probing `/api/auth/me`.
    /// A token the server rejects is discarded.
    pub async fn mount(&self) -> SessionState {
        let token = match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Stored token unreadable, starting anonymous: {}", e);
                None
            }
        };

        let Some(token) = token else {
            return self.transition(SessionState::Anonymous);
        };

        self.http.credentials().set_bearer(&token);
        match api::me(&self.http).await {
            Ok(principal) => self.transition(SessionState::Authenticated(principal)),
            Err(e) => {
                tracing::info!("Stored token rejected ({}), clearing it", e);
                self.forget();
                self.transition(SessionState::Anonymous)
            }
        }
    }

    /// On failure nothing changes: no token stored, state untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<Principal, ClientError> {
        let response = api::login(&self.http, email, password).await?;

        self.store.save(&response.token)?;
        self.http.credentials().set_bearer(&response.token);
        self.transition(SessionState::Authenticated(response.principal.clone()));

        Ok(response.principal)
    }

    /// Idempotent and infallible
    pub fn logout(&self) {
        self.forget();
        self.transition(SessionState::Anonymous);
    }

    pub fn guard(&self) -> RouteDecision {
        match self.state() {
            SessionState::Initializing => RouteDecision::Pending,
            SessionState::Authenticated(_) => RouteDecision::Allowed,
            SessionState::Anonymous => RouteDecision::RedirectToLogin,
        }
    }

    fn forget(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("Failed to clear stored token: {}", e);
        }
        self.http.credentials().clear();
    }

    fn transition(&self, next: SessionState) -> SessionState {
        let mut state = match self.state.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *state = next.clone();
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::http::Credentials;
    use crate::client::notify::NotificationBus;
    use crate::client::storage::{MemoryTokenStore, TOKEN_KEY};

    fn offline_session(store: Arc<MemoryTokenStore>) -> Session {
        // Nothing listens on port 9; every request fails at transport level
        let http = HttpClient::new("http://127.0.0.1:9", Credentials::new(), NotificationBus::new()).unwrap();
        Session::new(http, store)
    }

    #[test]
    fn guard_is_pending_while_initializing() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        assert!(session.is_loading());
        assert_eq!(session.guard(), RouteDecision::Pending);
    }

    #[tokio::test]
    async fn mount_without_token_is_anonymous_without_requests() {
        let session = offline_session(Arc::new(MemoryTokenStore::new()));
        assert_eq!(session.mount().await, SessionState::Anonymous);
        assert_eq!(session.guard(), RouteDecision::RedirectToLogin);
        assert!(session.http().credentials().authorization().is_none());
    }

    #[tokio::test]
    async fn mount_with_unverifiable_token_clears_it() {
        let store = Arc::new(MemoryTokenStore::with_token("stale"));
        let session = offline_session(store.clone());

        assert_eq!(session.mount().await, SessionState::Anonymous);
        assert!(!store.contains_key(TOKEN_KEY));
        assert!(session.http().credentials().authorization().is_none());
    }

    #[test]
    fn logout_twice_is_fine() {
        let store = Arc::new(MemoryTokenStore::with_token("T"));
        let session = offline_session(store.clone());
        session.http().credentials().set_bearer("T");

        session.logout();
        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(!store.contains_key(TOKEN_KEY));
        assert!(session.http().credentials().authorization().is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_state_alone() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = offline_session(store.clone());

        assert!(session.login("a@b.com", "pw").await.is_err());
        assert_eq!(session.state(), SessionState::Initializing);
        assert!(!store.contains_key(TOKEN_KEY));
    }
}
