#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use folio_api::client::{
    Credentials, HttpClient, MemoryTokenStore, NotificationBus, Session, ToastEvent, TOAST_EVENT,
};
use folio_api::config::AppConfig;
use folio_api::database::MemoryStore;
use folio_api::server::{self, AppState};
use tokio::sync::oneshot;

pub const ADMIN_EMAIL: &str = "admin@folio.test";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// A server on its own port inside the test's runtime, backed by the memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(config()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let state = AppState::new(config, Arc::new(MemoryStore::new()))?;
        server::seed_admin(&state).await?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let (tx, rx) = oneshot::channel::<()>();
        let serving = state.clone();
        tokio::spawn(async move {
            let _ = server::serve(listener, serving, async {
                let _ = rx.await;
            })
            .await;
        });

        let server = Self {
            port,
            base_url,
            state,
            shutdown: Some(tx),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/api/health", self.base_url);
        while Instant::now() < deadline {
            if client.get(&url).send().await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// A client with its own credentials and notification bus
    pub fn client(&self) -> Result<(HttpClient, ToastLog)> {
        let bus = NotificationBus::new();
        let log = ToastLog::attach(&bus);
        let http = HttpClient::new(&self.base_url, Credentials::new(), bus)?;
        Ok((http, log))
    }

    pub fn session(&self, store: Arc<MemoryTokenStore>) -> Result<(Session, ToastLog)> {
        let (http, log) = self.client()?;
        Ok((Session::new(http, store), log))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Records every notification published on a bus
#[derive(Clone, Default)]
pub struct ToastLog {
    events: Arc<Mutex<Vec<ToastEvent>>>,
}

impl ToastLog {
    fn attach(bus: &NotificationBus) -> Self {
        let log = Self::default();
        let sink = log.events.clone();
        // The bus outlives the test; the subscription is never removed
        let _subscription = bus.subscribe(TOAST_EVENT, move |event: &ToastEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        log
    }

    pub fn events(&self) -> Vec<ToastEvent> {
        self.events.lock().unwrap().clone()
    }
}

pub fn config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_rate_limiting = false;
    config.api.enable_request_logging = false;
    config.security.jwt_secret = "integration-secret".to_string();
    config.security.bcrypt_cost = 4;
    config.security.admin_email = ADMIN_EMAIL.to_string();
    config.security.admin_password = ADMIN_PASSWORD.to_string();
    config.server.uploads_dir = std::env::temp_dir().join("folio-test-uploads");
    config
}
