use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::client::{
    Credentials, FileTokenStore, HttpClient, NotificationBus, Session, DEFAULT_API_URL,
};

/// `FOLIO_CONFIG_DIR`, else `~/.config/folio`; created on first use
pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("FOLIO_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("folio")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// `FOLIO_API_URL`, else the local development server
pub fn api_url() -> String {
    std::env::var("FOLIO_API_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// A session backed by `credentials.json` and the process-wide bus
pub fn open_session() -> anyhow::Result<Session> {
    let store = FileTokenStore::in_dir(&get_config_dir()?);
    let http = HttpClient::new(&api_url(), Credentials::new(), NotificationBus::global().clone())?;
    Ok(Session::new(http, Arc::new(store)))
}

/// Mount the stored session and insist on it being authenticated
pub async fn require_session() -> anyhow::Result<Session> {
    let session = open_session()?;
    if session.mount().await.is_authenticated() {
        Ok(session)
    } else {
        anyhow::bail!("Not logged in. Run `folio auth login <email>` first")
    }
}
