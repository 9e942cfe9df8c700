//! Durable client state. Only one key is ever persisted: the bearer token.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

/// Key under which the bearer token is stored
pub const TOKEN_KEY: &str = "token";

/// File holding the CLI's persisted keys inside the config directory
pub const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Credential storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential file is corrupt: {0}")]
    Format(#[from] serde_json::Error),
}

pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, StorageError>;

    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Removing an absent token is not an error
    fn clear(&self) -> Result<(), StorageError>;
}

/// JSON key/value file; keys other than [`TOKEN_KEY`] are preserved
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `credentials.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIALS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<HashMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, values: &HashMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.read()?.remove(TOKEN_KEY))
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        let mut values = self.read()?;
        values.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write(&values)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut values = self.read()?;
        if values.remove(TOKEN_KEY).is_some() {
            self.write(&values)?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.values().insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values().contains_key(key)
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.values.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.values().get(TOKEN_KEY).cloned())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        self.values().insert(TOKEN_KEY.to_string(), token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.values().remove(TOKEN_KEY);
        Ok(())
    }
}
