use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_origin: String,
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string; the in-memory store is used when unset
    pub url: Option<String>,
    pub max_connections: u32,
}

/// Fixed-window limit applied to one group of routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitRule {
    pub max_requests: u32,
    pub window_secs: u64,
    pub message: String,
}

impl RateLimitRule {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_rate_limiting: bool,
    pub global_limit: RateLimitRule,
    pub auth_limit: RateLimitRule,
    pub strict_limit: RateLimitRule,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub bcrypt_cost: u32,
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("FRONTEND_ORIGIN") {
            self.server.frontend_origin = v;
        }
        if let Ok(v) = env::var("UPLOADS_DIR") {
            self.server.uploads_dir = PathBuf::from(v);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_RATE_LIMITING") {
            self.api.enable_rate_limiting = v.parse().unwrap_or(self.api.enable_rate_limiting);
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.security.admin_email = v;
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = v;
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 5000,
                frontend_origin: "http://localhost:5173".to_string(),
                uploads_dir: PathBuf::from("uploads"),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
            },
            api: ApiConfig {
                enable_rate_limiting: false,
                global_limit: global_limit(),
                auth_limit: auth_limit(),
                strict_limit: strict_limit(),
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                jwt_secret: "change_me_secret".to_string(),
                jwt_expiry_hours: 24 * 30,
                bcrypt_cost: 10,
                admin_email: "admin@example.com".to_string(),
                admin_password: "change_me".to_string(),
            },
        }
    }

    pub fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 10;
        config.api.enable_rate_limiting = true;
        config.api.max_request_size_bytes = 5 * 1024 * 1024; // 5MB
        config.security.cors_origins = vec![config.server.frontend_origin.clone()];
        config.security.jwt_expiry_hours = 24 * 7;
        config
    }

    pub fn production() -> Self {
        let mut config = Self::staging();
        config.environment = Environment::Production;
        config.database.max_connections = 20;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 2 * 1024 * 1024; // 2MB
        config.security.bcrypt_cost = 12;
        config
    }
}

fn global_limit() -> RateLimitRule {
    RateLimitRule {
        max_requests: 100,
        window_secs: 15 * 60,
        message: "Too many requests from this IP, please try again after 15 minutes".to_string(),
    }
}

fn auth_limit() -> RateLimitRule {
    RateLimitRule {
        max_requests: 100,
        window_secs: 15 * 60,
        message: "Too many login attempts, please try again after 15 minutes".to_string(),
    }
}

fn strict_limit() -> RateLimitRule {
    RateLimitRule {
        max_requests: 5,
        window_secs: 60 * 60,
        message: "Too many submissions from this IP, please avoid spamming and try again in an hour"
            .to_string(),
    }
}
