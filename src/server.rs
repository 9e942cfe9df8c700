//! Router assembly and process-wide state.

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{self, HeaderName, HeaderValue},
        Method,
    },
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::auth::{hash_password, AuthError, TokenKeys};
use crate::config::{AppConfig, RateLimitRule};
use crate::database::{self, DocumentStore, Repository};
use crate::handlers::{protected, public};
use crate::middleware::{enforce_envelope, rate_limit, require_auth, route_not_found, PanicEnvelope, RateLimiter};
use crate::models::{Blog, Message, Project, User};

const DEVELOPMENT_SECRET: &str = "change_me_secret";

/// Shared by every handler: configuration, storage and signing keys
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub keys: TokenKeys,
    slugs: Arc<tokio::sync::Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn DocumentStore>) -> Result<Self, AuthError> {
        let keys = TokenKeys::from_config(&config.security)?;
        Ok(Self {
            config: Arc::new(config),
            store,
            keys,
            slugs: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Connect the configured store and derive the keys
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        if config.is_production() && config.security.jwt_secret == DEVELOPMENT_SECRET {
            anyhow::bail!("JWT_SECRET must be set in production");
        }

        let store = database::connect(&config.database).await?;
        Ok(Self::new(config, store)?)
    }

    /// Held from reading the taken slugs until the document is written, so
    /// concurrent writers never pick the same slug.
    pub(crate) async fn lock_slugs(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.slugs.lock().await
    }

    pub fn users(&self) -> Repository<User> {
        Repository::new(self.store.clone())
    }

    pub fn projects(&self) -> Repository<Project> {
        Repository::new(self.store.clone())
    }

    pub fn blogs(&self) -> Repository<Blog> {
        Repository::new(self.store.clone())
    }

    pub fn messages(&self) -> Repository<Message> {
        Repository::new(self.store.clone())
    }
}

/// The full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let api = public_routes()
        .merge(login_routes(&config))
        .merge(contact_routes(&config))
        .merge(protected_routes(&state))
        .fallback(route_not_found)
        .layer(from_fn(enforce_envelope));

    let api = if config.api.enable_rate_limiting {
        let limiter = RateLimiter::new(config.api.global_limit.clone());
        api.layer(from_fn_with_state(limiter, rate_limit))
    } else {
        api
    };

    let router = api
        .nest_service("/uploads", ServeDir::new(&config.server.uploads_dir))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(CatchPanicLayer::custom(PanicEnvelope::new(!config.is_production())))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("SAMEORIGIN"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ))
        .layer(cors_layer(&config));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

/// Serve `app(state)` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown)
        .await
}

/// Create the bootstrap admin from configuration unless that email exists.
/// Returns whether a user was created.
pub async fn seed_admin(state: &AppState) -> anyhow::Result<bool> {
    let security = &state.config.security;
    let email = security.admin_email.trim().to_lowercase();

    if email.is_empty() || security.admin_password.is_empty() {
        tracing::warn!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin bootstrap");
        return Ok(false);
    }

    if state.users().exists(|u| u.email.eq_ignore_ascii_case(&email)).await? {
        return Ok(false);
    }

    let password_hash = hash_password(security.admin_password.clone(), security.bcrypt_cost).await?;
    state.users().insert(&User::new(email.clone(), password_hash)).await?;
    tracing::info!("Created admin user {}", email);

    Ok(true)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(public::health))
        .route("/api/projects", get(public::project_list))
        .route("/api/projects/:id", get(public::project_get))
        .route("/api/blogs", get(public::blog_list))
        .route("/api/blogs/:slug", get(public::blog_get))
}

fn login_routes(config: &AppConfig) -> Router<AppState> {
    limited(
        Router::new().route("/api/auth/login", post(public::login)),
        config,
        &config.api.auth_limit,
    )
}

fn contact_routes(config: &AppConfig) -> Router<AppState> {
    limited(
        Router::new().route("/api/messages", post(public::message_create)),
        config,
        &config.api.strict_limit,
    )
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(protected::me))
        .route("/api/projects", post(protected::project_create))
        .route(
            "/api/projects/:id",
            put(protected::project_update).delete(protected::project_delete),
        )
        .route("/api/blogs", post(protected::blog_create))
        .route(
            "/api/blogs/:slug",
            put(protected::blog_update).delete(protected::blog_delete),
        )
        .route("/api/blogs/:slug/publish", patch(protected::blog_publish))
        .route("/api/messages", get(protected::message_list))
        .route(
            "/api/messages/:id",
            patch(protected::message_update).delete(protected::message_delete),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth))
}

fn limited(router: Router<AppState>, config: &AppConfig, rule: &RateLimitRule) -> Router<AppState> {
    if !config.api.enable_rate_limiting {
        return router;
    }
    router.route_layer(from_fn_with_state(RateLimiter::new(rule.clone()), rate_limit))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(config.server.frontend_origin.as_str()))
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
