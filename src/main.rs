use folio_api::config::AppConfig;
use folio_api::server::{self, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("folio_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Folio API in {:?} mode", config.environment);

    std::fs::create_dir_all(&config.server.uploads_dir)?;
    let port = config.server.port;

    let state = AppState::from_config(config).await?;
    if server::seed_admin(&state).await? {
        tracing::info!("Admin account bootstrapped");
    }

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Folio API listening on http://{}", bind_addr);

    server::serve(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Shutting down");
    })
    .await?;

    Ok(())
}
