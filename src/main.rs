use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use ghl_podium_relay::{api, AppState, Config, SharedState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghl_podium_relay=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("ghl-podium-relay v{}", env!("CARGO_PKG_VERSION"));
    info!("Token file: {}", config.token_file.display());
    if config.ghl_access_token.is_some() {
        info!("GHL_ACCESS_TOKEN set, HighLevel token refresh is bypassed");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state: SharedState = Arc::new(AppState::new(config));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
