use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use tmarket_analytics::{HttpCountryResolver, MemoryStore};
use tmarket_core::config::{AuthMode, Config};
use tmarket_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured JSON logging. Level controlled via RUST_LOG.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tmarket=info".parse()?),
        )
        .json()
        .init();

    let cfg = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // The bundled in-memory store; a hosted KV deployment swaps this Arc
    // for its own KvStore implementation.
    let store = Arc::new(MemoryStore::new());
    info!("In-memory store active — rollups and raw events are lost on restart");

    let resolver = Arc::new(HttpCountryResolver::new(cfg.geo_timeout())?);

    match &cfg.auth_mode {
        AuthMode::Token(_) => info!("Admin routes require bearer token"),
        AuthMode::None => info!("Auth disabled (TMARKET_AUTH=none) — all routes open"),
    }

    let state = Arc::new(AppState::new(store, resolver, cfg.clone()));
    let app = tmarket_server::app::build_app(Arc::clone(&state));

    let addr = format!("0.0.0.0:{}", cfg.port);
    info!(port = cfg.port, "tmarket analytics listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
