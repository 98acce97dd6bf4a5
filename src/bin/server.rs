//! agentsphere HTTP server binary.
//!
//! # Environment Variables
//!
//! - `PORT` - HTTP port (default: 8080)
//! - `OPENROUTER_API_KEY` - enables live generation; without it every
//!   reaction comes from the local fallback
//! - `OPENROUTER_BASE_URL`, `AGENTSPHERE_MODEL`, `AGENTSPHERE_TIMEOUT_SECS`
//! - `AGENTSPHERE_BATCH_SIZE` (default 5), `AGENTSPHERE_BATCH_DELAY_MS` (default 1000)
//! - `AGENTSPHERE_SEED` - fixed RNG seed
//! - `AGENTSPHERE_PERSONAS` - JSON persona catalog replacing the built-in one
//! - `RUST_LOG` - Tracing filter (default: "info,agentsphere=debug")
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! ```

use agentsphere::server::{app_router, AppState};
use agentsphere::{SimulationConfig, SimulationService};
use anyhow::Context;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,agentsphere=debug".into()),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let bind_addr = format!("0.0.0.0:{}", port);

    let config = SimulationConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        batch_size = config.batch_size,
        batch_delay_ms = config.batch_delay_ms,
        seeded = config.seed.is_some(),
        "configuration loaded"
    );
    let service = SimulationService::from_config(config).context("failed to build service")?;
    let app = app_router(AppState::new(service));

    tracing::info!("agentsphere server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health     - liveness probe");
    tracing::info!("  GET  /agents     - persona catalog");
    tracing::info!("  POST /simulate   - streamed simulation");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
