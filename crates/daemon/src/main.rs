//! WishBot - calendar-driven greeting dispatcher
//!
//! Long-running daemon: polls the calendar snapshot on a fixed interval,
//! sends one wish per due event, and shuts down gracefully on interrupt.

mod context;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::context::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging FIRST so we can see .env loading
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file
    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "Loaded .env"),
        Err(e) => warn!(error = %e, "Could not load .env file"),
    }

    let config = wishbot_infra::config::load()?;

    info!("WishBot starting...");
    let mut ctx = AppContext::new(config).await?;
    ctx.start().await?;
    info!("WishBot initialized successfully");

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received; shutting down");

    // Graceful: an in-flight cycle finishes before stop returns.
    ctx.stop().await?;
    info!("WishBot stopped");
    Ok(())
}
