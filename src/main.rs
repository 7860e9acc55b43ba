//! taskdeck - HTTP Server Entry Point
//!
//! Starts the HTTP server that exposes the task API.

use taskdeck::{api, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        "Loaded configuration: store={:?}, database={}",
        config.store,
        config.database_path.display()
    );

    // Start HTTP server
    api::serve(config).await
}
