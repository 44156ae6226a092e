// Holonet - server binary
// Serves the server-rendered page backed by the external GraphQL service
// Run with: cargo run --bin server

//! # Holonet Server Binary
//!
//! Starts the HTTP host that renders the demo page on the server. Each
//! incoming request gets its own GraphQL client, prefetches page data,
//! resolves the component tree to a fixed point, and ships the markup with
//! the cache state embedded for the browser bootstrap.
//!
//! Once running:
//! - http://localhost:3000 serves the rendered page
//! - http://localhost:3000/health answers liveness probes

use dotenv::dotenv;
use holonet::{AppConfig, SsrServerBuilder};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file; optional in production
    // where the deployment system sets them
    if let Err(e) = dotenv() {
        eprintln!("Warning: Could not load .env file: {}", e);
    }

    // Structured logging; RUST_LOG controls verbosity
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Holonet Server...");
    info!("=============================");

    let config = AppConfig::load()?;
    info!("Server: {}:{}", config.server.host, config.server.port);
    info!("GraphQL service: {}", config.graphql.endpoint);

    SsrServerBuilder::new()
        .with_host(&config.server.host)
        .with_port(config.server.port)
        .with_cors(config.server.cors_enabled)
        .with_client_config(config.client_config()?)
        .build_and_run()
        .await?;

    Ok(())
}
