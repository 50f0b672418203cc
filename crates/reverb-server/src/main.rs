//! # Reverb Server
//!
//! WebTransport relay for realtime audio, video, and chat fan-out.
//!
//! ## Usage
//!
//! ```bash
//! # Run with a TLS certificate and key
//! reverb certs/cert.pem certs/key.pem
//!
//! # Run with environment variables
//! REVERB_HOST=::1 REVERB_PORT=4433 reverb certs/cert.pem certs/key.pem
//! ```

mod config;
mod handlers;
mod metrics;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wtransport::Identity;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reverb=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let (cert, key) = match (args.next(), args.next()) {
        (Some(cert), Some(key)) => (cert, key),
        _ => anyhow::bail!("usage: reverb <certificate.pem> <private-key.pem>"),
    };

    // Load configuration
    let config = config::Config::load()?;

    tracing::info!("Starting Reverb relay on {}:{}", config.host, config.port);

    // Initialize metrics
    metrics::init_metrics();

    let identity = Identity::load_pemfiles(&cert, &key)
        .await
        .with_context(|| format!("Failed to load TLS identity from {cert} and {key}"))?;

    // Start the server
    handlers::run_server(config, identity).await?;

    Ok(())
}
