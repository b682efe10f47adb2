//! Tokenscope Visualization Server
//!
//! Serve the token views and cascade animation.

use std::env;

use tokenscope_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tokenscope=info,tokenscope_vis=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env()?;

    // First argument overrides the port
    if let Some(port) = env::args().nth(1) {
        config = config.with_port(port.parse()?);
    }

    tracing::info!(
        addr = %config.addr,
        mode = %config.mode,
        brand = %config.brand,
        "starting token visualizer"
    );

    VisServer::new(config).serve().await?;

    Ok(())
}
