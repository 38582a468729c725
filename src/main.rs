//! Alkkagi Game Server
//!
//! Authoritative server binary: owns every board, accepts shot intents,
//! broadcasts snapshots.

use anyhow::Context;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use alkkagi::network::server::{GameServer, ServerConfig};
use alkkagi::{TICK_RATE, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Alkkagi Server v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);

    let mut config = ServerConfig::default();
    if let Ok(addr) = std::env::var("ALKKAGI_BIND") {
        config.bind_addr = addr
            .parse()
            .context("invalid ALKKAGI_BIND address")?;
    }
    info!("Binding {}", config.bind_addr);

    let server = GameServer::new(config);
    server.run().await.context("server terminated")?;

    Ok(())
}
