//! H100 Oracle service entrypoint
//!
//! Wires the market data client, price simulator and publisher together
//! and runs the publish scheduler until ctrl-c.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use h100_oracle::config::AppConfig;
use h100_oracle::market::MarketDataClient;
use h100_oracle::publisher::{OraclePublisher, Publish};
use h100_oracle::scheduler;
use h100_oracle::simulator::{PriceSimulator, Scenario};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load()?;
    cfg.validate_env()?;
    info!("Starting H100 oracle price scheduler ({})", cfg.digest());
    if !cfg.can_publish() {
        warn!("Publishing disabled: oracle address or updater key unset; cycles will skip writes");
    }

    let market = Arc::new(MarketDataClient::new(&cfg.market)?);
    let publisher: Arc<dyn Publish> = Arc::new(OraclePublisher::new(&cfg.chain, cfg.updater_key()));

    let simulator = if cfg.scheduler.simulator_enabled {
        let scenario = Scenario::parse(&cfg.simulator.scenario)?;
        info!(scenario = %scenario, "Price simulator enabled");
        Some(Arc::new(PriceSimulator::new(
            scenario.config(),
            market.clone() as Arc<dyn h100_oracle::market::MarketData>,
            Duration::from_secs(cfg.market.refresh_floor_secs),
        )))
    } else {
        info!("Price simulator disabled; publishing live market medians");
        None
    };

    let handle = scheduler::start(
        Duration::from_secs(cfg.scheduler.publish_interval_secs),
        publisher,
        market,
        simulator,
    );
    info!("Price scheduler started successfully");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    handle.shutdown();
    Ok(())
}
