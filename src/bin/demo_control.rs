//! Demo control CLI
//!
//! Usage: cargo run --bin demo_control -- <command>
//!
//! Spins up an in-process scheduler with the simulator enabled and runs one
//! control command against it. Commands mirror the demo control surface:
//! list, switch <scenario>, price, real, refresh, status, demo.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use h100_oracle::config::AppConfig;
use h100_oracle::control;
use h100_oracle::market::{MarketData, MarketDataClient};
use h100_oracle::publisher::{OraclePublisher, Publish};
use h100_oracle::scheduler::{self, SchedulerHandle};
use h100_oracle::simulator::{PriceSimulator, Scenario};

fn usage() {
    info!("Demo control commands:");
    info!("  demo_control list              - List all scenarios");
    info!("  demo_control switch <scenario> - Switch to scenario");
    info!("  demo_control price             - Get current simulated price");
    info!("  demo_control real              - Get current real market price");
    info!("  demo_control refresh           - Refresh real market price");
    info!("  demo_control status            - Show market status");
    info!("  demo_control demo              - Run demo sequence");
}

fn start_stack(cfg: &AppConfig) -> Result<SchedulerHandle> {
    let market = Arc::new(MarketDataClient::new(&cfg.market)?);
    let publisher: Arc<dyn Publish> = Arc::new(OraclePublisher::new(&cfg.chain, cfg.updater_key()));
    let scenario = Scenario::parse(&cfg.simulator.scenario)?;
    let simulator = Arc::new(PriceSimulator::new(
        scenario.config(),
        market.clone() as Arc<dyn MarketData>,
        Duration::from_secs(cfg.market.refresh_floor_secs),
    ));
    Ok(scheduler::start(
        Duration::from_secs(cfg.scheduler.publish_interval_secs),
        publisher,
        market,
        Some(simulator),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");

    if command == "list" {
        control::list_scenarios();
        return Ok(());
    }

    let cfg = AppConfig::load()?;

    match command {
        "switch" => match args.get(1) {
            Some(name) => {
                let handle = start_stack(&cfg)?;
                control::switch_scenario(&handle, name).await?;
                handle.shutdown();
            }
            None => error!("Missing scenario name. Use \"list\" to see available scenarios."),
        },
        "price" => {
            let handle = start_stack(&cfg)?;
            match control::current_price(&handle).await {
                Some(price) => info!("Current simulated price: ${price:.4}/hour"),
                None => error!("No simulated price available"),
            }
            handle.shutdown();
        }
        "real" => {
            let handle = start_stack(&cfg)?;
            control::refresh(&handle).await;
            match control::real_market_price(&handle).await {
                Some(price) => info!("Current real market price: ${price:.4}/hour"),
                None => error!("No real market price available"),
            }
            handle.shutdown();
        }
        "refresh" => {
            let handle = start_stack(&cfg)?;
            control::refresh(&handle).await;
            handle.shutdown();
        }
        "status" => {
            let handle = start_stack(&cfg)?;
            control::show_status(&handle).await;
            handle.shutdown();
        }
        "demo" => {
            let handle = start_stack(&cfg)?;
            control::run_demo_sequence(&handle).await?;
            handle.shutdown();
        }
        _ => usage(),
    }

    Ok(())
}
