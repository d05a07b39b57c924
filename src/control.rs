//! Demo control surface
//!
//! Operator commands over a running scheduler handle: scenario switching,
//! price reads, market refresh and a scripted demo sequence. All output is
//! emitted through tracing so it lands in the same stream as the service
//! logs.

use anyhow::Result;
use std::time::Duration;

use crate::scheduler::SchedulerHandle;
use crate::simulator::Scenario;

/// Dwell time per scenario during the demo sequence
const DEMO_STEP_DWELL: Duration = Duration::from_secs(10);

/// List all available scenarios with their headline parameters
pub fn list_scenarios() {
    tracing::info!("Available demo scenarios:");
    for scenario in Scenario::all() {
        let cfg = scenario.config();
        tracing::info!(
            "  {}: {:.0}% volatility, {}ms updates",
            scenario,
            cfg.volatility * 100.0,
            cfg.update_interval_ms
        );
    }
}

/// Switch the running simulator to a named scenario
pub async fn switch_scenario(handle: &SchedulerHandle, name: &str) -> Result<()> {
    let scenario = Scenario::parse(name)?;
    handle.set_scenario(scenario).await;
    tracing::info!(config = ?scenario.config(), "Scenario config");
    Ok(())
}

/// Current simulated price (advances the walk one step)
pub async fn current_price(handle: &SchedulerHandle) -> Option<f64> {
    handle.simulated_price().await
}

/// Last cached real market price
pub async fn real_market_price(handle: &SchedulerHandle) -> Option<f64> {
    handle.real_market_price().await
}

/// Refresh the real market anchor immediately
pub async fn refresh(handle: &SchedulerHandle) {
    handle.refresh_market_price().await;
    tracing::info!("Real market price refreshed");
}

/// Log simulated price, real anchor and their divergence
pub async fn show_status(handle: &SchedulerHandle) {
    let simulated = handle.simulated_price().await;
    let real = handle.real_market_price().await;

    tracing::info!("Current market status:");
    if let Some(price) = simulated {
        tracing::info!("  Simulated price: ${price:.4}/hour");
    }
    match real {
        Some(real) => {
            tracing::info!("  Real market price: ${real:.4}/hour");
            if let Some(sim) = simulated {
                let diff_pct = (sim - real) / real * 100.0;
                tracing::info!("  Difference: {diff_pct:.2}%");
            }
        }
        None => tracing::info!("  Real market price: not available (using fallback)"),
    }
}

/// Cycle through every scenario with a dwell between switches, so watchers
/// see each market mood in turn
pub async fn run_demo_sequence(handle: &SchedulerHandle) -> Result<()> {
    tracing::info!("Starting demo sequence");
    for scenario in Scenario::all() {
        tracing::info!(scenario = %scenario, "Switching scenario");
        handle.set_scenario(*scenario).await;
        tokio::time::sleep(DEMO_STEP_DWELL).await;
    }
    tracing::info!("Demo sequence completed");
    Ok(())
}
