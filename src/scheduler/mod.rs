//! Publish scheduler
//!
//! Drives the publish cycle on a fixed cadence. Every tick spawns a
//! supervised task; a cycle failure is logged and never reaches the
//! interval loop, so one bad cycle cannot stop future ticks. Ticks are not
//! serialized against each other: a slow cycle may overlap the next one,
//! which is harmless because oracle writes are last-value overwrites
//! carrying their own timestamp.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::market::MarketData;
use crate::publisher::Publish;
use crate::simulator::{PriceSimulator, Scenario};
use crate::types::PriceSource;

/// Control handle returned by [`start`]. Owns the loop task and the
/// optional simulator, so scenario controls go through an explicit object
/// instead of shared global state.
pub struct SchedulerHandle {
    simulator: Option<Arc<PriceSimulator>>,
    task: JoinHandle<()>,
}

/// Start the recurring publish loop
pub fn start(
    interval: Duration,
    publisher: Arc<dyn Publish>,
    market: Arc<dyn MarketData>,
    simulator: Option<Arc<PriceSimulator>>,
) -> SchedulerHandle {
    if simulator.is_some() {
        tracing::info!("Realistic simulated price generator enabled");
    }

    let loop_sim = simulator.clone();
    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let publisher = publisher.clone();
            let market = market.clone();
            let simulator = loop_sim.clone();
            tokio::spawn(async move {
                if let Err(e) =
                    run_publish_cycle(publisher.as_ref(), market.as_ref(), simulator.as_deref())
                        .await
                {
                    tracing::error!(error = %format!("{e:#}"), "Publish cycle failed");
                }
            });
        }
    });

    tracing::info!(interval_secs = interval.as_secs(), "Price scheduler started");
    SchedulerHandle { simulator, task }
}

/// One publish cycle: simulated price when a simulator is injected,
/// otherwise the median of live quotes. A cycle with no usable price skips
/// the write entirely rather than publishing a stale or zero value.
pub async fn run_publish_cycle(
    publisher: &dyn Publish,
    market: &dyn MarketData,
    simulator: Option<&PriceSimulator>,
) -> Result<()> {
    match simulator {
        Some(sim) => {
            let price = sim.current_price().await;
            match sim.real_market_price().await {
                Some(real) => tracing::info!(
                    simulated = %format!("${price:.4}"),
                    market = %format!("${real:.4}"),
                    "Using realistic simulated price"
                ),
                None => tracing::info!(
                    simulated = %format!("${price:.4}"),
                    "Using realistic simulated price (fallback mode)"
                ),
            }
            publisher.publish(price, PriceSource::Simulated).await
        }
        None => match market.market_price().await {
            Some(median) => publisher.publish(median, PriceSource::Combined).await,
            None => {
                tracing::warn!("No prices available to publish");
                Ok(())
            }
        },
    }
}

impl SchedulerHandle {
    pub fn is_simulated(&self) -> bool {
        self.simulator.is_some()
    }

    /// Swap the simulator to a named scenario. The price series continues
    /// uninterrupted; only future steps change behavior.
    pub async fn set_scenario(&self, scenario: Scenario) {
        match &self.simulator {
            Some(sim) => {
                sim.update_config(scenario.config()).await;
                tracing::info!(scenario = %scenario, "Demo scenario changed");
            }
            None => tracing::warn!("Scenario switch ignored: simulator not enabled"),
        }
    }

    /// Advance the simulator one step and return the new price
    pub async fn simulated_price(&self) -> Option<f64> {
        match &self.simulator {
            Some(sim) => Some(sim.current_price().await),
            None => None,
        }
    }

    /// Last cached real market anchor, if any
    pub async fn real_market_price(&self) -> Option<f64> {
        match &self.simulator {
            Some(sim) => sim.real_market_price().await,
            None => None,
        }
    }

    /// Force an immediate market refresh, bypassing the refresh floor
    pub async fn refresh_market_price(&self) {
        if let Some(sim) = &self.simulator {
            sim.refresh_market_price().await;
        }
    }

    /// Simulator handle for control surfaces that need direct access
    pub fn simulator(&self) -> Option<&Arc<PriceSimulator>> {
        self.simulator.as_ref()
    }

    /// Stop future ticks. In-flight cycles are not cancelled; they finish
    /// on their own.
    pub fn shutdown(self) {
        self.task.abort();
        tracing::info!("Price scheduler stopped");
    }
}
