//! Configuration management for the oracle service
//!
//! Loads from optional config files + environment variables via .env.
//! The updater private key is read from the environment only and is never
//! part of the file-backed configuration.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Environment variable holding the oracle updater's signing key
pub const UPDATER_KEY_ENV: &str = "ORACLE_UPDATER_PRIVATE_KEY";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub scheduler: SchedulerConfig,
    pub market: MarketConfig,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// JSON-RPC endpoint for the chain carrying the oracle contract
    pub rpc_url: String,
    /// Deployed H100Oracle contract address (empty disables publishing)
    pub oracle_address: String,
    /// Chain ID for transaction signing
    pub chain_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Publish cadence in seconds
    pub publish_interval_secs: u64,
    /// Feed the publisher from the price simulator instead of raw quotes
    pub simulator_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Vast.ai asks search endpoint
    pub vast_url: String,
    /// Akash GPU price stats endpoint
    pub akash_url: String,
    /// Per-call timeout for quote fetches in seconds
    pub fetch_timeout_secs: u64,
    /// Minimum interval between market refreshes in seconds
    pub refresh_floor_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Named scenario to start from (stable/volatile/bull/bear/extreme)
    pub scenario: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            // Chain defaults (local devnet)
            .set_default("chain.rpc_url", "http://localhost:8545")?
            .set_default("chain.oracle_address", "")?
            .set_default("chain.chain_id", 31337)?
            // Scheduler defaults
            .set_default("scheduler.publish_interval_secs", 30)?
            .set_default("scheduler.simulator_enabled", true)?
            // Market data defaults
            .set_default("market.vast_url", "https://console.vast.ai/api/v0/search/asks/")?
            .set_default(
                "market.akash_url",
                "https://console-api.akash.network/v1/gpu-prices",
            )?
            .set_default("market.fetch_timeout_secs", 15)?
            .set_default("market.refresh_floor_secs", 300)?
            // Simulator defaults
            .set_default("simulator.scenario", "volatile")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (H100_ORACLE_*)
            .add_source(Environment::with_prefix("H100_ORACLE").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        Ok(app_config)
    }

    /// Updater signing key from the environment, if set and non-empty
    pub fn updater_key(&self) -> Option<String> {
        std::env::var(UPDATER_KEY_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// True when both the contract address and the signing key are present.
    /// Publishing is skipped (with a per-cycle warning) otherwise.
    pub fn can_publish(&self) -> bool {
        !self.chain.oracle_address.trim().is_empty() && self.updater_key().is_some()
    }

    /// Validate the updater key format if one is set
    pub fn validate_env(&self) -> Result<()> {
        let Some(key) = self.updater_key() else {
            return Ok(());
        };
        let hex_part = key.strip_prefix("0x").unwrap_or(&key);
        if hex_part.len() != 64 || hex::decode(hex_part).is_err() {
            bail!(
                "{} must be a 32-byte hex string (64 hex chars, 0x prefix optional)",
                UPDATER_KEY_ENV
            );
        }
        Ok(())
    }

    /// Generate a digest of the config (without secrets) for logging
    pub fn digest(&self) -> String {
        format!(
            "rpc={} oracle={} interval={}s simulator={} scenario={}",
            self.chain.rpc_url,
            if self.chain.oracle_address.trim().is_empty() {
                "<unset>"
            } else {
                &self.chain.oracle_address
            },
            self.scheduler.publish_interval_secs,
            self.scheduler.simulator_enabled,
            self.simulator.scenario,
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}
