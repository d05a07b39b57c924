//! Oracle publisher
//!
//! Converts a USD GPU-hour price to the contract's 1e18 fixed-point wire
//! format and submits a signed `updatePrice` transaction. Submission
//! failures surface to the caller; there is no local retry, the next
//! scheduled cycle simply publishes a fresh value.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use ethers::contract::abigen;
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use std::sync::Arc;

use crate::config::{ChainConfig, UPDATER_KEY_ENV};
use crate::types::{to_fixed_point, PriceSource};

abigen!(
    H100OracleContract,
    r#"[
        function updatePrice(uint256 _price, uint256 _ts, uint8 _source)
    ]"#
);

/// Write seam for the scheduler; tests substitute a recording impl
#[async_trait]
pub trait Publish: Send + Sync {
    async fn publish(&self, price: f64, source: PriceSource) -> Result<()>;
}

pub struct OraclePublisher {
    rpc_url: String,
    oracle_address: String,
    chain_id: u64,
    updater_key: Option<String>,
}

impl OraclePublisher {
    pub fn new(chain: &ChainConfig, updater_key: Option<String>) -> Self {
        Self {
            rpc_url: chain.rpc_url.clone(),
            oracle_address: chain.oracle_address.trim().to_string(),
            chain_id: chain.chain_id,
            updater_key,
        }
    }

    fn is_configured(&self) -> bool {
        !self.oracle_address.is_empty() && self.updater_key.is_some()
    }
}

#[async_trait]
impl Publish for OraclePublisher {
    /// Sign and submit one `updatePrice` call. Missing configuration is a
    /// warning-and-skip, repeated every cycle so operators see it in logs
    /// until fixed; submission errors propagate to the caller.
    async fn publish(&self, price: f64, source: PriceSource) -> Result<()> {
        if !self.is_configured() {
            tracing::warn!(
                "Oracle publish skipped: set chain.oracle_address and {}",
                UPDATER_KEY_ENV
            );
            return Ok(());
        }

        let address: Address = self
            .oracle_address
            .parse()
            .with_context(|| format!("Invalid oracle address '{}'", self.oracle_address))?;
        let key = self.updater_key.as_deref().unwrap_or_default();
        let wallet: LocalWallet = key
            .parse()
            .with_context(|| format!("Invalid {} for oracle publish", UPDATER_KEY_ENV))?;
        let provider = Provider::<Http>::try_from(self.rpc_url.clone())
            .with_context(|| format!("Invalid chain.rpc_url '{}'", self.rpc_url))?;
        let signer = wallet.with_chain_id(self.chain_id);
        let client = Arc::new(SignerMiddleware::new(provider, signer));

        let price_fixed = to_fixed_point(price);
        let now_sec = Utc::now().timestamp();
        let contract = H100OracleContract::new(address, client);

        let call = contract.update_price(price_fixed, (now_sec as u64).into(), source.as_u8());
        let pending = call
            .send()
            .await
            .context("Failed to submit updatePrice transaction")?;
        let tx_hash = pending.tx_hash();
        pending
            .await
            .context("updatePrice transaction dropped before confirmation")?;

        tracing::info!(
            price = %format!("${price:.4}"),
            fixed = %price_fixed,
            ts = now_sec,
            source = %source,
            tx_hash = %format!("{tx_hash:#x}"),
            "Published price to oracle"
        );
        Ok(())
    }
}
