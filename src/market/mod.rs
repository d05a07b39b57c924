//! Market data module - H100 spot quote collection
//!
//! Fetches normalized GPU-hour prices from Vast.ai and Akash and reduces
//! them to a single representative market value. Each source is best-effort:
//! a failed or empty fetch yields no quote, never an error.

mod akash;
mod vast;

pub use akash::AkashSource;
pub use vast::VastSource;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::MarketConfig;
use crate::types::{reduce_quotes, Quote, QuoteSource};

/// Seam between the simulator and live market data. Production code wraps
/// `MarketDataClient`; tests inject deterministic feeds.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current reduced market price, or `None` when no source delivered
    async fn market_price(&self) -> Option<f64>;
}

/// HTTP client for both quote sources
pub struct MarketDataClient {
    vast: VastSource,
    akash: AkashSource,
}

impl MarketDataClient {
    pub fn new(cfg: &MarketConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            vast: VastSource::new(client.clone(), cfg.vast_url.clone()),
            akash: AkashSource::new(client, cfg.akash_url.clone()),
        })
    }

    /// Fetch quotes from both sources concurrently. Each branch resolves to
    /// `Option<Quote>`; errors are downgraded to "no quote from this source"
    /// so callers always see 0, 1, or 2 quotes.
    pub async fn fetch_quotes(&self) -> Vec<Quote> {
        let (vast, akash) = tokio::join!(
            fetch_one(QuoteSource::Vast, self.vast.lowest_h100_sxm_price()),
            fetch_one(QuoteSource::Akash, self.akash.h100_sxm_min_price()),
        );

        vast.into_iter().chain(akash).collect()
    }
}

async fn fetch_one(
    source: QuoteSource,
    fut: impl std::future::Future<Output = Result<Option<f64>>>,
) -> Option<Quote> {
    match fut.await {
        Ok(Some(price)) => Some(Quote {
            source,
            usd_per_gpu_hour: price,
        }),
        Ok(None) => {
            tracing::warn!(source = %source, "No matching H100 offers from source");
            None
        }
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "Quote fetch failed");
            None
        }
    }
}

#[async_trait]
impl MarketData for MarketDataClient {
    async fn market_price(&self) -> Option<f64> {
        let quotes = self.fetch_quotes().await;
        let median = reduce_quotes(&quotes);

        let by_source = |s: QuoteSource| {
            quotes
                .iter()
                .find(|q| q.source == s)
                .map(|q| format!("${:.4}", q.usd_per_gpu_hour))
                .unwrap_or_else(|| "N/A".to_string())
        };
        match median {
            Some(m) => tracing::info!(
                vast = %by_source(QuoteSource::Vast),
                akash = %by_source(QuoteSource::Akash),
                median = %format!("${m:.4}"),
                "Real market prices"
            ),
            None => tracing::warn!("No real market prices available"),
        }

        median
    }
}
