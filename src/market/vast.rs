//! Vast.ai asks search client
//!
//! Queries the public search endpoint and normalizes offers to USD per one
//! full H100 SXM GPU-hour. Offers can span multiple GPUs or fractional
//! slices; normalization divides the total hourly price by the effective
//! unit count `num_gpus * gpu_frac`.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

const TARGET_GPU_NAME: &str = "h100 sxm";

#[derive(Debug, Clone, Deserialize)]
struct VastSearchResponse {
    #[serde(default)]
    offers: Vec<VastOffer>,
}

/// Offer fields we consume; the API returns many more, all ignored
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VastOffer {
    pub id: Option<i64>,
    pub gpu_name: Option<String>,
    /// Total price for the whole offer in USD per hour
    pub dph_total: Option<f64>,
    pub num_gpus: Option<u32>,
    /// Fraction of a physical GPU this offer rents out
    pub gpu_frac: Option<f64>,
}

impl VastOffer {
    fn is_h100_sxm(&self) -> bool {
        self.gpu_name
            .as_deref()
            .map(|n| n.trim().eq_ignore_ascii_case(TARGET_GPU_NAME))
            .unwrap_or(false)
    }

    /// USD per one full GPU-hour, or `None` when the offer has no price or
    /// a non-positive effective unit count
    fn price_per_full_gpu_hour(&self) -> Option<f64> {
        let total = self.dph_total?;
        let units = self.num_gpus.unwrap_or(1) as f64 * self.gpu_frac.unwrap_or(1.0);
        if units <= 0.0 {
            return None;
        }
        Some(total / units)
    }
}

pub struct VastSource {
    client: Client,
    url: String,
}

impl VastSource {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    /// Lowest normalized H100 SXM price currently asked on Vast.ai.
    /// The search body only narrows server-side; filtering is repeated
    /// client-side since the API may ignore unknown fields.
    pub async fn lowest_h100_sxm_price(&self) -> Result<Option<f64>> {
        let response: VastSearchResponse = self
            .client
            .put(&self.url)
            .json(&json!({ "rentable": true }))
            .send()
            .await
            .context("Vast.ai search request failed")?
            .error_for_status()
            .context("Vast.ai search returned an error status")?
            .json()
            .await
            .context("Failed to parse Vast.ai search response")?;

        Ok(lowest_normalized_price(&response.offers))
    }
}

fn lowest_normalized_price(offers: &[VastOffer]) -> Option<f64> {
    offers
        .iter()
        .filter(|o| o.is_h100_sxm())
        .filter_map(|o| o.price_per_full_gpu_hour())
        .fold(None, |best: Option<f64>, price| match best {
            Some(b) if b <= price => Some(b),
            _ => Some(price),
        })
}
