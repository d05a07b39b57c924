//! Akash console GPU price stats client
//!
//! Akash exposes pre-aggregated per-model price stats, so no offer
//! normalization is needed; the H100 SXM entry's `price.min` is the quote.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct AkashGpuPrices {
    #[serde(default)]
    models: Vec<AkashModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AkashModel {
    pub vendor: Option<String>,
    pub model: Option<String>,
    /// e.g. "SXM5" or "PCIe"
    pub interface: Option<String>,
    pub price: Option<AkashModelPrice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AkashModelPrice {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl AkashModel {
    fn is_h100_sxm(&self) -> bool {
        let vendor_ok = self
            .vendor
            .as_deref()
            .map(|v| v.trim().eq_ignore_ascii_case("nvidia"))
            .unwrap_or(false);
        let model_ok = self
            .model
            .as_deref()
            .map(|m| m.trim().eq_ignore_ascii_case("h100"))
            .unwrap_or(false);
        let interface_ok = self
            .interface
            .as_deref()
            .map(|i| i.trim().eq_ignore_ascii_case("SXM5"))
            .unwrap_or(false);
        vendor_ok && model_ok && interface_ok
    }
}

pub struct AkashSource {
    client: Client,
    url: String,
}

impl AkashSource {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }

    /// Minimum advertised H100 SXM5 price on Akash, in USD per GPU-hour
    pub async fn h100_sxm_min_price(&self) -> Result<Option<f64>> {
        let response: AkashGpuPrices = self
            .client
            .get(&self.url)
            .send()
            .await
            .context("Akash GPU price request failed")?
            .error_for_status()
            .context("Akash GPU price endpoint returned an error status")?
            .json()
            .await
            .context("Failed to parse Akash GPU price response")?;

        Ok(min_h100_sxm_price(&response.models))
    }
}

fn min_h100_sxm_price(models: &[AkashModel]) -> Option<f64> {
    models
        .iter()
        .find(|m| m.is_h100_sxm())
        .and_then(|m| m.price.as_ref())
        .map(|p| p.min)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(vendor: &str, name: &str, iface: &str, min: Option<f64>) -> AkashModel {
        AkashModel {
            vendor: Some(vendor.to_string()),
            model: Some(name.to_string()),
            interface: Some(iface.to_string()),
            price: min.map(|min| AkashModelPrice {
                min,
                max: min * 2.0,
                avg: min * 1.5,
            }),
        }
    }

    #[test]
    fn test_matches_vendor_model_interface_triple() {
        assert!(model("nvidia", "h100", "SXM5", Some(2.0)).is_h100_sxm());
        assert!(model(" NVIDIA ", " H100 ", "sxm5", Some(2.0)).is_h100_sxm());
        assert!(!model("nvidia", "h100", "PCIe", Some(2.0)).is_h100_sxm());
        assert!(!model("amd", "h100", "SXM5", Some(2.0)).is_h100_sxm());
        assert!(!model("nvidia", "a100", "SXM5", Some(2.0)).is_h100_sxm());
    }

    #[test]
    fn test_returns_min_of_matching_model() {
        let models = vec![
            model("nvidia", "a100", "SXM4", Some(1.1)),
            model("nvidia", "h100", "SXM5", Some(2.35)),
            model("nvidia", "h100", "PCIe", Some(1.9)),
        ];
        assert_eq!(min_h100_sxm_price(&models), Some(2.35));
    }

    #[test]
    fn test_missing_model_or_price_yields_none() {
        assert_eq!(min_h100_sxm_price(&[]), None);
        let models = vec![model("nvidia", "h100", "SXM5", None)];
        assert_eq!(min_h100_sxm_price(&models), None);
    }
}
