//! Core types used throughout the oracle service
//!
//! Defines quote sources, the on-chain price source enum, and the
//! reductions shared by the publisher and the simulator.

use ethers::types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spot quote providers for H100 rental prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuoteSource {
    Vast,
    Akash,
}

impl QuoteSource {
    /// Label used in logs and API summaries
    pub fn api_label(&self) -> &'static str {
        match self {
            QuoteSource::Vast => "vast",
            QuoteSource::Akash => "akash",
        }
    }
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteSource::Vast => write!(f, "Vast.ai"),
            QuoteSource::Akash => write!(f, "Akash"),
        }
    }
}

/// One externally sourced, normalized price reading.
/// Produced per fetch and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    pub source: QuoteSource,
    /// USD per one full accelerator-hour
    pub usd_per_gpu_hour: f64,
}

/// Mirror of the on-chain `PriceSource` enum
/// (Unknown=0, Vast=1, Akash=2, Combined=3, Manual=4, Simulated=5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    Unknown,
    Vast,
    Akash,
    Combined,
    Manual,
    Simulated,
}

impl PriceSource {
    /// Wire value for the `uint8 _source` contract argument
    pub fn as_u8(&self) -> u8 {
        match self {
            PriceSource::Unknown => 0,
            PriceSource::Vast => 1,
            PriceSource::Akash => 2,
            PriceSource::Combined => 3,
            PriceSource::Manual => 4,
            PriceSource::Simulated => 5,
        }
    }
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSource::Unknown => write!(f, "Unknown"),
            PriceSource::Vast => write!(f, "Vast"),
            PriceSource::Akash => write!(f, "Akash"),
            PriceSource::Combined => write!(f, "Combined"),
            PriceSource::Manual => write!(f, "Manual"),
            PriceSource::Simulated => write!(f, "Simulated"),
        }
    }
}

/// Reduce the available quotes to a single market price: the median of the
/// finite quote prices (mean of the middle two when the count is even).
/// Returns `None` when nothing usable survived the fetch.
pub fn reduce_quotes(quotes: &[Quote]) -> Option<f64> {
    let mut prices: Vec<f64> = quotes
        .iter()
        .map(|q| q.usd_per_gpu_hour)
        .filter(|p| p.is_finite())
        .collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = prices.len();
    let mid = n / 2;
    if n % 2 == 1 {
        Some(prices[mid])
    } else {
        Some((prices[mid - 1] + prices[mid]) / 2.0)
    }
}

/// Convert a USD price to the oracle's 1e18 fixed-point representation,
/// rounding to the nearest integer. Non-finite or negative input maps to
/// zero since the price domain is non-negative.
pub fn to_fixed_point(price: f64) -> U256 {
    if !price.is_finite() || price <= 0.0 {
        return U256::zero();
    }
    U256::from((price * 1e18).round() as u128)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(source: QuoteSource, price: f64) -> Quote {
        Quote {
            source,
            usd_per_gpu_hour: price,
        }
    }

    #[test]
    fn test_reduce_empty_is_none() {
        assert_eq!(reduce_quotes(&[]), None);
    }

    #[test]
    fn test_reduce_singleton_is_identity() {
        let quotes = [quote(QuoteSource::Vast, 2.25)];
        assert_eq!(reduce_quotes(&quotes), Some(2.25));
    }

    #[test]
    fn test_reduce_two_is_mean() {
        let quotes = [
            quote(QuoteSource::Vast, 2.0),
            quote(QuoteSource::Akash, 3.0),
        ];
        assert_eq!(reduce_quotes(&quotes), Some(2.5));
    }

    #[test]
    fn test_reduce_three_is_middle() {
        let quotes = [
            quote(QuoteSource::Vast, 3.1),
            quote(QuoteSource::Akash, 1.9),
            quote(QuoteSource::Vast, 2.4),
        ];
        assert_eq!(reduce_quotes(&quotes), Some(2.4));
    }

    #[test]
    fn test_reduce_ignores_non_finite() {
        let quotes = [
            quote(QuoteSource::Vast, f64::NAN),
            quote(QuoteSource::Akash, 2.0),
        ];
        assert_eq!(reduce_quotes(&quotes), Some(2.0));
    }

    #[test]
    fn test_fixed_point_known_values() {
        assert_eq!(
            to_fixed_point(2.5),
            U256::from(2_500_000_000_000_000_000u128)
        );
        assert_eq!(to_fixed_point(0.0), U256::zero());
        assert_eq!(to_fixed_point(1.0), U256::exp10(18));
    }

    #[test]
    fn test_fixed_point_rounds_to_nearest() {
        // 1.5 units at the smallest scale rounds up, 1.4 rounds down
        assert_eq!(to_fixed_point(1.5e-18), U256::from(2u64));
        assert_eq!(to_fixed_point(1.4e-18), U256::from(1u64));

        // 0.1 + 0.2 lands slightly above 0.3; nearest-integer rounding must
        // not truncate back to exactly 3e17
        let fixed = to_fixed_point(0.1 + 0.2);
        let floor = U256::from(300_000_000_000_000_000u128);
        assert!(fixed > floor);
        assert!(fixed - floor < U256::from(128u64));
    }

    #[test]
    fn test_fixed_point_rejects_invalid_input() {
        assert_eq!(to_fixed_point(-1.0), U256::zero());
        assert_eq!(to_fixed_point(f64::NAN), U256::zero());
        assert_eq!(to_fixed_point(f64::INFINITY), U256::zero());
    }

    #[test]
    fn test_price_source_wire_values() {
        assert_eq!(PriceSource::Unknown.as_u8(), 0);
        assert_eq!(PriceSource::Vast.as_u8(), 1);
        assert_eq!(PriceSource::Akash.as_u8(), 2);
        assert_eq!(PriceSource::Combined.as_u8(), 3);
        assert_eq!(PriceSource::Manual.as_u8(), 4);
        assert_eq!(PriceSource::Simulated.as_u8(), 5);
    }
}
