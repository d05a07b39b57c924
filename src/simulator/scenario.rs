//! Named demo scenarios
//!
//! Each scenario bundles the walk parameters for a recognizable market
//! mood. Switching scenarios replaces the configuration only; the price
//! series itself continues uninterrupted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback anchor when no real market data has ever been fetched
const FALLBACK_BASE_PRICE: f64 = 2.50;

/// Walk parameters for the price simulator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Fractional swing around the base price (0.1 = 10% swings)
    pub volatility: f64,
    /// Signed trend coefficient, magnitude <= 1
    pub trend: f64,
    /// Suggested update cadence for chart-driving consumers
    pub update_interval_ms: u64,
    /// Anchor used while no real market data is available
    pub fallback_base_price: f64,
}

/// Named scenario catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    /// Low volatility, slight upward drift
    Stable,
    /// Moderate volatility, no overall trend
    Volatile,
    /// Rising prices with moderate volatility
    Bull,
    /// Falling prices with moderate volatility
    Bear,
    /// High volatility, pure noise
    Extreme,
}

pub const DEFAULT_SCENARIO: Scenario = Scenario::Volatile;

#[derive(Debug, thiserror::Error)]
#[error("unknown scenario '{0}', expected one of stable/volatile/bull/bear/extreme")]
pub struct UnknownScenario(pub String);

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::Stable,
            Scenario::Volatile,
            Scenario::Bull,
            Scenario::Bear,
            Scenario::Extreme,
        ]
    }

    pub fn config(&self) -> ScenarioConfig {
        match self {
            Scenario::Stable => ScenarioConfig {
                volatility: 0.03,
                trend: 0.05,
                update_interval_ms: 5000,
                fallback_base_price: FALLBACK_BASE_PRICE,
            },
            Scenario::Volatile => ScenarioConfig {
                volatility: 0.08,
                trend: 0.0,
                update_interval_ms: 3000,
                fallback_base_price: FALLBACK_BASE_PRICE,
            },
            Scenario::Bull => ScenarioConfig {
                volatility: 0.05,
                trend: 0.2,
                update_interval_ms: 4000,
                fallback_base_price: FALLBACK_BASE_PRICE,
            },
            Scenario::Bear => ScenarioConfig {
                volatility: 0.05,
                trend: -0.2,
                update_interval_ms: 4000,
                fallback_base_price: FALLBACK_BASE_PRICE,
            },
            Scenario::Extreme => ScenarioConfig {
                volatility: 0.12,
                trend: 0.0,
                update_interval_ms: 2000,
                fallback_base_price: FALLBACK_BASE_PRICE,
            },
        }
    }

    pub fn parse(name: &str) -> Result<Self, UnknownScenario> {
        match name.trim().to_lowercase().as_str() {
            "stable" => Ok(Scenario::Stable),
            "volatile" => Ok(Scenario::Volatile),
            "bull" => Ok(Scenario::Bull),
            "bear" => Ok(Scenario::Bear),
            "extreme" => Ok(Scenario::Extreme),
            other => Err(UnknownScenario(other.to_string())),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scenario::Stable => write!(f, "stable"),
            Scenario::Volatile => write!(f, "volatile"),
            Scenario::Bull => write!(f, "bull"),
            Scenario::Bear => write!(f, "bear"),
            Scenario::Extreme => write!(f, "extreme"),
        }
    }
}
