//! Realistic price simulator
//!
//! Evolves a synthetic H100 GPU-hour price series anchored to the live
//! market value: a bounded mean-reverting walk with a configurable trend,
//! uniform volatility noise, a deterministic micro-trend, occasional regime
//! reversals and rare news-style shocks. The simulator is pull-driven: each
//! `current_price()` call is one discrete time step; the publish timer
//! lives in the scheduler.

mod scenario;

pub use scenario::{Scenario, ScenarioConfig, UnknownScenario, DEFAULT_SCENARIO};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::market::MarketData;

/// Price drift per unit trend coefficient, per second
const TREND_RATE_PER_SEC: f64 = 0.001;
/// Amplitude of the deterministic micro-trend, as a fraction of base price
const MICRO_TREND_AMPLITUDE: f64 = 0.0005;
/// Wall-clock divisor for the micro-trend oscillation (ms)
const MICRO_TREND_PERIOD_MS: f64 = 10_000.0;
/// Lower/upper clamp bounds as fractions of the base price
const CLAMP_LOW: f64 = 0.7;
const CLAMP_HIGH: f64 = 1.3;
/// Per-step probability of a trend reversal
const REVERSAL_PROB: f64 = 0.01;
/// Per-step probability of a one-off shock
const SHOCK_PROB: f64 = 0.003;
/// Shock magnitude as a fraction of the base price
const SHOCK_SCALE: f64 = 0.15;

/// Mutable walk state, serialized behind the simulator's mutex since
/// scheduler ticks may overlap and each step is a multi-field
/// read-modify-write.
#[derive(Debug, Clone)]
struct SimulatorState {
    current_price: f64,
    last_update_ms: i64,
    /// Evolving trend coefficient; starts at the scenario's trend and gets
    /// halved/negated on regime reversals
    trend: f64,
    cached_market_price: Option<f64>,
    last_market_refresh_ms: i64,
}

struct Inner {
    config: ScenarioConfig,
    state: SimulatorState,
    rng: StdRng,
}

pub struct PriceSimulator {
    feed: Arc<dyn MarketData>,
    refresh_floor_ms: i64,
    inner: Mutex<Inner>,
}

/// One walk step. `vol_draw` is uniform in [-0.5, 0.5); `shock`, when
/// present, is the pre-scaled one-off offset. The shock lands after the
/// clamp, matching observed market-feed behavior: a news event may push the
/// price outside the band until the next step's clamp pulls it back.
fn advance_price(
    current: f64,
    base: f64,
    trend: f64,
    volatility: f64,
    dt_secs: f64,
    now_ms: i64,
    vol_draw: f64,
    shock: Option<f64>,
) -> f64 {
    let trend_change = trend * base * TREND_RATE_PER_SEC * dt_secs;
    let volatility_change = vol_draw * volatility * base;
    let micro_trend = (now_ms as f64 / MICRO_TREND_PERIOD_MS).sin() * base * MICRO_TREND_AMPLITUDE;

    let new_price = (current + trend_change + volatility_change + micro_trend)
        .clamp(CLAMP_LOW * base, CLAMP_HIGH * base);

    match shock {
        Some(shock) => new_price + shock,
        None => new_price,
    }
}

impl PriceSimulator {
    pub fn new(config: ScenarioConfig, feed: Arc<dyn MarketData>, refresh_floor: Duration) -> Self {
        Self::with_rng(config, feed, refresh_floor, StdRng::from_entropy())
    }

    /// Deterministic variant for tests
    pub fn with_seed(
        config: ScenarioConfig,
        feed: Arc<dyn MarketData>,
        refresh_floor: Duration,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, feed, refresh_floor, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: ScenarioConfig,
        feed: Arc<dyn MarketData>,
        refresh_floor: Duration,
        rng: StdRng,
    ) -> Self {
        let state = SimulatorState {
            current_price: config.fallback_base_price,
            last_update_ms: Utc::now().timestamp_millis(),
            trend: config.trend,
            cached_market_price: None,
            last_market_refresh_ms: 0,
        };
        Self {
            feed,
            refresh_floor_ms: refresh_floor.as_millis() as i64,
            inner: Mutex::new(Inner { config, state, rng }),
        }
    }

    /// Advance the walk one step and return the new price
    pub async fn current_price(&self) -> f64 {
        let mut inner = self.inner.lock().await;
        self.refresh_market_if_due(&mut inner).await;

        let base = inner
            .state
            .cached_market_price
            .unwrap_or(inner.config.fallback_base_price);
        let now = Utc::now().timestamp_millis();
        let dt_secs = (now - inner.state.last_update_ms).max(0) as f64 / 1000.0;

        let vol_draw: f64 = inner.rng.gen_range(-0.5..0.5);
        let reverse = inner.rng.gen_bool(REVERSAL_PROB);
        let shock = if inner.rng.gen_bool(SHOCK_PROB) {
            let draw: f64 = inner.rng.gen_range(-0.5..0.5);
            Some(draw * base * SHOCK_SCALE)
        } else {
            None
        };

        let new_price = advance_price(
            inner.state.current_price,
            base,
            inner.state.trend,
            inner.config.volatility,
            dt_secs,
            now,
            vol_draw,
            shock,
        );

        if reverse {
            inner.state.trend = -inner.state.trend * 0.5;
        }
        inner.state.current_price = new_price;
        inner.state.last_update_ms = now;
        new_price
    }

    /// Last committed price without advancing the walk
    pub async fn last_price(&self) -> f64 {
        self.inner.lock().await.state.current_price
    }

    /// Last cached real market price, no side effects
    pub async fn real_market_price(&self) -> Option<f64> {
        self.inner.lock().await.state.cached_market_price
    }

    /// Swap in a new scenario configuration. The price series continues
    /// uninterrupted: neither `current_price` nor the evolved trend
    /// coefficient is reset; only future steps pick up the new parameters.
    pub async fn update_config(&self, config: ScenarioConfig) {
        let mut inner = self.inner.lock().await;
        inner.config = config;
        tracing::info!(config = ?inner.config, "Simulator config updated");
    }

    /// Current configuration snapshot
    pub async fn config(&self) -> ScenarioConfig {
        self.inner.lock().await.config
    }

    /// Zero the refresh clock so the next step refetches the market price
    /// regardless of the refresh floor
    pub async fn force_refresh(&self) {
        self.inner.lock().await.state.last_market_refresh_ms = 0;
    }

    /// Force an immediate market refresh, bypassing the floor
    pub async fn refresh_market_price(&self) {
        let mut inner = self.inner.lock().await;
        inner.state.last_market_refresh_ms = 0;
        self.refresh_market_if_due(&mut inner).await;
    }

    /// Refetch the market anchor when the refresh floor has elapsed. A
    /// `None` result keeps the previous cached value and leaves the clock
    /// untouched, so the next step retries.
    async fn refresh_market_if_due(&self, inner: &mut Inner) {
        let now = Utc::now().timestamp_millis();
        if now - inner.state.last_market_refresh_ms <= self.refresh_floor_ms {
            return;
        }
        if let Some(price) = self.feed.market_price().await {
            inner.state.cached_market_price = Some(price);
            inner.state.last_market_refresh_ms = now;
            tracing::info!(
                price = %format!("${price:.4}"),
                "Updated real market base price"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Feed stub that replays scripted responses and counts fetches
    struct ScriptedFeed {
        responses: StdMutex<Vec<Option<f64>>>,
        fetches: AtomicUsize,
    }

    impl ScriptedFeed {
        fn new(responses: Vec<Option<f64>>) -> Arc<Self> {
            Arc::new(Self {
                responses: StdMutex::new(responses),
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketData for ScriptedFeed {
        async fn market_price(&self) -> Option<f64> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                responses.remove(0)
            }
        }
    }

    fn quiet_config() -> ScenarioConfig {
        ScenarioConfig {
            volatility: 0.0,
            trend: 0.0,
            update_interval_ms: 1000,
            fallback_base_price: 2.50,
        }
    }

    const FLOOR: Duration = Duration::from_secs(300);

    #[test]
    fn test_step_clamps_regardless_of_volatility() {
        // Worst-case draws against an absurd volatility still land in band
        let base = 2.5;
        for vol_draw in [-0.5, 0.5] {
            let price = advance_price(base, base, 0.0, 50.0, 1.0, 0, vol_draw, None);
            assert!(price >= CLAMP_LOW * base && price <= CLAMP_HIGH * base);
        }
        // Runaway trend is clamped too
        let price = advance_price(base, base, 1.0, 0.0, 10_000.0, 0, 0.0, None);
        assert_eq!(price, CLAMP_HIGH * base);
    }

    #[test]
    fn test_zero_volatility_and_trend_moves_only_by_micro_trend() {
        let base = 2.5;
        let mut current = base;
        let mut now_ms: i64 = 0;
        for step in 1..=10 {
            now_ms += 3_000;
            current = advance_price(current, base, 0.0, 0.0, 3.0, now_ms, 0.0, None);
            // Each step contributes at most the micro-trend amplitude
            let max_drift = step as f64 * MICRO_TREND_AMPLITUDE * base;
            assert!((current - base).abs() <= max_drift + 1e-12);
            assert!(current >= CLAMP_LOW * base && current <= CLAMP_HIGH * base);
        }
    }

    #[test]
    fn test_shock_lands_after_the_clamp() {
        let base = 2.5;
        // Price already pinned at the ceiling; a positive shock escapes it
        let shocked = advance_price(
            CLAMP_HIGH * base,
            base,
            0.0,
            0.0,
            1.0,
            0,
            0.5,
            Some(0.5 * base * SHOCK_SCALE),
        );
        assert!(shocked > CLAMP_HIGH * base);

        // The next step pulls it back inside the band
        let recovered = advance_price(shocked, base, 0.0, 0.0, 1.0, 0, 0.0, None);
        assert!(recovered <= CLAMP_HIGH * base);
    }

    #[tokio::test]
    async fn test_refresh_floor_limits_fetch_volume() {
        let feed = ScriptedFeed::new(vec![Some(2.4), Some(2.6)]);
        let sim = PriceSimulator::with_seed(quiet_config(), feed.clone(), FLOOR, 7);

        sim.current_price().await;
        sim.current_price().await;
        sim.current_price().await;

        // Only the first step fetched; later steps were inside the floor
        assert_eq!(feed.fetch_count(), 1);
        assert_eq!(sim.real_market_price().await, Some(2.4));
    }

    #[tokio::test]
    async fn test_force_refresh_triggers_exactly_one_fetch() {
        let feed = ScriptedFeed::new(vec![Some(2.4), Some(2.6)]);
        let sim = PriceSimulator::with_seed(quiet_config(), feed.clone(), FLOOR, 7);

        sim.current_price().await;
        assert_eq!(feed.fetch_count(), 1);

        sim.force_refresh().await;
        sim.current_price().await;
        assert_eq!(feed.fetch_count(), 2);
        assert_eq!(sim.real_market_price().await, Some(2.6));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_cache() {
        let feed = ScriptedFeed::new(vec![Some(3.0), None]);
        let sim = PriceSimulator::with_seed(quiet_config(), feed.clone(), FLOOR, 7);

        sim.refresh_market_price().await;
        assert_eq!(sim.real_market_price().await, Some(3.0));

        // Second refresh fails; the stale anchor survives
        sim.refresh_market_price().await;
        assert_eq!(feed.fetch_count(), 2);
        assert_eq!(sim.real_market_price().await, Some(3.0));
    }

    #[tokio::test]
    async fn test_scenario_switch_preserves_current_price() {
        let feed = ScriptedFeed::new(vec![]);
        let sim = PriceSimulator::with_seed(quiet_config(), feed, FLOOR, 7);

        sim.current_price().await;
        let before = sim.last_price().await;

        sim.update_config(Scenario::Extreme.config()).await;
        assert_eq!(sim.last_price().await, before);
        assert_eq!(sim.config().await, Scenario::Extreme.config());
    }

    #[tokio::test]
    async fn test_fallback_base_price_without_market_data() {
        let feed = ScriptedFeed::new(vec![]);
        let sim = PriceSimulator::with_seed(quiet_config(), feed, FLOOR, 7);

        assert_eq!(sim.real_market_price().await, None);
        let price = sim.current_price().await;
        // Zero volatility and trend: only the micro-trend moves the price
        assert!((price - 2.50).abs() <= MICRO_TREND_AMPLITUDE * 2.50 + 1e-12);
    }
}
