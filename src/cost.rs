//! Cost estimation and accounting
//!
//! The estimator is stateless: it turns token counts into a USD figure using a
//! per-service rate table. Running totals live behind the [`CostLedger`]
//! capability, which callers inject and own.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const DEFAULT_SERVICE: &str = "default";

/// Token estimate used wherever a service does not report usage: ceil(chars / 4).
pub fn estimate_tokens(text: &str) -> u32 {
    let chars = text.chars().count() as u32;
    chars.div_ceil(4)
}

/// Round a USD amount to 4 decimal places.
pub fn round_usd(amount: f64) -> f64 {
    (amount * 10_000.0).round() / 10_000.0
}

/// USD per 1000 tokens for one generation service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRates {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl ServiceRates {
    pub const fn new(input_per_1k: f64, output_per_1k: f64) -> Self {
        Self {
            input_per_1k,
            output_per_1k,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<String, ServiceRates>,
}

impl Default for RateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(DEFAULT_SERVICE.to_string(), ServiceRates::new(0.01, 0.03));
        rates.insert("openai".to_string(), ServiceRates::new(0.01, 0.03));
        rates.insert("anthropic".to_string(), ServiceRates::new(0.015, 0.075));
        rates.insert("ollama".to_string(), ServiceRates::new(0.0, 0.0));
        rates.insert("local".to_string(), ServiceRates::new(0.0, 0.0));
        Self { rates }
    }
}

impl RateTable {
    /// Default table with configured overrides applied on top.
    pub fn with_overrides(overrides: &HashMap<String, ServiceRates>) -> Self {
        let mut table = Self::default();
        for (service, rates) in overrides {
            table.set(service, *rates);
        }
        table
    }

    pub fn set(&mut self, service: &str, rates: ServiceRates) {
        self.rates.insert(service.to_ascii_lowercase(), rates);
    }

    /// Rates for a service, falling back to the default service's rates.
    pub fn for_service(&self, service: &str) -> ServiceRates {
        self.rates
            .get(&service.to_ascii_lowercase())
            .or_else(|| self.rates.get(DEFAULT_SERVICE))
            .copied()
            .unwrap_or(ServiceRates::new(0.01, 0.03))
    }
}

/// Stateless USD cost estimator
#[derive(Debug, Clone, Default)]
pub struct CostEstimator {
    rates: RateTable,
}

impl CostEstimator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// `(prompt/1000)*input + (response/1000)*output`, rounded to 4 decimals, never negative.
    pub fn estimate(&self, service: &str, prompt_tokens: u32, response_tokens: u32) -> f64 {
        let rates = self.rates.for_service(service);
        let input = (prompt_tokens as f64 / 1000.0) * rates.input_per_1k.max(0.0);
        let output = (response_tokens as f64 / 1000.0) * rates.output_per_1k.max(0.0);
        round_usd(input + output).max(0.0)
    }

    /// Estimate from raw text using the ceil(len/4) token heuristic.
    pub fn estimate_text(&self, service: &str, prompt: &str, response: &str) -> f64 {
        self.estimate(service, estimate_tokens(prompt), estimate_tokens(response))
    }
}

/// Running cost total owned outside the pipeline. Increments must be atomic.
pub trait CostLedger: Send + Sync {
    fn add(&self, amount_usd: f64);
}

#[derive(Debug, Default)]
struct LedgerTotals {
    daily: BTreeMap<NaiveDate, f64>,
    monthly: BTreeMap<(i32, u32), f64>,
}

/// Daily and monthly totals kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryCostLedger {
    totals: Mutex<LedgerTotals>,
}

impl InMemoryCostLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_at(&self, amount_usd: f64, at: DateTime<Utc>) {
        if !amount_usd.is_finite() || amount_usd <= 0.0 {
            return;
        }
        let date = at.date_naive();
        let mut totals = self.totals.lock();
        *totals.daily.entry(date).or_insert(0.0) += amount_usd;
        *totals
            .monthly
            .entry((date.year(), date.month()))
            .or_insert(0.0) += amount_usd;
    }

    pub fn daily_total(&self, date: NaiveDate) -> f64 {
        round_usd(self.totals.lock().daily.get(&date).copied().unwrap_or(0.0))
    }

    pub fn monthly_total(&self, year: i32, month: u32) -> f64 {
        round_usd(
            self.totals
                .lock()
                .monthly
                .get(&(year, month))
                .copied()
                .unwrap_or(0.0),
        )
    }

    pub fn today(&self) -> f64 {
        self.daily_total(Utc::now().date_naive())
    }
}

impl CostLedger for InMemoryCostLedger {
    fn add(&self, amount_usd: f64) {
        self.add_at(amount_usd, Utc::now());
    }
}
