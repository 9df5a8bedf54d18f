//! # Calculator
//!
//! The facade that owns configuration and memo tables and exposes the
//! calculation operations (implemented in [`crate::ops`]).
//!
//! ## Call Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Calculation Call                                 │
//! │                                                                         │
//! │  calc.tax_rate(Some(100.0), options)                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sanitize inputs ──► null / NaN / 0 ──► documented fallback (no cache)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  precision::resolve(config, options) ──► ResolvedOptions                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  generate_cache_key({inputs, options}) ──► MemoStore lookup             │
//! │       │                        │                                        │
//! │       │ miss                   └── hit ──► return stored result         │
//! │       ▼                                                                 │
//! │  Arith (decimal) ──► round ──► store ──► return                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! A `Calculator` is a plain value. Operations take `&mut self` because a
//! miss inserts into the store; to share one instance across threads wrap
//! it in `Arc<Mutex<Calculator>>`.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::{CalculatorConfig, CallOptions, ConfigOption};
use crate::error::CalcResult;
use crate::memo::MemoStore;
use crate::precision::{self, ResolvedOptions};
use crate::types::{CacheStats, Operation};

/// Cache name that addresses every table in `clear_cache` / `cache_stats`.
pub const ALL_CACHES: &str = "all";

/// Business-math calculator with per-operation memoization.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tally_core::{Calculator, CallOptions, RateType};
///
/// let mut calc = Calculator::new();
/// assert_eq!(calc.sum(&json!([1, 2, 3]), CallOptions::new()), 6.0);
///
/// let tax = calc.tax_rate(
///     Some(100.0),
///     CallOptions::new()
///         .with_tax_rate(0.1)
///         .with_rate_type(RateType::Inclusive)
///         .with_decimal_places(2),
/// );
/// assert_eq!(tax, 9.09);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Calculator {
    pub(crate) config: CalculatorConfig,
    pub(crate) store: MemoStore,
    cache_limit: Option<usize>,
}

impl Calculator {
    /// Creates a calculator with default configuration and unbounded caches.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a calculator from a configuration built by hand.
    ///
    /// ## Errors
    /// Returns a validation error if the configuration breaks an invariant
    /// (decimal places above 16, tax rate outside `[0, 1]`).
    pub fn with_config(config: CalculatorConfig) -> CalcResult<Self> {
        config.validate()?;
        Ok(Calculator {
            config,
            ..Self::default()
        })
    }

    /// Bounds every memo table to `limit` entries (oldest evicted first).
    pub fn with_cache_limit(mut self, limit: usize) -> Self {
        self.cache_limit = Some(limit);
        self.store = MemoStore::bounded(limit);
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// The live configuration.
    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// A snapshot of the configuration.
    pub fn options(&self) -> CalculatorConfig {
        self.config.clone()
    }

    /// Validates and applies one configuration option.
    ///
    /// On error the configuration is unchanged.
    pub fn set_option(&mut self, option: ConfigOption) -> CalcResult<()> {
        self.config.apply(option)?;
        info!(option = option.name(), "Calculator option updated");
        Ok(())
    }

    /// Name-based form of [`set_option`](Self::set_option).
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tally_core::{Calculator, Precision};
    ///
    /// let mut calc = Calculator::new();
    /// calc.set_option_named("outputDecimalPlaces", &json!(2)).unwrap();
    /// assert_eq!(calc.config().output_decimal_places, Precision::Places(2));
    ///
    /// assert!(calc.set_option_named("taxRate", &json!(2)).is_err());
    /// assert!(calc.set_option_named("currency", &json!("USD")).is_err());
    /// ```
    pub fn set_option_named(&mut self, name: &str, value: &Value) -> CalcResult<()> {
        let option = ConfigOption::from_named(name, value)?;
        self.set_option(option)
    }

    /// Clears every cache and restores the default configuration.
    ///
    /// A cache limit set with [`with_cache_limit`](Self::with_cache_limit)
    /// is kept.
    pub fn reset(&mut self) {
        self.store.clear_all();
        self.config = CalculatorConfig::default();
        info!("Calculator reset to defaults");
    }

    pub(crate) fn resolve(&self, overlay: &CallOptions) -> ResolvedOptions {
        precision::resolve(&self.config, overlay)
    }

    // =========================================================================
    // Cache Management
    // =========================================================================

    /// Clears one table by operation name, or all of them with `"all"`.
    ///
    /// Unknown names are logged and ignored.
    pub fn clear_cache(&mut self, name: &str) {
        if name == ALL_CACHES {
            self.store.clear_all();
            return;
        }

        match Operation::from_name(name) {
            Some(op) => self.store.clear(op),
            None => warn!(name, "Invalid cache name, nothing cleared"),
        }
    }

    /// Clears one table.
    pub fn clear_operation_cache(&mut self, op: Operation) {
        self.store.clear(op);
    }

    /// Entry counts for one table by name, or for all of them with `"all"`.
    ///
    /// Unknown names are logged and yield empty statistics.
    pub fn cache_stats(&self, name: &str) -> CacheStats {
        let ops: Vec<Operation> = if name == ALL_CACHES {
            Operation::ALL.to_vec()
        } else if let Some(op) = Operation::from_name(name) {
            vec![op]
        } else {
            warn!(name, "Invalid cache name, no statistics");
            Vec::new()
        };

        let mut stats = CacheStats::default();
        for op in ops {
            let count = self.store.len(op);
            stats.by_operation.insert(op, count);
            stats.total += count;
        }
        stats
    }

    /// The per-table entry limit, if one was configured.
    pub fn cache_limit(&self) -> Option<usize> {
        self.cache_limit
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use crate::types::{Precision, RateType};
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_with_config_validates() {
        let bad = CalculatorConfig {
            tax_rate: 2.0,
            ..CalculatorConfig::default()
        };
        assert!(matches!(
            Calculator::with_config(bad),
            Err(CalcError::Validation(_))
        ));

        let good = CalculatorConfig {
            output_decimal_places: Precision::Places(2),
            ..CalculatorConfig::default()
        };
        let calc = Calculator::with_config(good.clone()).unwrap();
        assert_eq!(calc.options(), good);
    }

    #[test]
    fn test_set_option_errors_leave_config_untouched() {
        let mut calc = Calculator::new();

        assert!(calc.set_option(ConfigOption::TaxRate(-0.1)).is_err());
        assert!(calc
            .set_option_named("outputDecimalPlaces", &json!(17))
            .is_err());
        assert!(calc.set_option_named("rateType", &json!("vat")).is_err());
        assert!(matches!(
            calc.set_option_named("precision", &json!(2)),
            Err(CalcError::UnknownOption(_))
        ));
        assert_eq!(calc.options(), CalculatorConfig::default());

        calc.set_option(ConfigOption::RateType(RateType::Exclusive))
            .unwrap();
        assert_eq!(calc.config().rate_type, RateType::Exclusive);
    }

    #[test]
    fn test_reset_restores_defaults_and_clears_caches() {
        let mut calc = Calculator::new();
        calc.set_option_named("taxRate", &json!(0.2)).unwrap();
        calc.sum(&json!([1, 2]), CallOptions::new());
        calc.tax_rate(Some(10.0), CallOptions::new());
        assert_eq!(calc.cache_stats(ALL_CACHES).total, 2);

        calc.reset();
        assert_eq!(calc.options(), CalculatorConfig::default());
        assert_eq!(calc.cache_stats(ALL_CACHES).total, 0);
    }

    #[test]
    fn test_clear_cache_is_selective() {
        let mut calc = Calculator::new();
        calc.sum(&json!([1, 2, 3]), CallOptions::new());
        calc.percent_to_decimal(Some(50.0), CallOptions::new());

        calc.clear_cache("sum");
        let stats = calc.cache_stats(ALL_CACHES);
        assert_eq!(stats.count(Operation::Sum), 0);
        assert_eq!(stats.count(Operation::PercentToDecimal), 1);
        assert_eq!(stats.total, 1);

        calc.clear_operation_cache(Operation::PercentToDecimal);
        assert_eq!(calc.cache_stats(ALL_CACHES).total, 0);
    }

    #[traced_test]
    #[test]
    fn test_invalid_cache_name_warns_and_keeps_entries() {
        let mut calc = Calculator::new();
        calc.sum(&json!([1]), CallOptions::new());

        calc.clear_cache("computeRate");
        assert!(logs_contain("Invalid cache name"));
        assert_eq!(calc.cache_stats("sum").total, 1);

        let stats = calc.cache_stats("bogus");
        assert_eq!(stats, CacheStats::default());
    }

    #[test]
    fn test_cache_stats_for_single_operation() {
        let mut calc = Calculator::new();
        calc.sum(&json!([1]), CallOptions::new());
        calc.sum(&json!([2]), CallOptions::new());
        calc.tax_rate(Some(5.0), CallOptions::new());

        let stats = calc.cache_stats("sum");
        assert_eq!(stats.by_operation.len(), 1);
        assert_eq!(stats.count(Operation::Sum), 2);
        assert_eq!(stats.total, 2);
    }

    #[test]
    fn test_cache_limit_survives_reset() {
        let mut calc = Calculator::new().with_cache_limit(1);
        calc.sum(&json!([1]), CallOptions::new());
        calc.sum(&json!([2]), CallOptions::new());
        assert_eq!(calc.cache_stats("sum").total, 1);

        calc.reset();
        calc.sum(&json!([1]), CallOptions::new());
        calc.sum(&json!([2]), CallOptions::new());
        assert_eq!(calc.cache_limit(), Some(1));
        assert_eq!(calc.cache_stats("sum").total, 1);
    }
}
