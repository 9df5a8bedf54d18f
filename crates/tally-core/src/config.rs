//! # Calculator Configuration
//!
//! The configuration owned by each [`Calculator`](crate::Calculator) and the
//! per-call overlay that can override it.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. CallOptions (highest priority, one call only)                      │
//! │     calc.sum(&data, CallOptions::new().with_decimal_places(2))         │
//! │                                                                         │
//! │  2. set_option / set_option_named (validated, persistent)              │
//! │                                                                         │
//! │  3. Environment Variables (CalculatorConfig::from_env)                 │
//! │     TALLY_OUTPUT_DECIMAL_PLACES=2                                      │
//! │     TALLY_TAX_RATE=0.15                                                │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! │     unrounded output, 10% tax, inclusive                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CalcError, CalcResult, ValidationResult};
use crate::types::{Precision, RateType};
use crate::validation;

/// Environment variable for [`CalculatorConfig::keep_input_max_precision`].
pub const ENV_KEEP_INPUT_MAX_PRECISION: &str = "TALLY_KEEP_INPUT_MAX_PRECISION";
/// Environment variable for [`CalculatorConfig::output_decimal_places`] (`-1` = unrounded).
pub const ENV_OUTPUT_DECIMAL_PLACES: &str = "TALLY_OUTPUT_DECIMAL_PLACES";
/// Environment variable for [`CalculatorConfig::tax_rate`].
pub const ENV_TAX_RATE: &str = "TALLY_TAX_RATE";
/// Environment variable for [`CalculatorConfig::rate_type`].
pub const ENV_RATE_TYPE: &str = "TALLY_RATE_TYPE";

// =============================================================================
// Calculator Configuration
// =============================================================================

/// Persistent calculator configuration.
///
/// ## Invariants
/// - `output_decimal_places` is `Unrounded` or `Places(0..=16)`
/// - `tax_rate` is finite and within `[0, 1]`
///
/// Both hold after every successful [`apply`](Self::apply); a rejected
/// update leaves the configuration untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorConfig {
    /// When set, results are returned at working precision unless the call
    /// overrides the decimal places.
    pub keep_input_max_precision: bool,

    /// Decimal places applied to every result.
    pub output_decimal_places: Precision,

    /// Default tax rate for `tax_rate` (0.1 = 10%).
    pub tax_rate: f64,

    /// Default tax mode for `tax_rate`.
    pub rate_type: RateType,
}

impl Default for CalculatorConfig {
    /// ## Default Values
    /// - Keep input max precision: off
    /// - Output: unrounded
    /// - Tax: 10% inclusive
    fn default() -> Self {
        CalculatorConfig {
            keep_input_max_precision: false,
            output_decimal_places: Precision::Unrounded,
            tax_rate: 0.1,
            rate_type: RateType::Inclusive,
        }
    }
}

impl CalculatorConfig {
    /// Creates a configuration from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `TALLY_KEEP_INPUT_MAX_PRECISION`: `true` / `false`
    /// - `TALLY_OUTPUT_DECIMAL_PLACES`: `-1` or `0..=16`
    /// - `TALLY_TAX_RATE`: e.g. `0.15`
    /// - `TALLY_RATE_TYPE`: `free` / `inclusive` / `exclusive`
    ///
    /// Invalid values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = CalculatorConfig::default();

        for var in [
            ENV_KEEP_INPUT_MAX_PRECISION,
            ENV_OUTPUT_DECIMAL_PLACES,
            ENV_TAX_RATE,
            ENV_RATE_TYPE,
        ] {
            let Some(raw) = lookup(var) else {
                continue;
            };

            match ConfigOption::from_env_var(var, raw.trim()) {
                Ok(option) => {
                    debug!(var, value = %raw, "Applying configuration from environment");
                    config.set(option);
                }
                Err(err) => {
                    warn!(var, value = %raw, error = %err, "Ignoring invalid environment value");
                }
            }
        }

        config
    }

    /// Validates and applies one option.
    pub fn apply(&mut self, option: ConfigOption) -> ValidationResult<()> {
        let option = option.validated()?;
        self.set(option);
        Ok(())
    }

    /// Checks both invariants of a configuration built by hand.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_precision(self.output_decimal_places)?;
        validation::validate_tax_rate(self.tax_rate)?;
        Ok(())
    }

    fn set(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::KeepInputMaxPrecision(keep) => self.keep_input_max_precision = keep,
            ConfigOption::OutputDecimalPlaces(precision) => self.output_decimal_places = precision,
            ConfigOption::TaxRate(rate) => self.tax_rate = rate,
            ConfigOption::RateType(rate_type) => self.rate_type = rate_type,
        }
    }
}

// =============================================================================
// Config Option
// =============================================================================

/// A single configuration update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigOption {
    KeepInputMaxPrecision(bool),
    OutputDecimalPlaces(Precision),
    TaxRate(f64),
    RateType(RateType),
}

impl ConfigOption {
    /// Option names accepted by [`from_named`](Self::from_named).
    pub const NAMES: [&'static str; 4] = [
        "keepInputMaxPrecision",
        "outputDecimalPlaces",
        "taxRate",
        "rateType",
    ];

    /// Builds an option from its camelCase name and an untyped value.
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tally_core::{ConfigOption, Precision};
    ///
    /// let option = ConfigOption::from_named("outputDecimalPlaces", &json!(2)).unwrap();
    /// assert_eq!(option, ConfigOption::OutputDecimalPlaces(Precision::Places(2)));
    ///
    /// assert!(ConfigOption::from_named("precision", &json!(2)).is_err());
    /// ```
    pub fn from_named(name: &str, value: &Value) -> CalcResult<Self> {
        let option = match name {
            "keepInputMaxPrecision" => {
                ConfigOption::KeepInputMaxPrecision(validation::expect_bool(name, value)?)
            }
            "outputDecimalPlaces" => {
                ConfigOption::OutputDecimalPlaces(validation::expect_decimal_places(name, value)?)
            }
            "taxRate" => ConfigOption::TaxRate(validation::expect_tax_rate(name, value)?),
            "rateType" => ConfigOption::RateType(validation::expect_rate_type(name, value)?),
            other => return Err(CalcError::UnknownOption(other.to_string())),
        };
        Ok(option)
    }

    /// The camelCase name of the field this option updates.
    pub const fn name(&self) -> &'static str {
        match self {
            ConfigOption::KeepInputMaxPrecision(_) => "keepInputMaxPrecision",
            ConfigOption::OutputDecimalPlaces(_) => "outputDecimalPlaces",
            ConfigOption::TaxRate(_) => "taxRate",
            ConfigOption::RateType(_) => "rateType",
        }
    }

    fn validated(self) -> ValidationResult<Self> {
        match self {
            ConfigOption::OutputDecimalPlaces(precision) => {
                validation::validate_precision(precision).map(ConfigOption::OutputDecimalPlaces)
            }
            ConfigOption::TaxRate(rate) => {
                validation::validate_tax_rate(rate).map(ConfigOption::TaxRate)
            }
            other => Ok(other),
        }
    }

    fn from_env_var(var: &str, raw: &str) -> CalcResult<Self> {
        let value = match var {
            ENV_KEEP_INPUT_MAX_PRECISION => match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Value::Bool(true),
                "0" | "false" | "no" | "off" => Value::Bool(false),
                _ => Value::String(raw.to_string()),
            },
            ENV_OUTPUT_DECIMAL_PLACES => raw
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            ENV_TAX_RATE => raw
                .parse::<f64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.to_string())),
            _ => Value::String(raw.to_string()),
        };

        let name = match var {
            ENV_KEEP_INPUT_MAX_PRECISION => "keepInputMaxPrecision",
            ENV_OUTPUT_DECIMAL_PLACES => "outputDecimalPlaces",
            ENV_TAX_RATE => "taxRate",
            ENV_RATE_TYPE => "rateType",
            other => return Err(CalcError::UnknownOption(other.to_string())),
        };

        Self::from_named(name, &value)
    }
}

// =============================================================================
// Call Options
// =============================================================================

/// Per-call overrides of [`CalculatorConfig`].
///
/// Every field is optional; a present field wins for that call only.
/// Invalid overrides (e.g. `Places(20)`) are ignored rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CallOptions {
    pub keep_input_max_precision: Option<bool>,
    pub output_decimal_places: Option<Precision>,
    pub tax_rate: Option<f64>,
    pub rate_type: Option<RateType>,
}

impl CallOptions {
    /// An overlay that overrides nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the decimal places using the integer form (`-1` = unrounded).
    ///
    /// Values outside `-1..=16` leave the override absent.
    pub fn with_decimal_places(mut self, places: i64) -> Self {
        self.output_decimal_places = Precision::from_places(places);
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.output_decimal_places = Some(precision);
        self
    }

    /// Returns this call's result at working precision.
    pub fn unrounded(self) -> Self {
        self.with_precision(Precision::Unrounded)
    }

    pub fn with_tax_rate(mut self, rate: f64) -> Self {
        self.tax_rate = Some(rate);
        self
    }

    pub fn with_rate_type(mut self, rate_type: RateType) -> Self {
        self.rate_type = Some(rate_type);
        self
    }

    pub fn keep_input_max_precision(mut self, keep: bool) -> Self {
        self.keep_input_max_precision = Some(keep);
        self
    }
}

impl From<Precision> for CallOptions {
    fn from(precision: Precision) -> Self {
        CallOptions::new().with_precision(precision)
    }
}

/// Integer decimal places, as accepted by [`CallOptions::with_decimal_places`].
impl From<i32> for CallOptions {
    fn from(places: i32) -> Self {
        CallOptions::new().with_decimal_places(i64::from(places))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = CalculatorConfig::default();
        assert!(!config.keep_input_max_precision);
        assert_eq!(config.output_decimal_places, Precision::Unrounded);
        assert_eq!(config.tax_rate, 0.1);
        assert_eq!(config.rate_type, RateType::Inclusive);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_rejects_without_partial_update() {
        let mut config = CalculatorConfig::default();

        assert!(config.apply(ConfigOption::TaxRate(1.5)).is_err());
        assert!(config
            .apply(ConfigOption::OutputDecimalPlaces(Precision::Places(17)))
            .is_err());
        assert_eq!(config, CalculatorConfig::default());

        config.apply(ConfigOption::TaxRate(0.15)).unwrap();
        assert_eq!(config.tax_rate, 0.15);
    }

    #[test]
    fn test_from_named() {
        assert_eq!(
            ConfigOption::from_named("keepInputMaxPrecision", &json!(true)).unwrap(),
            ConfigOption::KeepInputMaxPrecision(true)
        );
        assert_eq!(
            ConfigOption::from_named("outputDecimalPlaces", &json!(-1)).unwrap(),
            ConfigOption::OutputDecimalPlaces(Precision::Unrounded)
        );
        assert_eq!(
            ConfigOption::from_named("rateType", &json!("excl")).unwrap(),
            ConfigOption::RateType(RateType::Exclusive)
        );
        assert!(matches!(
            ConfigOption::from_named("precision", &json!(2)),
            Err(CalcError::UnknownOption(name)) if name == "precision"
        ));
        assert!(matches!(
            ConfigOption::from_named("taxRate", &json!(-0.5)),
            Err(CalcError::Validation(_))
        ));
    }

    #[test]
    fn test_from_lookup_applies_valid_and_skips_invalid() {
        let vars: HashMap<&str, &str> = [
            (ENV_OUTPUT_DECIMAL_PLACES, "2"),
            (ENV_TAX_RATE, "1.5"),
            (ENV_RATE_TYPE, "EXCL"),
            (ENV_KEEP_INPUT_MAX_PRECISION, "maybe"),
        ]
        .into_iter()
        .collect();

        let config = CalculatorConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.output_decimal_places, Precision::Places(2));
        assert_eq!(config.rate_type, RateType::Exclusive);
        // Rejected values keep their defaults
        assert_eq!(config.tax_rate, 0.1);
        assert!(!config.keep_input_max_precision);
    }

    #[test]
    fn test_call_options_builders() {
        let options = CallOptions::new()
            .with_decimal_places(2)
            .with_tax_rate(0.2)
            .with_rate_type(RateType::Exclusive);
        assert_eq!(options.output_decimal_places, Some(Precision::Places(2)));
        assert_eq!(options.tax_rate, Some(0.2));
        assert_eq!(options.rate_type, Some(RateType::Exclusive));

        assert_eq!(CallOptions::new().with_decimal_places(99).output_decimal_places, None);
        assert_eq!(
            CallOptions::new().with_decimal_places(-1).output_decimal_places,
            Some(Precision::Unrounded)
        );
        assert_eq!(
            CallOptions::from(3).output_decimal_places,
            Some(Precision::Places(3))
        );
    }
}
