//! Percentage conversions and tax extraction.
//!
//! ## Tax Formulas
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RateType::Free       tax = 0                                           │
//! │  RateType::Inclusive  tax = price / (1 + rate) × rate                   │
//! │                       $110.00 incl. 10% → $10.00 tax                    │
//! │  RateType::Exclusive  tax = price × rate                                │
//! │                       $100.00 excl. 10% → $10.00 tax                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bigdecimal::{BigDecimal, One, Zero};
use serde_json::json;
use tracing::warn;

use super::{call_key, fallback_on_error, finite, memoized};
use crate::arith::Arith;
use crate::calculator::Calculator;
use crate::config::CallOptions;
use crate::types::{Operation, RateType};

impl Calculator {
    /// Converts a percentage to a decimal fraction (`15` → `0.15`).
    ///
    /// `None`, NaN and infinities yield `None`. The second argument is
    /// either call options or a plain number of decimal places.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Calculator, CallOptions};
    ///
    /// let mut calc = Calculator::new();
    /// assert_eq!(calc.percent_to_decimal(Some(15.0), CallOptions::new()), Some(0.15));
    /// assert_eq!(calc.percent_to_decimal(Some(33.333), 2), Some(0.33));
    /// assert_eq!(calc.percent_to_decimal(None, CallOptions::new()), None);
    /// ```
    pub fn percent_to_decimal(
        &mut self,
        percentage: Option<f64>,
        options: impl Into<CallOptions>,
    ) -> Option<f64> {
        let percentage = finite(percentage)?;

        let resolved = self.resolve(&options.into());
        let key = call_key(json!({ "percentage": percentage }), &resolved);
        let arith = Arith::new();

        let result = memoized(
            &mut self.store.percent_to_decimal,
            Operation::PercentToDecimal,
            key,
            || {
                let fraction = arith.div(&arith.from_f64(percentage)?, &hundred())?;
                Ok(Some(arith.round_to(&fraction, resolved.precision)?))
            },
        );

        fallback_on_error(Operation::PercentToDecimal, result, None)
    }

    /// Converts a decimal fraction to a percentage (`0.15` → `15`).
    ///
    /// Unlike [`percent_to_decimal`](Self::percent_to_decimal), missing or
    /// invalid input yields `0`, not `None`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Calculator, CallOptions};
    ///
    /// let mut calc = Calculator::new();
    /// assert_eq!(calc.decimal_to_percent(Some(0.15), CallOptions::new()), 15.0);
    /// assert_eq!(calc.decimal_to_percent(None, CallOptions::new()), 0.0);
    /// ```
    pub fn decimal_to_percent(&mut self, value: Option<f64>, options: impl Into<CallOptions>) -> f64 {
        let Some(value) = finite(value).filter(|v| *v != 0.0) else {
            return 0.0;
        };

        let resolved = self.resolve(&options.into());
        let key = call_key(json!({ "value": value }), &resolved);
        let arith = Arith::new();

        let result = memoized(
            &mut self.store.decimal_to_percent,
            Operation::DecimalToPercent,
            key,
            || {
                let percent = arith.mul(&arith.from_f64(value)?, &hundred());
                arith.round_to(&percent, resolved.precision)
            },
        );

        fallback_on_error(Operation::DecimalToPercent, result, 0.0)
    }

    /// Computes the tax portion of a price.
    ///
    /// Rate and rate type come from the call options, falling back to the
    /// calculator's configuration.
    ///
    /// ## Edge Cases
    /// - price `None`, NaN or `0` → `0`
    /// - rate NaN/∞ → the price, unchanged (logged)
    /// - negative rate → the configured default rate is used (logged)
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Calculator, CallOptions, RateType};
    ///
    /// let mut calc = Calculator::new();
    /// let excl = CallOptions::new().with_tax_rate(0.1).with_rate_type(RateType::Exclusive);
    /// assert_eq!(calc.tax_rate(Some(100.0), excl), 10.0);
    ///
    /// let incl = CallOptions::new().with_tax_rate(0.1).with_rate_type(RateType::Inclusive);
    /// assert_eq!(calc.tax_rate(Some(110.0), incl), 10.0);
    /// ```
    pub fn tax_rate(&mut self, price: Option<f64>, options: impl Into<CallOptions>) -> f64 {
        let Some(price) = finite(price).filter(|p| *p != 0.0) else {
            return 0.0;
        };

        let mut resolved = self.resolve(&options.into());
        if !resolved.tax_rate.is_finite() {
            warn!(rate = resolved.tax_rate, "Tax rate is not a number, returning price unchanged");
            return price;
        }
        if resolved.tax_rate < 0.0 {
            warn!(
                rate = resolved.tax_rate,
                default = self.config.tax_rate,
                "Tax rate must not be negative, using the configured rate"
            );
            resolved.tax_rate = self.config.tax_rate;
        }

        let key = call_key(json!({ "price": price }), &resolved);
        let arith = Arith::new();

        let result = memoized(&mut self.store.tax_rate, Operation::TaxRate, key, || {
            let amount = arith.from_f64(price)?;
            let rate = arith.from_f64(resolved.tax_rate)?;
            let tax = match resolved.rate_type {
                RateType::Free => BigDecimal::zero(),
                RateType::Inclusive => {
                    let gross_factor = arith.add(&BigDecimal::one(), &rate);
                    arith.mul(&arith.div(&amount, &gross_factor)?, &rate)
                }
                RateType::Exclusive => arith.mul(&amount, &rate),
            };
            arith.round_to(&tax, resolved.precision)
        });

        fallback_on_error(Operation::TaxRate, result, 0.0)
    }
}

fn hundred() -> BigDecimal {
    BigDecimal::from(100_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOption;
    use crate::types::Precision;
    use tracing_test::traced_test;

    #[test]
    fn test_percent_to_decimal() {
        let mut calc = Calculator::new();
        assert_eq!(calc.percent_to_decimal(Some(50.0), CallOptions::new()), Some(0.5));
        assert_eq!(calc.percent_to_decimal(Some(0.1), CallOptions::new()), Some(0.001));
        assert_eq!(calc.percent_to_decimal(Some(-12.5), CallOptions::new()), Some(-0.125));
        assert_eq!(calc.percent_to_decimal(Some(12.345), 3), Some(0.123));
        assert_eq!(calc.percent_to_decimal(Some(0.0), CallOptions::new()), Some(0.0));
    }

    #[test]
    fn test_percent_to_decimal_invalid_is_none() {
        let mut calc = Calculator::new();
        assert_eq!(calc.percent_to_decimal(None, CallOptions::new()), None);
        assert_eq!(calc.percent_to_decimal(Some(f64::NAN), CallOptions::new()), None);
        assert_eq!(calc.percent_to_decimal(Some(f64::INFINITY), CallOptions::new()), None);
    }

    #[test]
    fn test_decimal_to_percent() {
        let mut calc = Calculator::new();
        assert_eq!(calc.decimal_to_percent(Some(0.5), CallOptions::new()), 50.0);
        assert_eq!(calc.decimal_to_percent(Some(0.123456), CallOptions::new()), 12.3456);
        assert_eq!(calc.decimal_to_percent(Some(0.123456), 2), 12.35);
        assert_eq!(calc.decimal_to_percent(Some(-0.07), CallOptions::new()), -7.0);
    }

    #[test]
    fn test_conversions_keep_tiny_and_huge_values() {
        let mut calc = Calculator::new();
        assert_eq!(calc.percent_to_decimal(Some(1e-27), CallOptions::new()), Some(1e-29));
        assert_eq!(calc.percent_to_decimal(Some(1e30), CallOptions::new()), Some(1e28));
        assert_eq!(calc.decimal_to_percent(Some(1e-30), CallOptions::new()), 1e-28);
        assert_eq!(calc.decimal_to_percent(Some(3e29), CallOptions::new()), 3e31);
    }

    #[test]
    fn test_decimal_to_percent_invalid_is_zero() {
        let mut calc = Calculator::new();
        assert_eq!(calc.decimal_to_percent(None, CallOptions::new()), 0.0);
        assert_eq!(calc.decimal_to_percent(Some(0.0), CallOptions::new()), 0.0);
        assert_eq!(calc.decimal_to_percent(Some(f64::NAN), CallOptions::new()), 0.0);
        assert_eq!(calc.cache_stats("decimalToPercent").total, 0);
    }

    #[test]
    fn test_tax_rate_formulas() {
        let mut calc = Calculator::new();
        let free = CallOptions::new().with_rate_type(RateType::Free);
        assert_eq!(calc.tax_rate(Some(100.0), free), 0.0);

        let excl = CallOptions::new()
            .with_tax_rate(0.0825)
            .with_rate_type(RateType::Exclusive);
        assert_eq!(calc.tax_rate(Some(10.0), excl), 0.825);
        assert_eq!(calc.tax_rate(Some(10.0), excl.with_decimal_places(2)), 0.83);

        let incl = CallOptions::new()
            .with_tax_rate(0.1)
            .with_rate_type(RateType::Inclusive);
        let unrounded = calc.tax_rate(Some(100.0), incl);
        assert!((unrounded - 9.090_909_090_909_09).abs() < 1e-12);
        assert_eq!(calc.tax_rate(Some(100.0), incl.with_decimal_places(2)), 9.09);
    }

    #[test]
    fn test_tax_rate_uses_configured_defaults() {
        let mut calc = Calculator::new();
        // Default: 10% inclusive
        assert_eq!(calc.tax_rate(Some(110.0), CallOptions::new()), 10.0);

        calc.set_option(ConfigOption::RateType(RateType::Exclusive)).unwrap();
        calc.set_option(ConfigOption::TaxRate(0.2)).unwrap();
        assert_eq!(calc.tax_rate(Some(50.0), CallOptions::new()), 10.0);
    }

    #[test]
    fn test_tax_rate_on_large_prices() {
        let mut calc = Calculator::new();
        let excl = CallOptions::new()
            .with_tax_rate(0.1)
            .with_rate_type(RateType::Exclusive);
        assert_eq!(calc.tax_rate(Some(1e29), excl), 1e28);

        let incl = CallOptions::new()
            .with_tax_rate(0.1)
            .with_rate_type(RateType::Inclusive);
        assert_eq!(calc.tax_rate(Some(1.1e30), incl), 1e29);
    }

    #[test]
    fn test_tax_rate_zero_or_missing_price() {
        let mut calc = Calculator::new();
        assert_eq!(calc.tax_rate(None, CallOptions::new()), 0.0);
        assert_eq!(calc.tax_rate(Some(0.0), CallOptions::new()), 0.0);
        assert_eq!(calc.tax_rate(Some(f64::NAN), CallOptions::new()), 0.0);
    }

    #[traced_test]
    #[test]
    fn test_tax_rate_invalid_rates() {
        let mut calc = Calculator::new();

        let nan_rate = CallOptions::new().with_tax_rate(f64::NAN);
        assert_eq!(calc.tax_rate(Some(100.0), nan_rate), 100.0);
        assert!(logs_contain("Tax rate is not a number"));

        // Negative rate falls back to the configured 10% inclusive
        let negative = CallOptions::new().with_tax_rate(-0.5);
        assert_eq!(calc.tax_rate(Some(110.0), negative), 10.0);
        assert!(logs_contain("Tax rate must not be negative"));
    }

    #[test]
    fn test_round_trip() {
        let mut calc = Calculator::new();
        for x in [0.15, 0.0825, 1.5, -0.3, 0.123456789] {
            let percent = calc.decimal_to_percent(Some(x), CallOptions::new());
            let back = calc
                .percent_to_decimal(Some(percent), Precision::Unrounded)
                .unwrap();
            assert!((back - x).abs() < 1e-15, "{} -> {} -> {}", x, percent, back);
        }
    }
}
