//! # Validation Module
//!
//! Configuration-time validation for Tally.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Two Validation Regimes                             │
//! │                                                                         │
//! │  Configuration time: THIS MODULE                                        │
//! │  ├── set_option / set_option_named / with_config                       │
//! │  ├── Strict: out-of-range or mistyped values are rejected              │
//! │  └── Config is never left partially applied                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Call time: ops/*                                                       │
//! │  ├── Permissive: null / NaN / negative inputs map to fallbacks          │
//! │  └── Invalid per-call overrides are ignored, never raised               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::validation::{validate_decimal_places, validate_tax_rate};
//!
//! validate_decimal_places(2).unwrap();
//! assert!(validate_tax_rate(1.5).is_err());
//! ```

use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::types::{Precision, RateType};
use crate::MAX_DECIMAL_PLACES;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an integer decimal-place count.
///
/// ## Rules
/// - `-1` means unrounded
/// - `0..=16` are decimal places
///
/// ## Example
/// ```rust
/// use tally_core::validation::validate_decimal_places;
/// use tally_core::Precision;
///
/// assert_eq!(validate_decimal_places(-1).unwrap(), Precision::Unrounded);
/// assert_eq!(validate_decimal_places(0).unwrap(), Precision::Places(0));
/// assert!(validate_decimal_places(17).is_err());
/// ```
pub fn validate_decimal_places(places: i64) -> ValidationResult<Precision> {
    Precision::from_places(places).ok_or(ValidationError::InvalidDecimalPlaces { value: places })
}

/// Validates an already-typed precision.
///
/// `Precision::Places` can hold any `u32`, so the upper bound still needs
/// checking.
pub fn validate_precision(precision: Precision) -> ValidationResult<Precision> {
    match precision {
        Precision::Places(n) if n > MAX_DECIMAL_PLACES => {
            Err(ValidationError::InvalidDecimalPlaces { value: n as i64 })
        }
        valid => Ok(valid),
    }
}

/// Validates a tax rate.
///
/// ## Rules
/// - Must be finite
/// - Must be between 0 and 1 (0% to 100%)
pub fn validate_tax_rate(rate: f64) -> ValidationResult<f64> {
    if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
        return Err(ValidationError::OutOfRange {
            field: "taxRate".to_string(),
            min: 0.0,
            max: 1.0,
            value: rate,
        });
    }

    Ok(rate)
}

// =============================================================================
// JSON Value Validators
// =============================================================================
// Used by the name-based setter, where option values arrive untyped.

/// Extracts a boolean or reports the field as mistyped.
pub fn expect_bool(field: &str, value: &Value) -> ValidationResult<bool> {
    value.as_bool().ok_or_else(|| invalid_type(field, "a boolean"))
}

/// Extracts an integer decimal-place count and validates its range.
pub fn expect_decimal_places(field: &str, value: &Value) -> ValidationResult<Precision> {
    let places = value
        .as_i64()
        .ok_or_else(|| invalid_type(field, "an integer in [0, 16] or -1"))?;
    validate_decimal_places(places)
}

/// Extracts a number and validates it as a tax rate.
pub fn expect_tax_rate(field: &str, value: &Value) -> ValidationResult<f64> {
    let rate = value
        .as_f64()
        .ok_or_else(|| invalid_type(field, "a number in [0, 1]"))?;
    validate_tax_rate(rate)
}

/// Extracts a string and parses it as a rate type.
pub fn expect_rate_type(field: &str, value: &Value) -> ValidationResult<RateType> {
    value
        .as_str()
        .ok_or_else(|| invalid_type(field, "a string"))?
        .parse()
}

fn invalid_type(field: &str, expected: &str) -> ValidationError {
    ValidationError::InvalidType {
        field: field.to_string(),
        expected: expected.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_decimal_places() {
        assert_eq!(validate_decimal_places(-1), Ok(Precision::Unrounded));
        assert_eq!(validate_decimal_places(0), Ok(Precision::Places(0)));
        assert_eq!(validate_decimal_places(16), Ok(Precision::Places(16)));

        assert!(validate_decimal_places(17).is_err());
        assert!(validate_decimal_places(-2).is_err());
    }

    #[test]
    fn test_validate_precision() {
        assert!(validate_precision(Precision::Unrounded).is_ok());
        assert!(validate_precision(Precision::Places(16)).is_ok());
        assert_eq!(
            validate_precision(Precision::Places(20)),
            Err(ValidationError::InvalidDecimalPlaces { value: 20 })
        );
    }

    #[test]
    fn test_validate_tax_rate() {
        assert!(validate_tax_rate(0.0).is_ok());
        assert!(validate_tax_rate(0.0825).is_ok());
        assert!(validate_tax_rate(1.0).is_ok());

        assert!(validate_tax_rate(-0.1).is_err());
        assert!(validate_tax_rate(1.01).is_err());
        assert!(validate_tax_rate(f64::NAN).is_err());
        assert!(validate_tax_rate(f64::INFINITY).is_err());
    }

    #[test]
    fn test_expect_helpers_reject_wrong_types() {
        assert_eq!(expect_bool("flag", &json!(true)), Ok(true));
        assert!(matches!(
            expect_bool("flag", &json!("yes")),
            Err(ValidationError::InvalidType { .. })
        ));

        assert_eq!(
            expect_decimal_places("outputDecimalPlaces", &json!(2)),
            Ok(Precision::Places(2))
        );
        assert!(expect_decimal_places("outputDecimalPlaces", &json!(2.5)).is_err());

        assert_eq!(expect_tax_rate("taxRate", &json!(0.2)), Ok(0.2));
        assert!(expect_tax_rate("taxRate", &json!("0.2")).is_err());

        assert_eq!(
            expect_rate_type("rateType", &json!("EXCL")),
            Ok(RateType::Exclusive)
        );
        assert!(expect_rate_type("rateType", &json!(1)).is_err());
    }
}
