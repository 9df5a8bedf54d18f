//! # Arithmetic Adapter
//!
//! The single seam between the calculation operations and the decimal
//! back-end (`bigdecimal`).
//!
//! ## Why Decimal Arithmetic?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64:                                                              │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: base-10 decimals                                         │
//! │    f64 ──(shortest round-trip text)──► BigDecimal 0.1                   │
//! │    BigDecimal 0.1 + BigDecimal 0.2 = BigDecimal 0.3                     │
//! │    BigDecimal ──(round half up, N places)──► f64 0.3                    │
//! │                                                                         │
//! │  Every finite f64 is representable: 1e300 and 1e-300 alike.             │
//! │  Results are trimmed to 20 significant digits, whatever the exponent.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation builds a fresh [`Arith`] for the call, so nothing about
//! one call's rounding can leak into another.

use std::num::NonZeroU64;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive, Zero};
use serde_json::Number;

use crate::error::{ArithError, ArithResult};
use crate::types::Precision;
use crate::WORKING_PRECISION;

/// A per-call decimal calculator with a fixed working precision and
/// rounding policy.
#[derive(Debug, Clone, Copy)]
pub struct Arith {
    significant_digits: NonZeroU64,
    rounding: RoundingMode,
}

impl Default for Arith {
    fn default() -> Self {
        Arith::new()
    }
}

impl Arith {
    /// Working precision of 20 significant digits, round half up.
    pub fn new() -> Self {
        Arith {
            significant_digits: NonZeroU64::new(u64::from(WORKING_PRECISION))
                .unwrap_or(NonZeroU64::MIN),
            rounding: RoundingMode::HalfUp,
        }
    }

    // =========================================================================
    // Conversion In
    // =========================================================================

    /// Converts a host float through its shortest round-trip text, so `0.1`
    /// becomes exactly `0.1` rather than its binary approximation.
    pub fn from_f64(&self, value: f64) -> ArithResult<BigDecimal> {
        if !value.is_finite() {
            return Err(ArithError::NotRepresentable(value));
        }

        BigDecimal::from_str(&value.to_string())
            .map(|d| self.normalize(d))
            .map_err(|_| ArithError::NotRepresentable(value))
    }

    /// Converts a JSON number through its literal text.
    pub fn from_number(&self, number: &Number) -> ArithResult<BigDecimal> {
        match BigDecimal::from_str(&number.to_string()) {
            Ok(d) => Ok(self.normalize(d)),
            Err(_) => self.from_f64(number.as_f64().unwrap_or(f64::NAN)),
        }
    }

    // =========================================================================
    // Arithmetic
    // =========================================================================

    pub fn add(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.normalize(a + b)
    }

    pub fn sub(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.normalize(a - b)
    }

    pub fn mul(&self, a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
        self.normalize(a * b)
    }

    /// Divides `a` by `b`.
    ///
    /// Callers guard zero denominators themselves; a zero here is reported
    /// rather than propagated as infinity.
    pub fn div(&self, a: &BigDecimal, b: &BigDecimal) -> ArithResult<BigDecimal> {
        if b.is_zero() {
            return Err(ArithError::DivisionByZero);
        }
        Ok(self.normalize(a / b))
    }

    // =========================================================================
    // Conversion Out
    // =========================================================================

    /// Rounds half up to the resolved precision and converts to `f64`.
    ///
    /// Fails with [`ArithError::Overflow`] when the result is beyond the
    /// `f64` range.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::arith::Arith;
    /// use tally_core::Precision;
    ///
    /// let arith = Arith::new();
    /// let ten = arith.from_f64(10.0).unwrap();
    /// let three = arith.from_f64(3.0).unwrap();
    /// let third = arith.div(&ten, &three).unwrap();
    /// assert_eq!(arith.round_to(&third, Precision::Places(2)), Ok(3.33));
    ///
    /// let half = arith.from_f64(2.5).unwrap();
    /// assert_eq!(arith.round_to(&half, Precision::Places(0)), Ok(3.0));
    /// ```
    pub fn round_to(&self, value: &BigDecimal, precision: Precision) -> ArithResult<f64> {
        let rounded = match precision.places() {
            Some(places) => value.with_scale_round(i64::from(places), self.rounding),
            None => value.clone(),
        };
        // Parsing the decimal text gives the nearest f64, so 3.33 comes back
        // as the literal 3.33.
        let out = rounded
            .to_string()
            .parse::<f64>()
            .ok()
            .or_else(|| rounded.to_f64())
            .ok_or(ArithError::Overflow)?;

        if out.is_finite() {
            Ok(out)
        } else {
            Err(ArithError::Overflow)
        }
    }

    /// Trims a result to the working precision.
    fn normalize(&self, value: BigDecimal) -> BigDecimal {
        if value.is_zero() {
            return BigDecimal::zero();
        }
        value
            .with_precision_round(self.significant_digits, self.rounding)
            .normalized()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
