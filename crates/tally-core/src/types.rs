//! # Domain Types
//!
//! Value types shared by the configuration, the resolver, the memo store and
//! the calculation operations.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Precision     │   │    RateType     │   │    LineItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Unrounded      │   │  Free           │   │  quantity       │       │
//! │  │  Places(0..=16) │   │  Inclusive      │   │  unit_price     │       │
//! │  │                 │   │  Exclusive      │   │  line_price     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │   Operation     │   │   CacheStats    │                             │
//! │  │  8 variants,    │   │  per-operation  │                             │
//! │  │  one memo table │   │  entry counts   │                             │
//! │  │  each           │   │  + total        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::MAX_DECIMAL_PLACES;

// =============================================================================
// Precision
// =============================================================================

/// Output precision of a calculation result.
///
/// ## Why an enum?
/// The `-1` marker for "do not round" becomes its own variant, so
/// `Places(0)` (round to an integer) can never be confused with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Return the raw working-precision result.
    #[default]
    Unrounded,
    /// Round half up to this many decimal places.
    Places(u32),
}

impl Precision {
    /// Maps the integer form used by option bags and environment variables.
    ///
    /// `-1` is unrounded, `0..=16` are decimal places, anything else is
    /// rejected.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::Precision;
    ///
    /// assert_eq!(Precision::from_places(-1), Some(Precision::Unrounded));
    /// assert_eq!(Precision::from_places(2), Some(Precision::Places(2)));
    /// assert_eq!(Precision::from_places(17), None);
    /// ```
    pub fn from_places(places: i64) -> Option<Self> {
        match places {
            -1 => Some(Precision::Unrounded),
            0..=16 => Some(Precision::Places(places as u32)),
            _ => None,
        }
    }

    /// Returns true for `Unrounded` and for `Places(n)` with `n <= 16`.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        match self {
            Precision::Unrounded => true,
            Precision::Places(n) => *n <= MAX_DECIMAL_PLACES,
        }
    }

    /// Decimal places to round to, or `None` when unrounded.
    #[inline]
    pub const fn places(&self) -> Option<u32> {
        match self {
            Precision::Unrounded => None,
            Precision::Places(n) => Some(*n),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Unrounded => write!(f, "unrounded"),
            Precision::Places(n) => write!(f, "{} places", n),
        }
    }
}

// =============================================================================
// Rate Type
// =============================================================================

/// How a tax rate relates to the price it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RateType {
    /// Not taxed; the tax portion is always zero.
    Free,

    /// Tax is included in the price (EU style).
    /// Tax portion = price / (1 + rate) × rate
    #[default]
    Inclusive,

    /// Tax is charged on top of the price (US style).
    /// Tax portion = price × rate
    Exclusive,
}

impl RateType {
    /// Canonical names, used in error messages.
    pub const NAMES: [&'static str; 3] = ["free", "inclusive", "exclusive"];
}

impl fmt::Display for RateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateType::Free => write!(f, "free"),
            RateType::Inclusive => write!(f, "inclusive"),
            RateType::Exclusive => write!(f, "exclusive"),
        }
    }
}

impl FromStr for RateType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `*_gst` are the legacy option values; older configs still use them.
        match s.to_lowercase().as_str() {
            "free" | "gst_free" => Ok(RateType::Free),
            "inclusive" | "incl" | "incl_gst" => Ok(RateType::Inclusive),
            "exclusive" | "excl" | "excl_gst" => Ok(RateType::Exclusive),
            _ => Err(ValidationError::NotAllowed {
                field: "rateType".to_string(),
                allowed: RateType::NAMES.iter().map(|n| n.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// Quantity, unit price and line price of one line.
///
/// Returned by `unit_price` and `line_price`; any field may be `None` when
/// the caller left it empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub quantity: Option<f64>,
    pub unit_price: Option<f64>,
    pub line_price: Option<f64>,
}

impl LineItem {
    /// A line item with every field empty.
    #[inline]
    pub const fn empty() -> Self {
        LineItem {
            quantity: None,
            unit_price: None,
            line_price: None,
        }
    }
}

// =============================================================================
// Operation
// =============================================================================

/// The memoized calculation operations; each owns one cache table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Sum,
    SubtractChain,
    UnitPrice,
    LinePrice,
    PercentToDecimal,
    DecimalToPercent,
    DiscountedPrice,
    TaxRate,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 8] = [
        Operation::Sum,
        Operation::SubtractChain,
        Operation::UnitPrice,
        Operation::LinePrice,
        Operation::PercentToDecimal,
        Operation::DecimalToPercent,
        Operation::DiscountedPrice,
        Operation::TaxRate,
    ];

    /// Stable camelCase name used by `clear_cache` and `cache_stats`.
    pub const fn name(&self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::SubtractChain => "subtractChain",
            Operation::UnitPrice => "unitPrice",
            Operation::LinePrice => "linePrice",
            Operation::PercentToDecimal => "percentToDecimal",
            Operation::DecimalToPercent => "decimalToPercent",
            Operation::DiscountedPrice => "discountedPrice",
            Operation::TaxRate => "taxRate",
        }
    }

    /// Looks an operation up by its camelCase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Cache Statistics
// =============================================================================

/// Entry counts of the memo tables.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Entries per queried operation.
    pub by_operation: BTreeMap<Operation, usize>,
    /// Sum of all counts in `by_operation`.
    pub total: usize,
}

impl CacheStats {
    /// Entry count for one operation (0 if it was not part of the query).
    pub fn count(&self, op: Operation) -> usize {
        self.by_operation.get(&op).copied().unwrap_or(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_places() {
        assert_eq!(Precision::from_places(-1), Some(Precision::Unrounded));
        assert_eq!(Precision::from_places(0), Some(Precision::Places(0)));
        assert_eq!(Precision::from_places(16), Some(Precision::Places(16)));
        assert_eq!(Precision::from_places(17), None);
        assert_eq!(Precision::from_places(-2), None);
    }

    #[test]
    fn test_precision_validity() {
        assert!(Precision::Unrounded.is_valid());
        assert!(Precision::Places(0).is_valid());
        assert!(!Precision::Places(17).is_valid());
        assert_eq!(Precision::Unrounded.places(), None);
        assert_eq!(Precision::Places(3).places(), Some(3));
        assert_eq!(Precision::default(), Precision::Unrounded);
    }

    #[test]
    fn test_rate_type_parses_gst_spellings() {
        assert_eq!("incl_gst".parse::<RateType>(), Ok(RateType::Inclusive));
        assert_eq!("excl_gst".parse::<RateType>(), Ok(RateType::Exclusive));
        assert_eq!("gst_free".parse::<RateType>(), Ok(RateType::Free));
        assert_eq!("INCL_GST".parse::<RateType>(), Ok(RateType::Inclusive));
        // Only the canonical names are advertised
        assert!(!RateType::NAMES.contains(&"incl_gst"));
    }

    #[test]
    fn test_rate_type_parsing() {
        assert_eq!("inclusive".parse::<RateType>(), Ok(RateType::Inclusive));
        assert_eq!("INCL".parse::<RateType>(), Ok(RateType::Inclusive));
        assert_eq!("Exclusive".parse::<RateType>(), Ok(RateType::Exclusive));
        assert_eq!("FREE".parse::<RateType>(), Ok(RateType::Free));
        assert!(matches!(
            "vat".parse::<RateType>(),
            Err(ValidationError::NotAllowed { .. })
        ));
    }

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_name(op.name()), Some(op));
        }
        assert_eq!(Operation::from_name("computeRate"), None);
        assert_eq!(Operation::from_name("all"), None);
    }

    #[test]
    fn test_line_item_serializes_camel_case() {
        let item = LineItem {
            quantity: Some(4.0),
            unit_price: Some(5.0),
            line_price: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"quantity":4.0,"unitPrice":5.0,"linePrice":null}"#);
    }
}
