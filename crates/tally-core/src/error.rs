//! # Error Types
//!
//! Error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  Configuration time (strict, returned to the caller)                    │
//! │  ├── CalcError        - Unknown option names, wraps validation errors   │
//! │  └── ValidationError  - Out-of-range or wrongly typed option values     │
//! │                                                                         │
//! │  Call time (permissive, never returned)                                 │
//! │  └── ArithError       - Non-finite input / result beyond f64 range      │
//! │                         → logged, operation falls back to null or zero  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Name the offending field and its valid range in the message
//! 3. Calculation calls never return errors; bad data maps to a fallback value

use thiserror::Error;

// =============================================================================
// Calc Error
// =============================================================================

/// Errors raised while configuring a [`Calculator`](crate::Calculator).
#[derive(Debug, Error)]
pub enum CalcError {
    /// The option name is not one of the known configuration fields.
    ///
    /// ## When This Occurs
    /// - `set_option_named("precision", ..)` (typo or removed option)
    #[error("Unknown configuration option: {0}")]
    UnknownOption(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Option value validation errors.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Decimal places outside `[0, 16]` and not the `-1` unrounded marker.
    #[error("outputDecimalPlaces must be between 0 and 16, or -1 for unrounded (got {value})")]
    InvalidDecimalPlaces { value: i64 },

    /// The value has the wrong JSON type for this field.
    #[error("{field} must be {expected}")]
    InvalidType { field: String, expected: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Arithmetic Error
// =============================================================================

/// Failures inside the decimal adapter.
///
/// These never cross the public API: each operation maps them to its
/// documented fallback value.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ArithError {
    /// The result does not fit in an `f64`.
    #[error("result exceeds the f64 range")]
    Overflow,

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0} cannot be represented as a decimal")]
    NotRepresentable(f64),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CalcError.
pub type CalcResult<T> = Result<T, CalcError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for the decimal adapter.
pub type ArithResult<T> = Result<T, ArithError>;

// =============================================================================
// Unit Tests
// =============================================================================
