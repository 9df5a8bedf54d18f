//! # tally-core: Memoizing Business-Math Calculator
//!
//! This crate does the money arithmetic for Tally: sums, price extension,
//! discounts, percentage conversions and tax extraction. Every calculation
//! runs on a decimal back-end, rounds half up to a configurable number of
//! places, and is memoized per operation.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        tally-core                                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Calculator (facade)                             │   │
//! │  │   sum · subtract_chain · unit_price · line_price                │   │
//! │  │   discounted_price · percent_to_decimal · decimal_to_percent    │   │
//! │  │   tax_rate · set_option · clear_cache · cache_stats · reset     │   │
//! │  └───────┬──────────────────┬──────────────────┬───────────────────┘   │
//! │          │                  │                  │                        │
//! │  ┌───────▼───────┐  ┌───────▼───────┐  ┌───────▼───────┐               │
//! │  │    config     │  │   cache_key   │  │     memo      │               │
//! │  │  precision    │  │  canonical    │  │  MemoStore    │               │
//! │  │  validation   │  │  JSON keys    │  │  MemoTable    │               │
//! │  └───────────────┘  └───────────────┘  └───────────────┘               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          arith (bigdecimal, 20 significant digits)              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │   NO I/O • NO GLOBAL STATE • DETERMINISTIC RESULTS                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`calculator`] - The [`Calculator`] facade and cache management
//! - [`ops`] - The eight memoized operations
//! - [`config`] - Configuration, named options and per-call overrides
//! - [`precision`] - Resolution of the effective options for one call
//! - [`cache_key`] - Canonical cache keys
//! - [`memo`] - Per-operation memo tables
//! - [`arith`] - Decimal arithmetic and rounding
//! - [`types`] - Domain types (Precision, RateType, LineItem, Operation)
//! - [`validation`] - Option validation rules
//! - [`error`] - Error types
//!
//! ## Design Principles
//!
//! 1. **Decimal Arithmetic**: inputs are converted to decimals before any
//!    arithmetic, so `0.1 + 0.2` is `0.3`
//! 2. **Permissive Calls**: calculations never fail; bad input yields a
//!    documented fallback
//! 3. **Strict Configuration**: invalid options are rejected with a typed error
//! 4. **Explicit State**: each `Calculator` owns its config and caches
//!
//! ## Example Usage
//!
//! ```rust
//! use serde_json::json;
//! use tally_core::{Calculator, CallOptions, RateType};
//!
//! let mut calc = Calculator::new();
//!
//! assert_eq!(calc.sum(&json!([0.1, 0.2]), CallOptions::new()), 0.3);
//!
//! let item = calc.line_price(Some(3.0), Some(3.335), 2);
//! assert_eq!(item.line_price, Some(10.01));
//!
//! let excl = CallOptions::new().with_tax_rate(0.0825).with_rate_type(RateType::Exclusive);
//! assert_eq!(calc.tax_rate(Some(10.0), excl.with_decimal_places(2)), 0.83);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod arith;
pub mod cache_key;
pub mod calculator;
pub mod config;
pub mod error;
pub mod memo;
pub mod ops;
pub mod precision;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cache_key::generate_cache_key;
pub use calculator::{Calculator, ALL_CACHES};
pub use config::{CalculatorConfig, CallOptions, ConfigOption};
pub use error::{CalcError, CalcResult, ValidationError};
pub use precision::ResolvedOptions;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Largest accepted number of output decimal places.
pub const MAX_DECIMAL_PLACES: u32 = 16;

/// Significant digits carried by intermediate decimal results.
pub const WORKING_PRECISION: u32 = 20;
