//! # Precision Resolution
//!
//! Reconciles the configured default, the per-call override and the
//! keep-input-max-precision flag into the one precision a call rounds to.
//!
//! ## Precedence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  overlay.output_decimal_places valid?  ── yes ──► use it               │
//! │                │                                                        │
//! │                no (absent or out of range)                              │
//! │                ▼                                                        │
//! │  keep flag (overlay, else config) set? ── yes ──► Unrounded            │
//! │                │                                                        │
//! │                no                                                       │
//! │                ▼                                                        │
//! │  config.output_decimal_places                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution never fails: invalid overrides fall through to the next step.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::{CalculatorConfig, CallOptions};
use crate::types::{Precision, RateType};

/// The configuration a single call actually runs with.
///
/// Always part of the cache key, so a configuration change can never
/// surface a result computed under different settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedOptions {
    pub precision: Precision,
    pub tax_rate: f64,
    pub rate_type: RateType,
}

impl ResolvedOptions {
    /// JSON form embedded in cache keys.
    pub(crate) fn to_key_value(&self) -> Value {
        json!({
            "precision": self.precision,
            "taxRate": self.tax_rate,
            "rateType": self.rate_type,
        })
    }
}

/// Resolves the output precision for one call.
///
/// ## Example
/// ```rust
/// use tally_core::precision::resolve_precision;
/// use tally_core::{CalculatorConfig, CallOptions, Precision};
///
/// let config = CalculatorConfig {
///     output_decimal_places: Precision::Places(2),
///     ..CalculatorConfig::default()
/// };
///
/// // Per-call override wins
/// let overlay = CallOptions::new().with_decimal_places(4);
/// assert_eq!(resolve_precision(&config, &overlay), Precision::Places(4));
///
/// // Out-of-range override is ignored
/// let overlay = CallOptions::new().with_precision(Precision::Places(40));
/// assert_eq!(resolve_precision(&config, &overlay), Precision::Places(2));
/// ```
pub fn resolve_precision(config: &CalculatorConfig, overlay: &CallOptions) -> Precision {
    match overlay.output_decimal_places {
        Some(precision) if precision.is_valid() => return precision,
        Some(precision) => {
            debug!(%precision, "Ignoring out-of-range decimal places override");
        }
        None => {}
    }

    let keep = overlay
        .keep_input_max_precision
        .unwrap_or(config.keep_input_max_precision);
    if keep {
        return Precision::Unrounded;
    }

    config.output_decimal_places
}

/// Resolves every option a call depends on.
///
/// Tax rate and rate type are taken from the overlay when present; range
/// checks on the rate belong to the tax operation, which has its own
/// fallback policy.
pub fn resolve(config: &CalculatorConfig, overlay: &CallOptions) -> ResolvedOptions {
    ResolvedOptions {
        precision: resolve_precision(config, overlay),
        tax_rate: overlay.tax_rate.unwrap_or(config.tax_rate),
        rate_type: overlay.rate_type.unwrap_or(config.rate_type),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
