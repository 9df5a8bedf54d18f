//! # Calculation Operations
//!
//! The eight memoized operations, grouped by what they compute:
//!
//! - [`aggregate`] - `sum`, `subtract_chain`
//! - [`pricing`] - `unit_price`, `line_price`, `discounted_price`
//! - [`rates`] - `percent_to_decimal`, `decimal_to_percent`, `tax_rate`
//!
//! Every operation follows the same template: sanitize → resolve options →
//! cache key → lookup → compute with [`Arith`](crate::arith::Arith) → round →
//! store. Inputs that hit a documented fallback (`None`, `0`, or the input
//! passed through) return before the cache is touched.

pub mod aggregate;
pub mod pricing;
pub mod rates;

use serde_json::{json, Number, Value};
use tracing::{debug, error};

use crate::cache_key::generate_cache_key;
use crate::error::ArithResult;
use crate::memo::MemoTable;
use crate::precision::ResolvedOptions;
use crate::types::Operation;

/// Cache key for one call: the raw inputs plus everything the call resolved.
pub(crate) fn call_key(inputs: Value, resolved: &ResolvedOptions) -> String {
    generate_cache_key(&json!({
        "inputs": inputs,
        "options": resolved.to_key_value(),
    }))
}

/// Returns the stored result for `key`, or computes, stores and returns it.
///
/// A failed computation is returned to the caller and nothing is stored.
pub(crate) fn memoized<V, F>(
    table: &mut MemoTable<V>,
    op: Operation,
    key: String,
    compute: F,
) -> ArithResult<V>
where
    V: Clone,
    F: FnOnce() -> ArithResult<V>,
{
    if let Some(hit) = table.get(&key) {
        debug!(operation = %op, "Cache hit");
        return Ok(hit);
    }

    debug!(operation = %op, "Cache miss");
    let value = compute()?;
    table.put(key, value.clone());
    Ok(value)
}

/// Logs an arithmetic failure and hands back the operation's fallback.
pub(crate) fn fallback_on_error<V>(op: Operation, result: ArithResult<V>, fallback: V) -> V {
    result.unwrap_or_else(|err| {
        error!(operation = %op, error = %err, "Calculation failed, returning fallback");
        fallback
    })
}

/// The numeric leaves of a scalar, sequence or record.
///
/// Anything that is not a JSON number (strings, null, booleans, nested
/// containers) is skipped. JSON numbers are always finite.
pub(crate) fn numeric_leaves(data: &Value) -> Vec<&Number> {
    match data {
        Value::Number(n) => vec![n],
        Value::Array(items) => items.iter().filter_map(as_number).collect(),
        Value::Object(fields) => fields.values().filter_map(as_number).collect(),
        _ => Vec::new(),
    }
}

fn as_number(value: &Value) -> Option<&Number> {
    match value {
        Value::Number(n) => Some(n),
        _ => None,
    }
}

/// Treats NaN and ±∞ like a missing value.
#[inline]
pub(crate) fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
