//! # Canonical Cache Keys
//!
//! Turns a calculation's inputs into a string that addresses its memo entry.
//!
//! ## Canonical Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  null            → null                                                 │
//! │  true / false    → true / false                                         │
//! │  1 / 1.0 / 1e0   → 1              (integer digits, no exponent)         │
//! │  1.5 / 1.50      → 15e-1          (digits + power of ten)               │
//! │  20 / 2e1        → 2e1            (trailing zeros move to exponent)     │
//! │  "1.5"           → "1.5"          (quoted, never collides with 1.5)     │
//! │  [b, a]          → [b,a]          (sequence order is kept)              │
//! │  {b: 1, a: 2}    → {"a":2,"b":1}  (field order is normalized away)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The key is a full structural serialization, not a hash: two values get
//! the same key exactly when they are equal up to record-field order and
//! number spelling.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::{Number, Value};

/// Generates the canonical cache key of a value.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use tally_core::generate_cache_key;
///
/// let a = json!({"quantity": 4, "linePrice": 20});
/// let b = json!({"linePrice": 20, "quantity": 4});
/// assert_eq!(generate_cache_key(&a), generate_cache_key(&b));
/// assert_eq!(generate_cache_key(&a), r#"{"linePrice":2e1,"quantity":4}"#);
///
/// // Equal numbers share a key whatever their spelling
/// assert_eq!(generate_cache_key(&json!(1)), generate_cache_key(&json!(1.0)));
/// ```
pub fn generate_cache_key(value: &Value) -> String {
    let mut key = String::new();
    write_canonical(value, &mut key);
    key
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            let mut sorted: Vec<(&String, &Value)> = fields.iter().collect();
            sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (name, field)) in sorted.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(name, out);
                out.push(':');
                write_canonical(field, out);
            }
            out.push('}');
        }
        Value::String(s) => write_json_string(s, out),
        Value::Number(n) => write_number(n, out),
        // null and booleans already have a single JSON spelling
        scalar => out.push_str(&scalar.to_string()),
    }
}

fn write_number(n: &Number, out: &mut String) {
    let Ok(decimal) = BigDecimal::from_str(&n.to_string()) else {
        out.push_str(&n.to_string());
        return;
    };
    // Normalized digits and scale are unique per numeric value.
    let (digits, scale) = decimal.normalized().as_bigint_and_exponent();
    if scale == 0 {
        out.push_str(&digits.to_string());
    } else {
        out.push_str(&format!("{}e{}", digits, -scale));
    }
}

fn write_json_string(s: &str, out: &mut String) {
    // Display on a Value::String produces the quoted, escaped literal.
    out.push_str(&Value::String(s.to_owned()).to_string());
}

// =============================================================================
// Unit Tests
// =============================================================================
