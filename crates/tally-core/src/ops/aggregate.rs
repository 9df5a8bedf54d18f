//! Sums and subtraction chains over loosely typed inputs.

use bigdecimal::{BigDecimal, Zero};
use serde_json::{json, Value};

use super::{call_key, fallback_on_error, memoized, numeric_leaves};
use crate::arith::Arith;
use crate::calculator::Calculator;
use crate::config::CallOptions;
use crate::types::Operation;

impl Calculator {
    /// Adds up a number, a sequence of numbers, or the values of a record.
    ///
    /// Non-numeric entries are skipped; nothing to add yields `0`. Every
    /// JSON number takes part, however large or small.
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tally_core::{Calculator, CallOptions};
    ///
    /// let mut calc = Calculator::new();
    /// assert_eq!(calc.sum(&json!([0.1, 0.2]), CallOptions::new()), 0.3);
    /// assert_eq!(calc.sum(&json!({"a": 1, "b": 2, "c": 3}), CallOptions::new()), 6.0);
    /// assert_eq!(calc.sum(&json!([1.111, 2.222]), CallOptions::from(2)), 3.33);
    /// assert_eq!(calc.sum(&json!([]), CallOptions::new()), 0.0);
    /// ```
    pub fn sum(&mut self, data: &Value, options: impl Into<CallOptions>) -> f64 {
        let resolved = self.resolve(&options.into());
        let key = call_key(json!({ "data": data }), &resolved);
        let arith = Arith::new();

        let result = memoized(&mut self.store.sum, Operation::Sum, key, || {
            let mut total = BigDecimal::zero();
            for number in numeric_leaves(data) {
                total = arith.add(&total, &arith.from_number(number)?);
            }
            arith.round_to(&total, resolved.precision)
        });

        fallback_on_error(Operation::Sum, result, 0.0)
    }

    /// Subtracts one number or each number of a sequence from `initial`.
    ///
    /// A non-numeric `initial` counts as `0`; non-numeric subtrahends are
    /// skipped.
    ///
    /// ## Example
    /// ```rust
    /// use serde_json::json;
    /// use tally_core::{Calculator, CallOptions};
    ///
    /// let mut calc = Calculator::new();
    /// assert_eq!(calc.subtract_chain(&json!(10), &json!([1, 2, 3]), CallOptions::new()), 4.0);
    /// assert_eq!(calc.subtract_chain(&json!(0.3), &json!(0.1), CallOptions::new()), 0.2);
    /// assert_eq!(calc.subtract_chain(&json!(null), &json!([5]), CallOptions::new()), -5.0);
    /// ```
    pub fn subtract_chain(
        &mut self,
        initial: &Value,
        subtrahends: &Value,
        options: impl Into<CallOptions>,
    ) -> f64 {
        let resolved = self.resolve(&options.into());
        let key = call_key(
            json!({ "initial": initial, "subtrahends": subtrahends }),
            &resolved,
        );
        let arith = Arith::new();

        let result = memoized(
            &mut self.store.subtract_chain,
            Operation::SubtractChain,
            key,
            || {
                let mut total = match initial {
                    Value::Number(n) => arith.from_number(n)?,
                    _ => BigDecimal::zero(),
                };
                let subtrahends = match subtrahends {
                    Value::Number(_) | Value::Array(_) => numeric_leaves(subtrahends),
                    _ => Vec::new(),
                };
                for number in subtrahends {
                    total = arith.sub(&total, &arith.from_number(number)?);
                }
                arith.round_to(&total, resolved.precision)
            },
        );

        fallback_on_error(Operation::SubtractChain, result, 0.0)
    }
}
