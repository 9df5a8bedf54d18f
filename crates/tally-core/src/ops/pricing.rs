//! Unit price, line price and discount calculations.
//!
//! ## Line Price Relationships
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   unit_price = line_price / quantity     (quantity 0 → line_price)      │
//! │   line_price = quantity × unit_price     (quantity 0 → 0)               │
//! │                                                                         │
//! │   Missing quantity means "a single line": unit price = line price.     │
//! │   Missing price means nothing can be derived: derived price is None.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::json;
use tracing::{error, warn};

use super::{call_key, fallback_on_error, finite, memoized};
use crate::arith::Arith;
use crate::calculator::Calculator;
use crate::config::CallOptions;
use crate::types::{LineItem, Operation};

impl Calculator {
    /// Derives the unit price from a quantity and a line price.
    ///
    /// ## Edge Cases
    /// | quantity | line_price | result                                  |
    /// |----------|------------|-----------------------------------------|
    /// | `None`   | `None`     | all `None`                              |
    /// | `None`   | `p`        | `unit_price = p`                        |
    /// | `q`      | `None`     | `unit_price = line_price = None`        |
    /// | `0`      | `p`        | `unit_price = p` (no division)          |
    ///
    /// NaN and infinities count as `None`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Calculator, CallOptions, LineItem};
    ///
    /// let mut calc = Calculator::new();
    /// let item = calc.unit_price(Some(4.0), Some(20.0), CallOptions::new());
    /// assert_eq!(
    ///     item,
    ///     LineItem { quantity: Some(4.0), unit_price: Some(5.0), line_price: Some(20.0) }
    /// );
    /// ```
    pub fn unit_price(
        &mut self,
        quantity: Option<f64>,
        line_price: Option<f64>,
        options: impl Into<CallOptions>,
    ) -> LineItem {
        let (quantity, line_price) = match (finite(quantity), finite(line_price)) {
            (None, None) => return LineItem::empty(),
            (None, Some(price)) => {
                return LineItem {
                    quantity: None,
                    unit_price: Some(price),
                    line_price: Some(price),
                }
            }
            (Some(q), None) => {
                return LineItem {
                    quantity: Some(q),
                    unit_price: None,
                    line_price: None,
                }
            }
            (Some(q), Some(price)) if q == 0.0 => {
                return LineItem {
                    quantity: Some(q),
                    unit_price: Some(price),
                    line_price: Some(price),
                }
            }
            (Some(q), Some(price)) => (q, price),
        };

        let resolved = self.resolve(&options.into());
        let key = call_key(
            json!({ "quantity": quantity, "linePrice": line_price }),
            &resolved,
        );
        let arith = Arith::new();

        let result = memoized(&mut self.store.unit_price, Operation::UnitPrice, key, || {
            let unit = arith.div(&arith.from_f64(line_price)?, &arith.from_f64(quantity)?)?;
            Ok(LineItem {
                quantity: Some(quantity),
                unit_price: Some(arith.round_to(&unit, resolved.precision)?),
                line_price: Some(line_price),
            })
        });

        fallback_on_error(
            Operation::UnitPrice,
            result,
            LineItem {
                quantity: Some(quantity),
                unit_price: None,
                line_price: Some(line_price),
            },
        )
    }

    /// Derives the line price from a quantity and a unit price.
    ///
    /// ## Edge Cases
    /// | quantity | unit_price | result                                  |
    /// |----------|------------|-----------------------------------------|
    /// | `None`   | `None`     | all `None`                              |
    /// | `None`   | `u`        | `line_price = u`                        |
    /// | `q`      | `None`     | `line_price = None`                     |
    /// | `0`      | `u`        | `line_price = 0`                        |
    /// | `< 0`    | any        | quantity clamped to `0` (logged)        |
    pub fn line_price(
        &mut self,
        quantity: Option<f64>,
        unit_price: Option<f64>,
        options: impl Into<CallOptions>,
    ) -> LineItem {
        let quantity = finite(quantity).map(|q| {
            if q < 0.0 {
                warn!(quantity = q, "Quantity must not be negative, using 0");
                0.0
            } else {
                q
            }
        });

        let (quantity, unit_price) = match (quantity, finite(unit_price)) {
            (None, None) => return LineItem::empty(),
            (None, Some(price)) => {
                return LineItem {
                    quantity: None,
                    unit_price: Some(price),
                    line_price: Some(price),
                }
            }
            (Some(q), None) => {
                return LineItem {
                    quantity: Some(q),
                    unit_price: None,
                    line_price: None,
                }
            }
            (Some(q), Some(price)) if q == 0.0 => {
                return LineItem {
                    quantity: Some(0.0),
                    unit_price: Some(price),
                    line_price: Some(0.0),
                }
            }
            (Some(q), Some(price)) => (q, price),
        };

        let resolved = self.resolve(&options.into());
        let key = call_key(
            json!({ "quantity": quantity, "unitPrice": unit_price }),
            &resolved,
        );
        let arith = Arith::new();

        let result = memoized(&mut self.store.line_price, Operation::LinePrice, key, || {
            let line = arith.mul(&arith.from_f64(quantity)?, &arith.from_f64(unit_price)?);
            Ok(LineItem {
                quantity: Some(quantity),
                unit_price: Some(unit_price),
                line_price: Some(arith.round_to(&line, resolved.precision)?),
            })
        });

        fallback_on_error(
            Operation::LinePrice,
            result,
            LineItem {
                quantity: Some(quantity),
                unit_price: Some(unit_price),
                line_price: None,
            },
        )
    }

    /// Applies a discount rate (0.2 = 20% off) to a price.
    ///
    /// ## Edge Cases
    /// - either input `None`/NaN → `None`
    /// - negative price or negative rate → the price, unchanged (logged)
    /// - rate `0` → the price; rate `1` → `0`
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::{Calculator, CallOptions};
    ///
    /// let mut calc = Calculator::new();
    /// assert_eq!(calc.discounted_price(Some(100.0), Some(0.2), CallOptions::new()), Some(80.0));
    /// assert_eq!(calc.discounted_price(None, Some(0.2), CallOptions::new()), None);
    /// ```
    pub fn discounted_price(
        &mut self,
        price: Option<f64>,
        rate: Option<f64>,
        options: impl Into<CallOptions>,
    ) -> Option<f64> {
        let (price, rate) = (finite(price)?, finite(rate)?);

        if price < 0.0 {
            error!(price, "Original price must not be negative, returning it unchanged");
            return Some(price);
        }
        if rate == 0.0 {
            return Some(price);
        }
        if rate == 1.0 {
            return Some(0.0);
        }
        if rate < 0.0 {
            error!(
                rate,
                "Discount rate must be within [0, 1]; convert percentages with percent_to_decimal first"
            );
            return Some(price);
        }

        let resolved = self.resolve(&options.into());
        let key = call_key(json!({ "price": price, "rate": rate }), &resolved);
        let arith = Arith::new();

        let result = memoized(
            &mut self.store.discounted_price,
            Operation::DiscountedPrice,
            key,
            || {
                let original = arith.from_f64(price)?;
                let discount = arith.mul(&original, &arith.from_f64(rate)?);
                let discounted = arith.sub(&original, &discount);
                Ok(Some(arith.round_to(&discounted, resolved.precision)?))
            },
        );

        fallback_on_error(Operation::DiscountedPrice, result, None)
    }
}
