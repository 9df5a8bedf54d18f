//! # Memoization Store
//!
//! One key→result table per calculation operation.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         MemoStore                                       │
//! │                                                                         │
//! │  sum               MemoTable<f64>        "{data,options}" → 6.0         │
//! │  subtract_chain    MemoTable<f64>                                       │
//! │  unit_price        MemoTable<LineItem>                                  │
//! │  line_price        MemoTable<LineItem>                                  │
//! │  percent_to_decimal MemoTable<Option<f64>>                              │
//! │  decimal_to_percent MemoTable<f64>                                      │
//! │  discounted_price  MemoTable<Option<f64>>                               │
//! │  tax_rate          MemoTable<f64>                                       │
//! │                                                                         │
//! │  Entries are never evicted unless a limit was configured; callers      │
//! │  clear tables explicitly.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, VecDeque};

use crate::types::{LineItem, Operation};

// =============================================================================
// Memo Table
// =============================================================================

/// A single operation's result table.
///
/// Unbounded by default. With a limit, inserting into a full table evicts
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct MemoTable<V> {
    entries: HashMap<String, V>,
    insertion_order: VecDeque<String>,
    limit: Option<usize>,
}

impl<V> Default for MemoTable<V> {
    fn default() -> Self {
        MemoTable::new(None)
    }
}

impl<V: Clone> MemoTable<V> {
    /// Returns a copy of the stored result, if any.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }
}

impl<V> MemoTable<V> {
    pub fn new(limit: Option<usize>) -> Self {
        MemoTable {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
            limit,
        }
    }

    /// Stores a result. An existing entry for the key is left as is.
    pub fn put(&mut self, key: String, value: V) {
        if self.entries.contains_key(&key) {
            return;
        }

        if let Some(limit) = self.limit {
            if limit == 0 {
                return;
            }
            while self.entries.len() >= limit {
                match self.insertion_order.pop_front() {
                    Some(oldest) => {
                        self.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            self.insertion_order.push_back(key.clone());
        }

        self.entries.insert(key, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Memo Store
// =============================================================================

/// All eight tables, addressed by [`Operation`].
#[derive(Debug, Clone, Default)]
pub struct MemoStore {
    pub(crate) sum: MemoTable<f64>,
    pub(crate) subtract_chain: MemoTable<f64>,
    pub(crate) unit_price: MemoTable<LineItem>,
    pub(crate) line_price: MemoTable<LineItem>,
    pub(crate) percent_to_decimal: MemoTable<Option<f64>>,
    pub(crate) decimal_to_percent: MemoTable<f64>,
    pub(crate) discounted_price: MemoTable<Option<f64>>,
    pub(crate) tax_rate: MemoTable<f64>,
}

impl MemoStore {
    /// Creates a store whose tables each hold at most `limit` entries.
    pub fn bounded(limit: usize) -> Self {
        MemoStore {
            sum: MemoTable::new(Some(limit)),
            subtract_chain: MemoTable::new(Some(limit)),
            unit_price: MemoTable::new(Some(limit)),
            line_price: MemoTable::new(Some(limit)),
            percent_to_decimal: MemoTable::new(Some(limit)),
            decimal_to_percent: MemoTable::new(Some(limit)),
            discounted_price: MemoTable::new(Some(limit)),
            tax_rate: MemoTable::new(Some(limit)),
        }
    }

    /// Number of entries in one operation's table.
    pub fn len(&self, op: Operation) -> usize {
        match op {
            Operation::Sum => self.sum.len(),
            Operation::SubtractChain => self.subtract_chain.len(),
            Operation::UnitPrice => self.unit_price.len(),
            Operation::LinePrice => self.line_price.len(),
            Operation::PercentToDecimal => self.percent_to_decimal.len(),
            Operation::DecimalToPercent => self.decimal_to_percent.len(),
            Operation::DiscountedPrice => self.discounted_price.len(),
            Operation::TaxRate => self.tax_rate.len(),
        }
    }

    /// Empties one operation's table.
    pub fn clear(&mut self, op: Operation) {
        match op {
            Operation::Sum => self.sum.clear(),
            Operation::SubtractChain => self.subtract_chain.clear(),
            Operation::UnitPrice => self.unit_price.clear(),
            Operation::LinePrice => self.line_price.clear(),
            Operation::PercentToDecimal => self.percent_to_decimal.clear(),
            Operation::DecimalToPercent => self.decimal_to_percent.clear(),
            Operation::DiscountedPrice => self.discounted_price.clear(),
            Operation::TaxRate => self.tax_rate.clear(),
        }
    }

    pub fn clear_all(&mut self) {
        for op in Operation::ALL {
            self.clear(op);
        }
    }

    /// Entries across all tables.
    pub fn total_len(&self) -> usize {
        Operation::ALL.iter().map(|op| self.len(*op)).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
