//! Spending and received-money categories keyed by transaction details.

use pesa_core::{normalize_whitespace, round2, Direction, TransactionRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One details label with its total, count and contributing transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCategory {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub transaction_count: usize,
    pub transactions: Vec<TransactionRecord>,
}

/// Insertion-ordered accumulator: first-seen label order, exact-label lookup.
#[derive(Debug, Default)]
struct CategoryLedger {
    entries: Vec<AggregatedCategory>,
    index: HashMap<String, usize>,
}

impl CategoryLedger {
    fn upsert(&mut self, label: String, amount: Decimal, record: &TransactionRecord) {
        let slot = match self.index.get(&label) {
            Some(&i) => i,
            None => {
                self.entries.push(AggregatedCategory {
                    category: label.clone(),
                    total: Decimal::ZERO,
                    transaction_count: 0,
                    transactions: Vec::new(),
                });
                self.index.insert(label, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[slot];
        entry.total += amount;
        entry.transaction_count += 1;
        entry.transactions.push(record.clone());
    }

    /// Totals are rounded here, after full-precision accumulation.
    fn finish(self) -> Vec<AggregatedCategory> {
        self.entries
            .into_iter()
            .map(|mut c| {
                c.total = round2(c.total);
                c
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub spending: Vec<AggregatedCategory>,
    pub received: Vec<AggregatedCategory>,
}

pub struct CategoryAggregator;

impl CategoryAggregator {
    /// Withdrawals grouped by details, totals as magnitudes.
    pub fn spending(txns: &[TransactionRecord]) -> Vec<AggregatedCategory> {
        Self::group(txns, Direction::Withdrawn)
    }

    /// Deposits grouped by details.
    pub fn received(txns: &[TransactionRecord]) -> Vec<AggregatedCategory> {
        Self::group(txns, Direction::PaidIn)
    }

    pub fn summarize(txns: &[TransactionRecord]) -> CategorySummary {
        CategorySummary {
            spending: Self::spending(txns),
            received: Self::received(txns),
        }
    }

    fn group(txns: &[TransactionRecord], direction: Direction) -> Vec<AggregatedCategory> {
        let mut ledger = CategoryLedger::default();

        for txn in txns {
            // Zero amounts carry no money on either side.
            if txn.direction != direction || txn.amount.is_zero() {
                continue;
            }
            ledger.upsert(normalize_whitespace(&txn.details), txn.amount, txn);
        }

        let out = ledger.finish();
        log::debug!("{:?}: {} categories from {} transactions", direction, out.len(), txns.len());
        out
    }
}
