//! Cross-check the ledger against the statement's own summary table.
//!
//! A layout drift that drops or misreads ledger rows shows up as a gap
//! between what the summary table says moved and what the ledger sums to.

use pesa_core::{round2, SummaryRow, TransactionRecord, TransactionStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary-table label carrying the grand total, when the table prints one.
const TOTAL_LABEL: &str = "TOTAL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    #[serde(with = "rust_decimal::serde::float")]
    pub summary_paid_in: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub summary_paid_out: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ledger_paid_in: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub ledger_withdrawn: Decimal,
}

impl Reconciliation {
    pub fn paid_in_gap(&self) -> Decimal {
        self.summary_paid_in - self.ledger_paid_in
    }

    pub fn paid_out_gap(&self) -> Decimal {
        self.summary_paid_out - self.ledger_withdrawn
    }

    pub fn is_balanced(&self) -> bool {
        self.paid_in_gap().is_zero() && self.paid_out_gap().is_zero()
    }
}

/// Only completed transactions count towards the ledger side.
pub fn reconcile(summary: &[SummaryRow], txns: &[TransactionRecord]) -> Reconciliation {
    let (summary_paid_in, summary_paid_out) = match summary
        .iter()
        .find(|r| r.transaction_type.eq_ignore_ascii_case(TOTAL_LABEL))
    {
        Some(total) => (total.total_paid_in, total.total_paid_out),
        None => summary.iter().fold((Decimal::ZERO, Decimal::ZERO), |(i, o), r| {
            (i + r.total_paid_in, o + r.total_paid_out)
        }),
    };

    let (ledger_paid_in, ledger_withdrawn) = txns
        .iter()
        .filter(|t| t.status == TransactionStatus::Completed)
        .fold((Decimal::ZERO, Decimal::ZERO), |(i, o), t| {
            (i + t.paid_in(), o + t.withdrawn())
        });

    let rec = Reconciliation {
        summary_paid_in: round2(summary_paid_in),
        summary_paid_out: round2(summary_paid_out),
        ledger_paid_in: round2(ledger_paid_in),
        ledger_withdrawn: round2(ledger_withdrawn),
    };

    if !rec.is_balanced() {
        log::warn!(
            "ledger does not match summary table: paid in gap {}, paid out gap {}",
            rec.paid_in_gap(),
            rec.paid_out_gap()
        );
    }

    rec
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(label: &str, paid_in: i64, paid_out: i64) -> SummaryRow {
        SummaryRow {
            transaction_type: label.to_string(),
            total_paid_in: Decimal::new(paid_in, 2),
            total_paid_out: Decimal::new(paid_out, 2),
        }
    }

    fn txn(signed: i64, status: TransactionStatus) -> TransactionRecord {
        TransactionRecord::from_signed(
            "TFP39YYAD3",
            "12/01/24 10:00",
            "x",
            status,
            Decimal::new(signed, 2),
            Decimal::ZERO,
        )
    }

    #[test]
    fn test_balanced_with_total_row() {
        let summary = vec![
            row("Send Money", 0, 50000),
            row("Receive Money", 25000, 0),
            row("TOTAL", 25000, 50000),
        ];
        let txns = vec![
            txn(-50000, TransactionStatus::Completed),
            txn(25000, TransactionStatus::Completed),
            txn(-99900, TransactionStatus::Failed),
        ];
        let rec = reconcile(&summary, &txns);
        assert!(rec.is_balanced(), "{rec:?}");
    }

    #[test]
    fn test_sums_rows_without_total_and_reports_gap() {
        let summary = vec![row("Send Money", 0, 50000), row("Receive Money", 25000, 0)];
        let txns = vec![txn(-40000, TransactionStatus::Completed)];
        let rec = reconcile(&summary, &txns);

        assert!(!rec.is_balanced());
        assert_eq!(rec.paid_in_gap(), Decimal::new(25000, 2));
        assert_eq!(rec.paid_out_gap(), Decimal::new(10000, 2));
    }
}
