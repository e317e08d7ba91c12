//! Itemized ledger entries recovered from the detailed statement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status column of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Failed,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Pending => "Pending",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of the ledger an amount sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    PaidIn,
    Withdrawn,
}

/// One ledger entry.
///
/// `amount` is always a non-negative magnitude; `direction` says whether it
/// was paid in or withdrawn. Serialized with the statement's column names
/// (`paid_in`, `withdrawn`), the inactive column being zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "LedgerRow", try_from = "LedgerRow")]
pub struct TransactionRecord {
    pub receipt_no: String,
    pub completion_time: String,
    pub details: String,
    pub status: TransactionStatus,
    pub direction: Direction,
    pub amount: Decimal,
    pub balance: Decimal,
}

impl TransactionRecord {
    /// Build a record from a signed statement amount: negative means withdrawn.
    pub fn from_signed(
        receipt_no: impl Into<String>,
        completion_time: impl Into<String>,
        details: impl Into<String>,
        status: TransactionStatus,
        signed_amount: Decimal,
        balance: Decimal,
    ) -> Self {
        let direction = if signed_amount.is_sign_negative() && !signed_amount.is_zero() {
            Direction::Withdrawn
        } else {
            Direction::PaidIn
        };
        Self {
            receipt_no: receipt_no.into(),
            completion_time: completion_time.into(),
            details: details.into(),
            status,
            direction,
            amount: signed_amount.abs(),
            balance,
        }
    }

    pub fn paid_in(&self) -> Decimal {
        match self.direction {
            Direction::PaidIn => self.amount,
            Direction::Withdrawn => Decimal::ZERO,
        }
    }

    pub fn withdrawn(&self) -> Decimal {
        match self.direction {
            Direction::Withdrawn => self.amount,
            Direction::PaidIn => Decimal::ZERO,
        }
    }
}

/// Wire shape of [`TransactionRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRow {
    pub receipt_no: String,
    pub completion_time: String,
    pub details: String,
    pub transaction_status: TransactionStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub paid_in: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub withdrawn: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

impl From<TransactionRecord> for LedgerRow {
    fn from(r: TransactionRecord) -> Self {
        LedgerRow {
            paid_in: r.paid_in(),
            withdrawn: r.withdrawn(),
            receipt_no: r.receipt_no,
            completion_time: r.completion_time,
            details: r.details,
            transaction_status: r.status,
            balance: r.balance,
        }
    }
}

impl TryFrom<LedgerRow> for TransactionRecord {
    type Error = String;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        let paid_in = row.paid_in.abs();
        let withdrawn = row.withdrawn.abs();
        if !paid_in.is_zero() && !withdrawn.is_zero() {
            return Err(format!(
                "receipt {}: paid_in and withdrawn are both non-zero",
                row.receipt_no
            ));
        }
        let (direction, amount) = if withdrawn.is_zero() {
            (Direction::PaidIn, paid_in)
        } else {
            (Direction::Withdrawn, withdrawn)
        };
        Ok(TransactionRecord {
            receipt_no: row.receipt_no,
            completion_time: row.completion_time,
            details: row.details,
            status: row.transaction_status,
            direction,
            amount,
            balance: row.balance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(amount: Decimal) -> TransactionRecord {
        TransactionRecord::from_signed(
            "TFP39YYAD3",
            "12/01/24 10:00",
            "Sent to John",
            TransactionStatus::Completed,
            amount,
            Decimal::new(150000, 2),
        )
    }

    #[test]
    fn test_negative_amount_is_withdrawal_magnitude() {
        let r = sample(Decimal::new(-50000, 2));
        assert_eq!(r.direction, Direction::Withdrawn);
        assert_eq!(r.amount, Decimal::new(50000, 2));
        assert_eq!(r.withdrawn(), Decimal::new(50000, 2));
        assert_eq!(r.paid_in(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_amount_is_paid_in() {
        let r = sample(Decimal::ZERO);
        assert_eq!(r.direction, Direction::PaidIn);
        assert_eq!(r.paid_in(), Decimal::ZERO);
        assert_eq!(r.withdrawn(), Decimal::ZERO);
    }

    #[test]
    fn test_serializes_with_statement_columns() {
        let v = serde_json::to_value(sample(Decimal::new(-50000, 2))).unwrap();
        assert_eq!(v["receipt_no"], "TFP39YYAD3");
        assert_eq!(v["transaction_status"], "Completed");
        assert_eq!(v["withdrawn"], serde_json::json!(500.0));
        assert_eq!(v["paid_in"], serde_json::json!(0.0));
        assert_eq!(v["balance"], serde_json::json!(1500.0));
    }

    #[test]
    fn test_rejects_row_with_both_columns() {
        let json = serde_json::json!({
            "receipt_no": "TFP39YYAD3",
            "completion_time": "12/01/24 10:00",
            "details": "Sent to John",
            "transaction_status": "Completed",
            "paid_in": 10.0,
            "withdrawn": 5.0,
            "balance": 0.0
        });
        assert!(serde_json::from_value::<TransactionRecord>(json).is_err());
    }
}
