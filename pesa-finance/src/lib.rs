//! pesa-finance: spending/received categories and ledger reconciliation

pub mod aggregate;
pub mod reconcile;

pub use aggregate::{AggregatedCategory, CategoryAggregator, CategorySummary};
pub use reconcile::{reconcile, Reconciliation};
