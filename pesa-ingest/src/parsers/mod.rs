//! Statement ledger parsers.

pub mod transaction_stream;

pub use transaction_stream::TransactionStreamParser;
