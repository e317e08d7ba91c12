//! pesa-core: record types, statement layout and error kinds shared by the
//! pesa statement extractors

pub mod error;
pub mod layout;
pub mod money;
pub mod statement;
pub mod transaction;

pub use error::{ExtractError, Result};
pub use layout::{CompiledLayout, MetadataLabels, StatementLayout, MAX_MONEY_FIELDS, STATUS_LOOKAHEAD};
pub use money::{clean_amount, normalize_whitespace, round2};
pub use statement::{
    DocumentProperties, KnownFingerprint, StatementMetadata, SummaryRow, NOT_AVAILABLE, UNKNOWN,
};
pub use transaction::{Direction, LedgerRow, TransactionRecord, TransactionStatus};
