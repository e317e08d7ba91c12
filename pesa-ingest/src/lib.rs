//! pesa-ingest: document access plus the extraction stages that turn
//! statement page text and blocks into structured records.

pub mod document;
pub mod fingerprint;
pub mod metadata;
pub mod parsers;
#[cfg(feature = "lopdf")]
pub mod pdf;
pub mod pipeline;
pub mod recognize;
pub mod summary_table;

pub use document::{unlock, MemoryDocument, StatementDocument, TextBlock};
pub use fingerprint::{FieldMismatch, PropertyFingerprintValidator};
pub use metadata::{statement_duration_months, MetadataFieldExtractor};
pub use parsers::TransactionStreamParser;
#[cfg(feature = "lopdf")]
pub use pdf::LopdfDocument;
pub use pipeline::{StatementExtraction, StatementExtractor};
pub use recognize::StatementRecognizer;
pub use summary_table::SummaryTableExtractor;
