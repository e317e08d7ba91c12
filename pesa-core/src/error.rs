//! Error kinds surfaced by the extraction stages.

use thiserror::Error;

/// Failures that reach the caller.
///
/// Missing labels, short summary blocks and receipt-shaped tokens without a
/// status line are not errors: they are absorbed into the output shape
/// (sentinel values, skipped candidates).
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The document is encrypted and no password, or a wrong one, was supplied.
    #[error("PDF decryption failed")]
    Decryption,

    /// The bytes could not be opened as a PDF.
    #[error("invalid or corrupted PDF: {0}")]
    InvalidDocument(String),

    /// The statement period carries the separator but a side is not a
    /// `%d %b %Y` date.
    #[error("failed to parse dates in period: {period} ({reason})")]
    DateParse { period: String, reason: String },

    /// A layout pattern failed to compile.
    #[error("invalid layout pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A page index past the end of the document was requested.
    #[error("page {0} not found")]
    Page(usize),
}

impl ExtractError {
    /// True for the kinds that abort the whole pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ExtractError::Decryption | ExtractError::InvalidDocument(_))
    }
}

pub type Result<T> = std::result::Result<T, ExtractError>;
