//! Statement-level records: document properties, customer metadata and the
//! aggregate summary table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sentinel for a label-anchored field that is missing from the page.
pub const UNKNOWN: &str = "Unknown";

/// Sentinel for a document property the PDF Info dictionary does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Embedded document properties, read once per document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentProperties {
    pub subject: String,
    pub author: String,
    pub keywords: String,
    pub producer: String,
    pub creator: String,
    /// `PDF-<version>`, e.g. `PDF-1.7`
    pub format: String,
    /// `YYYY-MM-DD HH:MM:SS` or `N/A`
    pub created: String,
    /// `YYYY-MM-DD HH:MM:SS` or `N/A`
    pub modified: String,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            subject: na(),
            author: na(),
            keywords: na(),
            producer: na(),
            creator: na(),
            format: na(),
            created: na(),
            modified: na(),
        }
    }
}

/// Reference property values identifying a known statement producer.
///
/// Only the fields that are `Some` take part in a match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownFingerprint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl KnownFingerprint {
    /// (field, expected, actual) for every field this fingerprint pins.
    pub fn pinned<'a>(&'a self, props: &'a DocumentProperties) -> Vec<(&'static str, &'a str, &'a str)> {
        [
            ("subject", &self.subject, &props.subject),
            ("author", &self.author, &props.author),
            ("keywords", &self.keywords, &props.keywords),
            ("producer", &self.producer, &props.producer),
            ("creator", &self.creator, &props.creator),
            ("format", &self.format, &props.format),
        ]
        .into_iter()
        .filter_map(|(field, expected, actual)| {
            expected.as_deref().map(|e| (field, e, actual.as_str()))
        })
        .collect()
    }
}

/// Customer identity and statement period from the first page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementMetadata {
    pub customer_name: String,
    pub mobile_number: String,
    pub email_address: String,
    pub statement_period: String,
    pub request_date: String,
    /// None when the period is missing or carries no date separator.
    pub statement_duration_months: Option<u32>,
}

/// One row of the "transaction type / paid in / paid out" table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub transaction_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid_in: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid_out: Decimal,
}
