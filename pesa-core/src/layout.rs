//! Statement layout: the pattern library every extractor is parameterized by.
//!
//! A layout is plain data (TOML-loadable) naming the labels, token shapes,
//! markers and window sizes of one statement format. [`StatementLayout::compile`]
//! turns it into a [`CompiledLayout`] holding the ready-to-use regexes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::statement::KnownFingerprint;
use crate::transaction::TransactionStatus;

/// Lines searched after the completion-time line for a status token.
pub const STATUS_LOOKAHEAD: usize = 7;

/// Amount/balance lines consumed after a status line.
pub const MAX_MONEY_FIELDS: usize = 2;

/// Labels anchoring the first-page customer fields (`<Label> : <value>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataLabels {
    pub customer_name: String,
    pub mobile_number: String,
    pub email_address: String,
    pub statement_period: String,
    pub request_date: String,
}

impl Default for MetadataLabels {
    fn default() -> Self {
        Self {
            customer_name: "Customer Name".to_string(),
            mobile_number: "Mobile Number".to_string(),
            email_address: "Email Address".to_string(),
            statement_period: "Statement Period".to_string(),
            request_date: "Request Date".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementLayout {
    /// Separator between the two period dates.
    pub period_separator: String,
    /// chrono format of each period date.
    pub period_date_format: String,
    /// Whole-line shape of a receipt number.
    pub receipt_pattern: String,
    /// Whole-line shape of an amount or balance cell.
    pub amount_line_pattern: String,
    /// Monetary token inside a summary-table block.
    pub money_token_pattern: String,
    /// Lowercase tokens that must all appear in the summary header block.
    pub summary_header_tokens: Vec<String>,
    /// Lowercase text of the block closing the summary region.
    pub summary_end_marker: String,
    pub status_lookahead: usize,
    pub max_money_fields: usize,
    /// Lowercase keywords that must appear in the leading pages.
    pub required_keywords: Vec<String>,
    /// Leading pages searched for `required_keywords`.
    pub keyword_pages: usize,
    pub labels: MetadataLabels,
    /// Exact status-column text mapped to a status.
    pub status_tokens: BTreeMap<String, TransactionStatus>,
    pub fingerprints: Vec<KnownFingerprint>,
}

impl Default for StatementLayout {
    fn default() -> Self {
        Self::mpesa()
    }
}

impl StatementLayout {
    /// Safaricom M-PESA customer statement.
    pub fn mpesa() -> Self {
        let status_tokens = [
            TransactionStatus::Completed,
            TransactionStatus::Failed,
            TransactionStatus::Pending,
        ]
        .into_iter()
        .map(|s| (s.as_str().to_string(), s))
        .collect();

        Self {
            period_separator: " - ".to_string(),
            period_date_format: "%d %b %Y".to_string(),
            receipt_pattern: r"^[A-Z0-9]{10,}$".to_string(),
            amount_line_pattern: r"^-?[\d,]+(\.\d{1,2})?$".to_string(),
            money_token_pattern: r"\d[\d,]*\.\d{2}".to_string(),
            summary_header_tokens: vec![
                "transaction type".to_string(),
                "paid in".to_string(),
                "paid out".to_string(),
            ],
            summary_end_marker: "detailed statement".to_string(),
            status_lookahead: STATUS_LOOKAHEAD,
            max_money_fields: MAX_MONEY_FIELDS,
            required_keywords: [
                "m-pesa statement",
                "safaricom",
                "receipt no",
                "completion time",
                "details",
                "transaction status",
                "paid in",
                "withdrawn",
                "balance",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
            keyword_pages: 2,
            labels: MetadataLabels::default(),
            status_tokens,
            fingerprints: vec![KnownFingerprint {
                subject: Some("M-PESA Statement".to_string()),
                author: Some("Safaricom PLC".to_string()),
                keywords: Some("M-PESA,Statement".to_string()),
                producer: Some("OpenPDF 1.3.26".to_string()),
                creator: Some("Safaricom PLC".to_string()),
                format: Some("PDF-1.7".to_string()),
            }],
        }
    }

    pub fn compile(&self) -> Result<CompiledLayout> {
        let label = |l: &str| Regex::new(&format!(r"{}\s*:\s*(.*)", regex::escape(l)));
        let labels = &self.labels;

        Ok(CompiledLayout {
            customer_name_re: label(&labels.customer_name)?,
            mobile_number_re: label(&labels.mobile_number)?,
            email_address_re: label(&labels.email_address)?,
            statement_period_re: label(&labels.statement_period)?,
            request_date_re: label(&labels.request_date)?,
            receipt_re: Regex::new(&self.receipt_pattern)?,
            amount_line_re: Regex::new(&self.amount_line_pattern)?,
            money_token_re: Regex::new(&self.money_token_pattern)?,
            layout: self.clone(),
        })
    }
}

/// A [`StatementLayout`] with its patterns compiled.
#[derive(Debug, Clone)]
pub struct CompiledLayout {
    pub layout: StatementLayout,
    pub customer_name_re: Regex,
    pub mobile_number_re: Regex,
    pub email_address_re: Regex,
    pub statement_period_re: Regex,
    pub request_date_re: Regex,
    pub receipt_re: Regex,
    pub amount_line_re: Regex,
    pub money_token_re: Regex,
}

impl CompiledLayout {
    pub fn status_for(&self, token: &str) -> Option<TransactionStatus> {
        self.layout.status_tokens.get(token).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mpesa_layout_compiles() {
        let c = StatementLayout::mpesa().compile().unwrap();
        assert!(c.receipt_re.is_match("TFP39YYAD3"));
        assert!(!c.receipt_re.is_match("TFP39"));
        assert!(c.amount_line_re.is_match("-1,500.5"));
        assert_eq!(c.status_for("Failed"), Some(TransactionStatus::Failed));
        assert_eq!(c.status_for("FAILED"), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let layout: StatementLayout = toml::from_str(
            r#"
status_lookahead = 9

[labels]
customer_name = "Account Holder"
"#,
        )
        .unwrap();
        assert_eq!(layout.status_lookahead, 9);
        assert_eq!(layout.labels.customer_name, "Account Holder");
        assert_eq!(layout.labels.request_date, "Request Date");
        assert_eq!(layout.max_money_fields, MAX_MONEY_FIELDS);
        assert_eq!(layout.fingerprints.len(), 1);
    }

    #[test]
    fn test_bad_pattern_is_reported() {
        let layout = StatementLayout {
            receipt_pattern: "([".to_string(),
            ..StatementLayout::mpesa()
        };
        assert!(layout.compile().is_err());
    }
}
