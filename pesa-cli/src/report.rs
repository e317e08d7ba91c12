//! Output shapes for `pesa extract`.

use anyhow::{Context, Result};
use pesa_core::{DocumentProperties, LedgerRow, StatementMetadata, SummaryRow, TransactionRecord};
use pesa_finance::{reconcile, AggregatedCategory, CategoryAggregator, Reconciliation};
use pesa_ingest::StatementExtraction;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full report as pretty JSON
    Json,
    /// Transaction ledger only, one row per receipt
    Csv,
}

#[derive(Debug, Serialize)]
pub struct StatementReport {
    pub filename: String,
    pub properties: DocumentProperties,
    pub fingerprint_match: bool,
    pub recognized: bool,
    pub metadata: Option<StatementMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_error: Option<String>,
    pub summary_table: Vec<SummaryRow>,
    pub spending_money_summary: Vec<AggregatedCategory>,
    pub received_money_summary: Vec<AggregatedCategory>,
    pub reconciliation: Reconciliation,
    pub transactions: Vec<TransactionRecord>,
}

impl StatementReport {
    pub fn build(filename: impl Into<String>, extraction: StatementExtraction) -> Self {
        let categories = CategoryAggregator::summarize(&extraction.transactions);
        let reconciliation = reconcile(&extraction.summary, &extraction.transactions);
        let (metadata, metadata_error) = match extraction.metadata {
            Ok(md) => (Some(md), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            filename: filename.into(),
            properties: extraction.properties,
            fingerprint_match: extraction.fingerprint_match,
            recognized: extraction.recognized,
            metadata,
            metadata_error,
            summary_table: extraction.summary,
            spending_money_summary: categories.spending,
            received_money_summary: categories.received,
            reconciliation,
            transactions: extraction.transactions,
        }
    }

    pub fn write<W: Write>(&self, format: OutputFormat, mut out: W) -> Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, self).context("write json report")?;
                writeln!(out)?;
            }
            OutputFormat::Csv => write_ledger_csv(&self.transactions, out)?,
        }
        Ok(())
    }
}

pub fn write_ledger_csv<W: Write>(txns: &[TransactionRecord], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for t in txns {
        wtr.serialize(LedgerRow::from(t.clone()))
            .with_context(|| format!("write csv row {}", t.receipt_no))?;
    }
    wtr.flush().context("flush csv")?;
    Ok(())
}
