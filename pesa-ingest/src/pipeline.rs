//! One extraction pass over one statement document.
//!
//! The document is unlocked once; every stage then reads its own input
//! (properties, first-page text, first-page blocks, all page text), so a
//! malformed statement period only affects the metadata result.

use pesa_core::{
    CompiledLayout, DocumentProperties, ExtractError, Result, StatementLayout, StatementMetadata,
    SummaryRow, TransactionRecord,
};

use crate::document::{unlock, StatementDocument};
use crate::fingerprint::PropertyFingerprintValidator;
use crate::metadata::MetadataFieldExtractor;
use crate::parsers::TransactionStreamParser;
use crate::recognize::StatementRecognizer;
use crate::summary_table::SummaryTableExtractor;

#[derive(Debug)]
pub struct StatementExtraction {
    pub properties: DocumentProperties,
    /// Properties match a known producer fingerprint.
    pub fingerprint_match: bool,
    /// Leading pages carry every required statement keyword.
    pub recognized: bool,
    pub metadata: Result<StatementMetadata>,
    pub summary: Vec<SummaryRow>,
    pub transactions: Vec<TransactionRecord>,
}

pub struct StatementExtractor {
    layout: CompiledLayout,
    validator: PropertyFingerprintValidator,
    recognizer: StatementRecognizer,
}

impl StatementExtractor {
    pub fn new(layout: &StatementLayout) -> Result<Self> {
        Ok(Self {
            layout: layout.compile()?,
            validator: PropertyFingerprintValidator::new(layout.fingerprints.clone()),
            recognizer: StatementRecognizer::new(
                layout.required_keywords.clone(),
                layout.keyword_pages,
            ),
        })
    }

    pub fn mpesa() -> Result<Self> {
        Self::new(&StatementLayout::mpesa())
    }

    pub fn layout(&self) -> &CompiledLayout {
        &self.layout
    }

    pub fn validator(&self) -> &PropertyFingerprintValidator {
        &self.validator
    }

    pub fn recognizer(&self) -> &StatementRecognizer {
        &self.recognizer
    }

    /// Run every stage. Decryption and unreadable-document failures abort
    /// the pass; a bad statement period is reported inside `metadata`.
    pub fn extract<D: StatementDocument + ?Sized>(
        &self,
        doc: &mut D,
        password: Option<&str>,
    ) -> Result<StatementExtraction> {
        unlock(doc, password)?;

        let page_count = doc.page_count();
        if page_count == 0 {
            return Err(ExtractError::InvalidDocument("document has no pages".to_string()));
        }

        let properties = doc.properties()?;
        let fingerprint_match = self.validator.is_valid(&properties);
        if !fingerprint_match {
            for m in self.validator.mismatches(&properties) {
                log::warn!(
                    "fingerprint mismatch on {}: expected {:?}, found {:?}",
                    m.field,
                    m.expected,
                    m.actual
                );
            }
        }

        let pages = (0..page_count)
            .map(|i| doc.page_text(i))
            .collect::<Result<Vec<_>>>()?;
        let first_blocks = doc.page_blocks(0)?;

        let recognized = self.recognizer.is_statement(&*doc);

        let metadata = MetadataFieldExtractor::new(&self.layout).extract(&pages[0]);
        if let Err(e) = &metadata {
            log::warn!("metadata extraction failed: {e}");
        }
        let summary = SummaryTableExtractor::new(&self.layout).extract(&first_blocks);
        let transactions = TransactionStreamParser::new(&self.layout).parse_pages(&pages);

        log::info!(
            "extracted {} summary rows and {} transactions from {page_count} pages",
            summary.len(),
            transactions.len()
        );

        Ok(StatementExtraction {
            properties,
            fingerprint_match,
            recognized,
            metadata,
            summary,
            transactions,
        })
    }

    /// Load PDF bytes with `lopdf` and run [`StatementExtractor::extract`].
    #[cfg(feature = "lopdf")]
    pub fn extract_pdf(&self, bytes: &[u8], password: Option<&str>) -> Result<StatementExtraction> {
        let mut doc = crate::pdf::LopdfDocument::load(bytes)?;
        self.extract(&mut doc, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MemoryDocument, TextBlock};

    fn statement(period: &str) -> MemoryDocument {
        let page_one = format!(
            "M-PESA STATEMENT\nSafaricom\nCustomer Name : JANE DOE\nStatement Period : {period}\n\
             Receipt No\nCompletion Time\nDetails\nTransaction Status\nPaid In\nWithdrawn\nBalance\n\
             TFP39YYAD3\n12/01/24 10:00\nSent to John\nCompleted\n-500.00\n1500.00\n"
        );
        MemoryDocument::default()
            .with_page(
                page_one,
                vec![
                    TextBlock::new(100.0, "TRANSACTION TYPE PAID IN PAID OUT"),
                    TextBlock::new(120.0, "Send Money 0.00 500.00"),
                    TextBlock::new(140.0, "DETAILED STATEMENT"),
                ],
            )
            .with_page("TFP40ZZBE4\n13/01/24 09:00\nFunds received\nCompleted\n250.00\n1750.00\n", vec![])
    }

    #[test]
    fn test_full_pass() {
        let ex = StatementExtractor::mpesa().unwrap();
        let out = ex.extract(&mut statement("01 Jan 2024 - 01 Mar 2024"), None).unwrap();

        assert!(out.recognized);
        assert!(!out.fingerprint_match);
        let md = out.metadata.unwrap();
        assert_eq!(md.customer_name, "JANE DOE");
        assert_eq!(md.statement_duration_months, Some(2));
        assert_eq!(out.summary.len(), 1);
        assert_eq!(out.transactions.len(), 2);
        assert_eq!(out.transactions[1].receipt_no, "TFP40ZZBE4");
    }

    #[test]
    fn test_bad_period_only_fails_metadata() {
        let ex = StatementExtractor::mpesa().unwrap();
        let out = ex.extract(&mut statement("2024/01/01 - 2024/03/01"), None).unwrap();

        assert!(matches!(out.metadata, Err(ExtractError::DateParse { .. })));
        assert_eq!(out.summary.len(), 1);
        assert_eq!(out.transactions.len(), 2);
    }

    #[test]
    fn test_locked_document_aborts() {
        let ex = StatementExtractor::mpesa().unwrap();
        let mut doc = statement("01 Jan 2024 - 01 Mar 2024").with_password("secret");

        assert!(matches!(ex.extract(&mut doc, None), Err(ExtractError::Decryption)));
        assert!(matches!(ex.extract(&mut doc, Some("nope")), Err(ExtractError::Decryption)));
        assert!(ex.extract(&mut doc, Some("secret")).is_ok());
    }

    #[test]
    fn test_empty_document_is_invalid() {
        let ex = StatementExtractor::mpesa().unwrap();
        let mut doc = MemoryDocument::default();
        assert!(matches!(
            ex.extract(&mut doc, None),
            Err(ExtractError::InvalidDocument(_))
        ));
    }
}
