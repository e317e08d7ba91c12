//! Aggregate "transaction type / paid in / paid out" table on the first page.
//!
//! Rows are the blocks between the table header and the "Detailed
//! Statement" heading that carry at least two monetary tokens:
//!   TRANSACTION TYPE    PAID IN     PAID OUT
//!   Send Money          0.00        5,430.00
//!   Business Payment    1,200.50    300.00
//!   DETAILED STATEMENT

use pesa_core::{clean_amount, normalize_whitespace, CompiledLayout, SummaryRow};

use crate::document::TextBlock;

pub struct SummaryTableExtractor<'a> {
    layout: &'a CompiledLayout,
}

impl<'a> SummaryTableExtractor<'a> {
    pub fn new(layout: &'a CompiledLayout) -> Self {
        Self { layout }
    }

    /// No header block means no rows.
    pub fn extract(&self, blocks: &[TextBlock]) -> Vec<SummaryRow> {
        let layout = &self.layout.layout;

        let Some(header_y) = blocks
            .iter()
            .find(|b| {
                let text = b.text.to_lowercase();
                layout
                    .summary_header_tokens
                    .iter()
                    .all(|t| text.contains(t.as_str()))
            })
            .map(|b| b.y)
        else {
            log::debug!("summary table header not found");
            return Vec::new();
        };

        let end_marker = layout.summary_end_marker.to_lowercase();
        let end_y = blocks
            .iter()
            .find(|b| b.text.to_lowercase().contains(&end_marker))
            .map(|b| b.y);

        blocks
            .iter()
            .filter(|b| b.y > header_y && end_y.is_none_or(|end| b.y < end))
            .filter_map(|b| self.row(b.text.trim()))
            .collect()
    }

    fn row(&self, text: &str) -> Option<SummaryRow> {
        let money = &self.layout.money_token_re;
        let amounts: Vec<&str> = money.find_iter(text).map(|m| m.as_str()).collect();
        if amounts.len() < 2 {
            return None;
        }

        let label = money.replace_all(text, "").replace(':', "");
        Some(SummaryRow {
            transaction_type: normalize_whitespace(&label),
            total_paid_in: clean_amount(amounts[0]),
            total_paid_out: clean_amount(amounts[1]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_core::StatementLayout;
    use rust_decimal::Decimal;

    fn page_blocks() -> Vec<TextBlock> {
        vec![
            TextBlock::new(40.0, "M-PESA STATEMENT"),
            TextBlock::new(60.0, "Customer Name : JANE DOE 1.00 2.00"),
            TextBlock::new(100.0, "TRANSACTION TYPE PAID IN PAID OUT"),
            TextBlock::new(120.0, "Send Money 0.00 5,430.00"),
            TextBlock::new(140.0, "Business Payment 1,200.50 300.00"),
            TextBlock::new(160.0, "Footnote 12.00"),
            TextBlock::new(180.0, "TOTAL: 1,200.50 5,730.00"),
            TextBlock::new(200.0, "DETAILED STATEMENT"),
            TextBlock::new(220.0, "TFP39YYAD3 12/01/24 Sent to John -500.00 1,500.00"),
        ]
    }

    #[test]
    fn test_rows_between_header_and_detailed_statement() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let rows = SummaryTableExtractor::new(&layout).extract(&page_blocks());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].transaction_type, "Send Money");
        assert_eq!(rows[0].total_paid_in, Decimal::ZERO);
        assert_eq!(rows[0].total_paid_out, Decimal::new(543000, 2));

        assert_eq!(rows[1].transaction_type, "Business Payment");
        assert_eq!(rows[1].total_paid_in, Decimal::new(120050, 2));
        assert_eq!(rows[1].total_paid_out, Decimal::new(30000, 2));

        // colon stripped from the label
        assert_eq!(rows[2].transaction_type, "TOTAL");
    }

    #[test]
    fn test_single_amount_block_is_not_a_row() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let rows = SummaryTableExtractor::new(&layout).extract(&page_blocks());
        assert!(rows.iter().all(|r| r.transaction_type != "Footnote"));
    }

    #[test]
    fn test_missing_lower_bound_is_unbounded() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let blocks: Vec<TextBlock> = page_blocks()
            .into_iter()
            .filter(|b| b.text != "DETAILED STATEMENT")
            .collect();
        let rows = SummaryTableExtractor::new(&layout).extract(&blocks);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].transaction_type, "TFP39YYAD3 12/01/24 Sent to John -");
    }

    #[test]
    fn test_no_header_no_rows() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let blocks = vec![TextBlock::new(10.0, "Business Payment 1,200.50 300.00")];
        assert!(SummaryTableExtractor::new(&layout).extract(&blocks).is_empty());
    }
}
