//! Detailed-statement ledger parser (line stream).
//!
//! Text extraction flattens the ledger table into one cell per line:
//!   TFP39YYAD3              <- receipt no
//!   12/01/24 10:00          <- completion time
//!   Sent to John            <- details (one or more lines)
//!   Doe 0712***678
//!   Completed               <- transaction status
//!   -500.00                 <- amount (negative = withdrawn)
//!   1,500.00                <- balance
//!
//! Each page is scanned on its own; records never span a page break.

use pesa_core::{clean_amount, normalize_whitespace, CompiledLayout, TransactionRecord};
use rust_decimal::Decimal;

pub struct TransactionStreamParser<'a> {
    layout: &'a CompiledLayout,
}

impl<'a> TransactionStreamParser<'a> {
    pub fn new(layout: &'a CompiledLayout) -> Self {
        Self { layout }
    }

    /// Parse every page in order and concatenate the records.
    pub fn parse_pages<S: AsRef<str>>(&self, pages: &[S]) -> Vec<TransactionRecord> {
        pages
            .iter()
            .flat_map(|page| self.parse_page(page.as_ref()))
            .collect()
    }

    /// Parse one page of text.
    pub fn parse_page(&self, text: &str) -> Vec<TransactionRecord> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        self.parse_lines(&lines)
    }

    /// Malformed candidates are skipped; this never fails.
    pub fn parse_lines(&self, lines: &[&str]) -> Vec<TransactionRecord> {
        let layout = &self.layout.layout;
        let n = lines.len();
        let mut out = Vec::new();
        let mut i = 0;

        while i < n {
            if !self.layout.receipt_re.is_match(lines[i].trim()) {
                i += 1;
                continue;
            }

            let receipt_no = lines[i].trim();
            i += 1;
            if i >= n {
                break;
            }
            let completion_time = lines[i].trim();
            i += 1;
            if i >= n {
                break;
            }

            let window_end = (i + layout.status_lookahead).min(n);
            let status_at = (i..window_end).find_map(|j| {
                self.layout
                    .status_for(lines[j].trim())
                    .map(|status| (j, status))
            });

            let Some((status_idx, status)) = status_at else {
                log::debug!("no status within {} lines of {receipt_no}, skipping", layout.status_lookahead);
                i += 1;
                continue;
            };

            let details = normalize_whitespace(&lines[i..status_idx].join(" "));
            i = status_idx + 1;

            let mut fields: Vec<&str> = Vec::with_capacity(layout.max_money_fields);
            while i < n && fields.len() < layout.max_money_fields {
                let line = lines[i].trim();
                if line.is_empty() || line == "-" || self.layout.amount_line_re.is_match(line) {
                    fields.push(line);
                    i += 1;
                } else {
                    break;
                }
            }

            let amount = fields.first().map_or(Decimal::ZERO, |f| clean_amount(f));
            let balance = fields.get(1).map_or(Decimal::ZERO, |f| clean_amount(f));

            out.push(TransactionRecord::from_signed(
                receipt_no,
                completion_time,
                details,
                status,
                amount,
                balance,
            ));
        }

        log::debug!("parsed {} transactions from {n} lines", out.len());
        out
    }
}
