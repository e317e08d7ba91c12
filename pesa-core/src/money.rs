//! Monetary token and free-text helpers shared by the extractors.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse a statement amount cell.
///
/// Empty cells and a lone `-` read as zero, thousands separators are
/// dropped, and anything unparseable also reads as zero.
pub fn clean_amount(value: &str) -> Decimal {
    let v = value.trim();
    if v.is_empty() || v == "-" {
        return Decimal::ZERO;
    }
    Decimal::from_str(&v.replace(',', "")).unwrap_or(Decimal::ZERO)
}

/// Round half away from zero to the two fractional digits used on output.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Collapse every whitespace run (newlines included) to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
