//! Customer fields and statement period from the first page text.
//!
//! Expected first-page lines:
//!   Customer Name : JANE WANJIKU DOE
//!   Mobile Number : 0712345678
//!   Email Address : jane@example.com
//!   Statement Period : 01 Jan 2024 - 01 Mar 2024
//!   Request Date : 02 Mar 2024

use chrono::{Datelike, NaiveDate};
use pesa_core::{CompiledLayout, ExtractError, Result, StatementMetadata, UNKNOWN};
use regex::Regex;

pub struct MetadataFieldExtractor<'a> {
    layout: &'a CompiledLayout,
}

impl<'a> MetadataFieldExtractor<'a> {
    pub fn new(layout: &'a CompiledLayout) -> Self {
        Self { layout }
    }

    /// Missing labels become `Unknown`; only a malformed period is an error.
    pub fn extract(&self, first_page: &str) -> Result<StatementMetadata> {
        let l = self.layout;
        let statement_period = labelled(&l.statement_period_re, first_page);

        let statement_duration_months = if statement_period == UNKNOWN {
            None
        } else {
            statement_duration_months(
                &statement_period,
                &l.layout.period_separator,
                &l.layout.period_date_format,
            )?
        };

        Ok(StatementMetadata {
            customer_name: labelled(&l.customer_name_re, first_page),
            mobile_number: labelled(&l.mobile_number_re, first_page),
            email_address: labelled(&l.email_address_re, first_page),
            request_date: labelled(&l.request_date_re, first_page),
            statement_period,
            statement_duration_months,
        })
    }
}

fn labelled(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Whole months covered by `<start><separator><end>`.
///
/// One month is dropped when the end day-of-month is earlier than the start
/// day, and the result never goes below zero. `Ok(None)` when the separator
/// is absent.
pub fn statement_duration_months(period: &str, separator: &str, format: &str) -> Result<Option<u32>> {
    let Some((start, end)) = period.split_once(separator) else {
        return Ok(None);
    };

    let parse = |side: &str| {
        NaiveDate::parse_from_str(side.trim(), format).map_err(|e| ExtractError::DateParse {
            period: period.to_string(),
            reason: format!("{:?}: {e}", side.trim()),
        })
    };
    let from = parse(start)?;
    let to = parse(end)?;

    let mut months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    if to.day() < from.day() {
        months -= 1;
    }

    Ok(Some(months.max(0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pesa_core::StatementLayout;

    fn months(period: &str) -> Result<Option<u32>> {
        statement_duration_months(period, " - ", "%d %b %Y")
    }

    #[test]
    fn test_duration_months() {
        assert_eq!(months("01 Jan 2024 - 01 Mar 2024").unwrap(), Some(2));
        assert_eq!(months("15 Jan 2024 - 01 Feb 2024").unwrap(), Some(0));
        assert_eq!(months("01 Jan 2024 - 01 Jan 2024").unwrap(), Some(0));
        assert_eq!(months("15 Nov 2023 - 14 Feb 2024").unwrap(), Some(2));
        assert_eq!(months("01 Mar 2024 - 01 Jan 2024").unwrap(), Some(0));
    }

    #[test]
    fn test_duration_without_separator_is_unknown() {
        assert_eq!(months("January 2024").unwrap(), None);
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let err = months("01 Jan 2024 - 31 Foo 2024").unwrap_err();
        assert!(matches!(err, ExtractError::DateParse { .. }));
        assert!(err.to_string().contains("01 Jan 2024 - 31 Foo 2024"));
    }

    #[test]
    fn test_extract_all_fields() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let page = "M-PESA STATEMENT\n\
                    Customer Name : JANE WANJIKU DOE\n\
                    Mobile Number : 0712345678\n\
                    Email Address : jane@example.com\n\
                    Statement Period : 01 Jan 2024 - 01 Mar 2024\n\
                    Request Date : 02 Mar 2024\n";
        let md = MetadataFieldExtractor::new(&layout).extract(page).unwrap();

        assert_eq!(md.customer_name, "JANE WANJIKU DOE");
        assert_eq!(md.mobile_number, "0712345678");
        assert_eq!(md.email_address, "jane@example.com");
        assert_eq!(md.statement_period, "01 Jan 2024 - 01 Mar 2024");
        assert_eq!(md.request_date, "02 Mar 2024");
        assert_eq!(md.statement_duration_months, Some(2));
    }

    #[test]
    fn test_missing_labels_default_to_unknown() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let md = MetadataFieldExtractor::new(&layout)
            .extract("Customer Name: Jane\n")
            .unwrap();

        assert_eq!(md.customer_name, "Jane");
        assert_eq!(md.email_address, UNKNOWN);
        assert_eq!(md.statement_period, UNKNOWN);
        assert_eq!(md.statement_duration_months, None);
    }

    #[test]
    fn test_malformed_period_fails_extraction() {
        let layout = StatementLayout::mpesa().compile().unwrap();
        let res = MetadataFieldExtractor::new(&layout)
            .extract("Statement Period : 2024-01-01 - 2024-03-01\n");
        assert!(matches!(res, Err(ExtractError::DateParse { .. })));
    }
}
