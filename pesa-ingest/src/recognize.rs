//! Keyword check on the leading pages: the statement headings every genuine
//! statement prints.

use pesa_core::Result;

use crate::document::StatementDocument;

#[derive(Debug, Clone)]
pub struct StatementRecognizer {
    keywords: Vec<String>,
    pages: usize,
}

impl StatementRecognizer {
    /// `keywords` are matched against lowercased text of the first `pages` pages.
    pub fn new(keywords: Vec<String>, pages: usize) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            pages,
        }
    }

    /// Keywords absent from `text`.
    pub fn missing_keywords(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.keywords
            .iter()
            .filter(|k| !text.contains(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn matches_text(&self, text: &str) -> bool {
        self.missing_keywords(text).is_empty()
    }

    /// Never fails: an unreadable page (e.g. still locked) means "not a statement".
    pub fn is_statement<D: StatementDocument + ?Sized>(&self, doc: &D) -> bool {
        match self.leading_text(doc) {
            Ok(text) => self.matches_text(&text),
            Err(e) => {
                log::warn!("keyword check could not read leading pages: {e}");
                false
            }
        }
    }

    /// Text of the leading pages, one page per `\n`-terminated chunk so a
    /// keyword never spans a page break.
    pub fn leading_text<D: StatementDocument + ?Sized>(&self, doc: &D) -> Result<String> {
        let mut text = String::new();
        for i in 0..self.pages.min(doc.page_count()) {
            text.push_str(&doc.page_text(i)?);
            text.push('\n');
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use pesa_core::StatementLayout;

    fn recognizer() -> StatementRecognizer {
        let layout = StatementLayout::mpesa();
        StatementRecognizer::new(layout.required_keywords, layout.keyword_pages)
    }

    const PAGE_ONE: &str = "M-PESA STATEMENT\nSafaricom\nCustomer Name : Jane\n";
    const PAGE_TWO: &str =
        "Receipt No\nCompletion Time\nDetails\nTransaction Status\nPaid In\nWithdrawn\nBalance\n";

    #[test]
    fn test_keywords_can_span_leading_pages() {
        let doc = MemoryDocument::default()
            .with_page(PAGE_ONE, vec![])
            .with_page(PAGE_TWO, vec![]);
        assert!(recognizer().is_statement(&doc));
    }

    #[test]
    fn test_keywords_past_leading_pages_do_not_count() {
        let doc = MemoryDocument::default()
            .with_page(PAGE_ONE, vec![])
            .with_page("blank", vec![])
            .with_page(PAGE_TWO, vec![]);
        assert!(!recognizer().is_statement(&doc));
    }

    #[test]
    fn test_missing_keywords_listed() {
        let r = recognizer();
        let missing = r.missing_keywords(PAGE_ONE);
        assert!(missing.contains(&"withdrawn"));
        assert!(!missing.contains(&"safaricom"));
    }

    #[test]
    fn test_locked_document_is_not_a_statement() {
        let doc = MemoryDocument::default()
            .with_page(PAGE_ONE, vec![])
            .with_password("pw");
        assert!(!recognizer().is_statement(&doc));
        assert!(matches!(
            recognizer().leading_text(&doc),
            Err(pesa_core::ExtractError::Decryption)
        ));
    }

    #[test]
    fn test_leading_text_keeps_page_breaks() {
        let doc = MemoryDocument::default()
            .with_page("M-PESA", vec![])
            .with_page("STATEMENT", vec![]);
        let r = StatementRecognizer::new(vec!["m-pesastatement".to_string()], 2);
        assert_eq!(r.leading_text(&doc).unwrap(), "M-PESA\nSTATEMENT\n");
        assert!(!r.is_statement(&doc));
    }
}
