//! Document access seam: decrypted page text, positioned blocks and
//! embedded properties of one statement.
//!
//! The extractors never touch PDF internals; they only see this trait.
//! [`MemoryDocument`] backs tests and callers that already hold extracted
//! text, `crate::pdf::LopdfDocument` reads real PDFs.

use chrono::NaiveDateTime;
use pesa_core::{DocumentProperties, ExtractError, Result, NOT_AVAILABLE};
use serde::{Deserialize, Serialize};

/// A run of page text with the vertical position of its top edge
/// (page-top origin, growing downwards).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    pub y: f64,
    pub text: String,
}

impl TextBlock {
    pub fn new(y: f64, text: impl Into<String>) -> Self {
        Self {
            y,
            text: text.into(),
        }
    }
}

pub trait StatementDocument {
    fn is_encrypted(&self) -> bool;

    /// Try a password; true when the document is now readable.
    fn authenticate(&mut self, password: &str) -> bool;

    fn page_count(&self) -> usize;

    /// Plain text of a page, lines separated by `\n`.
    fn page_text(&self, index: usize) -> Result<String>;

    /// Positioned text blocks of a page, in page order.
    fn page_blocks(&self, index: usize) -> Result<Vec<TextBlock>>;

    fn properties(&self) -> Result<DocumentProperties>;
}

/// Authenticate an encrypted document with the supplied password.
///
/// Unencrypted documents pass regardless of `password`.
pub fn unlock<D: StatementDocument + ?Sized>(doc: &mut D, password: Option<&str>) -> Result<()> {
    if !doc.is_encrypted() {
        return Ok(());
    }
    match password {
        Some(p) if doc.authenticate(p) => Ok(()),
        _ => Err(ExtractError::Decryption),
    }
}

/// Normalize a PDF date string (`D:YYYYMMDDHHmmSS...`) to
/// `YYYY-MM-DD HH:MM:SS`, or `N/A` when it is absent or malformed.
pub fn parse_pdf_date(raw: Option<&str>) -> String {
    raw.and_then(|s| s.strip_prefix("D:"))
        .and_then(|s| s.get(..14))
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y%m%d%H%M%S").ok())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    pub text: String,
    pub blocks: Vec<TextBlock>,
}

/// A document whose pages are already extracted.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
    properties: DocumentProperties,
    password: Option<String>,
    unlocked: bool,
}

impl MemoryDocument {
    pub fn new(properties: DocumentProperties) -> Self {
        Self {
            properties,
            ..Default::default()
        }
    }

    pub fn with_page(mut self, text: impl Into<String>, blocks: Vec<TextBlock>) -> Self {
        self.pages.push(MemoryPage {
            text: text.into(),
            blocks,
        });
        self
    }

    /// Lock the document behind `password`.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self.unlocked = false;
        self
    }

    fn page(&self, index: usize) -> Result<&MemoryPage> {
        if self.is_encrypted() && !self.unlocked {
            return Err(ExtractError::Decryption);
        }
        self.pages.get(index).ok_or(ExtractError::Page(index))
    }
}

impl StatementDocument for MemoryDocument {
    fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    fn authenticate(&mut self, password: &str) -> bool {
        self.unlocked = self.password.as_deref() == Some(password);
        self.unlocked
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        Ok(self.page(index)?.text.clone())
    }

    fn page_blocks(&self, index: usize) -> Result<Vec<TextBlock>> {
        Ok(self.page(index)?.blocks.clone())
    }

    fn properties(&self) -> Result<DocumentProperties> {
        if self.is_encrypted() && !self.unlocked {
            return Err(ExtractError::Decryption);
        }
        Ok(self.properties.clone())
    }
}
