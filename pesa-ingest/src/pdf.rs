//! [`StatementDocument`] over a PDF loaded with `lopdf`.
//!
//! Page text comes from `lopdf`'s own extractor. Blocks are rebuilt from the
//! page content stream: text-showing operators are positioned with the text
//! line matrix and items sharing a baseline are joined into one block, which
//! is enough to recover table rows from statement generators that emit one
//! text object per cell. Shown strings are decoded through the current `Tf`
//! font's encoding (ToUnicode CMaps included), falling back to UTF-16BE with
//! a BOM or Latin-1 when the font is unknown.
//!
//! `lopdf` only decrypts the RC4 security handler, so AES-encrypted files are
//! rejected at load instead of failing later as a wrong password.

use lopdf::{Dictionary, Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use pesa_core::{DocumentProperties, ExtractError, Result, NOT_AVAILABLE};

use crate::document::{parse_pdf_date, StatementDocument, TextBlock};

/// Baselines closer than this (in points) belong to the same block.
const ROW_TOLERANCE: f64 = 2.0;

/// A4 portrait height, used when no MediaBox can be found.
const DEFAULT_PAGE_HEIGHT: f64 = 842.0;

/// TJ adjustments wider than this (thousandths of an em) read as a space.
const TJ_SPACE_THRESHOLD: f64 = 200.0;

/// Standard security handler versions (`/V`) and revisions (`/R`) `lopdf` decrypts.
const SUPPORTED_V: RangeInclusive<i64> = 1..=2;
const SUPPORTED_R: RangeInclusive<i64> = 2..=3;

pub struct LopdfDocument {
    doc: Document,
    encrypted: bool,
    unlocked: bool,
    pages: Vec<(u32, ObjectId)>,
}

impl LopdfDocument {
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                ExtractError::Decryption
            } else {
                ExtractError::InvalidDocument(msg)
            }
        })?;
        let encrypted = doc.is_encrypted();
        if encrypted {
            check_security_handler(&doc)?;
        }
        let pages = doc.get_pages().into_iter().collect();

        log::debug!("loaded PDF {} (encrypted: {encrypted})", doc.version);

        Ok(Self {
            doc,
            encrypted,
            unlocked: false,
            pages,
        })
    }

    fn page_ref(&self, index: usize) -> Result<(u32, ObjectId)> {
        if self.encrypted && !self.unlocked {
            return Err(ExtractError::Decryption);
        }
        self.pages.get(index).copied().ok_or(ExtractError::Page(index))
    }

    fn info_dict(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_object(*id).and_then(Object::as_dict).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    fn format_version(&self) -> String {
        // A catalog /Version entry overrides the header version.
        let catalog_version = self
            .doc
            .catalog()
            .ok()
            .and_then(|c| c.get(b"Version").ok())
            .and_then(|v| v.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string());
        let version = catalog_version.unwrap_or_else(|| self.doc.version.clone());
        if version.is_empty() {
            "PDF-Unknown".to_string()
        } else {
            format!("PDF-{}", version.trim_start_matches('/'))
        }
    }

    /// Encodings of the page's fonts by resource name. Fonts whose encoding
    /// cannot be resolved are left out and decode as Latin-1.
    fn font_encodings(&self, page_id: ObjectId) -> BTreeMap<Vec<u8>, Encoding<'_>> {
        let Ok(fonts) = self.doc.get_page_fonts(page_id) else {
            return BTreeMap::new();
        };
        fonts
            .into_iter()
            .filter_map(|(name, font)| match font.get_font_encoding(&self.doc) {
                Ok(encoding) => Some((name, encoding)),
                Err(e) => {
                    log::debug!("font {} has no usable encoding: {e}", String::from_utf8_lossy(&name));
                    None
                }
            })
            .collect()
    }

    fn page_height(&self, page_id: ObjectId) -> f64 {
        let mut current = Some(page_id);
        while let Some(id) = current {
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };
            if let Ok(Object::Array(mb)) = dict.get(b"MediaBox") {
                let nums: Vec<f64> = mb.iter().filter_map(number).collect();
                if nums.len() == 4 {
                    return (nums[3] - nums[1]).abs();
                }
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        DEFAULT_PAGE_HEIGHT
    }
}

impl StatementDocument for LopdfDocument {
    fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    fn authenticate(&mut self, password: &str) -> bool {
        self.unlocked = self.doc.decrypt(password).is_ok();
        self.unlocked
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let (number, _) = self.page_ref(index)?;
        self.doc
            .extract_text(&[number])
            .map_err(|e| ExtractError::InvalidDocument(e.to_string()))
    }

    fn page_blocks(&self, index: usize) -> Result<Vec<TextBlock>> {
        let (_, page_id) = self.page_ref(index)?;
        let content = self
            .doc
            .get_and_decode_page_content(page_id)
            .map_err(|e| ExtractError::InvalidDocument(e.to_string()))?;

        let encodings = self.font_encodings(page_id);
        let mut font: Option<&Encoding> = None;
        let mut items = Vec::new();
        let (mut tx, mut ty, mut leading) = (0.0_f64, 0.0_f64, 0.0_f64);

        for op in &content.operations {
            let operands = &op.operands;
            match op.operator.as_str() {
                "Tf" => {
                    font = operands
                        .first()
                        .and_then(|o| o.as_name().ok())
                        .and_then(|name| encodings.get(name));
                }
                "BT" => {
                    tx = 0.0;
                    ty = 0.0;
                }
                "Tm" if operands.len() == 6 => {
                    tx = number(&operands[4]).unwrap_or(tx);
                    ty = number(&operands[5]).unwrap_or(ty);
                }
                "Td" | "TD" if operands.len() == 2 => {
                    let dx = number(&operands[0]).unwrap_or(0.0);
                    let dy = number(&operands[1]).unwrap_or(0.0);
                    if op.operator == "TD" {
                        leading = -dy;
                    }
                    tx += dx;
                    ty += dy;
                }
                "TL" => leading = operands.first().and_then(number).unwrap_or(leading),
                "T*" => ty -= leading,
                "Tj" => push_item(&mut items, tx, ty, operands.first().map(|o| shown_text(o, font))),
                "'" => {
                    ty -= leading;
                    push_item(&mut items, tx, ty, operands.first().map(|o| shown_text(o, font)));
                }
                "\"" => {
                    ty -= leading;
                    push_item(&mut items, tx, ty, operands.get(2).map(|o| shown_text(o, font)));
                }
                "TJ" => push_item(&mut items, tx, ty, operands.first().map(|o| shown_text(o, font))),
                _ => {}
            }
        }

        Ok(group_rows(items, self.page_height(page_id)))
    }

    fn properties(&self) -> Result<DocumentProperties> {
        if self.encrypted && !self.unlocked {
            return Err(ExtractError::Decryption);
        }
        let info = self.info_dict();
        let field = |key: &[u8]| -> Option<String> {
            info?.get(key).ok()?.as_str().ok().map(decode_pdf_string)
        };
        let or_na = |v: Option<String>| v.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(DocumentProperties {
            subject: or_na(field(b"Subject")),
            author: or_na(field(b"Author")),
            keywords: or_na(field(b"Keywords")),
            producer: or_na(field(b"Producer")),
            creator: or_na(field(b"Creator")),
            format: self.format_version(),
            created: parse_pdf_date(field(b"CreationDate").as_deref()),
            modified: parse_pdf_date(field(b"ModDate").as_deref()),
        })
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn check_security_handler(doc: &Document) -> Result<()> {
    let dict = doc
        .get_encrypted()
        .map_err(|e| ExtractError::InvalidDocument(format!("unreadable encryption dictionary: {e}")))?;
    let v = dict.get(b"V").and_then(Object::as_i64).unwrap_or(0);
    let r = dict.get(b"R").and_then(Object::as_i64).unwrap_or(0);
    if SUPPORTED_V.contains(&v) && SUPPORTED_R.contains(&r) {
        Ok(())
    } else {
        Err(ExtractError::InvalidDocument(format!(
            "unsupported encryption (V={v}, R={r}); only RC4 security handlers can be opened"
        )))
    }
}

fn decode_shown(bytes: &[u8], font: Option<&Encoding>) -> String {
    font.and_then(|encoding| Document::decode_text(encoding, bytes).ok())
        .unwrap_or_else(|| decode_pdf_string(bytes))
}

fn shown_text(obj: &Object, font: Option<&Encoding>) -> String {
    match obj {
        Object::String(bytes, _) => decode_shown(bytes, font),
        Object::Array(parts) => {
            let mut s = String::new();
            for part in parts {
                match part {
                    Object::String(bytes, _) => s.push_str(&decode_shown(bytes, font)),
                    other => {
                        if number(other).is_some_and(|n| -n > TJ_SPACE_THRESHOLD) {
                            s.push(' ');
                        }
                    }
                }
            }
            s
        }
        _ => String::new(),
    }
}

fn push_item(items: &mut Vec<(f64, f64, String)>, x: f64, y: f64, text: Option<String>) {
    if let Some(t) = text.filter(|t| !t.trim().is_empty()) {
        items.push((x, y, t));
    }
}

/// Join items sharing a baseline into blocks, top of page first.
fn group_rows(mut items: Vec<(f64, f64, String)>, page_height: f64) -> Vec<TextBlock> {
    items.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.total_cmp(&b.0)));

    let mut rows: Vec<(f64, Vec<(f64, String)>)> = Vec::new();
    for (x, y, text) in items {
        match rows.last_mut() {
            Some((row_y, cells)) if (*row_y - y).abs() <= ROW_TOLERANCE => cells.push((x, text)),
            _ => rows.push((y, vec![(x, text)])),
        }
    }

    rows.into_iter()
        .map(|(y, mut cells)| {
            cells.sort_by(|a, b| a.0.total_cmp(&b.0));
            let text = cells
                .iter()
                .map(|(_, t)| t.trim())
                .collect::<Vec<_>>()
                .join(" ");
            TextBlock::new(page_height - y, text)
        })
        .collect()
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pdf_string() {
        assert_eq!(decode_pdf_string(b"Safaricom PLC"), "Safaricom PLC");
        assert_eq!(decode_pdf_string(&[0xFE, 0xFF, 0x00, 0x4D, 0x00, 0x2D]), "M-");
    }

    #[test]
    fn test_group_rows_joins_cells_on_a_baseline() {
        let items = vec![
            (300.0, 700.0, "300.00".to_string()),
            (40.0, 700.5, "Business Payment".to_string()),
            (200.0, 700.0, "1,200.50".to_string()),
            (40.0, 720.0, "TRANSACTION TYPE PAID IN PAID OUT".to_string()),
        ];
        let blocks = group_rows(items, 800.0);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text, "TRANSACTION TYPE PAID IN PAID OUT");
        assert_eq!(blocks[0].y, 80.0);
        assert_eq!(blocks[1].text, "Business Payment 1,200.50 300.00");
        assert!(blocks[1].y > blocks[0].y);
    }

    #[test]
    fn test_tj_array_spacing() {
        let arr = Object::Array(vec![
            Object::string_literal("Paid"),
            Object::Integer(-250),
            Object::string_literal("In"),
            Object::Integer(-20),
            Object::string_literal("!"),
        ]);
        assert_eq!(shown_text(&arr, None), "Paid In!");
    }

    #[test]
    fn test_garbage_bytes_are_invalid() {
        assert!(matches!(
            LopdfDocument::load(b"not a pdf"),
            Err(ExtractError::InvalidDocument(_))
        ));
    }
}
