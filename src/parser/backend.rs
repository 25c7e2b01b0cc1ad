//! PDF backend abstraction layer.
//!
//! Tool handlers see documents only through [`PdfBackend`], which keeps the
//! concrete PDF library (lopdf) out of the handler logic and lets tests
//! substitute in-memory documents.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::layout::{self, GlyphDecoder, TextSpan};
use crate::detect::detect_header;
use crate::error::{Error, Result};
use crate::model::DocumentInfo;

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Page numbers (1-indexed), ascending.
    fn page_numbers(&self) -> Vec<u32>;

    /// Plain text of a page.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Positioned text runs of a page.
    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>>;

    /// Title, author, subject, creator and producer, where present.
    fn info(&self) -> DocumentInfo;

    /// Number of pages.
    fn page_count(&self) -> usize {
        self.page_numbers().len()
    }
}

/// Simple text decoding fallback when no font encoding is available.
///
/// UTF-16BE with a byte order mark, then UTF-8, then Latin-1.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = body
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Load from an in-memory byte slice.
    ///
    /// The header is checked first so that non-PDF payloads fail fast with
    /// [`Error::UnknownFormat`].
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let header = detect_header(data)?;
        log::debug!("loading {} ({} bytes)", header, data.len());

        let doc = LopdfDocument::load_mem(data)?;
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Concatenated content streams of a page, decoded through their filters.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => Ok(s.get_plain_content()?),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    let Object::Reference(r) = obj else { continue };
                    if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                        match s.get_plain_content() {
                            Ok(data) => {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                            Err(e) => log::warn!("skipping undecodable content stream: {}", e),
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn info_dict(&self) -> Option<&Dictionary> {
        match self.doc.trailer.get(b"Info").ok()? {
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            Object::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn page_numbers(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        let page_id = self.page_id(page)?;
        let fonts = PageFonts {
            doc: &self.doc,
            fonts: self.doc.get_page_fonts(page_id)?,
        };
        let content = self.page_content(page_id)?;
        layout::extract_spans(&content, &fonts)
    }

    fn info(&self) -> DocumentInfo {
        let Some(dict) = self.info_dict() else {
            return DocumentInfo::default();
        };
        DocumentInfo {
            title: info_string(dict, b"Title"),
            author: info_string(dict, b"Author"),
            subject: info_string(dict, b"Subject"),
            creator: info_string(dict, b"Creator"),
            producer: info_string(dict, b"Producer"),
        }
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Font resources of one page.
struct PageFonts<'a> {
    doc: &'a LopdfDocument,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl GlyphDecoder for PageFonts<'_> {
    fn base_font(&self, resource: &[u8]) -> Option<String> {
        let name = self.fonts.get(resource)?.get(b"BaseFont").ok()?.as_name().ok()?;
        Some(String::from_utf8_lossy(name).to_string())
    }

    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String {
        self.fonts
            .get(resource)
            .and_then(|font| font.get_font_encoding(self.doc).ok())
            .and_then(|enc| LopdfDocument::decode_text(&enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

/// A non-empty string value of the Info dictionary.
fn info_string(dict: &Dictionary, key: &[u8]) -> Option<String> {
    let value = match dict.get(key).ok()? {
        Object::String(bytes, _) => decode_text_simple(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).to_string(),
        _ => return None,
    };
    let value = value.trim_end_matches('\0').to_string();
    (!value.is_empty()).then_some(value)
}
