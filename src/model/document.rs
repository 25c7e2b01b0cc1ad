//! Extracted document text and metadata.

use serde::{Deserialize, Serialize};

/// Separator placed between page texts in the full document text.
pub const PAGE_SEPARATOR: &str = "\n\n";

/// Text of a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Extracted text, empty when nothing could be decoded
    pub text: String,
}

/// Document metadata read from the Info dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
}

impl DocumentInfo {
    /// Check if no metadata field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.creator.is_none()
            && self.producer.is_none()
    }
}

/// Payload of the `pdf_to_text` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPayload {
    pub text: String,
    pub pages: Vec<PageText>,
    pub page_count: usize,
    pub metadata: DocumentInfo,
}

impl TextPayload {
    /// Assemble the payload, joining page texts with [`PAGE_SEPARATOR`].
    pub fn new(pages: Vec<PageText>, metadata: DocumentInfo) -> Self {
        let text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(PAGE_SEPARATOR);
        Self {
            text,
            page_count: pages.len(),
            pages,
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_are_joined() {
        let pages = vec![
            PageText { page_number: 1, text: "one".into() },
            PageText { page_number: 2, text: String::new() },
            PageText { page_number: 3, text: "three".into() },
        ];
        let payload = TextPayload::new(pages, DocumentInfo::default());
        assert_eq!(payload.text, "one\n\n\n\nthree");
        assert_eq!(payload.page_count, 3);
    }

    #[test]
    fn test_metadata_omits_absent_keys() {
        let info = DocumentInfo {
            title: Some("A Paper".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert!(!info.is_empty());
        assert!(DocumentInfo::default().is_empty());
    }
}
