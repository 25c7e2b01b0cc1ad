//! Bibliography types.

use serde::{Deserialize, Serialize};

/// Listing convention of a references region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitationStyle {
    /// `[1] Author ...`
    NumberedBracket,
    /// `1. Author ...`
    NumberedDot,
    /// `Surname, I. (2020) ...`
    AuthorYear,
    /// Paragraph split fallback
    LineBased,
    /// No grammar dominated
    #[default]
    Unknown,
}

impl CitationStyle {
    /// Wire name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            CitationStyle::NumberedBracket => "numbered_bracket",
            CitationStyle::NumberedDot => "numbered_dot",
            CitationStyle::AuthorYear => "author_year",
            CitationStyle::LineBased => "line_based",
            CitationStyle::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CitationStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed citation. Absent fields are omitted from the JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    /// Whitespace-normalized citation text
    pub raw_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Result of reference extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceExtraction {
    /// Parsed citations in document order
    pub entries: Vec<ReferenceEntry>,
    /// Detected (or fallback) citation style
    pub style: CitationStyle,
    /// Whether a references header was found
    pub section_found: bool,
    /// Character offset of the references header
    pub section_start: Option<usize>,
    /// Set when no grammar parsed the region and paragraphs were split instead
    pub used_line_fallback: bool,
}

/// Payload of the `extract_references` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencesPayload {
    pub references: Vec<ReferenceEntry>,
    pub reference_count: usize,
    pub citation_style: CitationStyle,
    pub section_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_start_position: Option<usize>,
}

impl From<ReferenceExtraction> for ReferencesPayload {
    fn from(extraction: ReferenceExtraction) -> Self {
        Self {
            reference_count: extraction.entries.len(),
            references: extraction.entries,
            citation_style: extraction.style,
            section_found: extraction.section_found,
            section_start_position: extraction.section_start,
        }
    }
}
