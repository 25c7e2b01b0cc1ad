//! Section types.

use serde::{Deserialize, Serialize};

/// Heading convention a document uses to mark section boundaries.
///
/// Chosen once per request; it decides which extractor fills the outline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    /// `1.`, `2.3`, `4.1.2 Title`
    Numbered,
    /// `IV. Title`
    Roman,
    /// `B. Title`
    Letter,
    /// Whole-line `UPPERCASE HEADINGS`
    Uppercase,
    /// Well-known academic section names (fallback)
    CommonNames,
    /// Nothing recognizable
    #[default]
    Unknown,
}

impl HeadingStyle {
    /// Wire name of the style.
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingStyle::Numbered => "numbered",
            HeadingStyle::Roman => "roman",
            HeadingStyle::Letter => "letter",
            HeadingStyle::Uppercase => "uppercase",
            HeadingStyle::CommonNames => "common_names",
            HeadingStyle::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for HeadingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    /// Dot-delimited numeral ("2.3"), `null` for unnumbered headings
    pub number: Option<String>,

    /// Heading title
    pub title: String,

    /// Nesting depth, 1 = top level
    pub level: u32,

    /// Character offset of the heading in the source text
    pub start_position: usize,

    /// First 200 characters of the section body
    pub content_preview: String,
}

impl SectionEntry {
    /// The number/title/level triple used in the hierarchy view.
    pub fn hierarchy_entry(&self) -> HierarchyEntry {
        HierarchyEntry {
            number: self.number.clone(),
            title: self.title.clone(),
            level: self.level,
        }
    }
}

/// Compact outline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyEntry {
    pub number: Option<String>,
    pub title: String,
    pub level: u32,
}

/// Result of section detection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionOutline {
    /// Sections ordered by `start_position`
    pub sections: Vec<SectionEntry>,
    /// Style that produced the sections
    pub style: HeadingStyle,
}

impl SectionOutline {
    /// Check if no section was found.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Number of sections.
    pub fn len(&self) -> usize {
        self.sections.len()
    }
}

/// Payload of the `extract_sections` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionsPayload {
    pub sections: Vec<SectionEntry>,
    pub hierarchy: Vec<HierarchyEntry>,
    pub heading_style: HeadingStyle,
    pub section_count: usize,
}

impl From<SectionOutline> for SectionsPayload {
    fn from(outline: SectionOutline) -> Self {
        let hierarchy = outline
            .sections
            .iter()
            .map(SectionEntry::hierarchy_entry)
            .collect();
        Self {
            section_count: outline.sections.len(),
            hierarchy,
            sections: outline.sections,
            heading_style: outline.style,
        }
    }
}
