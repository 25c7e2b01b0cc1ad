//! Structure-recovery heuristics.
//!
//! Every function here is a pure function of its input text. Patterns are
//! compiled once into process-wide statics and never mutated.

pub mod references;
pub mod scanned;
pub mod sections;
pub mod tables;

pub use references::extract_references;
pub use scanned::looks_scanned;
pub use sections::detect_sections;
pub use tables::normalize_table;

/// Maximum characters kept in a section content preview.
pub const PREVIEW_CHARS: usize = 200;

/// Marker appended to truncated previews.
pub const ELLIPSIS: &str = "...";

/// Converts ascending byte offsets into character offsets in one pass.
pub(crate) struct CharOffsets<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            text,
            byte: 0,
            chars: 0,
        }
    }

    /// Character offset of `byte_offset`. Offsets must be non-decreasing.
    pub(crate) fn at(&mut self, byte_offset: usize) -> usize {
        if byte_offset < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte_offset].chars().count();
        self.byte = byte_offset;
        self.chars
    }
}

/// First [`PREVIEW_CHARS`] characters of `content`, with [`ELLIPSIS`] when cut.
pub(crate) fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], ELLIPSIS),
        None => content.to_string(),
    }
}

/// Collapse every whitespace run into a single space.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_offsets_count_characters() {
        let text = "Über 1. Intro ü 2.";
        let mut offsets = CharOffsets::new(text);
        let first = text.find("1.").unwrap();
        let second = text.find("2.").unwrap();
        assert_eq!(first, 6);
        assert_eq!(offsets.at(first), 5);
        assert_eq!(offsets.at(second), 16);
        assert_eq!(offsets.at(first), 5);
    }

    #[test]
    fn test_preview_truncation() {
        let short = "a".repeat(200);
        assert_eq!(preview(&short), short);

        let long = "é".repeat(201);
        let cut = preview(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a\n\tb   c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
