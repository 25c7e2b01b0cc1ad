use super::{guarded, PdfTools, NO_SECTIONS_WARNING};
use crate::analysis::detect_sections;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::model::SectionsPayload;

impl PdfTools {
    /// Recover the heading structure of already-extracted text.
    pub fn extract_sections(&self, text: &str) -> Envelope<SectionsPayload> {
        if text.trim().is_empty() {
            return Envelope::from_error(Error::EmptyInput);
        }

        match guarded(|| Ok(detect_sections(text))) {
            Ok(outline) => {
                log::debug!("{} sections, style {}", outline.len(), outline.style);
                let found = !outline.is_empty();
                let envelope = Envelope::success(SectionsPayload::from(outline));
                if found {
                    envelope
                } else {
                    envelope.with_warning(NO_SECTIONS_WARNING)
                }
            }
            Err(err) => Envelope::from_error_in("Failed to extract sections", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ToolConfig;
    use crate::error::ErrorCode;
    use crate::model::HeadingStyle;
    use crate::tools::{PdfTools, NO_SECTIONS_WARNING};

    fn tools() -> PdfTools {
        PdfTools::new(ToolConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_text_is_invalid_input() {
        for text in ["", "   \n\t "] {
            let env = tools().extract_sections(text);
            let error = env.error().cloned().unwrap();
            assert_eq!(error.code, ErrorCode::InvalidInput);
            assert_eq!(error.message, "Input text is empty");
            assert!(error.details.is_empty());
        }
    }

    #[test]
    fn test_numbered_document() {
        let text = "1. Introduction\nWe study things.\n\n2. Methods\nWe measured.\n\n3. Results\nIt worked.\n";
        let env = tools().extract_sections(text);
        let data = env.data().unwrap();
        assert_eq!(data.heading_style, HeadingStyle::Numbered);
        assert_eq!(data.section_count, 3);
        assert_eq!(data.hierarchy.len(), 3);
        assert!(data.sections.iter().all(|s| s.level == 1));
        assert!(env.warnings().is_empty());
    }

    #[test]
    fn test_unstructured_text_warns() {
        let env = tools().extract_sections("just a sentence with no headings at all");
        assert!(env.is_ok());
        assert_eq!(env.data().map(|d| d.section_count), Some(0));
        assert_eq!(env.warnings(), [NO_SECTIONS_WARNING]);
    }
}
