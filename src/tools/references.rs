use super::{guarded, PdfTools, LINE_BASED_WARNING, NO_REFERENCES_WARNING};
use crate::analysis;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::model::ReferencesPayload;

impl PdfTools {
    /// Locate the bibliography in already-extracted text and parse it.
    pub fn extract_references(&self, text: &str) -> Envelope<ReferencesPayload> {
        if text.trim().is_empty() {
            return Envelope::from_error(Error::EmptyInput);
        }

        match guarded(|| Ok(analysis::extract_references(text))) {
            Ok(extraction) => {
                log::debug!(
                    "{} references, style {}, section found: {}",
                    extraction.entries.len(),
                    extraction.style,
                    extraction.section_found
                );
                let warning = if !extraction.section_found {
                    Some(NO_REFERENCES_WARNING)
                } else if extraction.used_line_fallback {
                    Some(LINE_BASED_WARNING)
                } else {
                    None
                };

                let envelope = Envelope::success(ReferencesPayload::from(extraction));
                match warning {
                    Some(warning) => envelope.with_warning(warning),
                    None => envelope,
                }
            }
            Err(err) => Envelope::from_error_in("Failed to extract references", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ToolConfig;
    use crate::error::ErrorCode;
    use crate::model::CitationStyle;
    use crate::tools::{PdfTools, LINE_BASED_WARNING, NO_REFERENCES_WARNING};

    fn tools() -> PdfTools {
        PdfTools::new(ToolConfig::default()).unwrap()
    }

    #[test]
    fn test_empty_text_is_invalid_input() {
        let env = tools().extract_references("\n\n");
        assert_eq!(env.error().map(|e| e.code), Some(ErrorCode::InvalidInput));
    }

    #[test]
    fn test_bracket_references() {
        let text = "Body text.\n\nReferences\n[1] Smith, J. A paper. 2020.\n[2] Doe, A. Another paper. 2019.\n";
        let env = tools().extract_references(text);
        let data = env.data().unwrap();
        assert!(data.section_found);
        assert_eq!(data.citation_style, CitationStyle::NumberedBracket);
        assert_eq!(data.reference_count, 2);
        assert_eq!(data.section_start_position, Some(10));
        assert!(env.warnings().is_empty());
    }

    #[test]
    fn test_missing_section_warns() {
        let env = tools().extract_references("A paper without a bibliography.");
        let value = env.into_value();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["section_found"], false);
        assert_eq!(value["data"]["citation_style"], "unknown");
        assert_eq!(value["data"]["reference_count"], 0);
        assert!(value["data"].get("section_start_position").is_none());
        assert_eq!(value["meta"]["warnings"][0], NO_REFERENCES_WARNING);
    }

    #[test]
    fn test_line_based_fallback_warns() {
        let text = "Intro.\nReferences\nSmith and colleagues wrote a long survey on parsing.\n\nA second listing without any recognizable numbering.\n";
        let env = tools().extract_references(text);
        let data = env.data().unwrap();
        assert_eq!(data.citation_style, CitationStyle::LineBased);
        assert_eq!(data.reference_count, 2);
        assert_eq!(env.warnings(), [LINE_BASED_WARNING]);
    }
}
