use super::{decode_failure, guarded, Collected, PdfTools, SCANNED_WARNING};
use crate::analysis::looks_scanned;
use crate::config::ErrorMode;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::model::{PageText, TextPayload};
use crate::parser::{LopdfBackend, PdfBackend};
use crate::source::PdfSource;

/// Read every page's text and the document metadata.
///
/// In lenient mode a page that fails to decode contributes empty text and
/// is listed in `skipped_pages`.
pub fn collect_text(backend: &dyn PdfBackend, mode: ErrorMode) -> Result<Collected<TextPayload>> {
    let mut pages = Vec::with_capacity(backend.page_count());
    let mut skipped_pages = Vec::new();
    for page_number in backend.page_numbers() {
        let text = match backend.page_text(page_number) {
            Ok(text) => text,
            Err(e) if mode == ErrorMode::Lenient => {
                log::warn!("Failed to extract text from page {}: {}", page_number, e);
                skipped_pages.push(page_number);
                String::new()
            }
            Err(e) => return Err(e),
        };
        pages.push(PageText { page_number, text });
    }
    Ok(Collected {
        payload: TextPayload::new(pages, backend.info()),
        skipped_pages,
    })
}

impl PdfTools {
    /// Extract text from a URL or base64 payload.
    pub async fn pdf_to_text(&self, url_or_bytes: &str) -> Envelope<TextPayload> {
        self.pdf_to_text_from(PdfSource::parse(url_or_bytes)).await
    }

    /// Extract text from an already classified source.
    pub async fn pdf_to_text_from(&self, source: PdfSource) -> Envelope<TextPayload> {
        let fetched = match self.resolve(source).await {
            Ok(fetched) => fetched,
            Err(err) => return Envelope::from_error(err),
        };
        self.text_from_bytes(&fetched.bytes)
            .with_source(fetched.source)
    }

    /// Extract text from PDF bytes.
    pub fn text_from_bytes(&self, bytes: &[u8]) -> Envelope<TextPayload> {
        let mode = self.config.error_mode;
        let result = guarded(|| {
            let backend = LopdfBackend::load_bytes(bytes)?;
            log::debug!("PDF {}, {} pages", backend.version(), backend.page_count());
            collect_text(&backend, mode)
        });

        match result {
            Ok(collected) => {
                let payload = &collected.payload;
                let scanned = looks_scanned(&payload.text, payload.page_count);
                log::debug!(
                    "{} pages, {} chars, scanned: {}",
                    payload.page_count,
                    payload.text.chars().count(),
                    scanned
                );
                let envelope = collected.into_envelope();
                if scanned {
                    envelope.with_warning(SCANNED_WARNING)
                } else {
                    envelope
                }
            }
            Err(err) => decode_failure("Failed to parse PDF", err),
        }
    }
}
