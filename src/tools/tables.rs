use rayon::prelude::*;

use super::{decode_failure, guarded, Collected, PdfTools, NO_TABLES_WARNING};
use crate::analysis::tables::page_table_entries;
use crate::config::{ErrorMode, ToolConfig};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::model::{TableEntry, TablesPayload};
use crate::parser::{LopdfBackend, PdfBackend, TableDetector, TextSpan};
use crate::source::PdfSource;

/// Detect and normalize the tables of every page.
///
/// Content streams are decoded page by page; grid detection over the
/// decoded spans runs on rayon when `config.parallel` is set. In lenient
/// mode an undecodable page has no tables and is listed in `skipped_pages`.
pub fn collect_tables(
    backend: &dyn PdfBackend,
    config: &ToolConfig,
) -> Result<Collected<TablesPayload>> {
    let mut pages: Vec<(u32, Vec<TextSpan>)> = Vec::with_capacity(backend.page_count());
    let mut skipped_pages = Vec::new();
    for page_number in backend.page_numbers() {
        let spans = match backend.page_spans(page_number) {
            Ok(spans) => spans,
            Err(e) if config.error_mode == ErrorMode::Lenient => {
                log::warn!("Failed to read text positions on page {}: {}", page_number, e);
                skipped_pages.push(page_number);
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        pages.push((page_number, spans));
    }

    let detector = TableDetector::with_config(config.table_detector.clone());
    let detect = |(page_number, spans): &(u32, Vec<TextSpan>)| -> Vec<TableEntry> {
        page_table_entries(*page_number, &detector.detect(spans))
    };
    let per_page: Vec<Vec<TableEntry>> = if config.parallel {
        pages.par_iter().map(detect).collect()
    } else {
        pages.iter().map(detect).collect()
    };

    let tables: Vec<TableEntry> = per_page.into_iter().flatten().collect();
    Ok(Collected {
        payload: TablesPayload::new(tables, backend.page_count()),
        skipped_pages,
    })
}

impl PdfTools {
    /// Extract tables from a URL or base64 payload.
    pub async fn extract_tables(&self, url_or_bytes: &str) -> Envelope<TablesPayload> {
        self.extract_tables_from(PdfSource::parse(url_or_bytes)).await
    }

    /// Extract tables from an already classified source.
    pub async fn extract_tables_from(&self, source: PdfSource) -> Envelope<TablesPayload> {
        let fetched = match self.resolve(source).await {
            Ok(fetched) => fetched,
            Err(err) => return Envelope::from_error(err),
        };
        self.tables_from_bytes(&fetched.bytes)
            .with_source(fetched.source)
    }

    /// Extract tables from PDF bytes.
    pub fn tables_from_bytes(&self, bytes: &[u8]) -> Envelope<TablesPayload> {
        let result = guarded(|| {
            let backend = LopdfBackend::load_bytes(bytes)?;
            collect_tables(&backend, &self.config)
        });

        match result {
            Ok(collected) => {
                log::debug!(
                    "{} tables on {} pages",
                    collected.payload.table_count,
                    collected.payload.page_count
                );
                let found = collected.payload.table_count > 0;
                let envelope = collected.into_envelope();
                if found {
                    envelope
                } else {
                    envelope.with_warning(NO_TABLES_WARNING)
                }
            }
            Err(err) => decode_failure("Failed to extract tables from PDF", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::DocumentInfo;
    use crate::parser::TableDetectorConfig;

    /// Pages of positioned spans; `None` pages fail to decode.
    struct FakeDocument {
        pages: Vec<Option<Vec<TextSpan>>>,
    }

    impl PdfBackend for FakeDocument {
        fn page_numbers(&self) -> Vec<u32> {
            (1..=self.pages.len() as u32).collect()
        }

        fn page_text(&self, _page: u32) -> Result<String> {
            Ok(String::new())
        }

        fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
            self.pages[page as usize - 1]
                .clone()
                .ok_or_else(|| Error::PdfParse("Invalid content stream".to_string()))
        }

        fn info(&self) -> DocumentInfo {
            DocumentInfo::default()
        }
    }

    fn grid() -> Vec<TextSpan> {
        let rows = [("Model", "Accuracy", 700.0), ("Baseline", "0.81", 686.0), ("Ours", "0.93", 672.0)];
        rows.iter()
            .flat_map(|(left, right, y)| {
                [
                    TextSpan::new(*left, 72.0, *y, 10.0),
                    TextSpan::new(*right, 272.0, *y, 10.0),
                ]
            })
            .collect()
    }

    #[test]
    fn test_collect_tables_from_grid_page() {
        let doc = FakeDocument {
            pages: vec![Some(Vec::new()), Some(grid())],
        };
        for config in [ToolConfig::default(), ToolConfig::default().sequential()] {
            let payload = collect_tables(&doc, &config).unwrap().payload;
            assert_eq!(payload.page_count, 2);
            assert_eq!(payload.table_count, 1);

            let table = &payload.tables[0];
            assert_eq!(table.page_number, 2);
            assert_eq!(table.table_index, 1);
            assert_eq!(table.table.headers, ["Model", "Accuracy"]);
            assert_eq!(table.table.rows, [["Baseline", "0.81"], ["Ours", "0.93"]]);
            assert_eq!(table.table.row_count, 2);
            assert_eq!(table.table.column_count, 2);
        }
    }

    #[test]
    fn test_lenient_mode_skips_bad_pages() {
        let doc = FakeDocument {
            pages: vec![None, Some(grid())],
        };
        let collected = collect_tables(&doc, &ToolConfig::default()).unwrap();
        assert_eq!(collected.payload.table_count, 1);
        assert_eq!(collected.skipped_pages, [1]);

        let envelope = collected.into_envelope();
        assert_eq!(
            envelope.warnings(),
            ["Page 1 could not be decoded and was treated as empty"]
        );
        assert_eq!(envelope.data().map(|d| d.table_count), Some(1));

        let strict = ToolConfig::default().strict();
        assert!(collect_tables(&doc, &strict).is_err());
    }

    #[test]
    fn test_prose_page_has_no_tables() {
        let prose = vec![
            TextSpan::new("A single column of running text", 72.0, 700.0, 10.0),
            TextSpan::new("continues down the page without", 72.0, 686.0, 10.0),
            TextSpan::new("any aligned second column.", 72.0, 672.0, 10.0),
        ];
        let doc = FakeDocument {
            pages: vec![Some(prose)],
        };
        let payload = collect_tables(&doc, &ToolConfig::default()).unwrap().payload;
        assert_eq!(payload.table_count, 0);
        assert_eq!(payload.page_count, 1);
    }

    #[test]
    fn test_detector_tuning_applies() {
        let doc = FakeDocument {
            pages: vec![Some(grid())],
        };
        let tall = TableDetectorConfig {
            min_rows: 4,
            ..Default::default()
        };
        let config = ToolConfig::default().with_table_detector(tall);
        let collected = collect_tables(&doc, &config).unwrap();
        assert_eq!(collected.payload.table_count, 0);
        assert!(collected.skipped_pages.is_empty());
    }
}
