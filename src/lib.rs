//! # paperparse
//!
//! Structure recovery for academic PDFs.
//!
//! Four tools are exposed, each returning a uniform [`Envelope`]:
//!
//! - `pdf_to_text`: page text and document metadata from a URL or base64 payload
//! - `extract_tables`: best-effort grid tables from a URL or base64 payload
//! - `extract_sections`: heading structure of already-extracted text
//! - `extract_references`: the bibliography of already-extracted text
//!
//! ## Quick Start
//!
//! ```no_run
//! use paperparse::{PdfTools, ToolConfig};
//!
//! # async fn run() -> paperparse::Result<()> {
//! let tools = PdfTools::new(ToolConfig::default())?;
//!
//! let text = tools.pdf_to_text("https://arxiv.org/pdf/1706.03762").await;
//! if let Some(data) = text.data() {
//!     let sections = tools.extract_sections(&data.text);
//!     println!("{}", sections.to_json(paperparse::JsonFormat::Pretty)?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The heuristics are also usable directly:
//!
//! ```
//! use paperparse::analysis::detect_sections;
//! use paperparse::HeadingStyle;
//!
//! let outline = detect_sections("1. Introduction\nText\n2. Methods\nText\n3. Results\nText\n");
//! assert_eq!(outline.style, HeadingStyle::Numbered);
//! assert_eq!(outline.len(), 3);
//! ```

pub mod analysis;
pub mod config;
pub mod detect;
pub mod envelope;
pub mod error;
pub mod model;
pub mod parser;
pub mod source;
pub mod tools;

// Re-export commonly used types
pub use config::{ErrorMode, ToolConfig, DEFAULT_FETCH_TIMEOUT};
pub use detect::{detect_header, is_pdf_bytes, PdfHeader};
pub use envelope::{Envelope, ErrorBody, JsonFormat, Meta};
pub use error::{Error, ErrorCode, Result};
pub use model::{
    CitationStyle, DocumentInfo, HeadingStyle, HierarchyEntry, NormalizedTable, PageText,
    ReferenceEntry, ReferencesPayload, SectionEntry, SectionsPayload, TableEntry, TablesPayload,
    TextPayload,
};
pub use parser::{LopdfBackend, PdfBackend, TableDetectorConfig};
pub use source::PdfSource;
pub use tools::{list_tools, PdfTools, ToolCall, ToolKind};
