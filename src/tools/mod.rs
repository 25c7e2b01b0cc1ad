//! The four tool handlers and their registry.
//!
//! Every handler is total: whatever happens, the caller gets an
//! [`Envelope`]. Heuristic panics are caught and reported as
//! `INTERNAL_ERROR`.

mod references;
mod sections;
mod tables;
mod text;

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::ToolConfig;
use crate::envelope::Envelope;
use crate::error::{Error, ErrorCode, Result};
use crate::source::{build_client, FetchedPdf, PdfSource};

pub use tables::collect_tables;
pub use text::collect_text;

/// Warning attached when the text density suggests an image-only PDF.
pub const SCANNED_WARNING: &str = "This PDF appears to be scanned or image-based. \
    Text extraction may be incomplete. OCR is not supported.";

/// Warning attached when no heading was recognized.
pub const NO_SECTIONS_WARNING: &str =
    "No clear section structure detected. The document may not have standard headings.";

/// Warning attached when no references header was found.
pub const NO_REFERENCES_WARNING: &str = "No references section found. \
    The document may not have a standard references/bibliography section.";

/// Warning attached when references were split by paragraph.
pub const LINE_BASED_WARNING: &str = "Citation style could not be determined. \
    References were extracted using line-based parsing.";

/// Warning attached when no table survived normalization.
pub const NO_TABLES_WARNING: &str = "No tables were detected in this PDF. \
    Tables may be embedded as images or have non-standard formatting.";

/// Warning attached for each page lenient mode treated as empty.
pub fn skipped_page_warning(page: u32) -> String {
    format!("Page {} could not be decoded and was treated as empty", page)
}

/// A collected payload plus the pages that failed to decode in lenient mode.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    /// Extraction result over the readable pages
    pub payload: T,
    /// Pages skipped after a decode failure, ascending
    pub skipped_pages: Vec<u32>,
}

impl<T> Collected<T> {
    fn into_envelope(self) -> Envelope<T> {
        self.skipped_pages
            .iter()
            .fold(Envelope::success(self.payload), |envelope, page| {
                envelope.with_warning(skipped_page_warning(*page))
            })
    }
}

/// Tool handlers sharing one configuration and HTTP client.
#[derive(Debug, Clone)]
pub struct PdfTools {
    config: ToolConfig,
    client: Client,
}

impl PdfTools {
    /// Create handlers with the given configuration.
    pub fn new(config: ToolConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }

    /// The active configuration.
    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    async fn resolve(&self, source: PdfSource) -> Result<FetchedPdf> {
        source.resolve(&self.client, &self.config).await
    }

    /// Invoke a tool by name with JSON arguments and render the envelope.
    pub async fn call(&self, name: &str, arguments: &Value) -> Value {
        let Some(kind) = ToolKind::from_name(name) else {
            return invalid_request(format!("Unknown tool: {}", name));
        };
        let Some(argument) = arguments.get(kind.argument()).and_then(Value::as_str) else {
            return invalid_request(format!(
                "Missing string argument '{}' for {}",
                kind.argument(),
                kind.name()
            ));
        };

        log::debug!("calling {} ({} bytes of input)", kind.name(), argument.len());
        match kind {
            ToolKind::PdfToText => self.pdf_to_text(argument).await.into_value(),
            ToolKind::ExtractSections => self.extract_sections(argument).into_value(),
            ToolKind::ExtractTables => self.extract_tables(argument).await.into_value(),
            ToolKind::ExtractReferences => self.extract_references(argument).into_value(),
        }
    }
}

/// The bytes were obtained but could not be read as a PDF.
fn decode_failure<T>(context: &str, err: Error) -> Envelope<T> {
    let message = format!("{}: {}", context, err);
    Envelope::failure(ErrorCode::ParseError, message, err.details())
}

fn invalid_request(message: String) -> Value {
    Envelope::<()>::from_error(Error::InvalidRequest(message)).into_value()
}

/// The registered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    PdfToText,
    ExtractSections,
    ExtractTables,
    ExtractReferences,
}

impl ToolKind {
    /// Every tool, in registration order.
    pub const ALL: [ToolKind; 4] = [
        ToolKind::PdfToText,
        ToolKind::ExtractSections,
        ToolKind::ExtractTables,
        ToolKind::ExtractReferences,
    ];

    /// Wire name.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::PdfToText => "pdf_to_text",
            ToolKind::ExtractSections => "extract_sections",
            ToolKind::ExtractTables => "extract_tables",
            ToolKind::ExtractReferences => "extract_references",
        }
    }

    /// One-line description for tool listings.
    pub fn description(&self) -> &'static str {
        match self {
            ToolKind::PdfToText => "Extract all text from a PDF (url or base64-encoded bytes)",
            ToolKind::ExtractSections => "Analyze text and identify sections/headings structure",
            ToolKind::ExtractTables => "Best-effort table extraction from PDF",
            ToolKind::ExtractReferences => {
                "Extract bibliography/references from academic PDF text"
            }
        }
    }

    /// Name of the single string argument.
    pub fn argument(&self) -> &'static str {
        match self {
            ToolKind::PdfToText | ToolKind::ExtractTables => "url_or_bytes",
            ToolKind::ExtractSections | ToolKind::ExtractReferences => "text",
        }
    }

    /// Look a tool up by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Name, description and input schema.
    pub fn descriptor(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(self.argument().to_string(), json!({ "type": "string" }));
        json!({
            "name": self.name(),
            "description": self.description(),
            "inputSchema": {
                "type": "object",
                "properties": properties,
                "required": [self.argument()]
            }
        })
    }
}

/// Descriptors of all tools.
pub fn list_tools() -> Vec<Value> {
    ToolKind::ALL.iter().map(ToolKind::descriptor).collect()
}

/// One line of the stdio protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool wire name
    pub tool: String,
    /// Argument object
    #[serde(default)]
    pub arguments: Value,
}

/// Run `f`, turning a panic into [`Error::Panic`].
pub(crate) fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        log::error!("caught panic: {}", message);
        Err(Error::Panic(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_lookup() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("ocr"), None);
        assert_eq!(ToolKind::ExtractTables.argument(), "url_or_bytes");
        assert_eq!(ToolKind::ExtractReferences.argument(), "text");
    }

    #[test]
    fn test_descriptor_schema() {
        let tools = list_tools();
        assert_eq!(tools.len(), 4);
        assert_eq!(tools[0]["name"], "pdf_to_text");
        assert_eq!(tools[1]["inputSchema"]["required"][0], "text");
        assert_eq!(
            tools[2]["inputSchema"]["properties"]["url_or_bytes"]["type"],
            "string"
        );
    }

    #[test]
    fn test_guarded_catches_panics() {
        let result: Result<()> = guarded(|| panic!("index out of bounds"));
        match result {
            Err(Error::Panic(message)) => assert_eq!(message, "index out of bounds"),
            other => panic!("expected panic error, got {:?}", other),
        }

        let formatted: Result<()> = guarded(|| panic!("bad offset {}", 7));
        assert!(matches!(formatted, Err(Error::Panic(m)) if m == "bad offset 7"));

        assert_eq!(guarded(|| Ok(3)).unwrap(), 3);
    }

    #[test]
    fn test_decode_panic_is_parse_error() {
        let failed: Result<()> = guarded(|| panic!("bad xref offset"));
        let Err(err) = failed else {
            panic!("guarded should report the panic");
        };
        let envelope: Envelope<()> = decode_failure("Failed to parse PDF", err);
        let error = envelope.error().cloned().unwrap();
        assert_eq!(error.code, ErrorCode::ParseError);
        assert_eq!(error.message, "Failed to parse PDF: panic: bad xref offset");
        assert_eq!(error.details["error_type"], "Panic");
    }

    #[test]
    fn test_tool_call_arguments_default() {
        let call: ToolCall = serde_json::from_str(r#"{"tool":"extract_sections"}"#).unwrap();
        assert_eq!(call.tool, "extract_sections");
        assert!(call.arguments.is_null());
    }

    #[tokio::test]
    async fn test_call_rejects_unknown_tool() {
        let tools = PdfTools::new(ToolConfig::default()).unwrap();
        let value = tools.call("ocr_page", &json!({})).await;
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "INVALID_INPUT");
        assert_eq!(value["error"]["message"], "Invalid request: Unknown tool: ocr_page");
    }

    #[tokio::test]
    async fn test_call_rejects_missing_argument() {
        let tools = PdfTools::new(ToolConfig::default()).unwrap();
        let value = tools
            .call("extract_sections", &json!({ "text": 42 }))
            .await;
        assert_eq!(value["error"]["code"], "INVALID_INPUT");
        assert_eq!(value["error"]["details"]["error_type"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_call_dispatches_by_name() {
        let tools = PdfTools::new(ToolConfig::default()).unwrap();
        let text = "1. Introduction\nBody.\n2. Methods\nBody.\n3. Results\nBody.\n";
        let value = tools.call("extract_sections", &json!({ "text": text })).await;
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["heading_style"], "numbered");
        assert_eq!(value["data"]["section_count"], 3);
    }
}
