//! Error types for paperparse.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Result type alias for paperparse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error codes reported in failure envelopes.
///
/// This is a closed set; callers branch on it for retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad input parameters (empty text, undecodable base64).
    InvalidInput,
    /// The remote document could not be fetched.
    UpstreamError,
    /// Reserved; no handler emits it today.
    RateLimited,
    /// The remote fetch exceeded its deadline.
    Timeout,
    /// The bytes were obtained but are not a readable PDF.
    ParseError,
    /// Anything else.
    InternalError,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types that can occur while serving a request.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading local input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input text is empty or whitespace only.
    #[error("Input text is empty")]
    EmptyInput,

    /// The payload is not valid base64.
    #[error("Invalid base64 data: {0}")]
    InvalidBase64(String),

    /// A tool call was malformed (unknown tool, missing argument).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The remote server answered with a non-success status.
    #[error("Failed to fetch PDF: HTTP {status}")]
    UpstreamStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The remote fetch failed below the HTTP layer.
    #[error("Failed to fetch PDF: {message}")]
    Upstream {
        /// Requested URL
        url: String,
        /// Transport error description
        message: String,
    },

    /// The remote fetch timed out.
    #[error("Timeout while fetching PDF")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// The bytes are not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error extracting text content.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Unexpected failure inside the service.
    #[error("{0}")]
    Internal(String),

    /// A heuristic panicked; the payload message is kept.
    #[error("panic: {0}")]
    Panic(String),
}

impl Error {
    /// The envelope error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::EmptyInput | Error::InvalidBase64(_) | Error::InvalidRequest(_) => {
                ErrorCode::InvalidInput
            }
            Error::UpstreamStatus { .. } | Error::Upstream { .. } => ErrorCode::UpstreamError,
            Error::Timeout { .. } => ErrorCode::Timeout,
            Error::UnknownFormat
            | Error::UnsupportedVersion(_)
            | Error::PdfParse(_)
            | Error::Encrypted
            | Error::TextExtract(_)
            | Error::PageOutOfRange(..) => ErrorCode::ParseError,
            Error::Io(_) | Error::Internal(_) | Error::Panic(_) => ErrorCode::InternalError,
        }
    }

    /// Stable variant name, reported as `details.error_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Io(_) => "Io",
            Error::EmptyInput => "EmptyInput",
            Error::InvalidBase64(_) => "InvalidBase64",
            Error::InvalidRequest(_) => "InvalidRequest",
            Error::UpstreamStatus { .. } => "UpstreamStatus",
            Error::Upstream { .. } => "Upstream",
            Error::Timeout { .. } => "Timeout",
            Error::UnknownFormat => "UnknownFormat",
            Error::UnsupportedVersion(_) => "UnsupportedVersion",
            Error::PdfParse(_) => "PdfParse",
            Error::Encrypted => "Encrypted",
            Error::TextExtract(_) => "TextExtract",
            Error::PageOutOfRange(..) => "PageOutOfRange",
            Error::Internal(_) => "Internal",
            Error::Panic(_) => "Panic",
        }
    }

    /// Structured details attached to the failure envelope.
    pub fn details(&self) -> Map<String, Value> {
        let details = match self {
            Error::EmptyInput => json!({}),
            Error::InvalidBase64(_) => json!({ "input_type": "base64" }),
            Error::InvalidRequest(_) => json!({ "error_type": self.kind() }),
            Error::UpstreamStatus { url, status } => json!({ "url": url, "status_code": status }),
            Error::Upstream { url, .. } | Error::Timeout { url } => json!({ "url": url }),
            _ => json!({ "error_type": self.kind() }),
        };
        match details {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::InvalidBase64(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::UpstreamStatus {
            url: "https://example.com/a.pdf".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "Failed to fetch PDF: HTTP 404");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::EmptyInput.code(), ErrorCode::InvalidInput);
        assert_eq!(
            Error::InvalidBase64("bad".into()).code(),
            ErrorCode::InvalidInput
        );
        assert_eq!(
            Error::Timeout { url: "u".into() }.code(),
            ErrorCode::Timeout
        );
        assert_eq!(Error::UnknownFormat.code(), ErrorCode::ParseError);
        assert_eq!(Error::Internal("x".into()).code(), ErrorCode::InternalError);
        assert_eq!(Error::Panic("boom".into()).code(), ErrorCode::InternalError);
        assert_eq!(Error::Panic("boom".into()).details()["error_type"], "Panic");
    }

    #[test]
    fn test_upstream_status_details() {
        let err = Error::UpstreamStatus {
            url: "https://example.com/a.pdf".to_string(),
            status: 404,
        };
        let details = err.details();
        assert_eq!(details["status_code"], 404);
        assert_eq!(details["url"], "https://example.com/a.pdf");
    }

    #[test]
    fn test_parse_error_details_carry_kind() {
        let details = Error::PdfParse("bad xref".into()).details();
        assert_eq!(details["error_type"], "PdfParse");
        assert_eq!(Error::InvalidBase64("x".into()).details()["input_type"], "base64");
    }

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::RateLimited.as_str(), "RATE_LIMITED");
        assert_eq!(
            serde_json::to_value(ErrorCode::UpstreamError).unwrap(),
            "UPSTREAM_ERROR"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
