//! Uniform response envelope returned by every tool.
//!
//! A handler never returns `Err`: it either produces a [`Success`] carrying
//! its payload and advisory warnings, or a [`Failure`] carrying an
//! [`ErrorBody`] derived from an [`Error`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::{Error, ErrorCode, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace, one envelope per line
    Compact,
}

/// Outcome of one tool invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    /// `ok: true`
    Success(Success<T>),
    /// `ok: false`
    Failure(Failure),
}

/// Successful response.
#[derive(Debug, Clone, Serialize)]
pub struct Success<T> {
    ok: bool,
    /// Operation payload
    pub data: T,
    /// Timestamp, warnings, source, pagination
    pub meta: Meta,
}

/// Metadata attached to a successful response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    /// When the response was produced
    pub retrieved_at: DateTime<Utc>,
    /// Advisory, human-readable notes about best-effort results
    pub warnings: Vec<String>,
    /// URL the document was fetched from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Cursor block; results are never paged
    pub pagination: Pagination,
}

/// Pagination cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Always `null`
    pub next_cursor: Option<String>,
}

/// Failed response.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    ok: bool,
    /// What went wrong
    pub error: ErrorBody,
    /// Timestamp only
    pub meta: FailureMeta,
}

/// Error description of a failed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Closed error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Structured context (url, status_code, error_type, input_type)
    pub details: Map<String, Value>,
}

/// Metadata attached to a failed response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureMeta {
    /// When the response was produced
    pub retrieved_at: DateTime<Utc>,
}

impl<T> Envelope<T> {
    /// Wrap a payload with no warnings.
    pub fn success(data: T) -> Self {
        Envelope::Success(Success {
            ok: true,
            data,
            meta: Meta {
                retrieved_at: Utc::now(),
                warnings: Vec::new(),
                source: None,
                pagination: Pagination::default(),
            },
        })
    }

    /// Build a failure from an error, using its own message.
    pub fn from_error(err: Error) -> Self {
        let message = err.to_string();
        Self::failure(err.code(), message, err.details())
    }

    /// Build a failure whose message is prefixed with `context`.
    pub fn from_error_in(context: &str, err: Error) -> Self {
        let message = format!("{}: {}", context, err);
        Self::failure(err.code(), message, err.details())
    }

    /// Build a failure from its parts.
    pub fn failure(code: ErrorCode, message: impl Into<String>, details: Map<String, Value>) -> Self {
        Envelope::Failure(Failure {
            ok: false,
            error: ErrorBody {
                code,
                message: message.into(),
                details,
            },
            meta: FailureMeta {
                retrieved_at: Utc::now(),
            },
        })
    }

    /// Append an advisory warning. No-op on failures.
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        if let Envelope::Success(success) = &mut self {
            success.meta.warnings.push(warning.into());
        }
        self
    }

    /// Record the URL the document came from. No-op on failures.
    pub fn with_source(mut self, source: Option<String>) -> Self {
        if let Envelope::Success(success) = &mut self {
            success.meta.source = source;
        }
        self
    }

    /// Whether this is a success envelope.
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    /// The payload, if successful.
    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success(success) => Some(&success.data),
            Envelope::Failure(_) => None,
        }
    }

    /// Warnings of a success; empty for failures.
    pub fn warnings(&self) -> &[String] {
        match self {
            Envelope::Success(success) => &success.meta.warnings,
            Envelope::Failure(_) => &[],
        }
    }

    /// The error body, if failed.
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Envelope::Success(_) => None,
            Envelope::Failure(failure) => Some(&failure.error),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Convert to a JSON value.
    ///
    /// A payload that fails to serialize turns into an `INTERNAL_ERROR`
    /// envelope instead.
    pub fn into_value(self) -> Value {
        match serde_json::to_value(&self) {
            Ok(value) => value,
            Err(e) => {
                log::error!("envelope serialization failed: {}", e);
                json!({
                    "ok": false,
                    "error": {
                        "code": ErrorCode::InternalError,
                        "message": format!("Failed to serialize response: {}", e),
                        "details": { "error_type": "Serialize" },
                    },
                    "meta": { "retrieved_at": Utc::now() },
                })
            }
        }
    }

    /// Render as JSON text.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Internal(format!("JSON serialization error: {}", e)))
    }
}

impl<T> From<Error> for Envelope<T> {
    fn from(err: Error) -> Self {
        Envelope::from_error(err)
    }
}
