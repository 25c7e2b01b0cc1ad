//! Resolving the `url_or_bytes` argument into PDF bytes.

use std::path::Path;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;

use crate::config::ToolConfig;
use crate::error::{Error, Result};

/// Where a PDF comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    /// Fetched over HTTP(S)
    Url(String),
    /// Inline base64 payload
    Base64(String),
    /// Raw bytes already in memory
    Bytes(Vec<u8>),
}

/// Bytes of a resolved source, plus the URL they were fetched from.
#[derive(Debug, Clone)]
pub struct FetchedPdf {
    /// Document bytes
    pub bytes: Vec<u8>,
    /// Set only for remote sources
    pub source: Option<String>,
}

impl PdfSource {
    /// Classify a tool argument by prefix.
    pub fn parse(input: &str) -> Self {
        if input.starts_with("http://") || input.starts_with("https://") {
            PdfSource::Url(input.to_string())
        } else {
            PdfSource::Base64(input.to_string())
        }
    }

    /// Read a local file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(PdfSource::Bytes(std::fs::read(path)?))
    }

    /// The URL, for remote sources.
    pub fn url(&self) -> Option<&str> {
        match self {
            PdfSource::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Produce the document bytes.
    pub async fn resolve(self, client: &Client, config: &ToolConfig) -> Result<FetchedPdf> {
        match self {
            PdfSource::Url(url) => {
                let bytes = fetch(client, &url, config.fetch_timeout).await?;
                Ok(FetchedPdf {
                    bytes,
                    source: Some(url),
                })
            }
            PdfSource::Base64(payload) => Ok(FetchedPdf {
                bytes: decode_base64(&payload)?,
                source: None,
            }),
            PdfSource::Bytes(bytes) => Ok(FetchedPdf {
                bytes,
                source: None,
            }),
        }
    }
}

/// Decode a base64 payload, ignoring embedded whitespace.
pub fn decode_base64(payload: &str) -> Result<Vec<u8>> {
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(Error::InvalidBase64("empty payload".to_string()));
    }
    Ok(BASE64.decode(compact)?)
}

/// HTTP client carrying the configured User-Agent.
pub fn build_client(config: &ToolConfig) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Single GET with a deadline; no retries.
pub async fn fetch(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>> {
    log::info!("fetching {} (timeout {:?})", url, timeout);

    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| transport_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::UpstreamStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = response.bytes().await.map_err(|e| transport_error(url, e))?;
    log::info!("fetched {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

fn transport_error(url: &str, err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout {
            url: url.to_string(),
        }
    } else {
        Error::Upstream {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    #[test]
    fn test_parse_by_prefix() {
        assert_eq!(
            PdfSource::parse("https://arxiv.org/pdf/1706.03762"),
            PdfSource::Url("https://arxiv.org/pdf/1706.03762".to_string())
        );
        assert!(PdfSource::parse("http://example.com/a.pdf").url().is_some());
        assert_eq!(
            PdfSource::parse("JVBERi0xLjc="),
            PdfSource::Base64("JVBERi0xLjc=".to_string())
        );
        // Scheme match is case sensitive.
        assert!(PdfSource::parse("HTTPS://example.com").url().is_none());
    }

    #[test]
    fn test_decode_base64() {
        assert_eq!(decode_base64("JVBERi0xLjc=").unwrap(), b"%PDF-1.7");
        assert_eq!(decode_base64("JVBE\nRi0x\r\nLjc=").unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        let err = decode_base64("not base64!!").unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert!(err.to_string().starts_with("Invalid base64 data: "));
    }

    #[test]
    fn test_decode_base64_rejects_empty() {
        assert!(matches!(decode_base64("  \n"), Err(Error::InvalidBase64(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"%PDF-1.4").unwrap();
        assert_eq!(
            PdfSource::from_file(file.path()).unwrap(),
            PdfSource::Bytes(b"%PDF-1.4".to_vec())
        );
        assert!(matches!(
            PdfSource::from_file("/nonexistent/paper.pdf"),
            Err(Error::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_base64_has_no_source() {
        let config = ToolConfig::default();
        let client = build_client(&config).unwrap();
        let fetched = PdfSource::parse("JVBERi0xLjc=")
            .resolve(&client, &config)
            .await
            .unwrap();
        assert_eq!(fetched.bytes, b"%PDF-1.7");
        assert!(fetched.source.is_none());
    }
}
