//! Service configuration.

use std::time::Duration;

use crate::parser::TableDetectorConfig;

/// Default deadline for fetching a remote PDF.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Options shared by every tool handler.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Deadline for a single remote fetch (no retries are made)
    pub fetch_timeout: Duration,

    /// User-Agent header sent with remote fetches
    pub user_agent: String,

    /// How per-page extraction failures are handled
    pub error_mode: ErrorMode,

    /// Whether per-page table detection runs on the rayon pool
    pub parallel: bool,

    /// Tuning for the grid table detector
    pub table_detector: TableDetectorConfig,
}

impl ToolConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remote fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Fail the request when any page cannot be decoded.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Disable parallel page decoding.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set table detector tuning.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.table_detector = config;
        self
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: concat!("paperparse/", env!("CARGO_PKG_VERSION")).to_string(),
            error_mode: ErrorMode::Lenient,
            parallel: true,
            table_detector: TableDetectorConfig::default(),
        }
    }
}

/// Error handling mode during page extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any page error
    Strict,
    /// Log the failure and treat the page as empty
    #[default]
    Lenient,
}
