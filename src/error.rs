//! Error types for share-link parsing and config generation
//!
//! The crate uses one error enum with three kinds:
//! - **MalformedLink**: a mandatory field is missing or a decode step failed (base64, JSON, URL, port).
//! - **UnsupportedScheme**: no parser matches the link's scheme (e.g. `socks://`).
//! - **EmptyBatch**: nothing survived parsing, so no config can be generated.
//!
//! Per-line failures are recorded as [`LineDiagnostic`]s by the batch loop; only
//! `EmptyBatch` aborts a conversion.

use std::fmt;
use thiserror::Error;

/// Result type for parsing and generation
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while parsing share links or generating configs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// Missing mandatory field or failed decode step
    #[error("Malformed link: {0}")]
    MalformedLink(String),
    /// No parser matches the link scheme
    #[error("Unsupported scheme: {0}")]
    UnsupportedScheme(String),
    /// No descriptor survived parsing of the whole input
    #[error("No valid proxies found ({} line(s) failed)", diagnostics.len())]
    EmptyBatch {
        /// Failures collected while parsing the batch
        diagnostics: Vec<LineDiagnostic>,
    },
}

impl ConvertError {
    /// Shorthand for `MalformedLink` with a formatted message
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ConvertError::MalformedLink(msg.into())
    }
}

/// One per-line failure recorded during a batch conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line number in the input
    pub line_number: usize,
    /// The offending line as it appeared in the input
    pub link: String,
    /// Human readable reason
    pub message: String,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut preview: String = self.link.chars().take(48).collect();
        if preview.len() < self.link.len() {
            preview.push_str("...");
        }
        write!(f, "line {}: {} ({})", self.line_number, self.message, preview)
    }
}

impl From<base64::DecodeError> for ConvertError {
    fn from(err: base64::DecodeError) -> Self {
        ConvertError::MalformedLink(format!("Base64 decode error: {}", err))
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::MalformedLink(format!("JSON parse error: {}", err))
    }
}

impl From<url::ParseError> for ConvertError {
    fn from(err: url::ParseError) -> Self {
        ConvertError::MalformedLink(format!("URL parse error: {}", err))
    }
}

impl From<std::num::ParseIntError> for ConvertError {
    fn from(err: std::num::ParseIntError) -> Self {
        ConvertError::MalformedLink(format!("Invalid port: {}", err))
    }
}

impl From<std::string::FromUtf8Error> for ConvertError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        ConvertError::MalformedLink(format!("Invalid UTF-8: {}", err))
    }
}
