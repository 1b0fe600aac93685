//! Error types for the audit system

use thiserror::Error;

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Main error type for audit operations
///
/// An audited site being unreachable is never an error: transport failures
/// are folded into [`FetchResponse`](crate::FetchResponse) values and low
/// check scores. These variants cover malformed input and check faults.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Check {check} failed: {message}")]
    CheckFailed { check: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Invalid pattern: {0}")]
    RegexError(#[from] regex::Error),
}

impl AuditError {
    /// Create an invalid URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a check failure error
    pub fn check(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CheckFailed {
            check: check.into(),
            message: message.into(),
        }
    }
}
