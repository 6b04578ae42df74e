//! Error types for the audit pipeline.
//!
//! This module provides structured error handling with:
//! - `AuditError`: Failures surfaced by scoring, scanning, rendering and sinks
//! - `Result<T>`: Type alias for Results using AuditError
//!
//! Scoring and fetch failures are fatal for the whole run. Webhook failures
//! are absorbed at the sink boundary and never reach the process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::models::DeviceProfile;

// ============================================================================
// DOMAIN ERROR TYPE
// ============================================================================

/// Domain-specific errors for audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Scoring engine failure or browser launch failure
    #[error("Scoring failed for {url} ({profile}): {message}")]
    Scoring {
        url: String,
        profile: DeviceProfile,
        message: String,
    },

    /// Network-level failure fetching a page's HTML
    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Summary push to the spreadsheet webhook failed
    #[error("Webhook delivery failed: {0}")]
    Webhook(String),

    /// Page processing exceeded the configured page timeout
    #[error("Page {url} did not finish within {secs}s")]
    Timeout { url: String, secs: u64 },

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing an artifact failed
    #[error("Failed to write {}: {source}", .path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AuditError {
    /// Create a scoring error
    pub fn scoring(url: &str, profile: DeviceProfile, msg: impl Into<String>) -> Self {
        Self::Scoring {
            url: url.to_string(),
            profile,
            message: msg.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(url: &str, msg: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.to_string(),
            message: msg.into(),
        }
    }

    /// Create a webhook error
    pub fn webhook(msg: impl Into<String>) -> Self {
        Self::Webhook(msg.into())
    }

    /// Whether this error must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Webhook(_))
    }
}

/// Result type alias using AuditError.
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_webhook_errors_are_non_fatal() {
        assert!(!AuditError::webhook("502").is_fatal());
        assert!(AuditError::fetch("https://example.com", "dns").is_fatal());
        assert!(AuditError::scoring("https://example.com", DeviceProfile::Mobile, "boom").is_fatal());
    }

    #[test]
    fn scoring_error_names_the_profile() {
        let err = AuditError::scoring("https://example.com", DeviceProfile::Desktop, "chrome exited");
        assert_eq!(
            err.to_string(),
            "Scoring failed for https://example.com (desktop): chrome exited"
        );
    }
}
