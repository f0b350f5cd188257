//! Typed errors for document acquisition and rule loading.

use std::time::Duration;
use thiserror::Error;

/// Failure to obtain a document for a URL.
///
/// Every variant is fatal for the call that produced it and is surfaced to the
/// consumer as an [`ErrorRecord`](crate::models::ErrorRecord).
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("network error: {0}")]
    Network(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("page not found (404). Title: {title}")]
    NotFound { title: String },

    #[error("session unavailable: {0}")]
    Session(String),
}

/// Failure to load or compile extraction rules.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("could not read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid rules YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid CSS selector `{css}`: {reason}")]
    Selector { css: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_title() {
        let e = AcquireError::NotFound {
            title: "404 Not Found".to_string(),
        };
        assert_eq!(e.to_string(), "page not found (404). Title: 404 Not Found");
    }

    #[test]
    fn test_timeout_message() {
        let e = AcquireError::Timeout(Duration::from_secs(30));
        assert_eq!(e.to_string(), "timed out after 30s");
    }
}
