//! Error types for the search pipeline.
//!
//! Loading and querying report through one enum so the UI can show a single
//! status line; binaries wrap it in `anyhow` where they need more context.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// The dataset could not be fetched (file or network failure).
    #[error("could not retrieve '{location}': {reason}")]
    Retrieval { location: String, reason: String },

    /// The dataset was fetched but is malformed.
    #[error("could not parse '{location}': {reason}")]
    Parse { location: String, reason: String },

    /// A search or aggregate named a column the table does not declare.
    #[error("unknown column '{column}' (available: {})", available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    /// Invalid search configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SearchError {
    pub(crate) fn retrieval(source: &str, reason: impl ToString) -> Self {
        SearchError::Retrieval {
            location: source.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn parse(source: &str, reason: impl ToString) -> Self {
        SearchError::Parse {
            location: source.to_string(),
            reason: reason.to_string(),
        }
    }
}
