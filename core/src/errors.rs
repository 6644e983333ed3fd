use thiserror::Error;

use crate::namespace::path::KeyPath;


// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
    /// A set targeted a location that cannot be created: the parent is not
    /// a table, or the path runs two or more levels past existing data.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: KeyPath, reason: String },

    /// A schema default factory failed while answering a query.
    #[error("default for '{key}' failed: {source}")]
    Default {
        key: String,
        #[source]
        source: DefaultError,
    },
}

impl StoreError {
    pub(crate) fn invalid(path: &KeyPath, reason: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            path: path.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_invalid_path(&self) -> bool {
        matches!(self, StoreError::InvalidPath { .. })
    }
}


// ---------------------------------------------------------------------------
// Default factory errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DefaultError {
    #[error("environment variable {var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: std::env::VarError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}
