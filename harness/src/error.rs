//! Harness errors.
//!
//! The engine itself only fails on configuration; everything else here is
//! about getting a request in and a report out.

use std::path::PathBuf;

use thicket_search::ConfigurationError;

/// Error loading a request or writing a report.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("result digest mismatch: stored={stored}, recomputed={recomputed}")]
    DigestMismatch { stored: String, recomputed: String },
}

impl HarnessError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
