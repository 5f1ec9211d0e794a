//! Search requests loaded from TOML.
//!
//! ```toml
//! name = "game24-4187"
//!
//! [search]
//! problem = "4 1 8 7"
//! task_type = "game24"
//! search_method = "bfs"
//! max_depth = 3
//! candidates_per_step = 3
//! max_nodes = 30
//!
//! [script.children]
//! "4 1 8 7" = ["8 - 7 = 1 (left: 4 1 1)"]
//! ```
//!
//! The optional `[script]` table drives the scripted collaborators.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thicket_kernel::digest::{canonical_hash, ContentHash, DOMAIN_SEARCH_REQUEST};
use thicket_search::{ConfigurationError, RawSearchConfig, SearchConfig};

use crate::collaborators::Script;
use crate::error::HarnessError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub search: RawSearchConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,
}

impl SearchRequest {
    /// Parse a request document.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Toml`] for malformed input. Bounds are not
    /// checked here; see [`Self::config`].
    pub fn from_toml_str(text: &str) -> Result<Self, HarnessError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a request file.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| HarnessError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Validated engine configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigurationError`] from validation.
    pub fn config(&self) -> Result<SearchConfig, ConfigurationError> {
        SearchConfig::try_from(self.search.clone())
    }

    /// JSON form written next to a run's result.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Digest of [`Self::to_json_bytes`].
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn digest(&self) -> Result<ContentHash, serde_json::Error> {
        Ok(canonical_hash(DOMAIN_SEARCH_REQUEST, &self.to_json_bytes()?))
    }
}
