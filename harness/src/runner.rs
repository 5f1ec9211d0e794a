//! Harness runner: request in, digested report out.
//!
//! # Report directory
//!
//! ```text
//! <dir>/
//!   request.json        the request as run
//!   result.json         serialized SearchResult
//!   result_digest.txt   "sha256:..." over result.json
//! ```
//!
//! [`verify_dir`] recomputes the digest from `result.json` and fails closed on
//! a missing file or a mismatch.

use std::path::Path;

use thicket_kernel::digest::{
    canonical_hash, ContentHash, DOMAIN_SEARCH_REQUEST, DOMAIN_SEARCH_RESULT,
};
use thicket_search::{run_search, Collaborators, ProgressSink, SearchResult};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::HarnessError;
use crate::request::SearchRequest;

pub const REQUEST_FILENAME: &str = "request.json";
pub const RESULT_FILENAME: &str = "result.json";
pub const RESULT_DIGEST_FILENAME: &str = "result_digest.txt";

/// A finished run with its serialized artifacts.
#[derive(Debug)]
pub struct RunReport {
    pub result: SearchResult,
    pub request_digest: ContentHash,
    pub result_digest: ContentHash,
    request_json: Vec<u8>,
    result_json: Vec<u8>,
}

impl RunReport {
    #[must_use]
    pub fn result_json(&self) -> &[u8] {
        &self.result_json
    }

    /// Write the report directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Io`] on any filesystem failure.
    pub fn write_dir(&self, dir: &Path) -> Result<(), HarnessError> {
        std::fs::create_dir_all(dir).map_err(|e| HarnessError::io(dir, e))?;
        for (name, bytes) in [
            (REQUEST_FILENAME, self.request_json.as_slice()),
            (RESULT_FILENAME, self.result_json.as_slice()),
            (RESULT_DIGEST_FILENAME, self.result_digest.as_str().as_bytes()),
        ] {
            let path = dir.join(name);
            std::fs::write(&path, bytes).map_err(|e| HarnessError::io(path, e))?;
        }
        Ok(())
    }
}

/// Run one request against the given collaborators.
///
/// # Errors
///
/// - [`HarnessError::Configuration`] if the request fails validation.
/// - [`HarnessError::Json`] if the request or result cannot be encoded.
pub async fn run_request(
    request: &SearchRequest,
    collaborators: Collaborators<'_>,
    cancel: &CancellationToken,
) -> Result<RunReport, HarnessError> {
    let config = request.config()?;
    let request_json = request.to_json_bytes()?;
    let request_digest = canonical_hash(DOMAIN_SEARCH_REQUEST, &request_json);

    let result = run_search(&config, collaborators, cancel).await?;
    let result_json = result.to_json_bytes()?;
    let result_digest = canonical_hash(DOMAIN_SEARCH_RESULT, &result_json);
    info!(
        request = request.name.as_deref().unwrap_or("unnamed"),
        digest = %result_digest,
        "run complete"
    );

    Ok(RunReport {
        result,
        request_digest,
        result_digest,
        request_json,
        result_json,
    })
}

/// Run a request with collaborators built from its `[script]` table.
///
/// A request without a script runs against an empty one: the root gets no
/// candidates and is its own answer.
///
/// # Errors
///
/// As [`run_request`].
pub async fn run_scripted(
    request: &SearchRequest,
    sink: Option<&dyn ProgressSink>,
    cancel: &CancellationToken,
) -> Result<RunReport, HarnessError> {
    let script = request.script.clone().unwrap_or_default();
    let generator = script.generator();
    let evaluator = script.evaluator();
    let mut collaborators = Collaborators::new(&generator, &evaluator);
    if let Some(sink) = sink {
        collaborators = collaborators.with_sink(sink);
    }
    run_request(request, collaborators, cancel).await
}

/// Check that `result_digest.txt` matches `result.json`.
///
/// # Errors
///
/// - [`HarnessError::Io`] if either file is missing or unreadable.
/// - [`HarnessError::DigestMismatch`] if the digests differ.
pub fn verify_dir(dir: &Path) -> Result<ContentHash, HarnessError> {
    let result_path = dir.join(RESULT_FILENAME);
    let digest_path = dir.join(RESULT_DIGEST_FILENAME);
    let result_json = std::fs::read(&result_path).map_err(|e| HarnessError::io(result_path, e))?;
    let stored =
        std::fs::read_to_string(&digest_path).map_err(|e| HarnessError::io(digest_path, e))?;
    let recomputed = canonical_hash(DOMAIN_SEARCH_RESULT, &result_json);
    if stored.trim() != recomputed.as_str() {
        return Err(HarnessError::DigestMismatch {
            stored: stored.trim().to_string(),
            recomputed: recomputed.as_str().to_string(),
        });
    }
    Ok(recomputed)
}
