//! Report directory and JSON shape lock tests.
//!
//! Proves:
//! 1. A written report verifies and its digest matches the in-memory run
//! 2. `result.json` keeps the field names and tags visualizers rely on
//! 3. Any edit to `result.json` is detected

use lock_tests::search_helpers::game24_request;
use serde_json::Value;
use thicket_harness::runner::{RESULT_DIGEST_FILENAME, RESULT_FILENAME};
use thicket_harness::{run_scripted, verify_dir, HarnessError};
use thicket_search::SearchMethod;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn result_json_shape_is_stable() {
    let report = run_scripted(
        &game24_request(SearchMethod::Dfs),
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    let json: Value = serde_json::from_slice(report.result_json()).unwrap();

    assert_eq!(json["method"], "dfs");
    assert_eq!(json["final_answer"], "25 - 1 = 24 (left: 24)");
    assert_eq!(json["termination"]["type"], "solved");
    assert_eq!(json["selection"]["kind"], "sure");
    assert_eq!(json["cancelled"], false);
    assert_eq!(json["best_path"], serde_json::json!([0, 2, 5, 6]));

    let nodes = json["tree"]["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), report.result.total_nodes);
    let root = &nodes[0];
    assert_eq!(root["id"], 0);
    assert_eq!(root["parent"], Value::Null);
    assert_eq!(root["thought"], "4 1 8 7");
    assert_eq!(nodes[1]["evaluation"], "impossible");
    assert_eq!(nodes[1]["is_leaf"], true);
    assert_eq!(nodes[6]["path"].as_array().unwrap().len(), 3);

    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps[0]["type"], "explore_node");
    assert_eq!(steps[0]["order"], 0);
    assert_eq!(steps.last().unwrap()["type"], "complete");
}

#[tokio::test]
async fn written_report_verifies_until_edited() {
    let report = run_scripted(
        &game24_request(SearchMethod::Beam),
        None,
        &CancellationToken::new(),
    )
    .await
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    report.write_dir(dir.path()).unwrap();

    let stored = std::fs::read_to_string(dir.path().join(RESULT_DIGEST_FILENAME)).unwrap();
    assert_eq!(stored, report.result_digest.as_str());
    assert_eq!(verify_dir(dir.path()).unwrap(), report.result_digest);

    let path = dir.path().join(RESULT_FILENAME);
    let edited = String::from_utf8(std::fs::read(&path).unwrap())
        .unwrap()
        .replace("25 - 1 = 24", "25 - 1 = 42");
    std::fs::write(&path, edited).unwrap();
    assert!(matches!(
        verify_dir(dir.path()),
        Err(HarnessError::DigestMismatch { .. })
    ));

    std::fs::remove_file(&path).unwrap();
    assert!(matches!(verify_dir(dir.path()), Err(HarnessError::Io { .. })));
}
