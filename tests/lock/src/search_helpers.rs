//! Shared configuration, runners and structural checks for search tests.
//!
//! Everything here panics on failure; it is test support, not library code.

use thicket_harness::SearchRequest;
use thicket_kernel::{Evaluation, NodeId};
use thicket_search::{
    run_search, Collaborators, ProgressSink, SearchConfig, SearchEvent, SearchMethod,
    SearchResult, ThoughtEvaluator, ThoughtGenerator,
};
use tokio_util::sync::CancellationToken;

pub const GAME24_PROBLEM: &str = "reach 24 from 4,1,8,7";

/// A scripted Game of 24 run. `@METHOD@` is replaced by the search method.
const GAME24_REQUEST: &str = r#"
name = "game24-4187"

[search]
problem = "4 1 8 7"
task_type = "game24"
search_method = "@METHOD@"
max_depth = 3
candidates_per_step = 3
max_nodes = 20

[script.children]
"4 1 8 7" = [
    "8 - 7 = 1 (left: 4 1 1)",
    "4 * 8 = 32 (left: 32 1 7)",
    "4 + 8 = 12 (left: 12 1 7)",
]
"8 - 7 = 1 (left: 4 1 1)" = ["4 + 1 = 5 (left: 5 1)", "4 * 1 = 4 (left: 4 1)"]
"4 * 8 = 32 (left: 32 1 7)" = ["7 + 1 = 8 (left: 32 8)", "32 - 7 = 25 (left: 25 1)"]
"32 - 7 = 25 (left: 25 1)" = ["25 - 1 = 24 (left: 24)"]
"4 + 8 = 12 (left: 12 1 7)" = ["7 - 1 = 6 (left: 12 6)"]
"7 - 1 = 6 (left: 12 6)" = ["12 * 6 = 72 (left: 72)"]

[script.verdicts]
"8 - 7 = 1 (left: 4 1 1)" = { evaluation = "impossible", confidence = 0.9 }
"4 * 8 = 32 (left: 32 1 7)" = { evaluation = "maybe", confidence = 0.7 }
"4 + 8 = 12 (left: 12 1 7)" = { evaluation = "maybe", confidence = 0.6 }
"7 + 1 = 8 (left: 32 8)" = { evaluation = "impossible", confidence = 0.8 }
"32 - 7 = 25 (left: 25 1)" = { evaluation = "maybe", confidence = 0.8 }
"25 - 1 = 24 (left: 24)" = { evaluation = "sure", confidence = 1.0, reasoning = "24 reached" }
"7 - 1 = 6 (left: 12 6)" = { evaluation = "maybe", confidence = 0.5 }
"12 * 6 = 72 (left: 72)" = { evaluation = "impossible", confidence = 1.0 }
"#;

/// The scripted Game of 24 request for `method`.
///
/// # Panics
///
/// Panics if the embedded request does not parse.
#[must_use]
pub fn game24_request(method: SearchMethod) -> SearchRequest {
    SearchRequest::from_toml_str(&GAME24_REQUEST.replace("@METHOD@", method.as_str()))
        .expect("embedded game24 request parses")
}

#[must_use]
pub fn config(method: SearchMethod, max_depth: u32, cps: usize, max_nodes: usize) -> SearchConfig {
    SearchConfig {
        search_method: method,
        max_depth,
        candidates_per_step: cps,
        max_nodes,
        ..SearchConfig::new(GAME24_PROBLEM)
    }
}

/// Run to completion with a fresh token.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub async fn run(
    config: &SearchConfig,
    generator: &dyn ThoughtGenerator,
    evaluator: &dyn ThoughtEvaluator,
) -> SearchResult {
    run_search(
        config,
        Collaborators::new(generator, evaluator),
        &CancellationToken::new(),
    )
    .await
    .expect("valid config")
}

/// As [`run`], mirroring steps to `sink`.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub async fn run_with_sink(
    config: &SearchConfig,
    generator: &dyn ThoughtGenerator,
    evaluator: &dyn ThoughtEvaluator,
    sink: &dyn ProgressSink,
) -> SearchResult {
    run_search(
        config,
        Collaborators::new(generator, evaluator).with_sink(sink),
        &CancellationToken::new(),
    )
    .await
    .expect("valid config")
}

/// Node ids in the order they were taken from the frontier.
#[must_use]
pub fn explored(result: &SearchResult) -> Vec<NodeId> {
    result
        .steps
        .iter()
        .filter_map(|s| match s.event {
            SearchEvent::ExploreNode { node_id, .. } => Some(node_id),
            _ => None,
        })
        .collect()
}

/// Structural properties every result must satisfy.
///
/// # Panics
///
/// Panics with a description of the first violated property.
pub fn assert_structure(result: &SearchResult, config: &SearchConfig) {
    let tree = &result.tree;
    assert!(
        result.total_nodes <= config.max_nodes,
        "{} nodes exceed budget {}",
        result.total_nodes,
        config.max_nodes
    );
    assert_eq!(result.total_nodes, tree.len());
    tree.check_invariants().expect("tree invariants hold");

    let root = tree.root();
    assert_eq!(root.depth(), 0);
    assert!(root.path().is_empty());
    for node in &tree.nodes()[1..] {
        let parent = tree.node(node.parent().expect("non-root has parent")).expect("parent exists");
        assert_eq!(node.depth(), parent.depth() + 1, "depth of {}", node.id());
        assert_eq!(node.path().len(), node.depth() as usize, "path of {}", node.id());
        assert_ne!(
            node.evaluation(),
            Evaluation::Pending,
            "{} was committed without a verdict",
            node.id()
        );
    }

    assert_eq!(result.best_path.first(), Some(&NodeId::ROOT));
    assert_eq!(result.best_path.last(), Some(&result.best_node()));
    let best = tree.node(result.best_node()).expect("best node exists");
    assert_eq!(result.final_answer, best.thought());
    assert!(
        matches!(
            result.steps.last().map(|s| &s.event),
            Some(SearchEvent::Complete { .. })
        ),
        "step log must end with complete"
    );
    for (i, step) in result.steps.iter().enumerate() {
        assert_eq!(step.order, i as u64, "step orders are gap-free");
    }
}
