//! Shared helpers for thicket benchmark suites.

use thicket_harness::collaborators::{ScriptedEvaluator, ScriptedGenerator};
use thicket_kernel::{Evaluation, NodeId, ThoughtTree, Verdict};
use thicket_search::{run_search, Collaborators, SearchConfig, SearchMethod, SearchResult};
use tokio_util::sync::CancellationToken;

/// Candidate labels handed out for every thought.
pub const LABELS: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

/// Scripted collaborators producing `branching` maybe-children per thought,
/// with confidence rising along the label list. Nothing is ever `sure`, so
/// runs are bounded by the node budget or the depth limit.
///
/// # Panics
///
/// Panics if `branching` exceeds [`LABELS`].
#[must_use]
pub fn scripted(branching: usize) -> (ScriptedGenerator, ScriptedEvaluator) {
    assert!(branching <= LABELS.len(), "at most {} labels", LABELS.len());
    let generator = ScriptedGenerator::new().with_fallback(LABELS[..branching].iter().copied());
    let evaluator = LABELS
        .iter()
        .zip(1u32..)
        .fold(ScriptedEvaluator::new(), |e, (label, rank)| {
            e.with(label, Evaluation::Maybe, f64::from(rank) / 10.0)
        });
    (generator, evaluator)
}

/// Complete tree of the given shape, every node judged maybe.
///
/// # Panics
///
/// Panics if a child cannot be committed. Benchmark setup failures are fatal.
#[must_use]
pub fn complete_tree(branching: usize, depth: u32) -> ThoughtTree {
    let mut tree = ThoughtTree::new("benchmark problem", usize::MAX);
    let mut level = vec![NodeId::ROOT];
    for _ in 0..depth {
        let mut next = Vec::with_capacity(level.len() * branching);
        for parent in level {
            for (i, label) in LABELS.iter().cycle().take(branching).enumerate() {
                let pending = tree.prepare_child(parent, *label).expect("parent exists");
                #[allow(clippy::cast_precision_loss)]
                let confidence = (i + 1) as f64 / (branching + 1) as f64;
                let verdict = Verdict::new(Evaluation::Maybe, confidence, "");
                next.push(tree.commit_child(pending, verdict).expect("budget is unbounded"));
            }
        }
        level = next;
    }
    tree.finalize_leaves();
    tree
}

#[must_use]
pub fn config(method: SearchMethod, max_depth: u32, branching: usize, max_nodes: usize) -> SearchConfig {
    SearchConfig {
        search_method: method,
        max_depth,
        candidates_per_step: branching,
        max_nodes,
        ..SearchConfig::new("benchmark problem")
    }
}

/// Single-threaded runtime for driving the engine from a benchmark loop.
///
/// # Panics
///
/// Panics if the runtime cannot be built.
#[must_use]
pub fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("tokio runtime builds")
}

/// Run one search to completion.
///
/// # Panics
///
/// Panics if `config` is invalid.
pub async fn run(
    config: &SearchConfig,
    generator: &ScriptedGenerator,
    evaluator: &ScriptedEvaluator,
) -> SearchResult {
    run_search(
        config,
        Collaborators::new(generator, evaluator),
        &CancellationToken::new(),
    )
    .await
    .expect("benchmark config is valid")
}
