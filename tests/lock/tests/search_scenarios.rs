//! End-to-end search scenarios with scripted collaborators.
//!
//! Proves:
//! 1. A `sure` first child halts the run before its sibling is created
//! 2. Without `sure`, the first deepest equal-confidence leaf wins
//! 3. A single-node budget answers with the problem itself
//! 4. An empty generation makes the root a dead end and the answer
//! 5. Beam keeps only the best `candidates_per_step` children of a level
//! 6. The scripted Game of 24 request solves under every method

use lock_tests::search_helpers::{
    assert_structure, config, explored, game24_request, run, GAME24_PROBLEM,
};
use thicket_harness::collaborators::{ScriptedEvaluator, ScriptedGenerator};
use thicket_harness::runner::run_scripted;
use thicket_kernel::{Evaluation, NodeId};
use thicket_search::{SearchEvent, SearchMethod, Selection, TerminationReason};
use tokio_util::sync::CancellationToken;

fn always_a_b() -> ScriptedGenerator {
    ScriptedGenerator::new().with_fallback(["A", "B"])
}

#[tokio::test]
async fn sure_first_child_halts_immediately() {
    let generator = always_a_b();
    let evaluator = ScriptedEvaluator::new().with("A", Evaluation::Sure, 1.0);
    let config = config(SearchMethod::Bfs, 2, 2, 10);
    let result = run(&config, &generator, &evaluator).await;

    assert_structure(&result, &config);
    assert_eq!(result.final_answer, "A");
    assert_eq!(result.total_nodes, 2, "root and A only");
    assert_eq!(
        result.termination,
        TerminationReason::Solved { node_id: NodeId(1) }
    );
    assert_eq!(result.selection, Selection::Sure { node_id: NodeId(1) });
    assert_eq!(result.best_path, vec![NodeId::ROOT, NodeId(1)]);
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn all_maybe_falls_back_to_first_deepest_leaf() {
    let generator = always_a_b();
    let evaluator = ScriptedEvaluator::new();
    let config = config(SearchMethod::Bfs, 2, 2, 10);
    let result = run(&config, &generator, &evaluator).await;

    assert_structure(&result, &config);
    assert!(!result.cancelled);
    assert_eq!(result.termination, TerminationReason::FrontierExhausted);
    assert_eq!(result.total_nodes, 7, "root, two children, four grandchildren");

    let Selection::Fallback { node_id, score } = result.selection else {
        panic!("expected fallback selection, got {:?}", result.selection);
    };
    assert_eq!(node_id, NodeId(3), "first depth-2 leaf in pre-order");
    assert!((score - 0.7).abs() < 1e-9, "0.5 confidence + 0.2 depth, got {score}");
    assert_eq!(result.final_answer, "A");
    assert_eq!(result.best_path, vec![NodeId::ROOT, NodeId(1), NodeId(3)]);
}

#[tokio::test]
async fn single_node_budget_answers_with_problem() {
    let generator = always_a_b();
    let evaluator = ScriptedEvaluator::new();
    let config = config(SearchMethod::Bfs, 2, 2, 1);
    let result = run(&config, &generator, &evaluator).await;

    assert_structure(&result, &config);
    assert_eq!(result.total_nodes, 1);
    assert_eq!(result.final_answer, GAME24_PROBLEM);
    assert_eq!(result.best_path, vec![NodeId::ROOT]);
    assert!(result.tree.root().is_leaf());
    assert_eq!(result.termination, TerminationReason::NodeBudgetExhausted);
    assert_eq!(evaluator.calls(), 0);
}

#[tokio::test]
async fn empty_generation_makes_root_the_answer() {
    for method in [SearchMethod::Bfs, SearchMethod::Dfs, SearchMethod::Beam] {
        let generator = ScriptedGenerator::new();
        let evaluator = ScriptedEvaluator::new();
        let config = config(method, 2, 2, 10);
        let result = run(&config, &generator, &evaluator).await;

        assert_structure(&result, &config);
        assert_eq!(result.total_nodes, 1);
        assert_eq!(result.best_node(), NodeId::ROOT);
        assert_eq!(result.final_answer, GAME24_PROBLEM);
        assert!(result.tree.root().is_leaf());
        assert!(result
            .steps
            .iter()
            .any(|s| s.event == SearchEvent::DeadEnd { node_id: NodeId::ROOT }));
        assert_eq!(result.termination, TerminationReason::FrontierExhausted);
    }
}

#[tokio::test]
async fn beam_keeps_two_best_of_five_children() {
    let generator =
        ScriptedGenerator::new().with_children(GAME24_PROBLEM, ["c1", "c2", "c3", "c4", "c5"]);
    let evaluator = ScriptedEvaluator::new()
        .with("c1", Evaluation::Maybe, 0.3)
        .with("c2", Evaluation::Maybe, 0.9)
        .with("c3", Evaluation::Maybe, 0.5)
        .with("c4", Evaluation::Maybe, 0.8)
        .with("c5", Evaluation::Maybe, 0.1);
    let config = config(SearchMethod::Beam, 2, 2, 30);
    let result = run(&config, &generator, &evaluator).await;

    assert_structure(&result, &config);
    assert_eq!(result.total_nodes, 6, "over-delivered candidates are kept");

    let (kept, pruned) = result
        .steps
        .iter()
        .find_map(|s| match &s.event {
            SearchEvent::BeamLevel {
                level: 1,
                kept,
                pruned,
            } => Some((kept.clone(), pruned.clone())),
            _ => None,
        })
        .expect("level 1 was promoted");
    assert_eq!(kept, vec![NodeId(2), NodeId(4)]);
    assert_eq!(pruned, vec![NodeId(3), NodeId(1), NodeId(5)]);

    let depth_one: Vec<NodeId> = explored(&result)
        .into_iter()
        .filter(|id| result.tree.node(*id).unwrap().depth() == 1)
        .collect();
    assert_eq!(depth_one, kept);
    assert_eq!(result.final_answer, "c2", "highest confidence leaf wins");
}

#[tokio::test]
async fn game24_request_solves_under_every_method() {
    for (method, total) in [
        (SearchMethod::Bfs, 8),
        (SearchMethod::Dfs, 7),
        (SearchMethod::Beam, 8),
    ] {
        let request = game24_request(method);
        let report = run_scripted(&request, None, &CancellationToken::new())
            .await
            .unwrap();
        let result = &report.result;
        let config = request.config().unwrap();

        assert_structure(result, &config);
        assert!(result.is_solved(), "{method} did not solve");
        assert_eq!(result.final_answer, "25 - 1 = 24 (left: 24)");
        assert_eq!(result.best_path.len(), 4, "{method}: root plus three steps");
        assert_eq!(result.total_nodes, total, "{method} node count");
    }
}
