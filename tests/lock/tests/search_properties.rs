//! Engine-wide properties, checked for every search method.
//!
//! Proves:
//! 1. Node budget, depth/path and best-path shape hold for all methods
//! 2. A `sure` node ends the run and nothing is created after it
//! 3. Without a `sure` node the answer maximizes the fallback score
//! 4. BFS is level order, DFS is pre-order, beam keeps at most the width
//! 5. Two runs with the same scripted collaborators are identical

use lock_tests::search_helpers::{assert_structure, config, explored, run, GAME24_PROBLEM};
use thicket_harness::collaborators::{ScriptedEvaluator, ScriptedGenerator};
use thicket_kernel::{Evaluation, NodeId, ThoughtNode};
use thicket_search::fallback::fallback_score;
use thicket_search::{SearchEvent, SearchMethod, Selection};

const METHODS: [SearchMethod; 3] = [SearchMethod::Bfs, SearchMethod::Dfs, SearchMethod::Beam];

/// Three children for every thought; confidence varies with the label.
fn branching() -> (ScriptedGenerator, ScriptedEvaluator) {
    let generator = ScriptedGenerator::new().with_fallback(["x", "y", "z"]);
    let evaluator = ScriptedEvaluator::new()
        .with("x", Evaluation::Maybe, 0.4)
        .with("y", Evaluation::Maybe, 0.7)
        .with("z", Evaluation::Impossible, 0.9);
    (generator, evaluator)
}

#[tokio::test]
async fn structure_holds_for_all_methods_and_budgets() {
    let (generator, evaluator) = branching();
    for method in METHODS {
        for max_nodes in [1, 2, 3, 5, 8, 13, 40] {
            for max_depth in [1, 2, 4] {
                let config = config(method, max_depth, 3, max_nodes);
                let result = run(&config, &generator, &evaluator).await;
                assert_structure(&result, &config);
                assert!(
                    result.tree.nodes().iter().all(|n| n.depth() <= max_depth),
                    "{method}: node deeper than {max_depth}"
                );
            }
        }
    }
}

#[tokio::test]
async fn sure_ends_the_run_for_all_methods() {
    for method in METHODS {
        // Labels differ per level so only the depth-2 "b2" is sure.
        let generator = ScriptedGenerator::new()
            .with_children(GAME24_PROBLEM, ["a", "b", "c"])
            .with_fallback(["a2", "b2", "c2"]);
        let evaluator = ScriptedEvaluator::new().with("b2", Evaluation::Sure, 0.95);
        let config = config(method, 3, 3, 50);
        let result = run(&config, &generator, &evaluator).await;

        assert_structure(&result, &config);
        assert!(result.is_solved(), "{method} did not stop on sure");
        assert_eq!(result.final_answer, "b2");
        assert!(matches!(result.selection, Selection::Sure { .. }));
        assert_eq!(
            result.tree.nodes().last().map(ThoughtNode::id),
            Some(result.best_node()),
            "{method}: a node was created after the sure node"
        );
        assert_eq!(generator.calls(), 2, "{method}: root and one depth-1 node expanded");
    }
}

#[tokio::test]
async fn fallback_maximizes_score_over_leaves() {
    let (generator, evaluator) = branching();
    for method in METHODS {
        let config = config(method, 3, 3, 25);
        let result = run(&config, &generator, &evaluator).await;
        assert!(!result.is_solved());

        let best = result.tree.node(result.best_node()).unwrap();
        let best_score = fallback_score(best);
        let first_max = result
            .tree
            .pre_order()
            .filter(|n| n.is_leaf())
            .find(|n| fallback_score(n) >= best_score)
            .unwrap();
        assert_eq!(first_max.id(), best.id(), "{method}: first maximum must win");
        for leaf in result.tree.nodes().iter().filter(|n| n.is_leaf()) {
            assert!(fallback_score(leaf) <= best_score, "{method}: {} beats the answer", leaf.id());
        }
    }
}

#[tokio::test]
async fn bfs_explores_level_by_level() {
    let (generator, evaluator) = branching();
    let result = run(&config(SearchMethod::Bfs, 4, 3, 40), &generator, &evaluator).await;
    let depths: Vec<u32> = explored(&result)
        .into_iter()
        .map(|id| result.tree.node(id).unwrap().depth())
        .collect();
    assert!(depths.len() > 4);
    assert!(
        depths.windows(2).all(|w| w[0] <= w[1]),
        "BFS depths must not decrease: {depths:?}"
    );
}

#[tokio::test]
async fn dfs_finishes_first_subtree_before_second_child() {
    let (generator, evaluator) = branching();
    let result = run(&config(SearchMethod::Dfs, 3, 3, 40), &generator, &evaluator).await;

    let order = explored(&result);
    let explored_pre_order: Vec<NodeId> = result
        .tree
        .pre_order()
        .map(ThoughtNode::id)
        .filter(|id| order.contains(id))
        .collect();
    assert_eq!(order, explored_pre_order);

    // Root's second child comes after everything under its first child.
    let root_children = result.tree.root().children();
    let (first, second) = (root_children[0], root_children[1]);
    let second_at = order.iter().position(|&id| id == second).unwrap();
    for (at, id) in order.iter().enumerate() {
        if result.tree.node(*id).unwrap().ancestors().contains(&first) {
            assert!(at < second_at, "{id} explored after root's second child");
        }
    }
}

#[tokio::test]
async fn beam_never_carries_more_than_width() {
    let generator = ScriptedGenerator::new().with_fallback(["p", "q", "r", "s"]);
    let evaluator = ScriptedEvaluator::new()
        .with("p", Evaluation::Maybe, 0.2)
        .with("q", Evaluation::Maybe, 0.9)
        .with("r", Evaluation::Maybe, 0.6)
        .with("s", Evaluation::Maybe, 0.4);
    for width in [1, 2, 3] {
        let config = config(SearchMethod::Beam, 3, width, 200);
        let result = run(&config, &generator, &evaluator).await;
        assert_structure(&result, &config);

        let mut levels = 0;
        for step in &result.steps {
            if let SearchEvent::BeamLevel { kept, .. } = &step.event {
                levels += 1;
                assert!(kept.len() <= width, "level kept {} > width {width}", kept.len());
            }
        }
        assert!(levels >= 2, "expected at least two promoted levels");
        for depth in 1..=3 {
            let at_depth = explored(&result)
                .into_iter()
                .filter(|id| result.tree.node(*id).unwrap().depth() == depth)
                .count();
            assert!(at_depth <= width, "{at_depth} nodes explored at depth {depth}");
        }
    }
}

#[tokio::test]
async fn identical_runs_produce_identical_results() {
    for method in METHODS {
        let (generator, evaluator) = branching();
        let config = config(method, 3, 3, 30);
        let first = run(&config, &generator, &evaluator).await;
        let second = run(&config, &generator, &evaluator).await;

        assert_eq!(first.tree, second.tree, "{method}: trees differ");
        assert_eq!(first.final_answer, second.final_answer);
        assert_eq!(first.steps, second.steps);
        assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    }
}
