//! Search entry point and expansion loop.
//!
//! One loop serves all three methods; the [`Frontier`] decides what is
//! expanded next. Each expansion asks the generator for candidates, evaluates
//! the surviving candidates concurrently, then commits them to the tree in
//! generation order. Commits stop at the first `sure` child, so no sibling
//! generated after it ever enters the tree.
//!
//! Collaborator calls are raced against the cancellation token and the
//! optional deadline, and run under `catch_unwind`. None of that reaches the
//! caller as an error: the run always ends with a [`SearchResult`] whose
//! [`TerminationReason`] says why it stopped.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::{stream, FutureExt, StreamExt};
use thicket_kernel::{Evaluation, NodeId, PendingThought, ThoughtTree, TreeError, Verdict};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use crate::collaborator::{
    EvaluationRequest, GenerationRequest, ThoughtEvaluator, ThoughtGenerator,
};
use crate::config::SearchConfig;
use crate::error::ConfigurationError;
use crate::event::{CollaboratorStage, Degradation, ProgressSink, SearchEvent, StepLog};
use crate::fallback::select_fallback;
use crate::frontier::{frontier_for, Admitted, Frontier};
use crate::parse::sanitize_candidates;
use crate::result::{SearchResult, Selection, TerminationReason};

/// The engine's view of the outside world for one run.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub generator: &'a dyn ThoughtGenerator,
    pub evaluator: &'a dyn ThoughtEvaluator,
    /// Receives each step as it is recorded.
    pub sink: Option<&'a dyn ProgressSink>,
}

impl<'a> Collaborators<'a> {
    #[must_use]
    pub fn new(generator: &'a dyn ThoughtGenerator, evaluator: &'a dyn ThoughtEvaluator) -> Self {
        Self {
            generator,
            evaluator,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_sink(self, sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink: Some(sink),
            ..self
        }
    }
}

/// Run a tree-of-thoughts search.
///
/// Everything that happens after validation, including collaborator panics,
/// timeouts and cancellation, is reported through the returned
/// [`SearchResult`].
///
/// # Errors
///
/// Returns [`ConfigurationError`] when `config` fails validation. No
/// collaborator is called in that case.
pub async fn run_search(
    config: &SearchConfig,
    collaborators: Collaborators<'_>,
    cancel: &CancellationToken,
) -> Result<SearchResult, ConfigurationError> {
    config.validate()?;

    let span = tracing::info_span!(
        "search",
        method = %config.search_method,
        task = config.task_type.as_str(),
        max_nodes = config.max_nodes,
    );
    let engine = Engine::new(config, collaborators, cancel);
    Ok(engine.run().instrument(span).await)
}

/// Outcome of a guarded collaborator call.
enum Guarded<T> {
    Done(T),
    Degraded(Degradation),
    Cancelled,
}

async fn guarded<T>(
    call: impl Future<Output = T>,
    deadline: Option<Duration>,
    cancel: &CancellationToken,
) -> Guarded<T> {
    let caught = AssertUnwindSafe(call).catch_unwind();
    let bounded = async {
        match deadline {
            Some(limit) => tokio::time::timeout(limit, caught)
                .await
                .map_err(|_| Degradation::TimedOut),
            None => Ok(caught.await),
        }
    };
    tokio::select! {
        biased;
        () = cancel.cancelled() => Guarded::Cancelled,
        outcome = bounded => match outcome {
            Ok(Ok(value)) => Guarded::Done(value),
            Ok(Err(_)) => Guarded::Degraded(Degradation::Panicked),
            Err(degradation) => Guarded::Degraded(degradation),
        },
    }
}

enum Expansion {
    Continue,
    Solved(NodeId),
    Cancelled,
}

struct Engine<'a> {
    config: &'a SearchConfig,
    generator: &'a dyn ThoughtGenerator,
    evaluator: &'a dyn ThoughtEvaluator,
    cancel: &'a CancellationToken,
    tree: ThoughtTree,
    frontier: Box<dyn Frontier>,
    log: StepLog<'a>,
    explored: usize,
}

impl<'a> Engine<'a> {
    fn new(
        config: &'a SearchConfig,
        collaborators: Collaborators<'a>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            generator: collaborators.generator,
            evaluator: collaborators.evaluator,
            cancel,
            tree: ThoughtTree::new(config.problem.as_str(), config.max_nodes),
            frontier: frontier_for(
                config.search_method,
                config.candidates_per_step,
                NodeId::ROOT,
            ),
            log: StepLog::new(collaborators.sink),
            explored: 0,
        }
    }

    async fn run(mut self) -> SearchResult {
        info!(max_depth = self.config.max_depth, "search started");
        let termination = match self.explore().await {
            Ok(termination) => termination,
            Err(err) => {
                warn!(error = %err, "tree mutation failed; returning partial tree");
                TerminationReason::TreeInvariantViolation {
                    detail: err.to_string(),
                }
            }
        };
        self.finish(termination)
    }

    async fn explore(&mut self) -> Result<TerminationReason, TreeError> {
        loop {
            if self.cancel.is_cancelled() {
                return Ok(TerminationReason::Cancelled);
            }
            if self.tree.is_budget_exhausted() {
                return Ok(TerminationReason::NodeBudgetExhausted);
            }
            let Some(popped) = self.frontier.pop() else {
                return Ok(TerminationReason::FrontierExhausted);
            };
            if let Some(promotion) = popped.promotion {
                debug!(
                    level = promotion.level,
                    kept = promotion.kept.len(),
                    pruned = promotion.pruned.len(),
                    "beam level"
                );
                self.log.record(SearchEvent::BeamLevel {
                    level: promotion.level,
                    kept: promotion.kept,
                    pruned: promotion.pruned,
                });
            }

            let node_id = popped.node_id;
            let node = self.tree.node(node_id)?;
            let depth = node.depth();
            let thought = node.thought().to_string();
            self.explored += 1;
            debug!(node = %node_id, depth, "explore");
            self.log.record(SearchEvent::ExploreNode {
                node_id,
                depth,
                thought,
            });

            if depth >= self.config.max_depth {
                self.tree.mark_leaf(node_id)?;
                self.log.record(SearchEvent::DepthLimit { node_id });
                continue;
            }

            match self.expand(node_id).await? {
                Expansion::Continue => {}
                Expansion::Solved(solution) => {
                    return Ok(TerminationReason::Solved { node_id: solution });
                }
                Expansion::Cancelled => return Ok(TerminationReason::Cancelled),
            }
        }
    }

    async fn expand(&mut self, node_id: NodeId) -> Result<Expansion, TreeError> {
        let requested = self.config.candidates_per_step;
        let deadline = self.config.collaborator_timeout();

        let outcome = {
            let node = self.tree.node(node_id)?;
            let request = GenerationRequest::for_node(
                node,
                &self.config.problem,
                self.config.task_type,
                requested,
                &self.config.generation,
            );
            guarded(self.generator.generate(&request), deadline, self.cancel).await
        };
        let raw = match outcome {
            Guarded::Done(raw) => raw,
            Guarded::Cancelled => return Ok(Expansion::Cancelled),
            Guarded::Degraded(degradation) => {
                self.degraded(node_id, CollaboratorStage::Generation, degradation);
                Vec::new()
            }
        };

        let received = raw.len();
        let candidates = sanitize_candidates(raw);
        if candidates.len() < received {
            self.degraded(
                node_id,
                CollaboratorStage::Generation,
                Degradation::Discarded {
                    dropped: received - candidates.len(),
                },
            );
        }
        if candidates.len() > requested {
            self.degraded(
                node_id,
                CollaboratorStage::Generation,
                Degradation::OverDelivered {
                    requested,
                    received: candidates.len(),
                },
            );
        }
        if candidates.is_empty() {
            debug!(node = %node_id, "dead end");
            self.tree.mark_leaf(node_id)?;
            self.log.record(SearchEvent::DeadEnd { node_id });
            return Ok(Expansion::Continue);
        }

        let generated = candidates.len();
        let created = generated.min(self.tree.remaining_budget());
        if created < generated {
            debug!(node = %node_id, generated, created, "budget truncated candidates");
            self.log.record(SearchEvent::BudgetTruncated {
                node_id,
                generated,
                created,
            });
        }
        let pending = candidates
            .into_iter()
            .take(created)
            .map(|thought| self.tree.prepare_child(node_id, thought))
            .collect::<Result<Vec<_>, _>>()?;

        let config = self.config;
        let evaluator = self.evaluator;
        let cancel = self.cancel;
        let problem = config.problem.as_str();
        let task_type = config.task_type;
        let params = &config.generation;
        let mut evaluations = stream::iter(pending)
            .map(move |pending: PendingThought| async move {
                let outcome = {
                    let request =
                        EvaluationRequest::for_pending(&pending, problem, task_type, params);
                    guarded(evaluator.evaluate(&request), deadline, cancel).await
                };
                (pending, outcome)
            })
            .buffered(config.evaluation_parallelism());

        let mut admitted = Vec::new();
        while let Some((pending, outcome)) = evaluations.next().await {
            let (verdict, degradation) = match outcome {
                Guarded::Done(verdict) if verdict.evaluation == Evaluation::Pending => {
                    (Verdict::degraded(), Some(Degradation::Unclassified))
                }
                Guarded::Done(verdict) => (verdict, None),
                Guarded::Degraded(degradation) => (Verdict::degraded(), Some(degradation)),
                Guarded::Cancelled => return Ok(Expansion::Cancelled),
            };

            let depth = pending.depth();
            let thought = pending.thought().to_string();
            let child = self.tree.commit_child(pending, verdict)?;
            self.log.record(SearchEvent::GenerateCandidate {
                parent_id: node_id,
                node_id: child,
                depth,
                thought,
            });
            if let Some(degradation) = degradation {
                self.degraded(child, CollaboratorStage::Evaluation, degradation);
            }

            let node = self.tree.node(child)?;
            let evaluation = node.evaluation();
            let confidence = node.confidence();
            let reasoning = node.reasoning().to_string();
            self.log.record(SearchEvent::EvaluationComplete {
                node_id: child,
                evaluation,
                confidence,
                reasoning,
            });

            match evaluation {
                Evaluation::Sure => {
                    info!(node = %child, depth, "sure thought found");
                    return Ok(Expansion::Solved(child));
                }
                Evaluation::Impossible => self.tree.mark_leaf(child)?,
                Evaluation::Maybe | Evaluation::Pending => admitted.push(Admitted {
                    node_id: child,
                    confidence,
                }),
            }
        }

        self.frontier.admit(&admitted);
        Ok(Expansion::Continue)
    }

    fn degraded(&mut self, node_id: NodeId, stage: CollaboratorStage, degradation: Degradation) {
        warn!(node = %node_id, ?stage, ?degradation, "collaborator degraded");
        self.log.record(SearchEvent::Degraded {
            node_id,
            stage,
            degradation,
        });
    }

    fn finish(mut self, mut termination: TerminationReason) -> SearchResult {
        debug!(
            method = %self.frontier.method(),
            left = ?self.frontier.pending(),
            "frontier at termination"
        );
        self.tree.finalize_leaves();
        if let Err(err) = self.tree.check_invariants() {
            warn!(error = %err, "tree invariant check failed");
            termination = TerminationReason::TreeInvariantViolation {
                detail: err.to_string(),
            };
        }

        let selection = match termination {
            TerminationReason::Solved { node_id } => Selection::Sure { node_id },
            _ => {
                let choice = select_fallback(&self.tree);
                Selection::Fallback {
                    node_id: choice.node_id,
                    score: choice.score,
                }
            }
        };
        let best_node = selection.node_id();
        let best_path = self
            .tree
            .path_ids(best_node)
            .unwrap_or_else(|_| vec![NodeId::ROOT]);
        let final_answer = self
            .tree
            .get(best_node)
            .map_or_else(|| self.config.problem.clone(), |n| n.thought().to_string());
        let total_nodes = self.tree.len();

        info!(
            termination = ?termination,
            best = %best_node,
            total_nodes,
            explored = self.explored,
            "search complete"
        );
        self.log.record(SearchEvent::Complete {
            termination: termination.clone(),
            best_node,
            final_answer: final_answer.clone(),
            total_nodes,
            explored_nodes: self.explored,
        });

        SearchResult {
            method: self.config.search_method,
            cancelled: termination == TerminationReason::Cancelled,
            tree: self.tree,
            best_path,
            final_answer,
            selection,
            termination,
            total_nodes,
            explored_nodes: self.explored,
            frontier_high_water: self.frontier.high_water(),
            steps: self.log.into_steps(),
        }
    }
}
