//! Deterministic collaborators driven by a lookup table.
//!
//! Candidates and verdicts are keyed by thought text. Unknown thoughts get the
//! fallback candidates (none unless set) and the fallback verdict. Used by
//! fixtures, benchmarks and tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thicket_kernel::{Evaluation, Verdict};
use thicket_search::{EvaluationRequest, GenerationRequest, ThoughtEvaluator, ThoughtGenerator};

/// Verdict used for thoughts the script does not mention.
pub const UNSCRIPTED_REASONING: &str = "unscripted thought";

/// Serializable script, e.g. the `[script]` table of a request file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Parent thought to the candidates it produces, in order.
    #[serde(default)]
    pub children: BTreeMap<String, Vec<String>>,
    /// Candidates for thoughts missing from `children`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_children: Vec<String>,
    #[serde(default)]
    pub verdicts: BTreeMap<String, ScriptedVerdict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptedVerdict {
    pub evaluation: Evaluation,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
}

impl Script {
    #[must_use]
    pub fn generator(&self) -> ScriptedGenerator {
        let base = ScriptedGenerator::new()
            .with_fallback(self.fallback_children.iter().map(String::as_str));
        self.children.iter().fold(base, |g, (parent, children)| {
            g.with_children(parent, children.iter().map(String::as_str))
        })
    }

    #[must_use]
    pub fn evaluator(&self) -> ScriptedEvaluator {
        self.verdicts
            .iter()
            .fold(ScriptedEvaluator::new(), |e, (thought, v)| {
                e.with_verdict(
                    thought,
                    Verdict::new(v.evaluation, v.confidence, v.reasoning.clone()),
                )
            })
    }
}

/// Table-driven [`ThoughtGenerator`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    children: HashMap<String, Vec<String>>,
    fallback: Vec<String>,
    latency: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_children<'c>(
        mut self,
        parent: &str,
        children: impl IntoIterator<Item = &'c str>,
    ) -> Self {
        self.children.insert(
            parent.to_string(),
            children.into_iter().map(str::to_string).collect(),
        );
        self
    }

    /// Candidates for every thought without its own entry.
    #[must_use]
    pub fn with_fallback<'c>(mut self, children: impl IntoIterator<Item = &'c str>) -> Self {
        self.fallback = children.into_iter().map(str::to_string).collect();
        self
    }

    /// Sleep this long before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `generate` calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThoughtGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.children
            .get(request.thought)
            .unwrap_or(&self.fallback)
            .clone()
    }
}

/// Table-driven [`ThoughtEvaluator`].
#[derive(Debug)]
pub struct ScriptedEvaluator {
    verdicts: HashMap<String, Verdict>,
    fallback: Verdict,
    latency: Option<Duration>,
    latencies: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl Default for ScriptedEvaluator {
    fn default() -> Self {
        Self {
            verdicts: HashMap::new(),
            fallback: Verdict::new(
                Evaluation::Maybe,
                Verdict::DEFAULT_CONFIDENCE,
                UNSCRIPTED_REASONING,
            ),
            latency: None,
            latencies: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_verdict(mut self, thought: &str, verdict: Verdict) -> Self {
        self.verdicts.insert(thought.to_string(), verdict);
        self
    }

    /// Shorthand for [`Self::with_verdict`] with generated reasoning.
    #[must_use]
    pub fn with(self, thought: &str, evaluation: Evaluation, confidence: f64) -> Self {
        let reasoning = format!("{thought} judged {evaluation}");
        self.with_verdict(thought, Verdict::new(evaluation, confidence, reasoning))
    }

    /// Verdict for unscripted thoughts.
    #[must_use]
    pub fn with_fallback(mut self, verdict: Verdict) -> Self {
        self.fallback = verdict;
        self
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Latency for one thought, overriding [`Self::with_latency`].
    #[must_use]
    pub fn with_latency_for(mut self, thought: &str, latency: Duration) -> Self {
        self.latencies.insert(thought.to_string(), latency);
        self
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThoughtEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latencies.get(request.thought).copied().or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.verdicts
            .get(request.thought)
            .unwrap_or(&self.fallback)
            .clone()
    }
}
