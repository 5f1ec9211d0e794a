//! Collaborators backed by a raw text-completion model.
//!
//! [`PromptedGenerator`] and [`PromptedEvaluator`] turn engine requests into
//! task-typed prompts, call a [`TextCompletion`], and parse the reply with the
//! defensive helpers in [`thicket_search::parse`]. A failed completion maps to
//! zero candidates or the default verdict; the engine never sees the error.

use std::fmt::Write as _;

use async_trait::async_trait;
use thicket_kernel::Verdict;
use thicket_search::parse::{parse_candidates, parse_verdict};
use thicket_search::{
    EvaluationRequest, GenerationParams, GenerationRequest, TaskType, ThoughtEvaluator,
    ThoughtGenerator,
};
use tracing::warn;

/// A completion backend failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("completion failed: {0}")]
pub struct CompletionError(pub String);

/// Prompt in, text out. Transport and provider details live behind this.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, CompletionError>;
}

fn task_guidance(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Game24 => {
            "Combine two of the remaining numbers with +, -, * or / and list the numbers left."
        }
        TaskType::Math => "Take one concrete calculation or algebraic step.",
        TaskType::Logic => "State one deduction that follows from what is known.",
        TaskType::Creative => "Propose one distinct direction for the piece.",
        TaskType::Planning => "Propose one concrete next action.",
        TaskType::General => "Propose one useful next step.",
    }
}

fn write_context(prompt: &mut String, problem: &str, path: &[String], thought: &str) {
    let _ = writeln!(prompt, "Problem: {problem}");
    // An empty path means `thought` is the problem itself.
    if path.is_empty() {
        return;
    }
    prompt.push_str("Steps so far:\n");
    let steps = path
        .iter()
        .skip(1)
        .map(String::as_str)
        .chain(std::iter::once(thought));
    for (i, step) in steps.enumerate() {
        let _ = writeln!(prompt, "{}. {step}", i + 1);
    }
}

/// Prompt asking for `request.count` next thoughts, one per line.
#[must_use]
pub fn generation_prompt(request: &GenerationRequest<'_>) -> String {
    let mut prompt = String::new();
    write_context(&mut prompt, request.problem, request.path, request.thought);
    let _ = writeln!(prompt, "{}", task_guidance(request.task_type));
    let _ = writeln!(
        prompt,
        "Propose exactly {} different next steps, one per line, with no other text.",
        request.count
    );
    prompt
}

/// Prompt asking for a `sure` / `maybe` / `impossible` judgement of the
/// newest step.
#[must_use]
pub fn evaluation_prompt(request: &EvaluationRequest<'_>) -> String {
    let mut prompt = String::new();
    write_context(&mut prompt, request.problem, request.path, request.thought);
    prompt.push_str(
        "Judge whether the last step leads to a solution.\n\
         Answer in this format:\n\
         Evaluation: sure | maybe | impossible\n\
         Confidence: <number between 0 and 1>\n\
         Reasoning: <one sentence>\n",
    );
    prompt
}

/// [`ThoughtGenerator`] over a [`TextCompletion`].
#[derive(Debug, Clone)]
pub struct PromptedGenerator<C> {
    completion: C,
}

impl<C> PromptedGenerator<C> {
    #[must_use]
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl<C: TextCompletion> ThoughtGenerator for PromptedGenerator<C> {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Vec<String> {
        let prompt = generation_prompt(request);
        match self.completion.complete(&prompt, request.params).await {
            Ok(text) => parse_candidates(&text, request.count),
            Err(err) => {
                warn!(node = %request.node_id, error = %err, "generation completion failed");
                Vec::new()
            }
        }
    }
}

/// [`ThoughtEvaluator`] over a [`TextCompletion`].
#[derive(Debug, Clone)]
pub struct PromptedEvaluator<C> {
    completion: C,
}

impl<C> PromptedEvaluator<C> {
    #[must_use]
    pub fn new(completion: C) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl<C: TextCompletion> ThoughtEvaluator for PromptedEvaluator<C> {
    async fn evaluate(&self, request: &EvaluationRequest<'_>) -> Verdict {
        let prompt = evaluation_prompt(request);
        match self.completion.complete(&prompt, request.params).await {
            Ok(text) => parse_verdict(&text),
            Err(err) => {
                warn!(parent = %request.parent_id, error = %err, "evaluation completion failed");
                Verdict::degraded()
            }
        }
    }
}
