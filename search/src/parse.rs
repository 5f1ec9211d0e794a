//! Defensive parsing of free-form collaborator output.
//!
//! [`parse_candidates`] and [`parse_verdict`] are for collaborator
//! implementations that talk to a text model. [`sanitize_candidates`] is the
//! engine's own cleanup of whatever a generator returned.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use thicket_kernel::evaluation::DEGRADED_REASONING;
use thicket_kernel::{Evaluation, Verdict};

/// List markers: `-`, `*`, `•`, `1.`, `2)`, `(3)`, `Step 4:`, `Candidate 5 -`.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*•]+|\(?\d+[.):]|(?:step|candidate|option)\s*\d+\s*[:.)\-])(?:\s+|$)")
        .expect("list marker pattern is valid")
});

static VERDICT_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(sure|unsure|maybe|likely|impossible)\b").expect("verdict pattern is valid")
});

/// `Evaluation: ...` up to the end of the line.
static EVALUATION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\bevaluation[ \t]*[:=][ \t]*(.*)$").expect("evaluation label pattern is valid")
});

/// Words that turn a following `sure` or `impossible` into a hedge.
static NEGATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:not|cannot|never|hardly|unsure|hard\s+to\s+be)\b|n['’]t\b")
        .expect("negator pattern is valid")
});

static CONFIDENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confidence\s*[:=]?\s*(\d+(?:\.\d+)?)\s*(%?)")
        .expect("confidence pattern is valid")
});

static REASONING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)reason(?:ing)?\s*[:=]\s*(.+)").expect("reasoning pattern is valid")
});

/// Trim, drop blanks and drop repeats, keeping first occurrences in order.
#[must_use]
pub fn sanitize_candidates(raw: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && seen.insert(c.clone()))
        .collect()
}

/// Split a model response into at most `limit` candidate thoughts.
///
/// One candidate per line; list markers are stripped and header lines
/// ending in `:` are skipped.
#[must_use]
pub fn parse_candidates(raw: &str, limit: usize) -> Vec<String> {
    let lines = raw
        .lines()
        .map(|line| LIST_MARKER.replace(line, "").trim().to_string())
        .filter(|line| !line.ends_with(':'))
        .collect();
    let mut candidates = sanitize_candidates(lines);
    candidates.truncate(limit);
    candidates
}

/// Parse a model's judgement of a thought.
///
/// An `Evaluation:` label is read first; without one (or without a verdict
/// word in it) the whole text is searched. The earliest of `sure`,
/// `maybe`/`likely`/`unsure`, `impossible` wins. A negator earlier in the
/// same clause (`not`, `cannot`, `can't`, `hard to be`, ...) turns `sure`
/// and `impossible` into `maybe`.
///
/// Confidence comes from a `confidence: <n>` label. `85%` is a percentage;
/// a bare number is a fraction clamped to `[0, 1]`. Without a classification
/// word the result is [`Verdict::degraded`]; without a confidence label it
/// is 0.5.
#[must_use]
pub fn parse_verdict(raw: &str) -> Verdict {
    let labelled = EVALUATION_LABEL
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| classify(m.as_str()));
    let Some(evaluation) = labelled.or_else(|| classify(raw)) else {
        return Verdict::degraded();
    };

    let confidence = CONFIDENCE
        .captures(raw)
        .and_then(|caps| {
            let value: f64 = caps.get(1)?.as_str().parse().ok()?;
            let percent = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
            Some(if percent { value / 100.0 } else { value.min(1.0) })
        })
        .unwrap_or(Verdict::DEFAULT_CONFIDENCE);

    let reasoning = REASONING
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str().trim());
    let reasoning = if reasoning.is_empty() {
        DEGRADED_REASONING
    } else {
        reasoning
    };

    Verdict::new(evaluation, confidence, reasoning)
}

/// Classification from the earliest verdict word in `text`.
fn classify(text: &str) -> Option<Evaluation> {
    let word = VERDICT_WORD.find(text)?;
    let clause_start = text[..word.start()]
        .rfind(['.', ';', ',', '!', '?', '\n'])
        .map_or(0, |i| i + 1);
    let negated = NEGATOR.is_match(&text[clause_start..word.start()]);
    Some(match word.as_str().to_ascii_lowercase().as_str() {
        "sure" if !negated => Evaluation::Sure,
        "impossible" if !negated => Evaluation::Impossible,
        _ => Evaluation::Maybe,
    })
}
