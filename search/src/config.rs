//! Search configuration and its validation.
//!
//! [`RawSearchConfig`] is the untrusted wire/file shape (signed integers,
//! free-form strings). It converts into the typed [`SearchConfig`] through
//! `TryFrom`, which applies the same checks as [`SearchConfig::validate`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Frontier discipline used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    /// FIFO queue.
    Bfs,
    /// LIFO stack, first-generated child explored first.
    Dfs,
    /// Level-synchronized, pruned to `candidates_per_step` per level.
    Beam,
}

impl SearchMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Beam => "beam",
        }
    }
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMethod {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(Self::Bfs),
            "dfs" => Ok(Self::Dfs),
            "beam" => Ok(Self::Beam),
            _ => Err(ConfigurationError::UnknownSearchMethod(s.to_string())),
        }
    }
}

/// Domain tag steering collaborator prompts. Opaque to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Game24,
    Math,
    Logic,
    Creative,
    Planning,
    #[default]
    General,
}

impl TaskType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Game24 => "game24",
            Self::Math => "math",
            Self::Logic => "logic",
            Self::Creative => "creative",
            Self::Planning => "planning",
            Self::General => "general",
        }
    }
}

impl FromStr for TaskType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "game24" | "game_24" => Ok(Self::Game24),
            "math" => Ok(Self::Math),
            "logic" => Ok(Self::Logic),
            "creative" => Ok(Self::Creative),
            "planning" => Ok(Self::Planning),
            "general" => Ok(Self::General),
            _ => Err(ConfigurationError::UnknownTaskType(s.to_string())),
        }
    }
}

/// Sampling parameters passed through to collaborators untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub model: String,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            model: "default".to_string(),
        }
    }
}

/// Validated search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Problem statement; becomes the root thought.
    pub problem: String,
    pub task_type: TaskType,
    pub search_method: SearchMethod,
    /// Nodes at this depth are never expanded.
    pub max_depth: u32,
    /// Candidates requested per expansion; also the beam width.
    pub candidates_per_step: usize,
    /// Hard cap on nodes created, root included.
    pub max_nodes: usize,
    pub generation: GenerationParams,
    /// Per-call collaborator deadline. `None` waits indefinitely.
    #[serde(default)]
    pub collaborator_timeout_ms: Option<u64>,
    /// Sibling evaluations in flight at once. Defaults to `candidates_per_step`.
    #[serde(default)]
    pub max_parallel_evaluations: Option<usize>,
}

impl SearchConfig {
    /// Breadth-first defaults for `problem`.
    #[must_use]
    pub fn new(problem: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            task_type: TaskType::General,
            search_method: SearchMethod::Bfs,
            max_depth: 3,
            candidates_per_step: 3,
            max_nodes: 30,
            generation: GenerationParams::default(),
            collaborator_timeout_ms: None,
            max_parallel_evaluations: None,
        }
    }

    /// Check bounds before any collaborator is called.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::NonPositiveBound`] if `max_depth`,
    ///   `candidates_per_step`, `max_nodes`, `max_parallel_evaluations` or
    ///   `collaborator_timeout_ms` is 0.
    /// - [`ConfigurationError::TemperatureOutOfRange`] for a temperature
    ///   outside `[0, 2]`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        require_positive("max_depth", u64::from(self.max_depth))?;
        require_positive("candidates_per_step", self.candidates_per_step as u64)?;
        require_positive("max_nodes", self.max_nodes as u64)?;
        if let Some(parallel) = self.max_parallel_evaluations {
            require_positive("max_parallel_evaluations", parallel as u64)?;
        }
        if let Some(timeout_ms) = self.collaborator_timeout_ms {
            require_positive("collaborator_timeout_ms", timeout_ms)?;
        }
        let temperature = self.generation.temperature;
        if !temperature.is_finite() || !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigurationError::TemperatureOutOfRange(temperature));
        }
        Ok(())
    }

    /// Bound on concurrently running sibling evaluations.
    #[must_use]
    pub fn evaluation_parallelism(&self) -> usize {
        self.max_parallel_evaluations
            .unwrap_or(self.candidates_per_step)
            .max(1)
    }

    #[must_use]
    pub fn collaborator_timeout(&self) -> Option<Duration> {
        self.collaborator_timeout_ms.map(Duration::from_millis)
    }
}

fn require_positive(field: &'static str, value: u64) -> Result<(), ConfigurationError> {
    if value == 0 {
        return Err(ConfigurationError::NonPositiveBound { field, value: 0 });
    }
    Ok(())
}

/// Untrusted configuration as it arrives from a client or a file.
///
/// Accepts both `snake_case` and `camelCase` keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSearchConfig {
    pub problem: String,
    #[serde(default, alias = "taskType")]
    pub task_type: Option<String>,
    #[serde(alias = "searchMethod")]
    pub search_method: String,
    #[serde(alias = "maxDepth")]
    pub max_depth: i64,
    #[serde(alias = "candidatesPerStep")]
    pub candidates_per_step: i64,
    #[serde(alias = "maxNodes")]
    pub max_nodes: i64,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "collaboratorTimeoutMs")]
    pub collaborator_timeout_ms: Option<u64>,
    #[serde(default, alias = "maxParallelEvaluations")]
    pub max_parallel_evaluations: Option<i64>,
}

impl TryFrom<RawSearchConfig> for SearchConfig {
    type Error = ConfigurationError;

    fn try_from(raw: RawSearchConfig) -> Result<Self, Self::Error> {
        let search_method = raw.search_method.parse()?;
        let task_type = match raw.task_type.as_deref() {
            Some(tag) => tag.parse()?,
            None => TaskType::default(),
        };
        let defaults = GenerationParams::default();
        let config = Self {
            problem: raw.problem,
            task_type,
            search_method,
            max_depth: u32::try_from(bound("max_depth", raw.max_depth)?).map_err(|_| {
                ConfigurationError::BoundTooLarge {
                    field: "max_depth",
                    value: raw.max_depth,
                }
            })?,
            candidates_per_step: bound("candidates_per_step", raw.candidates_per_step)?,
            max_nodes: bound("max_nodes", raw.max_nodes)?,
            generation: GenerationParams {
                temperature: raw.temperature.unwrap_or(defaults.temperature),
                model: raw.model.unwrap_or(defaults.model),
            },
            collaborator_timeout_ms: raw.collaborator_timeout_ms,
            max_parallel_evaluations: raw
                .max_parallel_evaluations
                .map(|v| bound("max_parallel_evaluations", v))
                .transpose()?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn bound(field: &'static str, value: i64) -> Result<usize, ConfigurationError> {
    if value < 1 {
        return Err(ConfigurationError::NonPositiveBound { field, value });
    }
    usize::try_from(value).map_err(|_| ConfigurationError::BoundTooLarge { field, value })
}
