//! Analysis tasks and task selection.

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Most tasks a single item may fan out to.
pub const MAX_TASKS_PER_ITEM: usize = 3;

/// One analysis dimension requested for an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Positive / Negative / Neutral classification.
    Sentiment,
    /// Main topic in a few words.
    Topic,
    /// One-sentence review summary.
    Summary,
    /// Two to three sentence summary.
    Brief,
    /// Summary covering all main points.
    Detailed,
    /// Bullet-point summary.
    Bullets,
}

impl Task {
    /// Every task, in canonical order.
    pub const ALL: [Task; 6] = [
        Task::Sentiment,
        Task::Topic,
        Task::Summary,
        Task::Brief,
        Task::Detailed,
        Task::Bullets,
    ];

    /// The summarization modes.
    pub const SUMMARY_MODES: [Task; 3] = [Task::Brief, Task::Detailed, Task::Bullets];

    /// Returns the wire name of the task.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::Topic => "topic",
            Self::Summary => "summary",
            Self::Brief => "brief",
            Self::Detailed => "detailed",
            Self::Bullets => "bullets",
        }
    }

    /// Whether replies must be coerced onto a fixed label set.
    #[must_use]
    pub fn is_classification(self) -> bool {
        matches!(self, Self::Sentiment)
    }

    /// Whether this is one of the language-aware summarization modes.
    #[must_use]
    pub fn is_summary_mode(self) -> bool {
        Self::SUMMARY_MODES.contains(&self)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|task| task.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|t| t.as_str()).collect();
                AnalysisError::validation(
                    "task",
                    format!("unknown task '{s}'. Choose from: {}", valid.join(", ")),
                )
            })
    }
}

/// The ordered, de-duplicated set of tasks to run for one item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskSet(Vec<Task>);

impl TaskSet {
    /// Creates a set from tasks, dropping duplicates but keeping first-seen order.
    #[must_use]
    pub fn new(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut ordered = Vec::new();
        for task in tasks {
            if !ordered.contains(&task) {
                ordered.push(task);
            }
        }
        Self(ordered)
    }

    /// Sentiment, topic and summary: the review analysis.
    #[must_use]
    pub fn review() -> Self {
        Self::new([Task::Sentiment, Task::Topic, Task::Summary])
    }

    /// Sentiment only.
    #[must_use]
    pub fn sentiment() -> Self {
        Self::new([Task::Sentiment])
    }

    /// Builds a set from a name-to-enabled mapping.
    ///
    /// Enabled tasks run in canonical order regardless of map order.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown task names.
    pub fn from_params(params: &HashMap<String, bool>) -> Result<Self, AnalysisError> {
        let mut enabled = Vec::new();
        for (name, on) in params {
            let task: Task = name.parse()?;
            if *on {
                enabled.push(task);
            }
        }
        enabled.sort();
        Ok(Self::new(enabled))
    }

    /// Checks the set can be run as one item.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the set is empty, too large, or names
    /// more than one summarization mode.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.0.is_empty() {
            return Err(AnalysisError::validation(
                "tasks",
                "at least one task must be enabled",
            ));
        }
        if self.0.len() > MAX_TASKS_PER_ITEM {
            return Err(AnalysisError::validation(
                "tasks",
                format!("at most {MAX_TASKS_PER_ITEM} tasks may run per item"),
            ));
        }
        if self.0.iter().filter(|t| t.is_summary_mode()).count() > 1 {
            return Err(AnalysisError::validation(
                "tasks",
                "only one summary mode (brief, detailed, bullets) may be requested",
            ));
        }
        Ok(())
    }

    /// Iterates tasks in run order.
    pub fn iter(&self) -> impl Iterator<Item = Task> + '_ {
        self.0.iter().copied()
    }

    /// Returns whether the set contains `task`.
    #[must_use]
    pub fn contains(&self, task: Task) -> bool {
        self.0.contains(&task)
    }

    /// Returns the number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no task is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
