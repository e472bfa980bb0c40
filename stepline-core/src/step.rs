//! Step data structures for Stepline timelines

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Display status of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StepStatus {
    /// Not reached yet
    #[default]
    Idle,
    /// The current step
    Active,
    /// Already played
    Done,
    /// Marked failed by an explicit override; never derived
    Error,
}

impl StepStatus {
    /// Status a step at `index` gets when the timeline sits at `current`
    pub fn derive(index: usize, current: usize) -> Self {
        match index.cmp(&current) {
            std::cmp::Ordering::Less => StepStatus::Done,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Idle => "idle",
            StepStatus::Active => "active",
            StepStatus::Done => "done",
            StepStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents one stage of a conceptual animation
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Step {
    /// Identifier, unique within a catalog
    pub id: String,
    /// Short display name
    pub label: String,
    /// Optional longer text
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub description: Option<String>,
    /// Planned autoplay dwell time in milliseconds
    pub duration_ms: u64,
}

impl Step {
    /// Creates a new step without a description
    pub fn new(id: impl Into<String>, label: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            duration_ms,
        }
    }

    /// Attaches a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A step paired with its current status, as seen in a timeline snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepView {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub step: Step,
    pub status: StepStatus,
}

impl StepView {
    pub fn id(&self) -> &str {
        &self.step.id
    }
}
