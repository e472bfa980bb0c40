//! Stepline Core Library
//!
//! This library provides the step catalogs, the built-in visualization modules
//! and the pure timeline reducer behind Stepline's stepwise playback.

pub mod catalog;
pub mod modules;
pub mod step;
pub mod timeline;

pub use catalog::{Catalog, FaultMode};
pub use modules::Module;
pub use step::{Step, StepStatus, StepView};
pub use timeline::{progress_for_step, step_for_progress, transition, Event, TimelineState};

/// Result type for stepline-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stepline-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Step '{0}' has a zero duration")]
    ZeroDuration(String),

    #[error("Duplicate step ID: {0}")]
    DuplicateStepId(String),

    #[error("Duplicate fault mode: {0}")]
    DuplicateFaultMode(String),
}
