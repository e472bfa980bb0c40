//! Stepline Player Library
//!
//! This library drives a timeline in time: an autoplay scheduler that keeps at
//! most one pending timer, a swappable clock, and the [`Player`] handle that
//! consumers use to control playback.

pub mod clock;
pub mod player;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use player::Player;
pub use scheduler::{step_delay, ArmedTimer, AutoplayScheduler};

/// Speed multipliers offered by the product controls
pub const SPEED_PRESETS: [f64; 3] = [0.5, 1.0, 2.0];

/// Result type for stepline-player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stepline-player operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid speed: {0} (must be a positive, finite multiplier)")]
    InvalidSpeed(f64),
}

/// Player configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Speed multiplier applied to every step duration
    pub speed: f64,
    /// Failure mode to start with (None = healthy run)
    pub failure_mode: Option<String>,
    /// Start playing immediately after construction
    pub autoplay: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            failure_mode: None,
            autoplay: false,
        }
    }
}

/// Checks that a speed multiplier can be used to schedule steps
pub fn validate_speed(speed: f64) -> Result<f64> {
    if speed.is_finite() && speed > 0.0 {
        Ok(speed)
    } else {
        Err(Error::InvalidSpeed(speed))
    }
}
