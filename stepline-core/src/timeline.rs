//! Timeline state and the reducer that drives it
//!
//! A [`TimelineState`] only changes through [`transition`] (or the in-place
//! [`TimelineState::apply`]). The reducer is total: every event produces a
//! valid state, out-of-range positions are clamped, and events that do not
//! apply to the current state leave it untouched.

use crate::{Catalog, StepStatus, StepView};
use tracing::trace;

#[cfg(feature = "serde")]
use serde::Serialize;

/// Input to the timeline reducer
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Event {
    /// Start autoplay from the current step
    Play,
    /// Stop autoplay, keeping the position
    Pause,
    /// Rewind to step 0, stop, and clear the failure mode
    Reset,
    /// Reset followed by Play, committed as one transition
    Replay,
    /// Advance one step; reaching the last step stops autoplay
    NextStep,
    /// Go back one step and pause
    PrevStep,
    /// Jump to a step (clamped) and pause
    SetStep { index: i64 },
    /// Replace the speed multiplier
    SetSpeed { speed: f64 },
    /// Replace the opaque failure mode
    SetFailureMode { mode: Option<String> },
    /// Scheduler cadence; advances one step while playing
    Tick,
    /// Override one step's status without moving
    SetStepStatus { step_id: String, status: StepStatus },
}

impl Event {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::Play => "PLAY",
            Event::Pause => "PAUSE",
            Event::Reset => "RESET",
            Event::Replay => "REPLAY",
            Event::NextStep => "NEXT_STEP",
            Event::PrevStep => "PREV_STEP",
            Event::SetStep { .. } => "SET_STEP",
            Event::SetSpeed { .. } => "SET_SPEED",
            Event::SetFailureMode { .. } => "SET_FAILURE_MODE",
            Event::Tick => "TICK",
            Event::SetStepStatus { .. } => "SET_STEP_STATUS",
        }
    }
}

/// Mutable playback state for one consumer of a catalog
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TimelineState {
    step_index: usize,
    total_steps: usize,
    steps: Vec<StepView>,
    is_playing: bool,
    speed: f64,
    failure_mode: Option<String>,
    progress: u8,
}

impl TimelineState {
    /// Creates the initial state for a catalog: step 0 active, paused, speed 1
    pub fn new(catalog: &Catalog) -> Self {
        let steps = catalog
            .steps()
            .iter()
            .map(|step| StepView {
                step: step.clone(),
                status: StepStatus::Idle,
            })
            .collect();

        let mut state = Self {
            step_index: 0,
            total_steps: catalog.len(),
            steps,
            is_playing: false,
            speed: 1.0,
            failure_mode: None,
            progress: 0,
        };
        state.seek(0);
        state
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn steps(&self) -> &[StepView] {
        &self.steps
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn failure_mode(&self) -> Option<&str> {
        self.failure_mode.as_deref()
    }

    /// Percentage through the timeline, 0..=100
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn current_step(&self) -> Option<&StepView> {
        self.steps.get(self.step_index)
    }

    /// Status of a step by ID
    pub fn status_of(&self, step_id: &str) -> Option<StepStatus> {
        self.steps
            .iter()
            .find(|s| s.id() == step_id)
            .map(|s| s.status)
    }

    /// True when the position is on the last step (or there are no steps)
    pub fn is_at_end(&self) -> bool {
        self.step_index >= self.last_index()
    }

    fn last_index(&self) -> usize {
        self.total_steps.saturating_sub(1)
    }

    /// Applies an event in place
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::Play => self.is_playing = true,
            Event::Pause => self.is_playing = false,
            Event::Reset => self.reset(),
            Event::Replay => {
                self.reset();
                self.is_playing = true;
            }
            Event::NextStep => self.advance(),
            Event::PrevStep => {
                self.seek(self.step_index.saturating_sub(1));
                self.is_playing = false;
            }
            Event::SetStep { index } => {
                let clamped = (*index).clamp(0, self.last_index() as i64) as usize;
                self.seek(clamped);
                self.is_playing = false;
            }
            Event::SetSpeed { speed } => self.speed = *speed,
            Event::SetFailureMode { mode } => self.failure_mode = mode.clone(),
            Event::Tick => {
                if !self.is_playing {
                    return;
                }
                if self.is_at_end() {
                    self.is_playing = false;
                    return;
                }
                self.advance();
            }
            Event::SetStepStatus { step_id, status } => {
                if let Some(view) = self.steps.iter_mut().find(|s| s.step.id == *step_id) {
                    view.status = *status;
                }
            }
        }
    }

    fn reset(&mut self) {
        self.seek(0);
        self.is_playing = false;
        self.failure_mode = None;
    }

    fn advance(&mut self) {
        let next = (self.step_index + 1).min(self.last_index());
        self.seek(next);
        if next == self.last_index() {
            self.is_playing = false;
        }
    }

    /// Commits a new index, then derives progress and statuses from it.
    /// Any status overrides are discarded here.
    fn seek(&mut self, index: usize) {
        self.step_index = index;
        self.progress = progress_for_step(index, self.total_steps);
        for (i, view) in self.steps.iter_mut().enumerate() {
            view.status = StepStatus::derive(i, index);
        }
        trace!(index, progress = self.progress, "derived step statuses");
    }
}

/// Pure reducer: returns the state that results from applying `event`
pub fn transition(mut state: TimelineState, event: &Event) -> TimelineState {
    state.apply(event);
    state
}

/// Progress percentage for a step index
pub fn progress_for_step(index: usize, total_steps: usize) -> u8 {
    match total_steps {
        0 => 0,
        1 => 100,
        n => {
            let pct = (index.min(n - 1) as f64 / (n - 1) as f64 * 100.0).round();
            pct as u8
        }
    }
}

/// Maps a scrub position in `[0, 100]` to a step index
///
/// Out-of-range and NaN positions are clamped to the nearest end.
pub fn step_for_progress(pct: f64, total_steps: usize) -> usize {
    if total_steps <= 1 {
        return 0;
    }
    let pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    (pct / 100.0 * (total_steps - 1) as f64).round() as usize
}
