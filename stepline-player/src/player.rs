//! Playback handle binding one catalog to a timeline and its scheduler

use crate::{validate_speed, AutoplayScheduler, Clock, PlayerConfig, Result};
use std::time::Duration;
use stepline_core::{
    step_for_progress, Catalog, Event, FaultMode, Module, StepStatus, TimelineState,
};
use tracing::{debug, warn};

/// Controls playback of one timeline
///
/// Every mutation goes through [`Player::dispatch`]: the reducer runs first,
/// then the scheduler observes the committed state. One player serves one
/// consumer; separate players share nothing.
pub struct Player<C: Clock> {
    catalog: Catalog,
    state: TimelineState,
    scheduler: AutoplayScheduler,
    clock: C,
}

impl<C: Clock> Player<C> {
    /// Creates a paused player at step 0
    pub fn new(catalog: Catalog, clock: C) -> Self {
        let state = TimelineState::new(&catalog);
        Self {
            catalog,
            state,
            scheduler: AutoplayScheduler::new(),
            clock,
        }
    }

    /// Creates a player for one of the built-in modules
    pub fn for_module(module: Module, clock: C) -> Self {
        Self::new(module.catalog(), clock)
    }

    /// Creates a player and applies a configuration
    pub fn with_config(catalog: Catalog, clock: C, config: &PlayerConfig) -> Result<Self> {
        let speed = validate_speed(config.speed)?;
        let mut player = Self::new(catalog, clock);
        player.dispatch(Event::SetSpeed { speed });
        if let Some(mode) = config.failure_mode.as_deref() {
            player.set_failure_mode(Some(mode));
        }
        if config.autoplay {
            player.dispatch(Event::Play);
        }
        Ok(player)
    }

    /// Applies an event and lets the scheduler react to the result
    pub fn dispatch(&mut self, event: Event) {
        debug!(event = event.name(), step = self.state.step_index(), "dispatch");
        self.state.apply(&event);
        self.scheduler.observe(&self.state, self.clock.now());
    }

    /// Pauses when playing; otherwise plays, restarting from step 0 when at the end
    pub fn toggle_play(&mut self) {
        if self.state.is_playing() {
            self.dispatch(Event::Pause);
        } else if self.state.is_at_end() {
            self.dispatch(Event::Replay);
        } else {
            self.dispatch(Event::Play);
        }
    }

    pub fn next_step(&mut self) {
        self.dispatch(Event::NextStep);
    }

    pub fn prev_step(&mut self) {
        self.dispatch(Event::PrevStep);
    }

    pub fn reset(&mut self) {
        self.dispatch(Event::Reset);
    }

    /// Jumps to a step; out-of-range indices are clamped
    pub fn set_step(&mut self, index: i64) {
        self.dispatch(Event::SetStep { index });
    }

    /// Jumps to the step nearest to a position in `[0, 100]`
    pub fn scrub(&mut self, pct: f64) {
        let index = step_for_progress(pct, self.state.total_steps());
        self.set_step(index as i64);
    }

    /// Changes the speed multiplier; the current step restarts its full wait
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        let speed = validate_speed(speed)?;
        self.dispatch(Event::SetSpeed { speed });
        Ok(())
    }

    pub fn set_failure_mode(&mut self, mode: Option<&str>) {
        if let Some(mode) = mode {
            if self.catalog.fault_mode(mode).is_none() {
                warn!(mode, "failure mode is not declared by this catalog");
            }
        }
        self.dispatch(Event::SetFailureMode {
            mode: mode.map(str::to_owned),
        });
    }

    /// Overrides one step's status until the next position change
    pub fn set_step_status(&mut self, step_id: &str, status: StepStatus) {
        self.dispatch(Event::SetStepStatus {
            step_id: step_id.to_owned(),
            status,
        });
    }

    /// Fires the pending timer if it is due, dispatching TICK
    ///
    /// Returns true when a TICK was dispatched.
    pub fn poll(&mut self) -> bool {
        match self.scheduler.take_due(self.clock.now()) {
            Some(_) => {
                self.dispatch(Event::Tick);
                true
            }
            None => false,
        }
    }

    /// Plays until autoplay stops, calling `on_change` after every TICK
    ///
    /// Returns immediately when nothing is scheduled.
    pub fn run_blocking<F>(&mut self, mut on_change: F)
    where
        F: FnMut(&TimelineState),
    {
        while let Some(deadline) = self.next_deadline() {
            self.clock.sleep_until(deadline);
            if self.poll() {
                on_change(&self.state);
            }
        }
    }

    /// When the pending timer fires, if one is armed
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.pending().map(|t| t.deadline)
    }

    pub fn is_timer_armed(&self) -> bool {
        self.scheduler.pending().is_some()
    }

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Fault modes the catalog declares
    pub fn fault_modes(&self) -> &[FaultMode] {
        self.catalog.fault_modes()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
