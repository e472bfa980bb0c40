//! Autoplay scheduler
//!
//! Turns `is_playing` into one TICK per step. The scheduler owns at most one
//! pending timer; every arm is preceded by a cancel, and the timer is released
//! when it fires, when the watched state changes, and when the scheduler drops.

use std::time::Duration;
use stepline_core::TimelineState;
use tracing::debug;

/// A pending timer; firing it means dispatching TICK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmedTimer {
    /// Increases with every arm, so a timer can be told apart from its successor
    pub generation: u64,
    /// Clock time at which the timer fires
    pub deadline: Duration,
    /// Step that was current when the timer was armed
    pub step_index: usize,
}

/// The parts of the state the scheduler reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cue {
    playing: bool,
    step_index: usize,
    speed: f64,
}

impl Cue {
    fn of(state: &TimelineState) -> Self {
        Self {
            playing: state.is_playing(),
            step_index: state.step_index(),
            speed: state.speed(),
        }
    }
}

/// Single-timer scheduler for one timeline
#[derive(Debug, Default)]
pub struct AutoplayScheduler {
    pending: Option<ArmedTimer>,
    generation: u64,
    last_cue: Option<Cue>,
}

impl AutoplayScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reacts to a state after a transition
    ///
    /// When the playing flag, the current step or the speed differ from the
    /// last observation, any pending timer is cancelled and a new one is armed
    /// if the timeline is playing and not on its last step. Otherwise the
    /// pending timer is left alone.
    pub fn observe(&mut self, state: &TimelineState, now: Duration) -> Option<ArmedTimer> {
        let cue = Cue::of(state);
        if self.last_cue == Some(cue) {
            return self.pending;
        }
        self.last_cue = Some(cue);
        self.cancel();

        if !state.is_playing() || state.is_at_end() {
            return None;
        }

        let step = state.current_step()?;
        let Some(delay) = step_delay(step.step.duration_ms, state.speed()) else {
            debug!(speed = state.speed(), "speed cannot be scheduled, not arming");
            return None;
        };

        self.generation += 1;
        let timer = ArmedTimer {
            generation: self.generation,
            deadline: now + delay,
            step_index: state.step_index(),
        };
        debug!(
            generation = timer.generation,
            step = state.step_index(),
            delay_ms = delay.as_millis() as u64,
            "armed autoplay timer"
        );
        self.pending = Some(timer);
        Some(timer)
    }

    /// Releases the pending timer, if any
    pub fn cancel(&mut self) -> Option<ArmedTimer> {
        let timer = self.pending.take()?;
        debug!(generation = timer.generation, "cancelled autoplay timer");
        Some(timer)
    }

    /// Releases and returns the pending timer if its deadline has passed
    pub fn take_due(&mut self, now: Duration) -> Option<ArmedTimer> {
        match self.pending {
            Some(timer) if timer.deadline <= now => {
                self.pending = None;
                debug!(generation = timer.generation, "autoplay timer fired");
                Some(timer)
            }
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&ArmedTimer> {
        self.pending.as_ref()
    }

    /// Forgets the last observation so the next `observe` always re-arms
    pub fn invalidate(&mut self) {
        self.last_cue = None;
    }
}

impl Drop for AutoplayScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Wait time for a step: its duration divided by the speed multiplier
///
/// Returns None when the speed is not a positive, finite number or the
/// result cannot be represented.
pub fn step_delay(duration_ms: u64, speed: f64) -> Option<Duration> {
    if !(speed.is_finite() && speed > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(duration_ms as f64 / speed / 1000.0).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepline_core::{Catalog, Event, Step};

    fn state(durations: &[u64]) -> TimelineState {
        let steps = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Step::new(format!("s{}", i), format!("S{}", i), *d))
            .collect();
        TimelineState::new(&Catalog::new(steps, vec![]).unwrap())
    }

    #[test]
    fn test_step_delay() {
        assert_eq!(step_delay(1000, 1.0), Some(Duration::from_millis(1000)));
        assert_eq!(step_delay(1000, 2.0), Some(Duration::from_millis(500)));
        assert_eq!(step_delay(1000, 0.5), Some(Duration::from_millis(2000)));
        assert_eq!(step_delay(1000, 0.0), None);
        assert_eq!(step_delay(1000, -1.0), None);
        assert_eq!(step_delay(1000, f64::NAN), None);
        assert_eq!(step_delay(1000, f64::INFINITY), None);
    }

    #[test]
    fn test_arms_only_while_playing() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 2000, 1000]);
        assert!(scheduler.observe(&s, Duration::ZERO).is_none());

        s.apply(&Event::Play);
        let timer = scheduler.observe(&s, Duration::ZERO).unwrap();
        assert_eq!(timer.deadline, Duration::from_millis(1000));
        assert_eq!(timer.step_index, 0);

        s.apply(&Event::Pause);
        assert!(scheduler.observe(&s, Duration::from_millis(10)).is_none());
        assert!(scheduler.pending().is_none());
    }

    #[test]
    fn test_uses_current_step_duration() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 2000, 1000]);
        s.apply(&Event::Play);
        s.apply(&Event::Tick);
        let timer = scheduler.observe(&s, Duration::from_millis(1000)).unwrap();
        assert_eq!(timer.deadline, Duration::from_millis(3000));
    }

    #[test]
    fn test_rearm_replaces_pending_timer() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 1000, 1000]);
        s.apply(&Event::Play);
        let first = scheduler.observe(&s, Duration::ZERO).unwrap();

        s.apply(&Event::SetSpeed { speed: 2.0 });
        let second = scheduler.observe(&s, Duration::from_millis(300)).unwrap();
        assert!(second.generation > first.generation);
        assert_eq!(second.deadline, Duration::from_millis(800));
        assert_eq!(scheduler.pending(), Some(&second));
    }

    #[test]
    fn test_unrelated_change_keeps_timer() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 1000, 1000]);
        s.apply(&Event::Play);
        let first = scheduler.observe(&s, Duration::ZERO).unwrap();

        s.apply(&Event::SetFailureMode {
            mode: Some("timeout".to_string()),
        });
        let kept = scheduler.observe(&s, Duration::from_millis(400)).unwrap();
        assert_eq!(kept, first);
    }

    #[test]
    fn test_no_timer_on_last_step() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 1000]);
        s.apply(&Event::SetStep { index: 1 });
        s.apply(&Event::Play);
        assert!(scheduler.observe(&s, Duration::ZERO).is_none());
    }

    #[test]
    fn test_take_due() {
        let mut scheduler = AutoplayScheduler::new();
        let mut s = state(&[1000, 1000]);
        s.apply(&Event::Play);
        scheduler.observe(&s, Duration::ZERO);

        assert!(scheduler.take_due(Duration::from_millis(999)).is_none());
        assert!(scheduler.take_due(Duration::from_millis(1000)).is_some());
        assert!(scheduler.pending().is_none());
        assert!(scheduler.take_due(Duration::from_millis(5000)).is_none());
    }
}
