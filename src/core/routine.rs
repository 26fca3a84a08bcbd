//! Cancellable timed routines.
//!
//! The original gameplay relied on engine coroutines for patrol walks, boss
//! shooting loops and phase behaviors. Here those are explicit resumable
//! tasks: a stage value, a wait timer, and a cancelled flag, ticked by the
//! same per-frame schedule as everything else. The owner cancels or replaces
//! its routine on teardown, which is what guarantees that no two phases or
//! attack loops ever run concurrently.

use bevy::prelude::*;
use std::time::Duration;

/// A multi-stage timed routine ticked once per frame.
///
/// `S` is the stage type (usually a small enum). The routine waits out the
/// current stage's duration and then reports ready; the driving system
/// advances it to the next stage with a fresh wait.
#[derive(Debug, Clone)]
pub struct Routine<S> {
    stage: S,
    wait: Timer,
    cancelled: bool,
}

impl<S> Routine<S> {
    /// Start a routine in `stage`, waiting `wait_secs` before it is ready.
    pub fn new(stage: S, wait_secs: f32) -> Self {
        Self {
            stage,
            wait: Timer::from_seconds(wait_secs, TimerMode::Once),
            cancelled: false,
        }
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }

    /// Stop the routine permanently. A cancelled routine never reports ready.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Tick the wait timer. Returns true when the current stage's wait has
    /// elapsed and the routine is still live. Keeps returning true until the
    /// driver advances the routine.
    pub fn ready(&mut self, delta: Duration) -> bool {
        if self.cancelled {
            return false;
        }
        self.wait.tick(delta);
        self.wait.finished()
    }

    /// Move to the next stage and start a fresh wait.
    pub fn advance(&mut self, stage: S, wait_secs: f32) {
        self.stage = stage;
        self.wait = Timer::from_seconds(wait_secs, TimerMode::Once);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Stage {
        Walk,
        Pause,
    }

    #[test]
    fn becomes_ready_after_wait() {
        let mut routine = Routine::new(Stage::Walk, 1.0);
        assert!(!routine.ready(Duration::from_millis(500)));
        assert!(routine.ready(Duration::from_millis(600)));
        assert_eq!(*routine.stage(), Stage::Walk);
    }

    #[test]
    fn advance_resets_the_wait() {
        let mut routine = Routine::new(Stage::Walk, 0.5);
        assert!(routine.ready(Duration::from_secs(1)));
        routine.advance(Stage::Pause, 2.0);
        assert!(!routine.ready(Duration::from_secs(1)));
        assert!(routine.ready(Duration::from_secs(1)));
        assert_eq!(*routine.stage(), Stage::Pause);
    }

    #[test]
    fn cancelled_routine_never_fires() {
        let mut routine = Routine::new(Stage::Walk, 0.1);
        routine.cancel();
        assert!(!routine.ready(Duration::from_secs(10)));
        assert!(routine.is_cancelled());
    }
}
