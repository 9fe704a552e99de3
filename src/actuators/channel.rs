//! Actuator channel primitives.
//!
//! Two kinds of channel share one owner ([`ActuatorTimer`](super::ActuatorTimer)):
//!
//! - [`TimedChannel`] — a pump relay that runs for a fixed duration and
//!   switches itself off when the timer expires.
//! - [`LevelChannel`] — a plain relay holding whatever level it was last
//!   given.
//!
//! Neither type touches hardware.  They only track state; the owner
//! drives the physical output when a transition is reported.

use crate::config::OutputId;

/// Lifecycle of a timed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedState {
    Idle,
    Running { started_ms: u64, duration_ms: u32 },
}

/// A channel that can only be switched on for a bounded time.
#[derive(Debug, Clone)]
pub struct TimedChannel {
    id: u8,
    output: OutputId,
    state: TimedState,
}

impl TimedChannel {
    pub fn new(id: u8, output: OutputId) -> Self {
        Self {
            id,
            output,
            state: TimedState::Idle,
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn output(&self) -> OutputId {
        self.output
    }

    pub fn state(&self) -> TimedState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimedState::Running { .. })
    }

    /// Milliseconds left before expiry, `None` when idle.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            TimedState::Idle => None,
            TimedState::Running { started_ms, duration_ms } => {
                Some(u64::from(duration_ms).saturating_sub(now_ms.saturating_sub(started_ms)))
            }
        }
    }

    /// Idle → Running.  Returns `false` (and changes nothing) if the
    /// channel is already running.
    pub(super) fn start(&mut self, now_ms: u64, duration_ms: u32) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = TimedState::Running {
            started_ms: now_ms,
            duration_ms,
        };
        true
    }

    /// Running → Idle once `now_ms - started_ms >= duration_ms`.
    ///
    /// Returns the elapsed run time when the channel expired on this call.
    /// Depends only on elapsed time, so a late call turns the channel off
    /// late but never early.
    pub(super) fn expire(&mut self, now_ms: u64) -> Option<u64> {
        let TimedState::Running { started_ms, duration_ms } = self.state else {
            return None;
        };
        let elapsed = now_ms.saturating_sub(started_ms);
        if elapsed < u64::from(duration_ms) {
            return None;
        }
        self.state = TimedState::Idle;
        Some(elapsed)
    }

    pub(super) fn reset(&mut self) {
        self.state = TimedState::Idle;
    }
}

/// A stateless relay: the level is whatever was last written.
#[derive(Debug, Clone)]
pub struct LevelChannel {
    output: OutputId,
    level: bool,
}

impl LevelChannel {
    pub fn new(output: OutputId) -> Self {
        Self { output, level: false }
    }

    pub fn output(&self) -> OutputId {
        self.output
    }

    pub fn level(&self) -> bool {
        self.level
    }

    pub(super) fn set(&mut self, level: bool) {
        self.level = level;
    }
}
