//! Outbound application events.
//!
//! The domain emits these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them: log to
//! serial, count them, record them in tests.

use crate::bridge::wire::MAX_COMMAND_LEN;
use crate::config::OutputId;
use crate::error::{ActuatorError, CommsError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The control loop has started with every output off.
    Started { pumps: usize, relays: usize },

    /// A timed channel was switched on.
    PumpStarted { id: u8, duration_ms: u32 },

    /// A start request hit a channel that is already running.
    PumpAlreadyRunning { id: u8 },

    /// A timed channel expired and was switched off.
    PumpStopped { id: u8, ran_ms: u64 },

    /// A level channel was written.
    RelaySwitched { output: OutputId, on: bool },

    /// An actuator request named a channel that does not exist.
    InvalidTarget(ActuatorError),

    /// A decoded command was not acted upon (unknown name, pump off).
    CommandIgnored { name: heapless::String<MAX_COMMAND_LEN>, id: i32, state: bool },

    /// One snapshot was handed to the transport.
    SnapshotPublished { bytes: usize },

    /// One snapshot was dropped (disconnected or send failure).
    SnapshotDropped(CommsError),

    /// Inbound frames that failed to parse during one control pass.
    FramesDiscarded { count: usize },
}
