//! Actuator timing state machine.
//!
//! [`ActuatorTimer`] exclusively owns every timed (pump) and level (relay)
//! channel.  Callers only express intent ("run pump 2 for 5 s", "light
//! on") and the timer decides whether that is legal and drives the
//! physical output through [`OutputPort`].
//!
//! ```text
//!   start(id, ms) ──▶ ┌──────────────────┐
//!   set_level(o, s) ─▶│   ActuatorTimer  │──▶ OutputPort
//!   tick(now) ──────▶ │ Timed · Level    │──▶ EventSink
//!                     └──────────────────┘
//! ```
//!
//! Non-blocking and cooperative: nothing here waits.  Timed channels only
//! change state inside [`start`](ActuatorTimer::start) and
//! [`tick`](ActuatorTimer::tick), and `tick` compares elapsed time, not a
//! call count, so a stalled loop never stretches a run indefinitely.

pub mod channel;

use heapless::Vec;
use log::{debug, info};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, OutputPort};
use crate::config::{MAX_PUMPS, MAX_RELAYS, NodeConfig, OutputId, PumpBinding};
use crate::error::ActuatorError;

pub use channel::{LevelChannel, TimedChannel, TimedState};

/// Result of a legal start request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The channel was idle and is now running.
    Started,
    /// The channel was already running; its timer was left untouched.
    AlreadyRunning,
}

/// Owner of all actuator channels.
pub struct ActuatorTimer {
    pumps: Vec<TimedChannel, MAX_PUMPS>,
    relays: Vec<LevelChannel, MAX_RELAYS>,
}

impl ActuatorTimer {
    /// Build channels from explicit bindings.  Entries beyond capacity
    /// are ignored; [`NodeConfig::validate`] rejects such configs upstream.
    pub fn new(pumps: &[PumpBinding], relays: &[OutputId]) -> Self {
        let mut timer = Self {
            pumps: Vec::new(),
            relays: Vec::new(),
        };
        for p in pumps {
            let _ = timer.pumps.push(TimedChannel::new(p.id, p.output));
        }
        for &out in relays {
            let _ = timer.relays.push(LevelChannel::new(out));
        }
        timer
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::new(&config.pumps, &config.relays.as_array())
    }

    /// Drive every output LOW and clear all timers (power-on safe state).
    pub fn all_off(&mut self, out: &mut impl OutputPort) {
        for p in &mut self.pumps {
            out.set_output(p.output(), false);
            p.reset();
        }
        for r in &mut self.relays {
            out.set_output(r.output(), false);
            r.set(false);
        }
        info!(
            "Actuators: all off ({} pumps, {} relays)",
            self.pumps.len(),
            self.relays.len()
        );
    }

    /// Request timed channel `id` to run for `duration_ms`.
    ///
    /// - Unknown `id` → `Err(UnknownPump)`; nothing changes.
    /// - Already running → `Ok(AlreadyRunning)`; start time and duration
    ///   are kept, the run is neither restarted nor extended.
    /// - Otherwise the channel enters Running at `now_ms` and its output
    ///   is driven HIGH.
    pub fn start(
        &mut self,
        id: i32,
        duration_ms: u32,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Result<StartOutcome, ActuatorError> {
        let pump = self
            .pumps
            .iter_mut()
            .find(|p| i32::from(p.id()) == id)
            .ok_or(ActuatorError::UnknownPump { id })?;

        if !pump.start(now_ms, duration_ms) {
            debug!(
                "Pump {}: already running ({} ms left), start ignored",
                pump.id(),
                pump.remaining_ms(now_ms).unwrap_or(0)
            );
            sink.emit(&AppEvent::PumpAlreadyRunning { id: pump.id() });
            return Ok(StartOutcome::AlreadyRunning);
        }

        out.set_output(pump.output(), true);
        info!("Pump {}: ON for {} ms", pump.id(), duration_ms);
        sink.emit(&AppEvent::PumpStarted {
            id: pump.id(),
            duration_ms,
        });
        Ok(StartOutcome::Started)
    }

    /// Write level channel `output` immediately.  Always legal for a known
    /// output and always overwrites the previous level.
    pub fn set_level(
        &mut self,
        output: OutputId,
        state: bool,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Result<(), ActuatorError> {
        let relay = self
            .relays
            .iter_mut()
            .find(|r| r.output() == output)
            .ok_or(ActuatorError::UnknownOutput { output })?;

        out.set_output(output, state);
        relay.set(state);
        info!("Relay {}: {}", output, if state { "ON" } else { "OFF" });
        sink.emit(&AppEvent::RelaySwitched { output, on: state });
        Ok(())
    }

    /// Advance every running timed channel.  Returns how many expired.
    pub fn tick(
        &mut self,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut stopped = 0;
        for pump in &mut self.pumps {
            if let Some(ran_ms) = pump.expire(now_ms) {
                out.set_output(pump.output(), false);
                info!("Pump {}: OFF after {} ms", pump.id(), ran_ms);
                sink.emit(&AppEvent::PumpStopped {
                    id: pump.id(),
                    ran_ms,
                });
                stopped += 1;
            }
        }
        stopped
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn pump(&self, id: u8) -> Option<&TimedChannel> {
        self.pumps.iter().find(|p| p.id() == id)
    }

    pub fn relay_level(&self, output: OutputId) -> Option<bool> {
        self.relays
            .iter()
            .find(|r| r.output() == output)
            .map(LevelChannel::level)
    }

    pub fn running_pumps(&self) -> usize {
        self.pumps.iter().filter(|p| p.is_running()).count()
    }

    pub fn pump_count(&self) -> usize {
        self.pumps.len()
    }

    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }
}
