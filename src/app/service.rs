//! Application service — the hexagonal core.
//!
//! [`NodeService`] owns the actuator channels and the sensor sampler and
//! turns decoded commands into actuator intent.  All I/O flows through
//! port traits injected at call sites, making the whole service testable
//! with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                 │      NodeService       │
//!  OutputPort ◀── │ ActuatorTimer · Sampler│
//!                 └────────────────────────┘
//! ```

use log::{debug, info, warn};

use crate::actuators::{ActuatorTimer, StartOutcome};
use crate::config::{NodeConfig, OutputId, RelayOutputs, str_or_empty};
use crate::error::ActuatorError;
use crate::sensors::{SensorSampler, SensorSnapshot};

use super::commands::CommandKind;
use super::events::AppEvent;
use super::ports::{EventSink, OutputPort, SensorPort};

/// What a single command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A pump started or a relay was written.
    Applied,
    /// The pump was already running; nothing changed.
    AlreadyRunning,
    /// Recognised as a no-op (unknown name, `PUMP` off).
    Ignored,
    /// The command named a channel that does not exist.
    Rejected(ActuatorError),
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    actuators: ActuatorTimer,
    sampler: SensorSampler,
    relays: RelayOutputs,
    pump_duration_ms: u32,
    invalid_targets: u32,
}

impl NodeService {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            actuators: ActuatorTimer::from_config(config),
            sampler: SensorSampler::new(config.active_plants()),
            relays: config.relays,
            pump_duration_ms: config.pump_default_duration_ms,
            invalid_targets: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Force every output into its safe (off) state.
    pub fn start(&mut self, out: &mut impl OutputPort, sink: &mut impl EventSink) {
        self.actuators.all_off(out);
        sink.emit(&AppEvent::Started {
            pumps: self.actuators.pump_count(),
            relays: self.actuators.relay_count(),
        });
        info!("NodeService started, all outputs off");
    }

    // ── Command dispatch ──────────────────────────────────────

    /// Apply one decoded command.
    ///
    /// | name          | effect                                     |
    /// |---------------|--------------------------------------------|
    /// | `LIGHT`       | light relay ← `state`                      |
    /// | `FAN_EXHAUST` | exhaust relay ← `state`                    |
    /// | `FAN_INTAKE`  | intake relay ← `state`                     |
    /// | `HUMID`       | humidifier relay ← `state`                 |
    /// | `PUMP`        | `state` → start pump `id` for the default  |
    /// |               | duration; `!state` → ignored (no stop)     |
    ///
    /// Relay commands address a fixed relay; their `id` is not used.
    pub fn handle_command(
        &mut self,
        name: &str,
        id: i32,
        state: bool,
        now_ms: u64,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> CommandOutcome {
        let Ok(kind) = name.parse::<CommandKind>() else {
            debug!("Unknown command {:?} ignored", name);
            return self.ignored(name, id, state, sink);
        };

        let result = match kind {
            CommandKind::Light => self.set_relay(self.relays.light, state, out, sink),
            CommandKind::FanExhaust => self.set_relay(self.relays.fan_exhaust, state, out, sink),
            CommandKind::FanIntake => self.set_relay(self.relays.fan_intake, state, out, sink),
            CommandKind::Humidifier => self.set_relay(self.relays.humidifier, state, out, sink),
            CommandKind::Pump if state => self
                .actuators
                .start(id, self.pump_duration_ms, now_ms, out, sink)
                .map(|outcome| match outcome {
                    StartOutcome::Started => CommandOutcome::Applied,
                    StartOutcome::AlreadyRunning => CommandOutcome::AlreadyRunning,
                }),
            CommandKind::Pump => {
                info!("PUMP {} off requested: no manual stop, ignored", id);
                return self.ignored(name, id, state, sink);
            }
        };

        result.unwrap_or_else(|e| {
            warn!("{} rejected: {}", kind.as_str(), e);
            self.invalid_targets = self.invalid_targets.saturating_add(1);
            sink.emit(&AppEvent::InvalidTarget(e));
            CommandOutcome::Rejected(e)
        })
    }

    fn set_relay(
        &mut self,
        output: OutputId,
        state: bool,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Result<CommandOutcome, ActuatorError> {
        self.actuators
            .set_level(output, state, out, sink)
            .map(|()| CommandOutcome::Applied)
    }

    fn ignored(&self, name: &str, id: i32, state: bool, sink: &mut impl EventSink) -> CommandOutcome {
        sink.emit(&AppEvent::CommandIgnored {
            name: str_or_empty(name),
            id,
            state,
        });
        CommandOutcome::Ignored
    }

    // ── Per-pass work ─────────────────────────────────────────

    /// Advance actuator timers.  Returns how many pumps switched off.
    pub fn tick(&mut self, now_ms: u64, out: &mut impl OutputPort, sink: &mut impl EventSink) -> usize {
        self.actuators.tick(now_ms, out, sink)
    }

    /// Poll every sensor once.
    pub fn sample(&mut self, sensors: &mut impl SensorPort) -> SensorSnapshot {
        self.sampler.sample(sensors)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn actuators(&self) -> &ActuatorTimer {
        &self.actuators
    }

    pub fn sensor_faults(&self) -> u32 {
        self.sampler.faults()
    }

    pub fn invalid_targets(&self) -> u32 {
        self.invalid_targets
    }

    pub fn pump_duration_ms(&self) -> u32 {
        self.pump_duration_ms
    }
}
