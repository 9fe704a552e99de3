//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, outputs, clock, event sinks) implement these
//! traits.  The [`ControlLoop`](crate::control_loop::ControlLoop) and the
//! components it drives consume them via generics, so the domain core
//! never touches hardware directly.

use crate::config::OutputId;
use crate::error::SensorError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: one call per physical sensor.
///
/// Every read must have bounded latency.  Failures are reported, never
/// panicked; the sampler decides the fallback value.
pub trait SensorPort {
    /// Air temperature in °C.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity in %.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// Illuminance in lux.
    fn read_lux(&mut self) -> Result<f32, SensorError>;

    /// Raw 12-bit ADC value of the soil probe in `slot`.
    fn read_soil_raw(&mut self, slot: usize) -> Result<u16, SensorError>;

    /// Raw 12-bit ADC value of the tank level probe.
    fn read_tank_raw(&mut self) -> Result<u16, SensorError>;

    /// Raw 12-bit ADC value of the gas sensor.
    fn read_gas_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: drives a single digital output.
pub trait OutputPort {
    /// Set `output` HIGH (`true`) or LOW (`false`).
    fn set_output(&mut self, output: OutputId, high: bool);
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.  Tests inject a fake one.
pub trait ClockPort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Command handler (inbound dispatch contract)
// ───────────────────────────────────────────────────────────────

/// Receives every successfully decoded inbound command exactly once.
///
/// The bridge does not interpret `name`; recognising the vocabulary is
/// the handler's job.  Any `FnMut(&str, i32, bool)` closure is a handler.
pub trait CommandHandler {
    fn on_command(&mut self, name: &str, id: i32, state: bool);
}

impl<F> CommandHandler for F
where
    F: FnMut(&str, i32, bool),
{
    fn on_command(&mut self, name: &str, id: i32, state: bool) {
        self(name, id, state);
    }
}
