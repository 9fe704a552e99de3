//! Sensor subsystem — calibration helpers and the [`SensorSampler`] that
//! assembles one [`SensorSnapshot`] per sampling interval.
//!
//! The sampler never fails.  Each field is read independently through
//! [`SensorPort`]; a failed or non-finite reading is replaced by that
//! field's fallback so one flaky sensor cannot invalidate the rest.
//!
//! | Field        | Fallback |
//! |--------------|----------|
//! | temperature  | 0.0 °C   |
//! | humidity     | 0.0 %    |
//! | lux          | 0.0 lx   |
//! | soil slot    | 0 %      |
//! | tank, gas    | 0        |

pub mod environment;
pub mod soil;

use log::debug;

use crate::app::ports::SensorPort;
use crate::config::MAX_PLANTS;
use crate::error::SensorError;

pub const TEMPERATURE_FALLBACK: f32 = 0.0;
pub const HUMIDITY_FALLBACK: f32 = 0.0;
pub const LUX_FALLBACK: f32 = 0.0;
pub const SOIL_FALLBACK: u8 = 0;
pub const ANALOG_FALLBACK: u16 = 0;

/// One complete set of readings for a single sampling instant.
///
/// `soil` always has `MAX_PLANTS` entries; slots at or beyond the active
/// plant count are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSnapshot {
    pub temperature: f32,
    pub humidity: f32,
    pub lux: f32,
    pub soil: [u8; MAX_PLANTS],
    pub tank: u16,
    pub gas: u16,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE_FALLBACK,
            humidity: HUMIDITY_FALLBACK,
            lux: LUX_FALLBACK,
            soil: [SOIL_FALLBACK; MAX_PLANTS],
            tank: ANALOG_FALLBACK,
            gas: ANALOG_FALLBACK,
        }
    }
}

/// Polls every sensor once per call and counts the fields that fell back.
pub struct SensorSampler {
    active_plants: usize,
    faults: u32,
}

impl SensorSampler {
    pub fn new(active_plants: usize) -> Self {
        Self {
            active_plants: active_plants.min(MAX_PLANTS),
            faults: 0,
        }
    }

    pub fn active_plants(&self) -> usize {
        self.active_plants
    }

    /// Total fields replaced by a fallback since construction.
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Read every sensor and assemble a snapshot.
    pub fn sample(&mut self, port: &mut impl SensorPort) -> SensorSnapshot {
        let mut snap = SensorSnapshot::default();

        snap.temperature = self.finite("temperature", port.read_temperature(), TEMPERATURE_FALLBACK);
        snap.humidity = self.finite("humidity", port.read_humidity(), HUMIDITY_FALLBACK);
        snap.lux = self.finite("lux", port.read_lux(), LUX_FALLBACK);

        for (slot, pct) in snap.soil.iter_mut().take(self.active_plants).enumerate() {
            *pct = match port.read_soil_raw(slot) {
                Ok(raw) => soil::raw_to_percent(raw),
                Err(e) => {
                    self.fault("soil", e);
                    SOIL_FALLBACK
                }
            };
        }

        snap.tank = self.analog("tank", port.read_tank_raw());
        snap.gas = self.analog("gas", port.read_gas_raw());
        snap
    }

    fn finite(&mut self, field: &str, reading: Result<f32, SensorError>, fallback: f32) -> f32 {
        match reading {
            Ok(v) if v.is_finite() => v,
            Ok(_) => {
                self.fault(field, SensorError::NotANumber);
                fallback
            }
            Err(e) => {
                self.fault(field, e);
                fallback
            }
        }
    }

    fn analog(&mut self, field: &str, reading: Result<u16, SensorError>) -> u16 {
        reading.unwrap_or_else(|e| {
            self.fault(field, e);
            ANALOG_FALLBACK
        })
    }

    fn fault(&mut self, field: &str, e: SensorError) {
        self.faults = self.faults.saturating_add(1);
        debug!("Sensor {}: {}, using fallback", field, e);
    }
}
