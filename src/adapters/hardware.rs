//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the I²C [`EnvironmentProbe`] and reads the analog probes through
//! ADC1, exposing both through [`SensorPort`]; drives actuator GPIOs
//! through [`OutputPort`].  This is the only module in the system that
//! touches actual hardware.  On non-espidf targets the underlying
//! `hw_init` helpers operate on simulated registers.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{OutputPort, SensorPort};
use crate::config::OutputId;
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;
use crate::sensors::environment::EnvironmentProbe;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I, D> {
    probe: Option<EnvironmentProbe<I, D>>,
    /// Humidity from the SHT3x measurement taken by the last
    /// temperature read; one measurement serves both fields.
    pending_humidity: Option<Result<f32, SensorError>>,
}

impl<I: I2c, D: DelayNs> HardwareAdapter<I, D> {
    /// `probe` is `None` when the I²C bus failed to come up; the
    /// environment fields then read as not present.
    pub fn new(probe: Option<EnvironmentProbe<I, D>>) -> Self {
        if probe.is_none() {
            warn!("HardwareAdapter: no environment probe, climate/lux unavailable");
        }
        Self {
            probe,
            pending_humidity: None,
        }
    }

    fn probe(&mut self) -> Result<&mut EnvironmentProbe<I, D>, SensorError> {
        self.probe.as_mut().ok_or(SensorError::NotPresent)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I: I2c, D: DelayNs> SensorPort for HardwareAdapter<I, D> {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let climate = self.probe()?.read_climate();
        self.pending_humidity = Some(climate.map(|c| c.humidity_pct));
        climate.map(|c| c.temperature_c)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        match self.pending_humidity.take() {
            Some(reading) => reading,
            None => self.probe()?.read_climate().map(|c| c.humidity_pct),
        }
    }

    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.probe()?.read_lux()
    }

    fn read_soil_raw(&mut self, slot: usize) -> Result<u16, SensorError> {
        let channel = pins::SOIL_MOISTURE_ADC1_CH
            .get(slot)
            .ok_or(SensorError::NotPresent)?;
        hw_init::adc1_read(*channel)
    }

    fn read_tank_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(pins::TANK_LEVEL_ADC1_CH)
    }

    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(pins::GAS_SENSOR_ADC1_CH)
    }
}

// ── OutputPort implementation ─────────────────────────────────

impl<I, D> OutputPort for HardwareAdapter<I, D> {
    fn set_output(&mut self, output: OutputId, high: bool) {
        hw_init::gpio_write(output, high);
    }
}
