//! GPIO / peripheral pin assignments for the GrowNode main board (ESP32).
//!
//! Drivers and adapters take ADC channels, actuator GPIOs and bus addresses
//! from here.  The I²C pins are typed peripherals and are picked in `main`.

use crate::config::{MAX_PLANTS, OutputId};

// ---------------------------------------------------------------------------
// I²C bus (SHT3x temperature/humidity, BH1750 light)
// ---------------------------------------------------------------------------

/// SDA is GPIO21 and SCL is GPIO22.
pub const I2C_FREQ_HZ: u32 = 100_000;

/// SHT3x default address (ADDR pin low).
pub const ADDR_SHT3X: u8 = 0x44;
/// BH1750 default address (ADDR pin low).
pub const ADDR_BH1750: u8 = 0x23;
/// MCP4725 DAC (A0 low), parked at 0 V during boot.
pub const ADDR_MCP4725: u8 = 0x60;

// ---------------------------------------------------------------------------
// Analog sensors (ADC1, 12-bit)
// ---------------------------------------------------------------------------

/// Capacitive soil-moisture probes, one per plant slot, on
/// GPIO34, 36, 37, 38, 39 and 33.
pub const SOIL_MOISTURE_ADC1_CH: [u32; MAX_PLANTS] = [6, 0, 1, 2, 3, 5];

/// Tank fill-level probe (GPIO35).
pub const TANK_LEVEL_ADC1_CH: u32 = 7;

/// MQ-series gas sensor (GPIO32).
pub const GAS_SENSOR_ADC1_CH: u32 = 4;

// ---------------------------------------------------------------------------
// Actuators (relay board, active HIGH)
// ---------------------------------------------------------------------------

/// 12 V pump 1 via relay.
pub const PUMP_1_GPIO: OutputId = 18;
/// 12 V pump 2 via relay.
pub const PUMP_2_GPIO: OutputId = 23;

pub const RELAY_LIGHT_GPIO: OutputId = 19;
pub const RELAY_EXHAUST_GPIO: OutputId = 5;
pub const RELAY_INTAKE_GPIO: OutputId = 17;
pub const RELAY_HUMID_GPIO: OutputId = 16;
