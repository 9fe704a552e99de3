//! I²C environment probe: SHT3x (air temperature + humidity) and BH1750
//! (illuminance).
//!
//! Written against the `embedded-hal` 1.0 blocking traits so the same code
//! runs on the ESP-IDF `I2cDriver` and on a mock bus in tests.  Both parts
//! are used in single-shot mode: trigger, wait the datasheet conversion
//! time, read back.  Every bus error maps to [`SensorError::ReadFailed`].
//!
//! The same bus carries an MCP4725 DAC that nothing drives yet; it is
//! parked at 0 V during boot.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::SensorError;

// SHT3x: single shot, high repeatability, clock stretching disabled.
const SHT3X_MEASURE_HIGH: [u8; 2] = [0x24, 0x00];
const SHT3X_CONVERSION_MS: u32 = 16;

// BH1750: power on, then one-time high-resolution mode (1 lx / count).
const BH1750_POWER_ON: u8 = 0x01;
const BH1750_ONE_TIME_HRES: u8 = 0x20;
const BH1750_CONVERSION_MS: u32 = 180;

// MCP4725: write DAC register, EEPROM untouched, power-down bits 00.
const MCP4725_WRITE_DAC: u8 = 0x40;

/// One SHT3x measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Climate {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Owns the I²C bus and a delay source.
pub struct EnvironmentProbe<I, D> {
    i2c: I,
    delay: D,
    sht3x_addr: u8,
    bh1750_addr: u8,
}

impl<I: I2c, D: DelayNs> EnvironmentProbe<I, D> {
    pub fn new(i2c: I, delay: D, sht3x_addr: u8, bh1750_addr: u8) -> Self {
        Self {
            i2c,
            delay,
            sht3x_addr,
            bh1750_addr,
        }
    }

    /// Trigger and read one SHT3x temperature/humidity measurement.
    pub fn read_climate(&mut self) -> Result<Climate, SensorError> {
        self.i2c
            .write(self.sht3x_addr, &SHT3X_MEASURE_HIGH)
            .map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_ms(SHT3X_CONVERSION_MS);

        let mut buf = [0u8; 6];
        self.i2c
            .read(self.sht3x_addr, &mut buf)
            .map_err(|_| SensorError::ReadFailed)?;

        let raw_t = checked_word(&buf[0..3])?;
        let raw_h = checked_word(&buf[3..6])?;

        let temperature_c = -45.0 + 175.0 * f32::from(raw_t) / 65535.0;
        let humidity_pct = (100.0 * f32::from(raw_h) / 65535.0).clamp(0.0, 100.0);
        Ok(Climate {
            temperature_c,
            humidity_pct,
        })
    }

    /// Trigger and read one BH1750 illuminance measurement in lux.
    pub fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.i2c
            .write(self.bh1750_addr, &[BH1750_POWER_ON])
            .map_err(|_| SensorError::ReadFailed)?;
        self.i2c
            .write(self.bh1750_addr, &[BH1750_ONE_TIME_HRES])
            .map_err(|_| SensorError::ReadFailed)?;
        self.delay.delay_ms(BH1750_CONVERSION_MS);

        let mut buf = [0u8; 2];
        self.i2c
            .read(self.bh1750_addr, &mut buf)
            .map_err(|_| SensorError::ReadFailed)?;
        Ok(f32::from(u16::from_be_bytes(buf)) / 1.2)
    }

    /// Set the MCP4725 output at `addr` to 0 V without touching its EEPROM.
    pub fn zero_dac(&mut self, addr: u8) -> Result<(), SensorError> {
        self.i2c
            .write(addr, &[MCP4725_WRITE_DAC, 0x00, 0x00])
            .map_err(|_| SensorError::ReadFailed)
    }

    /// Give the bus back (used when tearing down in tests).
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

/// Two data bytes followed by their CRC.
fn checked_word(chunk: &[u8]) -> Result<u16, SensorError> {
    if crc8(&chunk[..2]) != chunk[2] {
        return Err(SensorError::ChecksumMismatch);
    }
    Ok(u16::from_be_bytes([chunk[0], chunk[1]]))
}

/// Sensirion CRC-8: polynomial 0x31, init 0xFF, no reflection.
fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xFF;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ 0x31 } else { crc << 1 };
        }
    }
    crc
}
