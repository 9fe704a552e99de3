//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 one-shot unit for every analog input and every
//! actuator GPIO as a push-pull output driven LOW, using raw ESP-IDF sys
//! calls.  Called once from `main()` before the control loop starts.
//!
//! On the host the same functions operate on simulated registers
//! (atomics), so adapters built on them can be exercised in tests.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, AtomicU64, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::config::OutputId;
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("peripheral init failed")
    }
}

/// Configure ADC1 and drive every pin in `outputs` LOW.
#[cfg(target_os = "espidf")]
pub fn init_peripherals(outputs: &[OutputId]) -> Result<(), HwInitError> {
    // SAFETY: called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc()?;
        init_gpio_outputs(outputs)?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals(outputs: &[OutputId]) -> Result<(), HwInitError> {
    for &pin in outputs {
        gpio_write(pin, false);
    }
    log::info!("hw_init(sim): {} outputs low, ADC simulated", outputs.len());
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// control-loop ADC read path.  `init_adc()` completes before the loop
/// starts, so there is no concurrent access.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }

    // 12 dB attenuation: full 0–3.3 V swing of the probes.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    let channels = pins::SOIL_MOISTURE_ADC1_CH
        .iter()
        .chain([&pins::TANK_LEVEL_ADC1_CH, &pins::GAS_SENSOR_ADC1_CH]);
    for &ch in channels {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), ch, &chan_cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }

    info!("hw_init: ADC1 configured (soil x{}, tank, gas)", pins::SOIL_MOISTURE_ADC1_CH.len());
    Ok(())
}

/// One-shot 12-bit conversion on ADC1 `channel`.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract — single-threaded control-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::ReadFailed);
    }
    in_range(raw)
}

// Simulated ADC1: one register per channel; u16::MAX marks a failed read.
#[cfg(not(target_os = "espidf"))]
static SIM_ADC1: [AtomicU16; 10] = [const { AtomicU16::new(0) }; 10];

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let reg = SIM_ADC1
        .get(channel as usize)
        .ok_or(SensorError::NotPresent)?;
    match reg.load(Ordering::Relaxed) {
        u16::MAX => Err(SensorError::ReadFailed),
        raw => in_range(i32::from(raw)),
    }
}

/// Full scale of the 12-bit one-shot conversion.
pub const ADC1_MAX_RAW: u16 = 4095;

fn in_range(raw: i32) -> Result<u16, SensorError> {
    u16::try_from(raw)
        .ok()
        .filter(|&r| r <= ADC1_MAX_RAW)
        .ok_or(SensorError::OutOfRange)
}

/// Simulation: set the value the next `adc1_read(channel)` returns.
/// `None` makes the channel fail.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc1(channel: u32, raw: Option<u16>) {
    if let Some(reg) = SIM_ADC1.get(channel as usize) {
        reg.store(raw.unwrap_or(u16::MAX), Ordering::Relaxed);
    }
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs(outputs: &[OutputId]) -> Result<(), HwInitError> {
    for &pin in outputs {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }
        unsafe { gpio_set_level(pin, 0) };
    }

    info!("hw_init: {} GPIO outputs configured LOW", outputs.len());
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: OutputId, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was configured in init_gpio_outputs(). Control loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

// Simulated output latch, one bit per GPIO.
#[cfg(not(target_os = "espidf"))]
static SIM_GPIO_OUT: AtomicU64 = AtomicU64::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: OutputId, high: bool) {
    let Ok(bit) = u32::try_from(pin) else { return };
    let Some(mask) = 1u64.checked_shl(bit) else { return };
    if high {
        SIM_GPIO_OUT.fetch_or(mask, Ordering::Relaxed);
    } else {
        SIM_GPIO_OUT.fetch_and(!mask, Ordering::Relaxed);
    }
}

/// Simulation: current latched level of output `pin`.
#[cfg(not(target_os = "espidf"))]
pub fn sim_output_level(pin: OutputId) -> bool {
    let Ok(bit) = u32::try_from(pin) else { return false };
    1u64.checked_shl(bit)
        .is_some_and(|mask| SIM_GPIO_OUT.load(Ordering::Relaxed) & mask != 0)
}
