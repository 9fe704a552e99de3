//! GrowNode Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter    LogEventSink   Esp32Clock   WsTransport    │
//! │  (Sensor+Output)    (EventSink)    (ClockPort)  (Frames)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             NodeService (pure logic)                   │    │
//! │  │  ActuatorTimer · SensorSampler                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  MessageBridge (JSON codec) · ControlLoop (pass scheduler)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use grownode::adapters::device_id;
use grownode::adapters::hardware::HardwareAdapter;
use grownode::adapters::log_sink::LogEventSink;
use grownode::adapters::time::Esp32Clock;
use grownode::adapters::wifi::{self, WifiCredentials};
use grownode::adapters::ws_transport::{LinkState, WsTransport};
use grownode::config::{MAX_PUMPS, MAX_RELAYS, NodeConfig, OutputId};
use grownode::control_loop::ControlLoop;
use grownode::diagnostics;
use grownode::drivers::{hw_init, watchdog::Watchdog};
use grownode::pins;
use grownode::sensors::environment::EnvironmentProbe;

/// Shared with the WebSocket client task.
static LINK: LinkState = LinkState::new();

/// Pause between control-loop passes.
const PASS_DELAY_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GrowNode v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    diagnostics::install_panic_handler();

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = NodeConfig::default().with_build_env();
    if let Err(e) = config.validate() {
        warn!("Config rejected ({}), using defaults", e);
        config = NodeConfig::default();
    }
    config.device_id = device_id::resolve(&config.device_id);
    info!("Device ID: {}", config.device_id);

    // ── 3. Peripherals ────────────────────────────────────────
    let mut outputs: heapless::Vec<OutputId, { MAX_PUMPS + MAX_RELAYS }> =
        config.pumps.iter().map(|p| p.output).collect();
    outputs.extend(config.relays.as_array());
    hw_init::init_peripherals(&outputs)?;

    let peripherals = Peripherals::take()?;
    // SDA = GPIO21, SCL = GPIO22.
    let i2c_config = I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz());
    let probe = match I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &i2c_config,
    ) {
        Ok(bus) => {
            let mut probe = EnvironmentProbe::new(bus, FreeRtos, pins::ADDR_SHT3X, pins::ADDR_BH1750);
            if let Err(e) = probe.zero_dac(pins::ADDR_MCP4725) {
                warn!("DAC not reachable at 0x{:02X} ({})", pins::ADDR_MCP4725, e);
            }
            Some(probe)
        }
        Err(e) => {
            warn!("I2C init failed ({:?}), climate/lux will read as fallback", e);
            None
        }
    };
    let hw = HardwareAdapter::new(probe);

    // ── 4. Network ────────────────────────────────────────────
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    // The driver must outlive the loop for the link to stay up.
    let wifi_link = match WifiCredentials::from_config(&config) {
        Ok(creds) => wifi::connect(peripherals.modem, sys_loop, nvs, &creds)
            .inspect_err(|e| warn!("WiFi unavailable ({}), running offline", e))
            .ok(),
        Err(e) => {
            warn!("WiFi not configured ({}), running offline", e);
            None
        }
    };

    let transport = match &wifi_link {
        Some(_) => WsTransport::connect(&config, &LINK)
            .inspect_err(|e| warn!("Websocket unavailable ({}), running offline", e))
            .ok(),
        None => None,
    };

    // ── 5. Control loop ───────────────────────────────────────
    let mut node = ControlLoop::new(&config, hw, Esp32Clock::new(), transport, LogEventSink::new());
    node.start();

    // Armed only now: WiFi retries above can outlast the timeout.
    let watchdog = Watchdog::new(config.watchdog_timeout_ms);

    info!("System ready. Entering control loop.");

    loop {
        node.run_once();
        watchdog.feed();
        FreeRtos::delay_ms(PASS_DELAY_MS);
    }
}
