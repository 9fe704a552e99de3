//! Node configuration parameters
//!
//! All tunable parameters for the GrowNode system. Values are supplied
//! once at startup (build-time environment on the device, JSON or
//! `Default` elsewhere) and never persisted.

use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::pins;

/// Soil-moisture slot capacity of every snapshot.
pub const MAX_PLANTS: usize = 6;
/// Maximum number of timed (pump) channels.
pub const MAX_PUMPS: usize = 4;
/// Maximum number of level (relay) channels.
pub const MAX_RELAYS: usize = 8;

/// Physical output identifier (GPIO number on the device).
pub type OutputId = i32;

/// Device identifier string as sent in every outbound message.
pub type DeviceId = String<32>;

/// One timed channel: protocol id → physical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpBinding {
    /// Id used by the `PUMP` command (1-based).
    pub id: u8,
    /// Output the pump relay is wired to.
    pub output: OutputId,
}

/// Level-channel outputs addressed by the relay commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayOutputs {
    pub light: OutputId,
    pub fan_exhaust: OutputId,
    pub fan_intake: OutputId,
    pub humidifier: OutputId,
}

impl RelayOutputs {
    pub fn as_array(&self) -> [OutputId; 4] {
        [self.light, self.fan_exhaust, self.fan_intake, self.humidifier]
    }
}

/// Core node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    // --- Identity ---
    /// Device identifier reported in `sensor_update` messages.
    /// Empty = derive from the factory MAC at boot.
    pub device_id: DeviceId,

    // --- Timing ---
    /// Sensor sampling / publish interval (milliseconds)
    pub sampling_interval_ms: u32,
    /// Run time for a `PUMP` start command (milliseconds)
    pub pump_default_duration_ms: u32,
    /// Runtime metrics log interval (milliseconds)
    pub metrics_interval_ms: u32,
    /// Task watchdog timeout (milliseconds)
    pub watchdog_timeout_ms: u32,

    // --- Plants ---
    /// Number of soil slots populated from hardware (1..=MAX_PLANTS)
    pub active_plants: u8,

    // --- Actuators ---
    pub pumps: Vec<PumpBinding, MAX_PUMPS>,
    pub relays: RelayOutputs,

    // --- Network ---
    pub wifi_ssid: String<32>,
    pub wifi_password: String<64>,
    pub server_host: String<64>,
    pub server_port: u16,
    pub server_path: String<32>,
    /// Websocket reconnect back-off (milliseconds)
    pub reconnect_interval_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        let mut pumps = Vec::new();
        // Capacity is MAX_PUMPS >= 2, pushes cannot fail.
        let _ = pumps.push(PumpBinding { id: 1, output: pins::PUMP_1_GPIO });
        let _ = pumps.push(PumpBinding { id: 2, output: pins::PUMP_2_GPIO });

        Self {
            device_id: str_or_empty("esp32_main"),

            sampling_interval_ms: 2_000,
            pump_default_duration_ms: 5_000,
            metrics_interval_ms: 60_000,
            watchdog_timeout_ms: 10_000,

            active_plants: MAX_PLANTS as u8,

            pumps,
            relays: RelayOutputs {
                light: pins::RELAY_LIGHT_GPIO,
                fan_exhaust: pins::RELAY_EXHAUST_GPIO,
                fan_intake: pins::RELAY_INTAKE_GPIO,
                humidifier: pins::RELAY_HUMID_GPIO,
            },

            wifi_ssid: String::new(),
            wifi_password: String::new(),
            server_host: str_or_empty("192.168.2.100"),
            server_port: 5000,
            server_path: str_or_empty("/"),
            reconnect_interval_ms: 5_000,
        }
    }
}

/// Reasons a [`NodeConfig`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Input could not be parsed as a config document.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Malformed => Self::Config("malformed"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}

impl NodeConfig {
    /// Parse and validate a JSON config document. Missing fields take
    /// their default values.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply build-time environment overrides (device builds).
    pub fn with_build_env(mut self) -> Self {
        if let Some(ssid) = option_env!("GROWNODE_WIFI_SSID") {
            self.wifi_ssid = str_or_empty(ssid);
        }
        if let Some(pass) = option_env!("GROWNODE_WIFI_PASS") {
            self.wifi_password = str_or_empty(pass);
        }
        if let Some(host) = option_env!("GROWNODE_SERVER_HOST") {
            self.server_host = str_or_empty(host);
        }
        if let Some(id) = option_env!("GROWNODE_DEVICE_ID") {
            self.device_id = str_or_empty(id);
        }
        self
    }

    /// Range-check every field. Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sampling_interval_ms must be > 0"));
        }
        if self.active_plants == 0 || self.active_plants as usize > MAX_PLANTS {
            return Err(ConfigError::ValidationFailed("active_plants must be 1..=MAX_PLANTS"));
        }
        if self.pumps.iter().any(|p| p.id == 0) {
            return Err(ConfigError::ValidationFailed("pump id 0 is reserved"));
        }
        for (i, p) in self.pumps.iter().enumerate() {
            if self.pumps[i + 1..].iter().any(|q| q.id == p.id) {
                return Err(ConfigError::ValidationFailed("duplicate pump id"));
            }
        }

        let mut outputs: Vec<OutputId, { MAX_PUMPS + MAX_RELAYS }> = Vec::new();
        for out in self.pumps.iter().map(|p| p.output).chain(self.relays.as_array()) {
            if outputs.contains(&out) {
                return Err(ConfigError::ValidationFailed("output shared between channels"));
            }
            outputs
                .push(out)
                .map_err(|_| ConfigError::ValidationFailed("too many channels"))?;
        }
        Ok(())
    }

    /// Soil slots actually read from hardware.
    pub fn active_plants(&self) -> usize {
        (self.active_plants as usize).min(MAX_PLANTS)
    }
}

/// Copy `s` into a fixed-capacity string, truncating on overflow.
pub(crate) fn str_or_empty<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
