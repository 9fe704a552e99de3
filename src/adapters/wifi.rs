//! WiFi station-mode adapter.
//!
//! Validates the build-time credentials and brings the STA interface up
//! before the WebSocket link is opened.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: only the credential validation is compiled.
//!
//! ## Retry policy
//!
//! Connection is attempted [`CONNECT_ATTEMPTS`] times with
//! [`RETRY_DELAY_MS`] between tries.  Losing the link later is not
//! handled here; the WebSocket client keeps retrying on its own timer
//! and the node keeps sampling while offline.

use core::fmt;

use crate::config::NodeConfig;
use crate::error::CommsError;

pub const CONNECT_ATTEMPTS: u32 = 5;
pub const RETRY_DELAY_MS: u32 = 3_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl From<WifiError> for CommsError {
    fn from(_: WifiError) -> Self {
        CommsError::WifiConnectFailed
    }
}

// ── Validation ────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

/// Checked copy of the station credentials from [`NodeConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
}

impl WifiCredentials {
    pub fn from_config(config: &NodeConfig) -> Result<Self, WifiError> {
        if config.wifi_ssid.is_empty() {
            return Err(WifiError::NoCredentials);
        }
        validate_ssid(&config.wifi_ssid)?;
        validate_password(&config.wifi_password)?;
        Ok(Self {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
        })
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    /// Open networks carry an empty password.
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

// ── ESP-IDF station bring-up ──────────────────────────────────

#[cfg(target_os = "espidf")]
mod station {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::delay::FreeRtos;
    use esp_idf_svc::hal::modem::Modem;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use super::{WifiCredentials, WifiError, CONNECT_ATTEMPTS, RETRY_DELAY_MS};

    /// Start the STA interface and block until it has an IP address.
    ///
    /// The returned driver must be kept alive for the link to stay up.
    pub fn connect(
        modem: Modem,
        sys_loop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        creds: &WifiCredentials,
    ) -> Result<BlockingWifi<EspWifi<'static>>, WifiError> {
        let esp_wifi = EspWifi::new(modem, sys_loop.clone(), nvs).map_err(|e| {
            warn!("WiFi: driver init failed: {:?}", e);
            WifiError::ConnectionFailed
        })?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sys_loop).map_err(|e| {
            warn!("WiFi: blocking wrap failed: {:?}", e);
            WifiError::ConnectionFailed
        })?;

        let auth_method = if creds.is_open() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: creds.ssid.clone(),
            password: creds.password.clone(),
            auth_method,
            ..Default::default()
        }))
        .map_err(|_| WifiError::ConnectionFailed)?;

        wifi.start().map_err(|_| WifiError::ConnectionFailed)?;
        info!("WiFi: started, connecting to '{}'", creds.ssid);

        for attempt in 1..=CONNECT_ATTEMPTS {
            let result = wifi.connect().and_then(|()| wifi.wait_netif_up());
            match result {
                Ok(()) => {
                    if let Ok(ip) = wifi.wifi().sta_netif().get_ip_info() {
                        info!("WiFi: connected on attempt {}, ip={}", attempt, ip.ip);
                    }
                    return Ok(wifi);
                }
                Err(e) => {
                    warn!("WiFi: attempt {}/{} failed: {:?}", attempt, CONNECT_ATTEMPTS, e);
                    let _ = wifi.disconnect();
                    if attempt < CONNECT_ATTEMPTS {
                        FreeRtos::delay_ms(RETRY_DELAY_MS);
                    }
                }
            }
        }

        warn!("WiFi: giving up after {} attempts", CONNECT_ATTEMPTS);
        Err(WifiError::ConnectionFailed)
    }
}

#[cfg(target_os = "espidf")]
pub use station::connect;
