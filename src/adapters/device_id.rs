//! Device identity derived from the ESP32 factory MAC address.
//!
//! Used when no device id is configured.  Produces `esp32-XXYYZZ` (last
//! 3 bytes of the 6-byte MAC, uppercase hex), stable across reboots since
//! the MAC is burned into eFuse.

use core::fmt::Write;

use crate::config::DeviceId;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: the buffer is exactly the 6 bytes the call writes.
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Format: `esp32-XXYYZZ` (e.g., `esp32-EFCAFE`).
pub fn device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    let _ = write!(id, "esp32-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}

/// `configured` if non-empty, otherwise the MAC-derived id.
pub fn resolve(configured: &DeviceId) -> DeviceId {
    if configured.is_empty() {
        device_id(&read_mac())
    } else {
        configured.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::str_or_empty;

    #[test]
    fn device_id_format() {
        let mac = [0x00, 0x11, 0x22, 0xAA, 0xBB, 0xCC];
        assert_eq!(device_id(&mac).as_str(), "esp32-AABBCC");
    }

    #[test]
    fn configured_id_wins() {
        let id: DeviceId = str_or_empty("esp32_main");
        assert_eq!(resolve(&id).as_str(), "esp32_main");
    }

    #[test]
    fn empty_id_falls_back_to_mac() {
        assert_eq!(resolve(&DeviceId::new()).as_str(), "esp32-EFCAFE");
    }
}
