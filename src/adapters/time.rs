//! ESP32 clock adapter.
//!
//! Provides the monotonic millisecond clock behind [`ClockPort`].
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` for
//!   host-side simulation.

use crate::app::ports::ClockPort;

/// Monotonic clock for the ESP32 platform.
pub struct Esp32Clock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32Clock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: plain read of the IDF high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for Esp32Clock {
    fn now_ms(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}
