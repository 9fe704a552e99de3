//! Task watchdog for the control-loop task.
//!
//! The control loop subscribes itself to the ESP-IDF TWDT at boot and
//! feeds it once per pass.  A pass that hangs (stuck I²C transaction,
//! runaway loop) for longer than `watchdog_timeout_ms` panics the chip,
//! and the panic hook logs why before the reset.
//!
//! On the host the watchdog only counts feeds.

#[cfg(not(target_os = "espidf"))]
use core::cell::Cell;

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    armed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: Cell<u64>,
}

impl Watchdog {
    /// Subscribe the calling task.  A failed subscription is logged and
    /// leaves the watchdog disarmed; the node keeps running without it.
    pub fn new(timeout_ms: u32) -> Self {
        let armed = subscribe_current_task(timeout_ms);
        if armed {
            info!("Watchdog: armed, {} ms timeout", timeout_ms);
        } else {
            warn!("Watchdog: not armed, loop stalls will go unnoticed");
        }
        Self {
            timeout_ms,
            armed,
            #[cfg(not(target_os = "espidf"))]
            feeds: Cell::new(0),
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Call once per control-loop pass.
    pub fn feed(&self) {
        if !self.armed {
            return;
        }
        #[cfg(target_os = "espidf")]
        // SAFETY: resets the TWDT entry of the task subscribed in `new`.
        unsafe {
            esp_idf_svc::sys::esp_task_wdt_reset();
        }
        #[cfg(not(target_os = "espidf"))]
        self.feeds.set(self.feeds.get() + 1);
    }

    /// Simulation: feeds seen since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u64 {
        self.feeds.get()
    }
}

#[cfg(target_os = "espidf")]
impl Drop for Watchdog {
    fn drop(&mut self) {
        if self.armed {
            // SAFETY: removes the calling task subscribed in `new`.
            unsafe {
                esp_idf_svc::sys::esp_task_wdt_delete(core::ptr::null_mut());
            }
        }
    }
}

#[cfg(target_os = "espidf")]
fn subscribe_current_task(timeout_ms: u32) -> bool {
    use esp_idf_svc::sys::{
        ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure,
    };

    let cfg = esp_task_wdt_config_t {
        timeout_ms,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: TWDT configuration from the main task during init.
    let rc = unsafe { esp_task_wdt_reconfigure(&cfg) };
    if rc != ESP_OK as i32 {
        warn!("Watchdog: reconfigure returned {}", rc);
    }
    // SAFETY: a null handle subscribes the calling task.
    let rc = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
    rc == ESP_OK as i32
}

#[cfg(not(target_os = "espidf"))]
fn subscribe_current_task(timeout_ms: u32) -> bool {
    timeout_ms > 0
}
