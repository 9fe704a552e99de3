//! Runtime diagnostics.
//!
//! [`RuntimeMetrics`] is a set of plain counters owned by the control
//! loop and logged every `metrics_interval_ms`.  Nothing is persisted:
//! the node has no storage and every counter restarts at zero on boot.
//!
//! A panic hook logs the panic reason before the default handler resets
//! the chip, so the last serial line tells you why.

use log::{error, info};

/// Counters accumulated by the control loop since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeMetrics {
    pub loop_passes: u64,
    pub frames_received: u32,
    pub frames_discarded: u32,
    pub commands_rejected: u32,
    pub snapshots_published: u32,
    pub snapshots_dropped: u32,
    pub pumps_stopped: u32,
    pub sensor_faults: u32,
}

impl RuntimeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit one summary line at `info` level.
    pub fn log_summary(&self, uptime_ms: u64) {
        info!(
            "METRICS | up={}s passes={} rx={} bad={} rejected={} tx={} dropped={} pump_off={} sensor_faults={} heap_free={}",
            uptime_ms / 1000,
            self.loop_passes,
            self.frames_received,
            self.frames_discarded,
            self.commands_rejected,
            self.snapshots_published,
            self.snapshots_dropped,
            self.pumps_stopped,
            self.sensor_faults,
            heap_free(),
        );
    }
}

#[cfg(target_os = "espidf")]
fn heap_free() -> u32 {
    // SAFETY: read-only query of the IDF heap allocator.
    unsafe { esp_idf_svc::sys::esp_get_free_heap_size() }
}

#[cfg(not(target_os = "espidf"))]
fn heap_free() -> u32 {
    // Nothing meaningful to report on the host.
    0
}

// ───────────────────────────────────────────────────────────────
// Panic hook
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the panic reason and location.
///
/// Call once during init, after the logger is up.
pub fn install_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        let reason = if let Some(msg) = info.payload().downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = info.payload().downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        };

        match info.location() {
            Some(loc) => error!("PANIC: {} at {}:{}", reason, loc.file(), loc.line()),
            None => error!("PANIC: {}", reason),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_start_at_zero() {
        let m = RuntimeMetrics::new();
        assert_eq!(m, RuntimeMetrics::default());
        assert_eq!(m.loop_passes, 0);
    }

    #[test]
    fn summary_does_not_panic() {
        let m = RuntimeMetrics {
            loop_passes: 10,
            frames_received: 3,
            ..RuntimeMetrics::default()
        };
        m.log_summary(12_345);
    }
}
