//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Every record
//! is one line, tagged by subsystem: `PUMP`, `RELAY`, `SENSE`, `NET`.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { pumps, relays } => {
                info!("START | pumps={} relays={} | all outputs off", pumps, relays);
            }
            AppEvent::PumpStarted { id, duration_ms } => {
                info!("PUMP  | {} on for {} ms", id, duration_ms);
            }
            AppEvent::PumpAlreadyRunning { id } => {
                info!("PUMP  | {} already running, timer unchanged", id);
            }
            AppEvent::PumpStopped { id, ran_ms } => {
                info!("PUMP  | {} off after {} ms", id, ran_ms);
            }
            AppEvent::RelaySwitched { output, on } => {
                info!("RELAY | gpio {} -> {}", output, if *on { "ON" } else { "OFF" });
            }
            AppEvent::InvalidTarget(e) => {
                warn!("RELAY | {}", e);
            }
            AppEvent::CommandIgnored { name, id, state } => {
                debug!("NET   | ignored command={} id={} state={}", name, id, state);
            }
            AppEvent::SnapshotPublished { bytes } => {
                debug!("SENSE | snapshot sent ({} bytes)", bytes);
            }
            AppEvent::SnapshotDropped(e) => {
                debug!("SENSE | snapshot dropped: {}", e);
            }
            AppEvent::FramesDiscarded { count } => {
                debug!("NET   | {} malformed frame(s) discarded", count);
            }
        }
    }
}
