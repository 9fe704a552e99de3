//! Message bridge — snapshots out, commands in.
//!
//! ```text
//!   SensorSnapshot ──▶ publish() ──▶ encode ──▶ FrameTransport
//!   FrameTransport ──▶ pump()    ──▶ decode ──▶ CommandHandler
//! ```
//!
//! Outbound is best-effort: while disconnected a snapshot is dropped, not
//! queued, since only the latest reading matters.  Inbound parsing is
//! lenient: a frame that does not decode is discarded with a debug log
//! and never reaches the handler.  The bridge does not interpret command
//! names; that is the handler's job.

pub mod inbox;
pub mod transport;
pub mod wire;

use log::{debug, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{CommandHandler, EventSink};
use crate::config::DeviceId;
use crate::error::CommsError;
use crate::sensors::SensorSnapshot;
use transport::FrameTransport;

/// Inbound frames dispatched per [`MessageBridge::pump`] call.  Anything
/// beyond stays queued in the transport for the next pass, so a burst of
/// commands cannot starve actuator timing.
pub const MAX_FRAMES_PER_PASS: usize = 8;

/// Outcome of one [`MessageBridge::pump`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Frames taken from the transport.
    pub taken: usize,
    /// Of those, frames that did not decode.
    pub discarded: usize,
}

impl PumpReport {
    pub fn dispatched(&self) -> usize {
        self.taken - self.discarded
    }
}

pub struct MessageBridge<T: FrameTransport> {
    transport: T,
    device_id: DeviceId,
    active_plants: usize,
    handler: Option<Box<dyn CommandHandler>>,
}

impl<T: FrameTransport> MessageBridge<T> {
    pub fn new(transport: T, device_id: DeviceId, active_plants: usize) -> Self {
        Self {
            transport,
            device_id,
            active_plants,
            handler: None,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Send one snapshot as one frame.  Returns the frame length.
    ///
    /// Disconnected → `Err(NotConnected)` and nothing is transmitted.
    pub fn publish(
        &mut self,
        snap: &SensorSnapshot,
        sink: &mut impl EventSink,
    ) -> Result<usize, CommsError> {
        let result = self.try_publish(snap);
        match result {
            Ok(bytes) => sink.emit(&AppEvent::SnapshotPublished { bytes }),
            Err(e) => sink.emit(&AppEvent::SnapshotDropped(e)),
        }
        result
    }

    fn try_publish(&mut self, snap: &SensorSnapshot) -> Result<usize, CommsError> {
        if !self.transport.is_connected() {
            return Err(CommsError::NotConnected);
        }
        let text = wire::encode_snapshot(&self.device_id, snap, self.active_plants)?;
        self.transport.send_text(&text).map_err(|e| {
            warn!("Bridge: send failed: {:?}", e);
            CommsError::SendFailed
        })?;
        Ok(text.len())
    }

    // ── Inbound ───────────────────────────────────────────────

    /// Decode one complete frame and hand it to `handler`.
    ///
    /// Returns `true` when the handler was invoked (exactly once).
    pub fn on_frame(&self, bytes: &[u8], handler: &mut dyn CommandHandler) -> bool {
        match wire::decode_command(bytes) {
            Some(cmd) => {
                handler.on_command(&cmd.name, cmd.id, cmd.state);
                true
            }
            None => {
                debug!("Bridge: discarded malformed frame ({} bytes)", bytes.len());
                false
            }
        }
    }

    /// Drain up to [`MAX_FRAMES_PER_PASS`] pending frames through `handler`.
    pub fn pump(&mut self, handler: &mut dyn CommandHandler) -> PumpReport {
        let mut report = PumpReport::default();
        while report.taken < MAX_FRAMES_PER_PASS {
            let Some(frame) = self.transport.next_frame() else {
                break;
            };
            report.taken += 1;
            if !self.on_frame(&frame, handler) {
                report.discarded += 1;
            }
        }
        report
    }

    /// Install the owned handler used by [`dispatch_pending`](Self::dispatch_pending).
    /// Replaces any handler registered earlier.
    pub fn register_handler(&mut self, handler: impl CommandHandler + 'static) {
        if self.handler.replace(Box::new(handler)).is_some() {
            debug!("Bridge: command handler replaced");
        }
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// [`pump`](Self::pump) through the registered handler.  Without a
    /// registered handler pending frames are left queued.
    pub fn dispatch_pending(&mut self) -> PumpReport {
        let Some(mut handler) = self.handler.take() else {
            return PumpReport::default();
        };
        let report = self.pump(handler.as_mut());
        self.handler = Some(handler);
        report
    }
}
