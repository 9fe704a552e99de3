//! Inbound frame inbox.
//!
//! Websocket callbacks run on the ESP-IDF client task, not on the control
//! loop.  They must never touch actuator state directly, so every text
//! frame is copied into this bounded `embassy-sync` channel and drained by
//! the control loop on its next pass.
//!
//! ```text
//! ┌──────────────┐   Frame   ┌──────────────┐
//! │  WS callback │──────────▶│ Control Loop │
//! │ (IDF task)   │  (inbox)  │   (sync)     │
//! └──────────────┘           └──────────────┘
//! ```
//!
//! When the inbox is full the newest frame is dropped and counted; frames
//! already queued keep their order.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::transport::Frame;
use crate::error::CommsError;

/// Frames buffered between two control-loop passes.
pub const INBOX_DEPTH: usize = 16;

/// Single-producer / single-consumer frame queue.
pub struct FrameInbox {
    channel: Channel<CriticalSectionRawMutex, Frame, INBOX_DEPTH>,
    dropped: AtomicU32,
}

impl FrameInbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Copy `bytes` into the inbox.  Called from the transport context.
    pub fn push(&self, bytes: &[u8]) -> Result<(), CommsError> {
        let frame = match Frame::from_slice(bytes) {
            Ok(f) => f,
            Err(()) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                return Err(CommsError::FrameTooLarge);
            }
        };
        self.channel.try_send(frame).map_err(|_| {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            CommsError::SendFailed
        })
    }

    /// Next queued frame.  Called from the control loop.
    pub fn pop(&self) -> Option<Frame> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    /// Frames rejected since boot (oversized or inbox full).
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Discard everything queued.  The link does this on every connect.
    pub fn clear(&self) {
        self.channel.clear();
    }
}

impl Default for FrameInbox {
    fn default() -> Self {
        Self::new()
    }
}
