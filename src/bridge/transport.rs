//! Transport abstraction — any message-framed duplex channel.
//!
//! Concrete implementations:
//! - Websocket client over WiFi (`adapters::ws_transport`, device only)
//! - `None` (via the `Option<T>` impl) when the link could not be set up
//! - In-memory loopbacks in the tests
//!
//! The bridge is generic over `FrameTransport`; connection management and
//! reconnection are the transport's own business.  The bridge only asks
//! whether it is connected right now.

use heapless::Vec;

/// Largest inbound frame the node will buffer.
pub const MAX_FRAME_LEN: usize = 512;

/// One complete inbound text frame.
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Message-framed duplex channel.
pub trait FrameTransport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Whether a frame sent now has a live connection to go out on.
    fn is_connected(&self) -> bool;

    /// Send one complete text frame.  Best-effort: no acknowledgment.
    fn send_text(&mut self, text: &str) -> Result<(), Self::Error>;

    /// Next complete inbound frame, if any.  Never blocks.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// `None` is a link that never came up: never connected, nothing
/// arrives.  Lets the node run offline with the same loop type.
impl<T: FrameTransport> FrameTransport for Option<T> {
    type Error = Option<T::Error>;

    fn is_connected(&self) -> bool {
        self.as_ref().is_some_and(T::is_connected)
    }

    fn send_text(&mut self, text: &str) -> Result<(), Self::Error> {
        match self {
            Some(t) => t.send_text(text).map_err(Some),
            None => Err(None),
        }
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.as_mut().and_then(T::next_frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always;

    impl FrameTransport for Always {
        type Error = ();

        fn is_connected(&self) -> bool {
            true
        }

        fn send_text(&mut self, _text: &str) -> Result<(), ()> {
            Ok(())
        }

        fn next_frame(&mut self) -> Option<Frame> {
            Frame::from_slice(b"{}").ok()
        }
    }

    #[test]
    fn absent_link_is_offline() {
        let mut t: Option<Always> = None;
        assert!(!t.is_connected());
        assert_eq!(t.send_text("x"), Err(None));
        assert!(t.next_frame().is_none());
    }

    #[test]
    fn present_link_delegates() {
        let mut t = Some(Always);
        assert!(t.is_connected());
        assert!(t.send_text("x").is_ok());
        assert_eq!(t.next_frame().unwrap().as_slice(), b"{}");
    }
}
