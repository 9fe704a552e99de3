//! WebSocket client transport.
//!
//! The ESP-IDF client runs its own task and reports events through a
//! callback.  The callback only touches a [`LinkState`]: it flips the
//! connected flag and copies text frames into the [`FrameInbox`].  The
//! control loop reads both through [`FrameTransport`].
//!
//! Reconnection is the client's job: it retries every
//! `reconnect_interval_ms` on its own.  While it is down, snapshots are
//! dropped by the bridge and no frames arrive.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{info, warn};

use crate::bridge::inbox::FrameInbox;
use crate::bridge::transport::{Frame, FrameTransport};

/// What the client task can report, reduced to what the node cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent<'a> {
    Connected,
    Disconnected,
    Text(&'a [u8]),
    /// Binary, ping, pong and the rest; ignored.
    Other,
}

/// State shared between the client task and the control loop.
pub struct LinkState {
    inbox: FrameInbox,
    connected: AtomicBool,
    connects: AtomicU32,
}

impl LinkState {
    pub const fn new() -> Self {
        Self {
            inbox: FrameInbox::new(),
            connected: AtomicBool::new(false),
            connects: AtomicU32::new(0),
        }
    }

    /// Called from the client task.
    pub fn handle(&self, event: LinkEvent<'_>) {
        match event {
            LinkEvent::Connected => {
                // Commands from a previous session are not replayed.
                let stale = self.inbox.len();
                self.inbox.clear();
                if stale > 0 {
                    warn!("NET | discarded {} stale inbound frame(s)", stale);
                }
                self.connected.store(true, Ordering::Release);
                let n = self.connects.fetch_add(1, Ordering::Relaxed) + 1;
                info!("NET | websocket connected (#{})", n);
            }
            LinkEvent::Disconnected => {
                if self.connected.swap(false, Ordering::AcqRel) {
                    warn!("NET | websocket disconnected, client will retry");
                }
            }
            LinkEvent::Text(bytes) => {
                if let Err(e) = self.inbox.push(bytes) {
                    warn!("NET | inbound frame dropped ({} bytes): {}", bytes.len(), e);
                }
            }
            LinkEvent::Other => {}
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn inbox(&self) -> &FrameInbox {
        &self.inbox
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// `ws://host:port/path`
pub fn server_uri(host: &str, port: u16, path: &str) -> heapless::String<128> {
    use core::fmt::Write;
    let mut uri = heapless::String::new();
    let path = if path.starts_with('/') { path } else { "/" };
    let _ = write!(uri, "ws://{}:{}{}", host, port, path);
    uri
}

// ── ESP-IDF client ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod client {
    use core::time::Duration;

    use esp_idf_svc::io::EspIOError;
    use esp_idf_svc::ws::client::{
        EspWebSocketClient, EspWebSocketClientConfig, WebSocketEvent, WebSocketEventType,
    };
    use esp_idf_svc::ws::FrameType;

    use super::{LinkEvent, LinkState};
    use crate::bridge::transport::{Frame, FrameTransport};
    use crate::config::NodeConfig;
    use crate::error::CommsError;

    const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// [`FrameTransport`] over the ESP-IDF WebSocket client.
    pub struct WsTransport {
        client: EspWebSocketClient<'static>,
        link: &'static LinkState,
    }

    impl WsTransport {
        pub fn connect(config: &NodeConfig, link: &'static LinkState) -> Result<Self, CommsError> {
            let uri = super::server_uri(&config.server_host, config.server_port, &config.server_path);
            let ws_config = EspWebSocketClientConfig {
                reconnect_timeout_ms: Duration::from_millis(u64::from(config.reconnect_interval_ms)),
                ..Default::default()
            };

            let client = EspWebSocketClient::new(
                &uri,
                &ws_config,
                CONNECT_TIMEOUT,
                move |event: &Result<WebSocketEvent, EspIOError>| {
                    let Ok(event) = event else {
                        link.handle(LinkEvent::Disconnected);
                        return;
                    };
                    link.handle(match event.event_type {
                        WebSocketEventType::Connected => LinkEvent::Connected,
                        WebSocketEventType::Disconnected | WebSocketEventType::Closed => {
                            LinkEvent::Disconnected
                        }
                        WebSocketEventType::Text(text) => LinkEvent::Text(text.as_bytes()),
                        _ => LinkEvent::Other,
                    });
                },
            )
            .map_err(|e| {
                log::warn!("NET | websocket client init failed for {}: {:?}", uri, e);
                CommsError::NotConnected
            })?;

            log::info!("NET | websocket client started for {}", uri);
            Ok(Self { client, link })
        }
    }

    impl FrameTransport for WsTransport {
        type Error = EspIOError;

        fn is_connected(&self) -> bool {
            self.link.is_connected() && self.client.is_connected()
        }

        fn send_text(&mut self, text: &str) -> Result<(), EspIOError> {
            self.client.send(FrameType::Text(false), text.as_bytes())
        }

        fn next_frame(&mut self) -> Option<Frame> {
            self.link.inbox().pop()
        }
    }
}

#[cfg(target_os = "espidf")]
pub use client::WsTransport;

/// Host-side transport reading from a [`LinkState`] that tests (or a
/// simulator) drive by hand.  Sent frames are kept for inspection.
#[cfg(not(target_os = "espidf"))]
pub struct LinkTransport<'a> {
    link: &'a LinkState,
    pub sent: std::vec::Vec<std::string::String>,
}

#[cfg(not(target_os = "espidf"))]
impl<'a> LinkTransport<'a> {
    pub fn new(link: &'a LinkState) -> Self {
        Self { link, sent: std::vec::Vec::new() }
    }
}

#[cfg(not(target_os = "espidf"))]
impl FrameTransport for LinkTransport<'_> {
    type Error = ();

    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    fn send_text(&mut self, text: &str) -> Result<(), ()> {
        if !self.link.is_connected() {
            return Err(());
        }
        self.sent.push(text.into());
        Ok(())
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.link.inbox().pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_from_parts() {
        assert_eq!(server_uri("192.168.2.100", 5000, "/").as_str(), "ws://192.168.2.100:5000/");
        assert_eq!(server_uri("hub.local", 81, "/ws").as_str(), "ws://hub.local:81/ws");
    }

    #[test]
    fn bad_path_falls_back_to_root() {
        assert_eq!(server_uri("h", 1, "ws").as_str(), "ws://h:1/");
    }

    #[test]
    fn connection_events_flip_the_flag() {
        let link = LinkState::new();
        assert!(!link.is_connected());
        link.handle(LinkEvent::Connected);
        assert!(link.is_connected());
        link.handle(LinkEvent::Disconnected);
        assert!(!link.is_connected());
        link.handle(LinkEvent::Connected);
        assert!(link.is_connected());
    }

    #[test]
    fn reconnect_discards_undrained_frames() {
        let link = LinkState::new();
        link.handle(LinkEvent::Connected);
        link.handle(LinkEvent::Text(br#"{"command":"PUMP","id":1,"state":true}"#));
        link.handle(LinkEvent::Disconnected);
        assert_eq!(link.inbox().len(), 1);

        link.handle(LinkEvent::Connected);
        assert!(link.inbox().is_empty());

        link.handle(LinkEvent::Text(br#"{"command":"LIGHT","state":true}"#));
        let mut t = LinkTransport::new(&link);
        assert_eq!(t.next_frame().unwrap().as_slice(), br#"{"command":"LIGHT","state":true}"#);
    }

    #[test]
    fn text_frames_land_in_the_inbox() {
        let link = LinkState::new();
        link.handle(LinkEvent::Text(br#"{"command":"LIGHT","state":true}"#));
        link.handle(LinkEvent::Other);
        let mut t = LinkTransport::new(&link);
        assert_eq!(
            t.next_frame().unwrap().as_slice(),
            br#"{"command":"LIGHT","state":true}"#
        );
        assert!(t.next_frame().is_none());
    }

    #[test]
    fn send_requires_connection() {
        let link = LinkState::new();
        let mut t = LinkTransport::new(&link);
        assert!(t.send_text("x").is_err());
        link.handle(LinkEvent::Connected);
        t.send_text("x").unwrap();
        assert_eq!(t.sent, ["x"]);
    }
}
