//! Fuzz target: inbound command frames
//!
//! Pushes arbitrary bytes through the frame inbox and the bridge and
//! asserts that decoding never panics, that a frame yields at most one
//! handler call, and that accepted command names fit their buffer.
//!
//! cargo fuzz run fuzz_inbound_frame

#![no_main]

use grownode::bridge::inbox::FrameInbox;
use grownode::bridge::transport::{Frame, FrameTransport};
use grownode::bridge::wire::{self, MAX_COMMAND_LEN};
use grownode::bridge::MessageBridge;
use grownode::config::DeviceId;
use libfuzzer_sys::fuzz_target;

struct InboxOnly(FrameInbox);

impl FrameTransport for InboxOnly {
    type Error = ();

    fn is_connected(&self) -> bool {
        false
    }

    fn send_text(&mut self, _text: &str) -> Result<(), ()> {
        Err(())
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.0.pop()
    }
}

fuzz_target!(|data: &[u8]| {
    if let Some(cmd) = wire::decode_command(data) {
        assert!(cmd.name.len() <= MAX_COMMAND_LEN);
    }

    let inbox = FrameInbox::new();
    let queued = inbox.push(data).is_ok();
    let mut bridge = MessageBridge::new(InboxOnly(inbox), DeviceId::new(), 6);

    let mut calls = 0usize;
    let report = bridge.pump(&mut |_: &str, _: i32, _: bool| calls += 1);

    assert_eq!(report.taken, usize::from(queued));
    assert_eq!(report.dispatched(), calls);
    assert!(calls <= 1, "one frame must yield at most one command");
});
