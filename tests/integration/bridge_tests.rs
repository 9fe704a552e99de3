//! MessageBridge integration tests.
//!
//! Exercises the bridge against the loopback transport and against the
//! WebSocket link state that the device client task feeds.

use std::cell::RefCell;
use std::rc::Rc;

use grownode::adapters::ws_transport::{LinkEvent, LinkState, LinkTransport};
use grownode::bridge::inbox::INBOX_DEPTH;
use grownode::bridge::MessageBridge;
use grownode::config::DeviceId;
use grownode::sensors::SensorSnapshot;

use crate::mock_hw::{Loopback, RecordingSink};

type Calls = Rc<RefCell<Vec<(String, i32, bool)>>>;

fn device() -> DeviceId {
    let mut id = DeviceId::new();
    id.push_str("tent-1").unwrap();
    id
}

fn recorder(calls: &Calls) -> impl FnMut(&str, i32, bool) + 'static {
    let calls = Rc::clone(calls);
    move |name: &str, id: i32, state: bool| calls.borrow_mut().push((name.to_owned(), id, state))
}

#[test]
fn registered_handler_receives_commands() {
    let calls = Calls::default();
    let mut bridge = MessageBridge::new(Loopback::connected(), device(), 6);
    bridge.register_handler(recorder(&calls));
    assert!(bridge.has_handler());

    bridge.transport_mut().queue(r#"{"command":"PUMP","id":2,"state":true}"#);
    bridge.transport_mut().queue(r#"{"command":"LIGHT","id":null,"state":false}"#);
    let report = bridge.dispatch_pending();

    assert_eq!(report.dispatched(), 2);
    assert_eq!(
        *calls.borrow(),
        [("PUMP".to_owned(), 2, true), ("LIGHT".to_owned(), 0, false)]
    );
}

#[test]
fn without_handler_frames_stay_queued() {
    let mut bridge = MessageBridge::new(Loopback::connected(), device(), 6);
    bridge.transport_mut().queue(r#"{"command":"LIGHT","state":true}"#);

    assert_eq!(bridge.dispatch_pending().taken, 0);
    assert_eq!(bridge.transport().inbound.len(), 1);
}

#[test]
fn replacing_handler_routes_to_the_new_one() {
    let first = Calls::default();
    let second = Calls::default();
    let mut bridge = MessageBridge::new(Loopback::connected(), device(), 6);
    bridge.register_handler(recorder(&first));
    bridge.register_handler(recorder(&second));

    bridge.transport_mut().queue(r#"{"command":"HUMID","state":true}"#);
    bridge.dispatch_pending();

    assert!(first.borrow().is_empty());
    assert_eq!(second.borrow().len(), 1);
}

#[test]
fn missing_command_never_reaches_handler() {
    let calls = Calls::default();
    let mut bridge = MessageBridge::new(Loopback::connected(), device(), 6);
    bridge.transport_mut().queue(r#"{"id":2,"state":true}"#);
    bridge.transport_mut().queue("{");

    let report = bridge.pump(&mut recorder(&calls));
    assert_eq!(report.discarded, 2);
    assert!(calls.borrow().is_empty());
}

#[test]
fn unusable_id_still_dispatches_with_zero() {
    for frame in [
        r#"{"command":"PUMP","id":"1","state":true}"#,
        r#"{"command":"PUMP","id":1.0,"state":true}"#,
        r#"{"command":"PUMP","id":4294967296,"state":true}"#,
    ] {
        let calls = Calls::default();
        let mut bridge = MessageBridge::new(Loopback::connected(), device(), 6);
        bridge.transport_mut().queue(frame);

        let report = bridge.pump(&mut recorder(&calls));
        assert_eq!(report.dispatched(), 1, "{frame}");
        assert_eq!(*calls.borrow(), [("PUMP".to_owned(), 0, true)], "{frame}");
    }
}

#[test]
fn publish_carries_device_id() {
    let mut bridge = MessageBridge::new(Loopback::connected(), device(), 2);
    let mut sink = RecordingSink::default();
    bridge.publish(&SensorSnapshot::default(), &mut sink).unwrap();

    let sent = &bridge.transport().sent[0];
    assert!(sent.starts_with(r#"{"type":"sensor_update","device":"tent-1""#));
    assert!(sent.ends_with(r#""soil":[0,0]}}"#));
}

// ── WebSocket link state ──────────────────────────────────────

#[test]
fn link_frames_flow_into_the_bridge() {
    let link = LinkState::new();
    link.handle(LinkEvent::Connected);
    link.handle(LinkEvent::Text(br#"{"command":"FAN_INTAKE","state":true}"#));

    let calls = Calls::default();
    let mut bridge = MessageBridge::new(LinkTransport::new(&link), device(), 6);
    assert!(bridge.is_connected());
    assert_eq!(bridge.pump(&mut recorder(&calls)).dispatched(), 1);
    assert_eq!(calls.borrow()[0].0, "FAN_INTAKE");

    let mut sink = RecordingSink::default();
    assert!(bridge.publish(&SensorSnapshot::default(), &mut sink).is_ok());
    assert_eq!(bridge.transport().sent.len(), 1);
}

#[test]
fn link_drop_stops_publishing() {
    let link = LinkState::new();
    let mut bridge = MessageBridge::new(LinkTransport::new(&link), device(), 6);
    let mut sink = RecordingSink::default();

    link.handle(LinkEvent::Connected);
    link.handle(LinkEvent::Disconnected);
    assert!(bridge.publish(&SensorSnapshot::default(), &mut sink).is_err());
    assert!(bridge.transport().sent.is_empty());

    link.handle(LinkEvent::Connected);
    assert!(bridge.publish(&SensorSnapshot::default(), &mut sink).is_ok());
}

#[test]
fn link_inbox_overflow_is_counted() {
    let link = LinkState::new();
    for _ in 0..INBOX_DEPTH + 3 {
        link.handle(LinkEvent::Text(br#"{"command":"LIGHT","state":true}"#));
    }
    assert_eq!(link.inbox().len(), INBOX_DEPTH);
    assert_eq!(link.inbox().dropped(), 3);
}
