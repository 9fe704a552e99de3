//! ControlLoop integration tests.
//!
//! Drive whole passes (inbound frames → commands → actuator timing →
//! sampling → publish) with mock hardware and a hand-set clock.

use grownode::actuators::TimedState;
use grownode::app::events::AppEvent;
use grownode::bridge::MAX_FRAMES_PER_PASS;
use grownode::config::NodeConfig;
use grownode::control_loop::ControlLoop;
use grownode::error::{ActuatorError, CommsError, SensorError};
use grownode::pins;

use crate::mock_hw::{FakeClock, Loopback, MockHardware, RecordingSink};

type Node = ControlLoop<MockHardware, FakeClock, Loopback, RecordingSink>;

fn node_with(config: &NodeConfig, transport: Loopback) -> Node {
    let mut node = ControlLoop::new(
        config,
        MockHardware::new(),
        FakeClock::at(0),
        transport,
        RecordingSink::default(),
    );
    node.start();
    node
}

fn online_node() -> Node {
    node_with(&NodeConfig::default(), Loopback::connected())
}

fn at(node: &mut Node, ms: u64) -> grownode::control_loop::PassReport {
    node.clock().set(ms);
    node.run_once()
}

fn send(node: &mut Node, text: &str) {
    node.bridge_mut().transport_mut().queue(text);
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_every_output_low() {
    let node = online_node();
    let config = NodeConfig::default();
    for out in config.pumps.iter().map(|p| p.output).chain(config.relays.as_array()) {
        assert_eq!(node.hw().writes_to(out), 1, "output {} not initialised", out);
        assert!(!node.hw().level(out));
    }
    assert!(matches!(
        node.sink().events.first(),
        Some(AppEvent::Started { pumps: 2, relays: 4 })
    ));
}

// ── Pump commands ─────────────────────────────────────────────

#[test]
fn pump_command_runs_for_default_duration() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"PUMP","id":2,"state":true}"#);

    at(&mut node, 100);
    assert!(node.hw().level(pins::PUMP_2_GPIO));
    assert_eq!(
        node.service().actuators().pump(2).unwrap().state(),
        TimedState::Running { started_ms: 100, duration_ms: 5_000 }
    );

    let report = at(&mut node, 5_099);
    assert_eq!(report.pumps_stopped, 0);
    assert!(node.hw().level(pins::PUMP_2_GPIO));

    let report = at(&mut node, 5_100);
    assert_eq!(report.pumps_stopped, 1);
    assert!(!node.hw().level(pins::PUMP_2_GPIO));
    assert!(node.sink().events.contains(&AppEvent::PumpStopped { id: 2, ran_ms: 5_000 }));
}

#[test]
fn second_pump_command_keeps_original_start() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"PUMP","id":1,"state":true}"#);
    at(&mut node, 1_000);

    send(&mut node, r#"{"command":"PUMP","id":1,"state":true}"#);
    at(&mut node, 3_000);

    assert_eq!(
        node.service().actuators().pump(1).unwrap().state(),
        TimedState::Running { started_ms: 1_000, duration_ms: 5_000 }
    );
    assert_eq!(node.hw().writes_to(pins::PUMP_1_GPIO), 2, "init LOW + one HIGH");
    assert!(node.sink().events.contains(&AppEvent::PumpAlreadyRunning { id: 1 }));

    at(&mut node, 6_000);
    assert!(!node.hw().level(pins::PUMP_1_GPIO));
}

#[test]
fn pump_off_command_does_not_stop_a_running_pump() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"PUMP","id":1,"state":true}"#);
    at(&mut node, 0);
    send(&mut node, r#"{"command":"PUMP","id":1,"state":false}"#);
    at(&mut node, 10);

    assert!(node.hw().level(pins::PUMP_1_GPIO));
    assert_eq!(node.sink().count(|e| matches!(e, AppEvent::CommandIgnored { .. })), 1);
}

#[test]
fn unknown_pump_is_rejected_and_loop_continues() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"PUMP","id":9,"state":true}"#);
    send(&mut node, r#"{"command":"LIGHT","state":true}"#);
    at(&mut node, 50);

    assert_eq!(node.metrics().commands_rejected, 1);
    assert_eq!(node.service().invalid_targets(), 1);
    assert!(node
        .sink()
        .events
        .contains(&AppEvent::InvalidTarget(ActuatorError::UnknownPump { id: 9 })));
    assert!(node.hw().level(pins::RELAY_LIGHT_GPIO));
}

// ── Relay commands ────────────────────────────────────────────

#[test]
fn relay_commands_ignore_id() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"FAN_EXHAUST","id":7,"state":true}"#);
    send(&mut node, r#"{"command":"HUMID","state":true}"#);
    at(&mut node, 10);

    assert!(node.hw().level(pins::RELAY_EXHAUST_GPIO));
    assert!(node.hw().level(pins::RELAY_HUMID_GPIO));

    send(&mut node, r#"{"command":"FAN_EXHAUST","state":false}"#);
    at(&mut node, 20);
    assert!(!node.hw().level(pins::RELAY_EXHAUST_GPIO));
    assert_eq!(node.service().actuators().relay_level(pins::RELAY_EXHAUST_GPIO), Some(false));
}

// ── Malformed input ───────────────────────────────────────────

#[test]
fn malformed_frames_change_nothing() {
    let mut node = online_node();
    let writes_before = node.hw().writes.len();
    send(&mut node, r#"{"id":1,"state":true}"#);
    send(&mut node, "not json at all");
    send(&mut node, r#"{"command":"LIGHT"}"#);

    let report = at(&mut node, 10);
    assert_eq!(report.frames.taken, 3);
    assert_eq!(report.frames.discarded, 3);
    assert_eq!(node.hw().writes.len(), writes_before);
    assert!(node.sink().events.contains(&AppEvent::FramesDiscarded { count: 3 }));
    assert_eq!(node.metrics().frames_discarded, 3);
}

#[test]
fn frame_burst_is_spread_over_passes() {
    let mut node = online_node();
    for _ in 0..MAX_FRAMES_PER_PASS + 2 {
        send(&mut node, r#"{"command":"LIGHT","state":true}"#);
    }

    let first = at(&mut node, 10);
    assert_eq!(first.frames.taken, MAX_FRAMES_PER_PASS);
    let second = at(&mut node, 20);
    assert_eq!(second.frames.taken, 2);
    assert_eq!(node.metrics().frames_received, (MAX_FRAMES_PER_PASS + 2) as u32);
}

// ── Sampling and publishing ───────────────────────────────────

#[test]
fn publishes_once_per_sampling_interval() {
    let mut node = online_node();

    assert!(at(&mut node, 0).published.is_none());
    assert!(at(&mut node, 1_999).published.is_none());
    assert!(at(&mut node, 2_000).published.is_some());
    assert!(at(&mut node, 3_999).published.is_none());
    assert!(at(&mut node, 4_000).published.is_some());

    assert_eq!(node.bridge().transport().sent.len(), 2);
    assert_eq!(node.metrics().snapshots_published, 2);
}

#[test]
fn published_frame_matches_wire_layout() {
    let config = NodeConfig {
        active_plants: 3,
        ..NodeConfig::default()
    };
    let mut node = node_with(&config, Loopback::connected());
    at(&mut node, 2_000);

    assert_eq!(
        node.bridge().transport().sent[0],
        r#"{"type":"sensor_update","device":"esp32_main","data":{"temp":24.5,"humidity":55.0,"lux":300.0,"tank":1800,"gas":400,"soil":[50,50,50]}}"#
    );
}

#[test]
fn disconnected_publish_sends_nothing() {
    let mut node = node_with(&NodeConfig::default(), Loopback::default());
    let report = at(&mut node, 2_000);

    assert_eq!(report.published, Some(Err(CommsError::NotConnected)));
    assert!(node.bridge().transport().sent.is_empty());
    assert_eq!(node.metrics().snapshots_dropped, 1);
    assert!(node
        .sink()
        .events
        .contains(&AppEvent::SnapshotDropped(CommsError::NotConnected)));
}

#[test]
fn failing_sensor_falls_back_and_still_publishes() {
    let mut node = online_node();
    node.hw_mut().temperature = Err(SensorError::ReadFailed);
    node.hw_mut().lux = Ok(f32::NAN);

    let report = at(&mut node, 2_000);
    assert!(matches!(report.published, Some(Ok(_))));

    let frame = &node.bridge().transport().sent[0];
    assert!(frame.contains(r#""temp":0.0"#));
    assert!(frame.contains(r#""lux":0.0"#));
    assert!(frame.contains(r#""humidity":55.0"#));
    assert_eq!(node.metrics().sensor_faults, 2);
}

#[test]
fn pump_timing_ignores_link_state() {
    let mut node = online_node();
    send(&mut node, r#"{"command":"PUMP","id":1,"state":true}"#);
    at(&mut node, 0);

    node.bridge_mut().transport_mut().connected = false;
    at(&mut node, 2_000);
    at(&mut node, 5_000);
    assert!(!node.hw().level(pins::PUMP_1_GPIO));
}
