//! Mock adapters for integration tests.
//!
//! Records every output write and every emitted event so tests can
//! assert on the full history without touching real GPIO registers.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use grownode::app::events::AppEvent;
use grownode::app::ports::{ClockPort, EventSink, OutputPort, SensorPort};
use grownode::bridge::transport::{Frame, FrameTransport};
use grownode::config::{MAX_PLANTS, OutputId};
use grownode::error::SensorError;

// ── MockHardware ──────────────────────────────────────────────

/// Scripted sensor readings plus a recording output latch.
pub struct MockHardware {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub lux: Result<f32, SensorError>,
    pub soil: [Result<u16, SensorError>; MAX_PLANTS],
    pub tank: Result<u16, SensorError>,
    pub gas: Result<u16, SensorError>,
    pub writes: Vec<(OutputId, bool)>,
    levels: HashMap<OutputId, bool>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            temperature: Ok(24.5),
            humidity: Ok(55.0),
            lux: Ok(300.0),
            soil: [Ok(2647); MAX_PLANTS],
            tank: Ok(1800),
            gas: Ok(400),
            writes: Vec::new(),
            levels: HashMap::new(),
        }
    }

    /// Last level written to `output` (LOW if never written).
    pub fn level(&self, output: OutputId) -> bool {
        self.levels.get(&output).copied().unwrap_or(false)
    }

    pub fn writes_to(&self, output: OutputId) -> usize {
        self.writes.iter().filter(|(o, _)| *o == output).count()
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPort for MockHardware {
    fn set_output(&mut self, output: OutputId, high: bool) {
        self.writes.push((output, high));
        self.levels.insert(output, high);
    }
}

impl SensorPort for MockHardware {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity
    }

    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.lux
    }

    fn read_soil_raw(&mut self, slot: usize) -> Result<u16, SensorError> {
        self.soil.get(slot).copied().unwrap_or(Err(SensorError::NotPresent))
    }

    fn read_tank_raw(&mut self) -> Result<u16, SensorError> {
        self.tank
    }

    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        self.gas
    }
}

// ── FakeClock ─────────────────────────────────────────────────

/// Monotonic clock the test sets by hand.
#[derive(Default)]
pub struct FakeClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── Loopback transport ────────────────────────────────────────

/// In-memory link: frames queued by the test, sends recorded.
#[derive(Default)]
pub struct Loopback {
    pub connected: bool,
    pub sent: Vec<String>,
    pub inbound: VecDeque<Frame>,
}

#[allow(dead_code)]
impl Loopback {
    pub fn connected() -> Self {
        Self { connected: true, ..Self::default() }
    }

    pub fn queue(&mut self, text: &str) {
        let frame = Frame::from_slice(text.as_bytes()).expect("test frame fits");
        self.inbound.push_back(frame);
    }
}

impl FrameTransport for Loopback {
    type Error = ();

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn send_text(&mut self, text: &str) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.sent.push(text.to_owned());
        Ok(())
    }

    fn next_frame(&mut self) -> Option<Frame> {
        self.inbound.pop_front()
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
