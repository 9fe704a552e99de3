//! Top-level cooperative scheduler.
//!
//! One [`ControlLoop::run_once`] call is one pass:
//!
//! 1. drain pending inbound frames through the bridge, dispatching each
//!    decoded command to the [`NodeService`] synchronously;
//! 2. advance the actuator timers;
//! 3. if the sampling interval has elapsed, sample every sensor and
//!    publish the snapshot.
//!
//! The pass reads the clock once, so every step sees the same `now`.
//! Nothing here sleeps; the caller decides how to pace passes.

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{ClockPort, EventSink, OutputPort, SensorPort};
use crate::app::service::{CommandOutcome, NodeService};
use crate::bridge::transport::FrameTransport;
use crate::bridge::{MessageBridge, PumpReport};
use crate::config::NodeConfig;
use crate::diagnostics::RuntimeMetrics;
use crate::error::CommsError;

/// What one pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub now_ms: u64,
    pub frames: PumpReport,
    pub pumps_stopped: usize,
    /// `Some` when this pass sampled; carries the publish result.
    pub published: Option<Result<usize, CommsError>>,
}

pub struct ControlLoop<H, C, T: FrameTransport, S> {
    service: NodeService,
    bridge: MessageBridge<T>,
    hw: H,
    clock: C,
    sink: S,
    metrics: RuntimeMetrics,
    sampling_interval_ms: u64,
    metrics_interval_ms: u64,
    last_sample_ms: u64,
    last_metrics_ms: u64,
}

impl<H, C, T, S> ControlLoop<H, C, T, S>
where
    H: SensorPort + OutputPort,
    C: ClockPort,
    T: FrameTransport,
    S: EventSink,
{
    pub fn new(config: &NodeConfig, hw: H, clock: C, transport: T, sink: S) -> Self {
        let bridge = MessageBridge::new(transport, config.device_id.clone(), config.active_plants());
        Self {
            service: NodeService::new(config),
            bridge,
            hw,
            clock,
            sink,
            metrics: RuntimeMetrics::new(),
            sampling_interval_ms: u64::from(config.sampling_interval_ms),
            metrics_interval_ms: u64::from(config.metrics_interval_ms),
            last_sample_ms: 0,
            last_metrics_ms: 0,
        }
    }

    /// Drive all outputs to their safe state.  Call once before the first pass.
    pub fn start(&mut self) {
        self.service.start(&mut self.hw, &mut self.sink);
        let now = self.clock.now_ms();
        self.last_metrics_ms = now;
    }

    /// Run one pass.
    pub fn run_once(&mut self) -> PassReport {
        let now = self.clock.now_ms();
        self.metrics.loop_passes += 1;

        // 1. Inbound commands
        let mut rejected = 0u32;
        let Self {
            service,
            bridge,
            hw,
            sink,
            ..
        } = self;
        let frames = bridge.pump(&mut |name: &str, id: i32, state: bool| {
            let outcome = service.handle_command(name, id, state, now, &mut *hw, &mut *sink);
            if let CommandOutcome::Rejected(_) = outcome {
                rejected += 1;
            }
        });
        if frames.discarded > 0 {
            self.sink.emit(&AppEvent::FramesDiscarded {
                count: frames.discarded,
            });
        }
        self.metrics.frames_received += frames.taken as u32;
        self.metrics.frames_discarded += frames.discarded as u32;
        self.metrics.commands_rejected += rejected;

        // 2. Actuator timing, every pass
        let pumps_stopped = self.service.tick(now, &mut self.hw, &mut self.sink);
        self.metrics.pumps_stopped += pumps_stopped as u32;

        // 3. Sampling cadence
        let mut published = None;
        if now.saturating_sub(self.last_sample_ms) >= self.sampling_interval_ms {
            self.last_sample_ms = now;
            published = Some(self.sample_and_publish());
        }

        if self.metrics_interval_ms > 0
            && now.saturating_sub(self.last_metrics_ms) >= self.metrics_interval_ms
        {
            self.last_metrics_ms = now;
            self.metrics.log_summary(now);
        }

        PassReport {
            now_ms: now,
            frames,
            pumps_stopped,
            published,
        }
    }

    fn sample_and_publish(&mut self) -> Result<usize, CommsError> {
        let snapshot = self.service.sample(&mut self.hw);
        self.metrics.sensor_faults = self.service.sensor_faults();

        let result = self.bridge.publish(&snapshot, &mut self.sink);
        match result {
            Ok(_) => self.metrics.snapshots_published += 1,
            Err(e) => {
                debug!("Snapshot dropped: {}", e);
                self.metrics.snapshots_dropped += 1;
            }
        }
        result
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn service(&self) -> &NodeService {
        &self.service
    }

    pub fn bridge(&self) -> &MessageBridge<T> {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut MessageBridge<T> {
        &mut self.bridge
    }

    pub fn hw(&self) -> &H {
        &self.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn metrics(&self) -> &RuntimeMetrics {
        &self.metrics
    }
}
