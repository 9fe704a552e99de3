//! Unified error types for the GrowNode firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping
//! the top-level control loop's error handling uniform.  All variants are
//! `Copy` so they can be passed through the actuator and bridge layers
//! without allocation.  Nothing here is fatal: the control loop logs and
//! carries on.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned unusable data.
    Sensor(SensorError),
    /// An actuator request was rejected.
    Actuator(ActuatorError),
    /// A communication subsystem failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Actuator(e) => write!(f, "actuator: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Bus transaction or ADC conversion failed.
    ReadFailed,
    /// Driver returned NaN or an infinite value.
    NotANumber,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Data integrity check (CRC) failed.
    ChecksumMismatch,
    /// No sensor is wired for the requested slot.
    NotPresent,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::NotANumber => write!(f, "reading is not a number"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::ChecksumMismatch => write!(f, "checksum mismatch"),
            Self::NotPresent => write!(f, "sensor not present"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// No timed channel has this protocol id.
    UnknownPump { id: i32 },
    /// No level channel is bound to this output.
    UnknownOutput { output: i32 },
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPump { id } => write!(f, "invalid target: no pump with id {id}"),
            Self::UnknownOutput { output } => {
                write!(f, "invalid target: no relay on output {output}")
            }
        }
    }
}

impl From<ActuatorError> for Error {
    fn from(e: ActuatorError) -> Self {
        Self::Actuator(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Transport has no live connection.
    NotConnected,
    /// Transport accepted the frame but failed to transmit it.
    SendFailed,
    /// Frame exceeds the fixed inbound buffer.
    FrameTooLarge,
    /// Snapshot could not be encoded.
    Serialize,
    WifiConnectFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "transport not connected"),
            Self::SendFailed => write!(f, "send failed"),
            Self::FrameTooLarge => write!(f, "frame too large"),
            Self::Serialize => write!(f, "serialisation failed"),
            Self::WifiConnectFailed => write!(f, "WiFi connect failed"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
