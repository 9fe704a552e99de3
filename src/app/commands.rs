//! Inbound command vocabulary.
//!
//! The bridge hands raw `(name, id, state)` triples to its handler; this
//! module is where the handler turns the name into something it can act
//! on.  Unknown names are not an error, they are simply ignored.

use core::str::FromStr;

/// Commands the node acts upon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Grow light relay.
    Light,
    /// Exhaust fan relay.
    FanExhaust,
    /// Intake fan relay.
    FanIntake,
    /// Humidifier relay.
    Humidifier,
    /// Timed pump channel, addressed by id.
    Pump,
}

impl CommandKind {
    /// Wire name of the command.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "LIGHT",
            Self::FanExhaust => "FAN_EXHAUST",
            Self::FanIntake => "FAN_INTAKE",
            Self::Humidifier => "HUMID",
            Self::Pump => "PUMP",
        }
    }
}

/// The name is not part of the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownCommand;

impl FromStr for CommandKind {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LIGHT" => Ok(Self::Light),
            "FAN_EXHAUST" => Ok(Self::FanExhaust),
            "FAN_INTAKE" => Ok(Self::FanIntake),
            "HUMID" => Ok(Self::Humidifier),
            "PUMP" => Ok(Self::Pump),
            _ => Err(UnknownCommand),
        }
    }
}
