//! Application core — pure domain logic, zero I/O.
//!
//! Command vocabulary, outbound events, the [`NodeService`](service::NodeService)
//! that maps commands onto actuators, and the **port traits** in [`ports`]
//! through which every hardware interaction flows.  Nothing here needs
//! real peripherals to be tested.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
