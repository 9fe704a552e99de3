//! GrowNode firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod actuators;
pub mod app;
pub mod bridge;
pub mod config;
pub mod control_loop;
pub mod diagnostics;
pub mod error;
pub mod pins;

// Hardware-facing modules; the device implementations are guarded by
// cfg attributes inside and fall back to simulated registers on the host.
pub mod adapters;
pub mod drivers;
pub mod sensors;
