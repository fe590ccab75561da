//! Trait definitions for the actuator abstraction.
//!
//! This module defines the core abstractions that allow pumpctl to:
//! - Drive real output lines (ESP32) or a simulated relay (desktop, tests)
//! - Select the relay implementation once at startup
//!
//! # Relay Abstraction
//!
//! - [`Relay`]: open/close valve, start/stop pump, state query
//! - [`LineProvider`]: platform initialisation and output lines by name
//!
//! The leaf line driver is [`embedded_hal::digital::OutputPin`].

pub mod relay;

pub use relay::*;
