//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`].
//!
//! # Available Implementations
//!
//! - `simulated`: Software-only relay that logs and journals actions
//! - `line`: Relay over two digital output lines
//! - `mock`: Mock output lines and line provider for desktop testing
//! - `esp32`: ESP32-C3 pin names, plus the GPIO line provider with the
//!   `esp32` feature

pub mod line;
pub mod mock;
pub mod simulated;

pub mod esp32;

pub use line::*;
pub use mock::*;
pub use simulated::*;
