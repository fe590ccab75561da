//! ESP32-C3 hardware abstraction layer for the valve and pump lines.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32-C3 SuperMini
//! - **Valve**: relay module input on a GPIO (default [`pins::VALVE`])
//! - **Pump**: relay module input on a GPIO (default [`pins::PUMP`])
//!
//! Relay inputs are active high: driving a line high energises the coil.
//!
//! The pin names are always available so configuration defaults can be
//! checked on the host. The GPIO driver needs the `esp32` feature.

#[cfg(feature = "esp32")]
mod lines;

#[cfg(feature = "esp32")]
pub use lines::{Esp32Line, Esp32Lines};

/// Default line names for the SuperMini wiring.
pub mod pins {
    /// Valve relay input
    pub const VALVE: &str = "GPIO2";

    /// Pump relay input
    pub const PUMP: &str = "GPIO3";
}

/// Every line name the GPIO bank hands out, in pin order.
///
/// GPIO11-19 are wired to flash and USB on the SuperMini.
pub const LINE_NAMES: [&str; 13] = [
    "GPIO0", "GPIO1", "GPIO2", "GPIO3", "GPIO4", "GPIO5", "GPIO6", "GPIO7", "GPIO8", "GPIO9",
    "GPIO10", "GPIO20", "GPIO21",
];

/// Canonical form of a line name as the GPIO bank keys it.
pub fn normalize_line_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

/// Whether `name` resolves to a line on the GPIO bank.
pub fn is_known_line(name: &str) -> bool {
    let key = normalize_line_name(name);
    LINE_NAMES.contains(&key.as_str())
}
