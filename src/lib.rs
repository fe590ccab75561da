//! # pumpctl
//!
//! A valve and pump controller that runs scheduled open/run cycles and
//! exposes manual control over an authenticated HTTP API.
//!
//! ## Features
//!
//! - **Relay abstraction**: One trait over a simulated relay and real output lines
//! - **Ordered sequencing**: The pump starts before the valve opens and stops before it closes
//! - **Periodic cycle**: Open and run for a fixed duration, repeating at a fixed period
//! - **Fault tolerance**: Failed line writes are logged and counted, never fatal
//! - **Basic auth**: Every route requires credentials, compared in constant time
//! - **Optional HTTPS**: The same router served over rustls when a certificate is given
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Relay and line provider abstractions
//! - `hal` - Concrete implementations (simulated, mock lines, ESP32 lines)
//! - `controller` - Controller that sequences the actuators
//! - `config` - Immutable startup configuration
//! - `services` - Shared state, cycle runner and web API (`web` feature)
//!
//! ## Example
//!
//! ```rust
//! use pumpctl::{PumpController, hal::SimulatedRelay, traits::RelayAction};
//!
//! // Create controller with a simulated relay
//! let mut controller = PumpController::new(SimulatedRelay::new());
//!
//! controller.start();
//! assert!(controller.relay_state().valve_open);
//!
//! controller.stop();
//! assert_eq!(
//!     &controller.relay().journal()[2..],
//!     &[RelayAction::StopPump, RelayAction::CloseValve]
//! );
//! ```

#![warn(missing_docs)]

/// Configuration for the cycle, relay, web server and credentials.
pub mod config;
/// Controller that sequences the valve and pump.
pub mod controller;
/// Startup and runtime error types.
pub mod error;
/// Hardware abstraction layer with simulated and mock implementations.
pub mod hal;
/// Core traits for the actuator abstraction.
pub mod traits;

/// Shared state, periodic cycle and HTTP API (feature-gated).
#[cfg(feature = "web")]
pub mod services;

// Re-exports for convenience
pub use controller::{
    CommandOutcome, ControllerPhase, CycleStart, FaultLog, Health, PumpController,
};
pub use error::{ConfigError, DriverError};
pub use traits::{Actuator, ActuatorState, LineProvider, Relay, RelayAction};

// Config re-exports
pub use config::{AuthConfig, Config, CycleConfig, RelayConfig, WebConfig};
