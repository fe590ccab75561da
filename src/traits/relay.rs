//! Relay abstraction over the valve and pump actuators.
//!
//! This module defines the interfaces that let pumpctl drive either a
//! simulated relay (desktop development, tests) or real output lines.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Relay`] | Open/close valve, start/stop pump, report state |
//! | [`LineProvider`] | Initialise a platform and hand out output lines by name |
//!
//! # Implementation
//!
//! For development and testing, use [`SimulatedRelay`] or a [`LineRelay`]
//! over [`MockLine`]s. On ESP32 hardware, use `Esp32Lines` (requires the
//! `esp32` feature) as the [`LineProvider`] for a [`LineRelay`].
//!
//! # Example
//!
//! ```rust
//! use pumpctl::traits::Relay;
//! use pumpctl::hal::SimulatedRelay;
//!
//! let mut relay = SimulatedRelay::new();
//! relay.open_valve().unwrap();
//! relay.start_pump().unwrap();
//!
//! let state = relay.state();
//! assert!(state.valve_open);
//! assert!(state.pump_on);
//! ```
//!
//! [`SimulatedRelay`]: crate::hal::SimulatedRelay
//! [`LineRelay`]: crate::hal::LineRelay
//! [`MockLine`]: crate::hal::MockLine

use core::fmt;

use crate::error::{ConfigError, DriverError};

/// One of the two actuators behind a relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Actuator {
    /// The valve on the water path.
    Valve,
    /// The pump feeding the valve.
    Pump,
}

impl Actuator {
    /// Returns the actuator name as a lowercase string.
    ///
    /// ```
    /// use pumpctl::Actuator;
    ///
    /// assert_eq!(Actuator::Valve.as_str(), "valve");
    /// assert_eq!(Actuator::Pump.as_str(), "pump");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Actuator::Valve => "valve",
            Actuator::Pump => "pump",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single mutating relay operation.
///
/// Used for log entries, call-order journals and error context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RelayAction {
    /// Drive the valve line high.
    OpenValve,
    /// Drive the valve line low.
    CloseValve,
    /// Drive the pump line high.
    StartPump,
    /// Drive the pump line low.
    StopPump,
}

impl RelayAction {
    /// The actuator this action drives.
    pub const fn actuator(&self) -> Actuator {
        match self {
            RelayAction::OpenValve | RelayAction::CloseValve => Actuator::Valve,
            RelayAction::StartPump | RelayAction::StopPump => Actuator::Pump,
        }
    }

    /// Whether the action energises its line.
    pub const fn energises(&self) -> bool {
        matches!(self, RelayAction::OpenValve | RelayAction::StartPump)
    }

    /// Human readable description, e.g. `"open valve"`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RelayAction::OpenValve => "open valve",
            RelayAction::CloseValve => "close valve",
            RelayAction::StartPump => "start pump",
            RelayAction::StopPump => "stop pump",
        }
    }
}

impl fmt::Display for RelayAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last recorded actuator state.
///
/// Reflects the last successfully issued line command, not sensed physical
/// state. Defaults to everything off.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActuatorState {
    /// Whether the valve line was last driven high.
    pub valve_open: bool,
    /// Whether the pump line was last driven high.
    pub pump_on: bool,
}

impl ActuatorState {
    /// Valve closed and pump off.
    pub const IDLE: Self = Self {
        valve_open: false,
        pump_on: false,
    };

    /// Valve open and pump on.
    pub const RUNNING: Self = Self {
        valve_open: true,
        pump_on: true,
    };

    /// Record the effect of a successful action.
    pub fn apply(&mut self, action: RelayAction) {
        let on = action.energises();
        match action.actuator() {
            Actuator::Valve => self.valve_open = on,
            Actuator::Pump => self.pump_on = on,
        }
    }
}

/// Relay trait - the four actuator operations plus a state query.
///
/// Implementations must record state only for operations that actually took
/// effect, and should emit a log entry naming each action.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use pumpctl::traits::{ActuatorState, Relay};
/// use pumpctl::DriverError;
///
/// struct MyRelay { state: ActuatorState /* line handles */ }
///
/// impl Relay for MyRelay {
///     fn open_valve(&mut self) -> Result<(), DriverError> {
///         // Drive the valve line high...
///         self.state.valve_open = true;
///         Ok(())
///     }
///     // ...
///     fn state(&self) -> ActuatorState {
///         self.state
///     }
/// }
/// ```
pub trait Relay {
    /// Open the valve (valve line high).
    fn open_valve(&mut self) -> Result<(), DriverError>;

    /// Close the valve (valve line low).
    fn close_valve(&mut self) -> Result<(), DriverError>;

    /// Start the pump (pump line high).
    fn start_pump(&mut self) -> Result<(), DriverError>;

    /// Stop the pump (pump line low).
    fn stop_pump(&mut self) -> Result<(), DriverError>;

    /// Last recorded state. Never fails.
    fn state(&self) -> ActuatorState;

    /// Dispatch a [`RelayAction`] to the matching operation.
    fn perform(&mut self, action: RelayAction) -> Result<(), DriverError> {
        match action {
            RelayAction::OpenValve => self.open_valve(),
            RelayAction::CloseValve => self.close_valve(),
            RelayAction::StartPump => self.start_pump(),
            RelayAction::StopPump => self.stop_pump(),
        }
    }
}

impl<R: Relay + ?Sized> Relay for Box<R> {
    fn open_valve(&mut self) -> Result<(), DriverError> {
        (**self).open_valve()
    }

    fn close_valve(&mut self) -> Result<(), DriverError> {
        (**self).close_valve()
    }

    fn start_pump(&mut self) -> Result<(), DriverError> {
        (**self).start_pump()
    }

    fn stop_pump(&mut self) -> Result<(), DriverError> {
        (**self).stop_pump()
    }

    fn state(&self) -> ActuatorState {
        (**self).state()
    }
}

/// Source of named digital output lines.
///
/// A provider wraps a platform's I/O subsystem. [`LineRelay::open`] calls
/// [`init`](Self::init) once and then claims the valve and pump lines by
/// their logical names.
///
/// [`LineRelay::open`]: crate::hal::LineRelay::open
pub trait LineProvider {
    /// The output line type handed out by this provider.
    type Line: embedded_hal::digital::OutputPin;

    /// Initialise the platform I/O subsystem.
    fn init(&mut self) -> Result<(), ConfigError>;

    /// Claim the line with the given logical name.
    ///
    /// Returns `Ok(None)` if no such line exists, or an error if the line
    /// exists but cannot be configured as an output.
    fn claim(&mut self, name: &str) -> Result<Option<Self::Line>, ConfigError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actuator_state_default_is_idle() {
        assert_eq!(ActuatorState::default(), ActuatorState::IDLE);
    }

    #[test]
    fn action_actuator_mapping() {
        assert_eq!(RelayAction::OpenValve.actuator(), Actuator::Valve);
        assert_eq!(RelayAction::CloseValve.actuator(), Actuator::Valve);
        assert_eq!(RelayAction::StartPump.actuator(), Actuator::Pump);
        assert_eq!(RelayAction::StopPump.actuator(), Actuator::Pump);
    }

    #[test]
    fn apply_tracks_each_actuator_independently() {
        let mut state = ActuatorState::IDLE;

        state.apply(RelayAction::StartPump);
        assert_eq!(
            state,
            ActuatorState {
                valve_open: false,
                pump_on: true
            }
        );

        state.apply(RelayAction::OpenValve);
        assert_eq!(state, ActuatorState::RUNNING);

        state.apply(RelayAction::StopPump);
        state.apply(RelayAction::CloseValve);
        assert_eq!(state, ActuatorState::IDLE);
    }

    #[test]
    fn action_display_names_the_action() {
        assert_eq!(RelayAction::OpenValve.to_string(), "open valve");
        assert_eq!(RelayAction::StopPump.to_string(), "stop pump");
    }

    struct CountingRelay {
        state: ActuatorState,
        calls: usize,
    }

    impl Relay for CountingRelay {
        fn open_valve(&mut self) -> Result<(), DriverError> {
            self.calls += 1;
            self.state.valve_open = true;
            Ok(())
        }

        fn close_valve(&mut self) -> Result<(), DriverError> {
            self.calls += 1;
            self.state.valve_open = false;
            Ok(())
        }

        fn start_pump(&mut self) -> Result<(), DriverError> {
            self.calls += 1;
            self.state.pump_on = true;
            Ok(())
        }

        fn stop_pump(&mut self) -> Result<(), DriverError> {
            self.calls += 1;
            self.state.pump_on = false;
            Ok(())
        }

        fn state(&self) -> ActuatorState {
            self.state
        }
    }

    #[test]
    fn perform_dispatches_to_operation() {
        let mut relay = CountingRelay {
            state: ActuatorState::IDLE,
            calls: 0,
        };

        relay.perform(RelayAction::OpenValve).unwrap();
        relay.perform(RelayAction::StartPump).unwrap();
        assert_eq!(relay.state(), ActuatorState::RUNNING);
        assert_eq!(relay.calls, 2);
    }

    #[test]
    fn boxed_relay_forwards() {
        let mut relay: Box<dyn Relay> = Box::new(CountingRelay {
            state: ActuatorState::IDLE,
            calls: 0,
        });

        relay.start_pump().unwrap();
        assert!(relay.state().pump_on);
        relay.stop_pump().unwrap();
        assert!(!relay.state().pump_on);
    }
}
