//! Relay backed by two discrete digital output lines.
//!
//! The valve and pump each sit on their own line. Driving a line high
//! energises the actuator; low de-energises it.
//!
//! Control logic:
//! - Open valve: valve line high
//! - Close valve: valve line low
//! - Start pump: pump line high
//! - Stop pump: pump line low
//!
//! State is recorded only after the line accepted the write, so a failed
//! write leaves the previously recorded state in place.

use embedded_hal::digital::{Error as _, OutputPin};
use tracing::{debug, info, warn};

use crate::config::{short_string, ShortString};
use crate::error::{ConfigError, DriverError};
use crate::traits::{Actuator, ActuatorState, LineProvider, Relay, RelayAction};

/// Hardware-backed relay over two [`OutputPin`] lines.
///
/// Construct with [`LineRelay::open`], which brings the platform up,
/// resolves both lines and leaves the actuators de-energised.
///
/// # Example
///
/// ```rust
/// use pumpctl::hal::{LineRelay, MockLine, MockLineProvider};
/// use pumpctl::traits::Relay;
///
/// let valve = MockLine::new();
/// let pump = MockLine::new();
/// let provider = MockLineProvider::new()
///     .with_line("P1_12", valve.clone())
///     .with_line("P1_16", pump.clone());
///
/// let mut relay = LineRelay::open(provider, "P1_12", "P1_16").unwrap();
/// relay.start_pump().unwrap();
///
/// assert!(pump.is_high());
/// assert!(!valve.is_high());
/// ```
pub struct LineRelay<V, P> {
    valve: V,
    pump: P,
    valve_name: ShortString,
    pump_name: ShortString,
    state: ActuatorState,
}

impl<O: OutputPin> LineRelay<O, O> {
    /// Opens a relay on lines claimed from `provider`.
    ///
    /// Initialises the provider, resolves both lines before touching either,
    /// then stops the pump and closes the valve.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::PlatformInit`] if the provider fails to initialise
    /// - [`ConfigError::LineNotFound`] if either name does not resolve
    /// - [`ConfigError::LineUnavailable`] if a line exists but cannot be
    ///   configured as an output
    /// - [`ConfigError::SafeState`] if the lines reject the initial low write
    pub fn open<L>(mut provider: L, valve_name: &str, pump_name: &str) -> Result<Self, ConfigError>
    where
        L: LineProvider<Line = O>,
    {
        provider.init()?;

        let valve = claim(&mut provider, Actuator::Valve, valve_name)?;
        let pump = claim(&mut provider, Actuator::Pump, pump_name)?;

        let mut relay = Self::from_lines(valve, pump, valve_name, pump_name);

        // Initially in a stopped state.
        relay.stop_pump().map_err(ConfigError::SafeState)?;
        relay.close_valve().map_err(ConfigError::SafeState)?;

        info!(
            valve = relay.valve_name(),
            pump = relay.pump_name(),
            "output lines ready"
        );
        Ok(relay)
    }
}

impl<V: OutputPin, P: OutputPin> LineRelay<V, P> {
    /// Wraps two already configured lines without driving them.
    ///
    /// The recorded state starts as idle, which is only accurate once the
    /// caller has driven both lines low.
    pub fn from_lines(valve: V, pump: P, valve_name: &str, pump_name: &str) -> Self {
        Self {
            valve,
            pump,
            valve_name: short_string(valve_name),
            pump_name: short_string(pump_name),
            state: ActuatorState::IDLE,
        }
    }

    /// Logical name of the valve line.
    pub fn valve_name(&self) -> &str {
        &self.valve_name
    }

    /// Logical name of the pump line.
    pub fn pump_name(&self) -> &str {
        &self.pump_name
    }

    fn drive(&mut self, action: RelayAction) -> Result<(), DriverError> {
        let high = action.energises();
        let (result, line) = match action.actuator() {
            Actuator::Valve => (set_level(&mut self.valve, high), &self.valve_name),
            Actuator::Pump => (set_level(&mut self.pump, high), &self.pump_name),
        };

        match result {
            Ok(()) => {
                info!("{action}");
                debug!(line = line.as_str(), high, "line driven");
                self.state.apply(action);
                Ok(())
            }
            Err(reason) => {
                warn!(line = line.as_str(), %reason, "{action} rejected");
                Err(DriverError::Write {
                    action,
                    line: line.as_str().into(),
                    reason,
                })
            }
        }
    }
}

impl<V: OutputPin, P: OutputPin> Relay for LineRelay<V, P> {
    fn open_valve(&mut self) -> Result<(), DriverError> {
        self.drive(RelayAction::OpenValve)
    }

    fn close_valve(&mut self) -> Result<(), DriverError> {
        self.drive(RelayAction::CloseValve)
    }

    fn start_pump(&mut self) -> Result<(), DriverError> {
        self.drive(RelayAction::StartPump)
    }

    fn stop_pump(&mut self) -> Result<(), DriverError> {
        self.drive(RelayAction::StopPump)
    }

    fn state(&self) -> ActuatorState {
        self.state
    }
}

fn claim<L: LineProvider>(
    provider: &mut L,
    actuator: Actuator,
    name: &str,
) -> Result<L::Line, ConfigError> {
    provider
        .claim(name)?
        .ok_or_else(|| ConfigError::LineNotFound {
            actuator,
            name: name.into(),
        })
}

fn set_level<O: OutputPin>(line: &mut O, high: bool) -> Result<(), String> {
    let result = if high { line.set_high() } else { line.set_low() };
    result.map_err(|e| format!("{:?}", e.kind()))
}
