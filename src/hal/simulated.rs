//! Software-only relay for development and testing.

use tracing::info;

use crate::error::DriverError;
use crate::traits::{ActuatorState, Relay, RelayAction};

/// Simulated relay that records and logs state without touching hardware.
///
/// Never fails. Every action is appended to a journal so tests can verify
/// the order in which the controller drives the actuators.
///
/// # Example
///
/// ```rust
/// use pumpctl::hal::SimulatedRelay;
/// use pumpctl::traits::{Relay, RelayAction};
///
/// let mut relay = SimulatedRelay::new();
/// relay.start_pump().unwrap();
/// relay.open_valve().unwrap();
///
/// assert_eq!(
///     relay.journal(),
///     &[RelayAction::StartPump, RelayAction::OpenValve]
/// );
/// assert!(relay.state().valve_open);
/// ```
#[derive(Debug, Default)]
pub struct SimulatedRelay {
    state: ActuatorState,
    journal: Vec<RelayAction>,
}

impl SimulatedRelay {
    /// Creates a simulated relay with the valve closed and the pump off.
    pub fn new() -> Self {
        Self::default()
    }

    /// All actions performed so far, oldest first.
    pub fn journal(&self) -> &[RelayAction] {
        &self.journal
    }

    /// Clears the action journal, keeping the current state.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn record(&mut self, action: RelayAction) -> Result<(), DriverError> {
        info!("{action}");
        self.state.apply(action);
        self.journal.push(action);
        Ok(())
    }
}

impl Relay for SimulatedRelay {
    fn open_valve(&mut self) -> Result<(), DriverError> {
        self.record(RelayAction::OpenValve)
    }

    fn close_valve(&mut self) -> Result<(), DriverError> {
        self.record(RelayAction::CloseValve)
    }

    fn start_pump(&mut self) -> Result<(), DriverError> {
        self.record(RelayAction::StartPump)
    }

    fn stop_pump(&mut self) -> Result<(), DriverError> {
        self.record(RelayAction::StopPump)
    }

    fn state(&self) -> ActuatorState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_with_empty_journal() {
        let relay = SimulatedRelay::new();
        assert_eq!(relay.state(), ActuatorState::IDLE);
        assert!(relay.journal().is_empty());
    }

    #[test]
    fn each_operation_updates_state() {
        let mut relay = SimulatedRelay::new();

        relay.open_valve().unwrap();
        assert!(relay.state().valve_open);
        assert!(!relay.state().pump_on);

        relay.start_pump().unwrap();
        assert_eq!(relay.state(), ActuatorState::RUNNING);

        relay.close_valve().unwrap();
        assert!(!relay.state().valve_open);
        assert!(relay.state().pump_on);

        relay.stop_pump().unwrap();
        assert_eq!(relay.state(), ActuatorState::IDLE);
    }

    #[test]
    fn repeated_operations_are_journaled() {
        let mut relay = SimulatedRelay::new();
        relay.stop_pump().unwrap();
        relay.stop_pump().unwrap();

        assert_eq!(
            relay.journal(),
            &[RelayAction::StopPump, RelayAction::StopPump]
        );
        assert_eq!(relay.state(), ActuatorState::IDLE);
    }

    #[test]
    fn clear_journal_keeps_state() {
        let mut relay = SimulatedRelay::new();
        relay.open_valve().unwrap();
        relay.clear_journal();

        assert!(relay.journal().is_empty());
        assert!(relay.state().valve_open);
    }
}
