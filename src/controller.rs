//! Pump controller that sequences the valve and pump.
//!
//! This module provides [`PumpController`], the central component that owns
//! the relay, the cycle enable flag and the logical phase.
//!
//! # Overview
//!
//! The controller:
//! - Starts the pump before opening the valve on a manual start
//! - Stops the pump before closing the valve on a manual stop
//! - Opens and closes the valve around a periodic cycle when enabled
//! - Keeps going when a line write fails, recording the fault for health checks
//!
//! # Example
//!
//! ```rust
//! use pumpctl::{PumpController, ControllerPhase, hal::SimulatedRelay};
//!
//! let mut controller = PumpController::new(SimulatedRelay::new());
//!
//! controller.start();
//! assert_eq!(controller.phase(), ControllerPhase::Running);
//! assert!(controller.relay_state().pump_on);
//!
//! controller.stop();
//! assert_eq!(controller.phase(), ControllerPhase::Idle);
//! assert!(!controller.relay_state().valve_open);
//! ```
//!
//! # Fault Handling
//!
//! A failed line write never aborts a sequence. The failure is logged,
//! counted, and the next step is still attempted:
//!
//! ```rust
//! use pumpctl::{PumpController, CommandOutcome};
//! use pumpctl::hal::{LineRelay, MockLine, MockLineProvider};
//!
//! let valve = MockLine::new();
//! let provider = MockLineProvider::new()
//!     .with_line("valve", valve.clone())
//!     .with_line("pump", MockLine::new());
//! let relay = LineRelay::open(provider, "valve", "pump").unwrap();
//! let mut controller = PumpController::new(relay);
//!
//! valve.set_failing(true);
//! let outcome = controller.start();
//!
//! assert!(matches!(outcome, CommandOutcome::Degraded(ref errors) if errors.len() == 1));
//! assert!(controller.relay_state().pump_on);
//! assert!(!controller.health().consistent);
//! ```

use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::traits::{ActuatorState, Relay, RelayAction};

/// Order of relay calls for a manual start.
const START_SEQUENCE: [RelayAction; 2] = [RelayAction::StartPump, RelayAction::OpenValve];

/// Order of relay calls for a manual stop and for the end of a cycle.
const STOP_SEQUENCE: [RelayAction; 2] = [RelayAction::StopPump, RelayAction::CloseValve];

/// Order of relay calls at the start of a periodic cycle.
const CYCLE_OPEN_SEQUENCE: [RelayAction; 2] = [RelayAction::OpenValve, RelayAction::StartPump];

/// Logical controller phase.
///
/// Set unconditionally by the controller's commands, regardless of whether
/// the relay calls succeeded. Compare against [`ActuatorState`] to detect
/// divergence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ControllerPhase {
    /// Valve closed, pump off.
    #[default]
    Idle,
    /// Valve open, pump on.
    Running,
}

impl ControllerPhase {
    /// The actuator state this phase calls for.
    pub const fn expected_state(&self) -> ActuatorState {
        match self {
            ControllerPhase::Idle => ActuatorState::IDLE,
            ControllerPhase::Running => ActuatorState::RUNNING,
        }
    }
}

/// Result of a start/stop sequence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Every relay call succeeded.
    Applied,
    /// Some relay calls failed; the rest were still attempted.
    Degraded(Vec<DriverError>),
}

impl CommandOutcome {
    /// Whether every step succeeded.
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// Result of a cycle tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleStart {
    /// The cycle is disabled; nothing was done.
    Skipped,
    /// The valve was opened and the pump started.
    Started(CommandOutcome),
}

/// Running record of line write failures.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FaultLog {
    /// Total failed writes since startup.
    pub count: u32,
    /// Most recent failure.
    pub last: Option<DriverError>,
}

impl FaultLog {
    fn record(&mut self, error: &DriverError) {
        self.count = self.count.saturating_add(1);
        self.last = Some(error.clone());
    }
}

/// Health snapshot for the API.
///
/// `consistent` is false when the recorded actuator state does not match
/// what the current phase calls for, e.g. the pump started but the valve
/// failed to open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Health {
    /// Current logical phase.
    pub phase: ControllerPhase,
    /// Recorded actuator state.
    pub actuators: ActuatorState,
    /// Whether `actuators` matches `phase`.
    pub consistent: bool,
    /// Whether the periodic cycle may act.
    pub cycle_enabled: bool,
    /// Failed writes since startup.
    pub driver_faults: u32,
    /// Most recent failure, if any.
    pub last_fault: Option<DriverError>,
}

/// Main pump controller.
///
/// Sequences relay operations and owns the cycle enable flag.
///
/// # Type Parameter
///
/// - `R`: The relay implementation ([`Relay`] trait)
///
/// # Thread Safety
///
/// The controller itself is not thread-safe. For the web server and the
/// cycle runner, use the `SharedPumpState` wrapper from the services module
/// (requires `web` feature), which holds it behind a single mutex.
pub struct PumpController<R: Relay> {
    relay: R,
    enabled: bool,
    phase: ControllerPhase,
    faults: FaultLog,
}

impl<R: Relay> PumpController<R> {
    /// Create a new controller with the cycle enabled.
    pub fn new(relay: R) -> Self {
        Self {
            relay,
            enabled: true,
            phase: ControllerPhase::Idle,
            faults: FaultLog::default(),
        }
    }

    /// Set the initial cycle enable flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Start the pump, then open the valve.
    pub fn start(&mut self) -> CommandOutcome {
        info!("starting pump");
        self.phase = ControllerPhase::Running;
        self.run_sequence(&START_SEQUENCE)
    }

    /// Stop the pump, then close the valve.
    pub fn stop(&mut self) -> CommandOutcome {
        info!("stopping pump");
        self.phase = ControllerPhase::Idle;
        self.run_sequence(&STOP_SEQUENCE)
    }

    /// Current relay state, straight from the relay.
    pub fn relay_state(&self) -> ActuatorState {
        self.relay.state()
    }

    /// Open the valve and start the pump if the cycle is enabled.
    ///
    /// Call [`end_cycle`](Self::end_cycle) once the open duration has passed.
    pub fn begin_cycle(&mut self) -> CycleStart {
        if !self.enabled {
            debug!("cycle not enabled");
            return CycleStart::Skipped;
        }

        info!("cycle opening valve");
        self.phase = ControllerPhase::Running;
        CycleStart::Started(self.run_sequence(&CYCLE_OPEN_SEQUENCE))
    }

    /// Stop the pump and close the valve at the end of a cycle.
    ///
    /// Runs regardless of the enable flag, so a cycle in progress always
    /// completes.
    pub fn end_cycle(&mut self) -> CommandOutcome {
        info!("cycle closing valve");
        self.phase = ControllerPhase::Idle;
        self.run_sequence(&STOP_SEQUENCE)
    }

    /// Allow or block the periodic cycle. Manual commands are unaffected.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "cycle enable changed");
        }
        self.enabled = enabled;
    }

    /// Whether the periodic cycle may act.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current logical phase.
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// Line write failures since startup.
    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    /// Health snapshot.
    pub fn health(&self) -> Health {
        let actuators = self.relay.state();
        Health {
            phase: self.phase,
            actuators,
            consistent: actuators == self.phase.expected_state(),
            cycle_enabled: self.enabled,
            driver_faults: self.faults.count,
            last_fault: self.faults.last.clone(),
        }
    }

    /// Borrow the relay.
    pub fn relay(&self) -> &R {
        &self.relay
    }

    /// Mutably borrow the relay.
    pub fn relay_mut(&mut self) -> &mut R {
        &mut self.relay
    }

    fn run_sequence(&mut self, steps: &[RelayAction]) -> CommandOutcome {
        let mut errors = Vec::new();

        for &action in steps {
            if let Err(e) = self.relay.perform(action) {
                warn!(error = %e, "failed to {action}");
                self.faults.record(&e);
                errors.push(e);
            }
        }

        if errors.is_empty() {
            CommandOutcome::Applied
        } else {
            CommandOutcome::Degraded(errors)
        }
    }
}
