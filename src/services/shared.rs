//! Shared controller state for the web API and the cycle runner.
//!
//! `SharedPumpState` provides thread-safe access to a single `PumpController`
//! shared between HTTP handlers and the periodic cycle.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pumpctl::services::SharedPumpState;
//!
//! let state = Arc::new(SharedPumpState::new(controller));
//!
//! // Web handlers issue commands
//! state.start();
//!
//! // and read snapshots
//! let actuators = state.relay_state();
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::controller::{CommandOutcome, CycleStart, Health, PumpController};
use crate::traits::{ActuatorState, Relay};

/// Shared state for all services (web, cycle runner).
///
/// Wraps a single `PumpController` behind one mutex, so relay operations,
/// the enable flag and the phase change together. Every start, stop and
/// cycle transition runs entirely under the lock: at most one actuator
/// sequence is in flight at any time.
///
/// # Thread Safety
///
/// - The lock is held only for the duration of the relay calls, never across
///   the cycle hold.
/// - A poisoned lock is recovered rather than propagated, so one panicking
///   handler cannot leave the actuators uncontrollable.
pub struct SharedPumpState<R: Relay> {
    controller: Mutex<PumpController<R>>,
    start_time: Instant,
}

impl<R: Relay> SharedPumpState<R> {
    /// Create new shared state wrapping a controller.
    pub fn new(controller: PumpController<R>) -> Self {
        Self {
            controller: Mutex::new(controller),
            start_time: Instant::now(),
        }
    }

    /// Time since the shared state was created.
    #[inline]
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Access the controller with a mutable lock.
    ///
    /// The closure pattern prevents accidentally holding the lock across
    /// await points.
    pub fn with_controller<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&mut PumpController<R>) -> T,
    {
        let mut guard = self
            .controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Start the pump, then open the valve.
    pub fn start(&self) -> CommandOutcome {
        self.with_controller(|controller| controller.start())
    }

    /// Stop the pump, then close the valve.
    pub fn stop(&self) -> CommandOutcome {
        self.with_controller(|controller| controller.stop())
    }

    /// Begin a periodic cycle if enabled.
    pub fn begin_cycle(&self) -> CycleStart {
        self.with_controller(|controller| controller.begin_cycle())
    }

    /// End a periodic cycle.
    pub fn end_cycle(&self) -> CommandOutcome {
        self.with_controller(|controller| controller.end_cycle())
    }

    /// Allow or block the periodic cycle.
    pub fn set_enabled(&self, enabled: bool) {
        self.with_controller(|controller| controller.set_enabled(enabled));
    }

    /// Whether the periodic cycle may act.
    pub fn is_enabled(&self) -> bool {
        self.with_controller(|controller| controller.is_enabled())
    }

    /// Recorded actuator state.
    pub fn relay_state(&self) -> ActuatorState {
        self.with_controller(|controller| controller.relay_state())
    }

    /// Health snapshot.
    pub fn health(&self) -> Health {
        self.with_controller(|controller| controller.health())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::hal::SimulatedRelay;
    use crate::traits::RelayAction;
    use crate::ControllerPhase;

    fn shared() -> Arc<SharedPumpState<SimulatedRelay>> {
        Arc::new(SharedPumpState::new(PumpController::new(
            SimulatedRelay::new(),
        )))
    }

    #[test]
    fn commands_pass_through() {
        let state = shared();
        assert!(state.start().is_applied());
        assert_eq!(state.relay_state(), ActuatorState::RUNNING);

        state.stop();
        assert_eq!(state.relay_state(), ActuatorState::IDLE);
    }

    #[test]
    fn enable_flag_round_trip() {
        let state = shared();
        assert!(state.is_enabled());
        state.set_enabled(false);
        assert!(!state.is_enabled());
        assert_eq!(state.begin_cycle(), CycleStart::Skipped);
    }

    #[test]
    fn concurrent_commands_never_interleave() {
        let state = shared();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let state = Arc::clone(&state);
                thread::spawn(move || {
                    for _ in 0..50 {
                        if i % 2 == 0 {
                            state.start();
                        } else {
                            state.stop();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        state.with_controller(|controller| {
            let journal = controller.relay().journal();
            assert_eq!(journal.len(), 8 * 50 * 2);
            for pair in journal.chunks(2) {
                assert!(
                    pair == [RelayAction::StartPump, RelayAction::OpenValve]
                        || pair == [RelayAction::StopPump, RelayAction::CloseValve],
                    "interleaved sequence: {:?}",
                    pair
                );
            }

            let expected = controller.phase().expected_state();
            assert_eq!(controller.relay_state(), expected);
            assert!(matches!(
                controller.phase(),
                ControllerPhase::Idle | ControllerPhase::Running
            ));
        });
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let state = shared();

        let poisoner = Arc::clone(&state);
        let _ = thread::spawn(move || {
            poisoner.with_controller(|_| panic!("handler panicked"));
        })
        .join();

        state.start();
        assert_eq!(state.relay_state(), ActuatorState::RUNNING);
    }
}
