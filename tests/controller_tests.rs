//! Integration tests for the pump controller

use pumpctl::{
    hal::{LineJournal, LineRelay, MockLine, MockLineProvider, SimulatedRelay},
    ActuatorState, CommandOutcome, ConfigError, ControllerPhase, CycleStart, PumpController,
    RelayAction,
};

fn line_controller() -> (PumpController<LineRelay<MockLine, MockLine>>, MockLine, MockLine) {
    let valve = MockLine::new();
    let pump = MockLine::new();
    let provider = MockLineProvider::new()
        .with_line("P1_12", valve.clone())
        .with_line("P1_16", pump.clone());
    let relay = LineRelay::open(provider, "P1_12", "P1_16").unwrap();
    (PumpController::new(relay), valve, pump)
}

#[test]
fn state_follows_last_command() {
    let mut controller = PumpController::new(SimulatedRelay::new());
    assert_eq!(controller.relay_state(), ActuatorState::IDLE);

    let commands = [true, true, false, true, false, false, true];
    for &start in &commands {
        if start {
            controller.start();
        } else {
            controller.stop();
        }
        let expected = if start {
            ActuatorState::RUNNING
        } else {
            ActuatorState::IDLE
        };
        assert_eq!(controller.relay_state(), expected);
    }
}

#[test]
fn repeated_start_is_idempotent() {
    let mut controller = PumpController::new(SimulatedRelay::new());
    controller.start();
    let after_one = controller.health();
    controller.start();
    controller.start();

    assert_eq!(controller.health(), after_one);
    assert_eq!(controller.relay().journal().len(), 6);
}

#[test]
fn start_and_stop_ordering() {
    let mut controller = PumpController::new(SimulatedRelay::new());

    controller.start();
    assert_eq!(
        controller.relay().journal(),
        &[RelayAction::StartPump, RelayAction::OpenValve]
    );

    controller.relay_mut().clear_journal();
    controller.stop();
    assert_eq!(
        controller.relay().journal(),
        &[RelayAction::StopPump, RelayAction::CloseValve]
    );
}

#[test]
fn hardware_lines_follow_the_same_order() {
    let journal = LineJournal::new();
    let provider = MockLineProvider::new()
        .with_line("P1_12", MockLine::new().with_journal("valve", &journal))
        .with_line("P1_16", MockLine::new().with_journal("pump", &journal));
    let mut controller = PumpController::new(LineRelay::open(provider, "P1_12", "P1_16").unwrap());

    controller.start();
    controller.stop();

    let entries = journal.entries();
    // Safe-state writes at open come first
    assert_eq!(
        &entries[2..],
        &[
            ("pump".to_string(), true),
            ("valve".to_string(), true),
            ("pump".to_string(), false),
            ("valve".to_string(), false),
        ]
    );
}

#[test]
fn cycle_opens_valve_before_pump() {
    let mut controller = PumpController::new(SimulatedRelay::new());

    assert!(matches!(
        controller.begin_cycle(),
        CycleStart::Started(CommandOutcome::Applied)
    ));
    assert_eq!(controller.phase(), ControllerPhase::Running);
    controller.end_cycle();

    assert_eq!(
        controller.relay().journal(),
        &[
            RelayAction::OpenValve,
            RelayAction::StartPump,
            RelayAction::StopPump,
            RelayAction::CloseValve,
        ]
    );
}

#[test]
fn disabled_cycle_does_not_touch_relay() {
    let mut controller = PumpController::new(SimulatedRelay::new()).with_enabled(false);

    assert_eq!(controller.begin_cycle(), CycleStart::Skipped);
    assert!(controller.relay().journal().is_empty());

    // Manual commands still work while the cycle is disabled
    controller.start();
    assert_eq!(controller.relay_state(), ActuatorState::RUNNING);
}

#[test]
fn missing_line_fails_without_driving_anything() {
    let valve = MockLine::new();
    let provider = MockLineProvider::new().with_line("P1_12", valve.clone());

    let err = LineRelay::open(provider, "P1_12", "P1_16").err().unwrap();
    assert!(matches!(err, ConfigError::LineNotFound { ref name, .. } if name == "P1_16"));
    assert_eq!(valve.writes(), 0);
}

#[test]
fn failed_write_is_counted_and_next_step_still_runs() {
    let (mut controller, valve, pump) = line_controller();

    valve.set_failing(true);
    let outcome = controller.start();

    let CommandOutcome::Degraded(errors) = outcome else {
        panic!("expected degraded outcome");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].action(), RelayAction::OpenValve);

    // Pump step ran; valve kept its previous recorded state
    assert!(pump.is_high());
    assert!(!valve.is_high());
    assert_eq!(
        controller.relay_state(),
        ActuatorState {
            valve_open: false,
            pump_on: true,
        }
    );

    let health = controller.health();
    assert_eq!(health.phase, ControllerPhase::Running);
    assert!(!health.consistent);
    assert_eq!(health.driver_faults, 1);
    assert_eq!(health.last_fault.as_ref(), Some(&errors[0]));
}

#[test]
fn recovery_after_fault_restores_consistency() {
    let (mut controller, valve, _pump) = line_controller();

    valve.set_failing(true);
    controller.start();
    assert!(!controller.health().consistent);

    valve.set_failing(false);
    assert!(controller.stop().is_applied());

    let health = controller.health();
    assert!(health.consistent);
    assert_eq!(health.phase, ControllerPhase::Idle);
    // Fault history is kept
    assert_eq!(health.driver_faults, 1);
}

#[test]
fn stop_with_both_lines_failing_attempts_both() {
    let (mut controller, valve, pump) = line_controller();
    controller.start();

    valve.set_failing(true);
    pump.set_failing(true);
    let CommandOutcome::Degraded(errors) = controller.stop() else {
        panic!("expected degraded outcome");
    };

    let actions: Vec<_> = errors.iter().map(|e| e.action()).collect();
    assert_eq!(actions, vec![RelayAction::StopPump, RelayAction::CloseValve]);
    assert_eq!(controller.relay_state(), ActuatorState::RUNNING);
    assert_eq!(controller.faults().count, 2);
}
