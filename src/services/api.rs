//! API response types for the HTTP interface.

use serde::{Deserialize, Serialize};

use crate::{ActuatorState, ControllerPhase, Health};

// ============================================================================
// Response Types
// ============================================================================

/// Current actuator state, as served by `/api/v1/state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Whether the valve is open
    pub valve_open: bool,
    /// Whether the pump is running
    pub pump_on: bool,
}

impl From<ActuatorState> for StateResponse {
    fn from(state: ActuatorState) -> Self {
        Self {
            valve_open: state.valve_open,
            pump_on: state.pump_on,
        }
    }
}

/// Controller health, as served by `/api/v1/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Logical phase (`idle` or `running`)
    pub phase: ControllerPhase,
    /// Whether the valve is open
    pub valve_open: bool,
    /// Whether the pump is running
    pub pump_on: bool,
    /// Whether the actuators match the phase
    pub consistent: bool,
    /// Whether the periodic cycle may act
    pub cycle_enabled: bool,
    /// Failed line writes since startup
    pub driver_faults: u32,
    /// Most recent line failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fault: Option<String>,
    /// Seconds since the server started
    pub uptime_secs: u64,
}

impl HealthResponse {
    /// Build from a controller snapshot and the process uptime.
    pub fn new(health: Health, uptime_secs: u64) -> Self {
        Self {
            phase: health.phase,
            valve_open: health.actuators.valve_open,
            pump_on: health.actuators.pump_on,
            consistent: health.consistent,
            cycle_enabled: health.cycle_enabled,
            driver_faults: health.driver_faults,
            last_fault: health.last_fault.map(|e| e.to_string()),
            uptime_secs,
        }
    }
}

/// Body of error responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RelayAction;
    use crate::DriverError;

    #[test]
    fn state_response_wire_format() {
        let json = serde_json::to_string(&StateResponse::from(ActuatorState::IDLE)).unwrap();
        assert_eq!(json, r#"{"valve_open":false,"pump_on":false}"#);

        let json = serde_json::to_string(&StateResponse::from(ActuatorState::RUNNING)).unwrap();
        assert_eq!(json, r#"{"valve_open":true,"pump_on":true}"#);
    }

    #[test]
    fn health_response_from_snapshot() {
        let fault = DriverError::Write {
            action: RelayAction::OpenValve,
            line: "P1_12".into(),
            reason: "Other".into(),
        };
        let health = Health {
            phase: ControllerPhase::Running,
            actuators: ActuatorState {
                valve_open: false,
                pump_on: true,
            },
            consistent: false,
            cycle_enabled: true,
            driver_faults: 1,
            last_fault: Some(fault.clone()),
        };

        let response = HealthResponse::new(health, 42);
        assert_eq!(response.phase, ControllerPhase::Running);
        assert!(!response.valve_open);
        assert!(response.pump_on);
        assert!(!response.consistent);
        assert_eq!(response.driver_faults, 1);
        assert_eq!(response.last_fault, Some(fault.to_string()));
        assert_eq!(response.uptime_secs, 42);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["phase"], "running");
    }

    #[test]
    fn healthy_response_omits_last_fault() {
        let health = Health {
            phase: ControllerPhase::Idle,
            actuators: ActuatorState::IDLE,
            consistent: true,
            cycle_enabled: false,
            driver_faults: 0,
            last_fault: None,
        };
        let json = serde_json::to_string(&HealthResponse::new(health, 0)).unwrap();
        assert!(!json.contains("last_fault"));
    }
}
