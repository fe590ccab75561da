//! Error types for startup configuration and runtime line writes.

use thiserror::Error;

use crate::traits::{Actuator, RelayAction};

/// Fatal startup error: the actuators cannot be brought up safely.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The platform I/O subsystem failed to initialise.
    #[error("failed to initialise I/O platform: {0}")]
    PlatformInit(String),

    /// No output line with the configured name exists.
    #[error("output line `{name}` for the {actuator} not found")]
    LineNotFound {
        /// Actuator the line was meant to drive.
        actuator: Actuator,
        /// Logical line name that failed to resolve.
        name: String,
    },

    /// The line exists but could not be configured as an output.
    #[error("output line `{name}` unavailable: {reason}")]
    LineUnavailable {
        /// Logical line name.
        name: String,
        /// Platform error text.
        reason: String,
    },

    /// Driving the lines to the de-energised state failed.
    #[error("failed to de-energise actuators at startup: {0}")]
    SafeState(#[source] DriverError),

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A line write failed at runtime.
///
/// Logged and counted by the controller, never escalated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The output line rejected the write.
    #[error("failed to {action} on line `{line}`: {reason}")]
    Write {
        /// Action being performed.
        action: RelayAction,
        /// Logical name of the line.
        line: String,
        /// Driver error text.
        reason: String,
    },
}

impl DriverError {
    /// The action that failed.
    pub fn action(&self) -> RelayAction {
        match self {
            DriverError::Write { action, .. } => *action,
        }
    }
}
