//! Configuration for the cycle, relay, web server and credentials.
//!
//! Uses `heapless::String` for line names and credentials so the same
//! structs work on ESP32 and desktop.
//!
//! Configuration is built once at startup and never changes afterwards.
//!
//! # Example
//!
//! ```rust
//! use pumpctl::config::{AuthConfig, Config, CycleConfig, RelayConfig};
//!
//! let config = Config::default()
//!     .with_cycle(CycleConfig::default().with_open_duration_secs(60).with_period_secs(600))
//!     .with_relay(RelayConfig::default().with_simulated(true))
//!     .with_auth(AuthConfig::new("admin", "hunter2").unwrap());
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.cycle.period().as_secs(), 600);
//! ```

use core::fmt;
use core::time::Duration;

use heapless::String as HString;

use crate::error::ConfigError;
use crate::hal::esp32::{normalize_line_name, pins};

/// Maximum length for config strings (line names, credentials)
pub const MAX_SHORT_STRING: usize = 64;

/// Type alias for config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    let mut hs = ShortString::new();
    let take = s.len().min(MAX_SHORT_STRING);
    // Find valid UTF-8 boundary
    let valid_end = s
        .char_indices()
        .take_while(|(i, c)| i + c.len_utf8() <= take)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, rejecting values that do not fit
pub fn bounded_string(field: &str, s: &str) -> Result<ShortString, ConfigError> {
    let mut hs = ShortString::new();
    hs.push_str(s).map_err(|_| {
        ConfigError::Invalid(format!(
            "{field} is longer than {MAX_SHORT_STRING} bytes"
        ))
    })?;
    Ok(hs)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Periodic cycle timing
    pub cycle: CycleConfig,
    /// Relay selection and line names
    pub relay: RelayConfig,
    /// Web server configuration
    pub web: WebConfig,
    /// Basic auth credentials
    pub auth: AuthConfig,
}

impl Config {
    /// Set cycle configuration
    pub fn with_cycle(mut self, cycle: CycleConfig) -> Self {
        self.cycle = cycle;
        self
    }

    /// Set relay configuration
    pub fn with_relay(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    /// Set web configuration
    pub fn with_web(mut self, web: WebConfig) -> Self {
        self.web = web;
        self
    }

    /// Set credentials
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = auth;
        self
    }

    /// Check that the configuration can drive the actuators.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the cycle period is zero, or if the
    /// hardware relay is selected with empty or identical line names.
    /// Names are compared the way the GPIO bank resolves them, so `gpio2`
    /// and ` GPIO2` are the same line.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cycle.period_secs == 0 {
            return Err(ConfigError::Invalid(
                "cycle period must be at least one second".into(),
            ));
        }

        if !self.relay.simulated {
            let valve = normalize_line_name(&self.relay.valve_line);
            let pump = normalize_line_name(&self.relay.pump_line);
            if valve.is_empty() || pump.is_empty() {
                return Err(ConfigError::Invalid("output line names must not be empty".into()));
            }
            if valve == pump {
                return Err(ConfigError::Invalid(format!(
                    "valve and pump cannot share line `{}`",
                    self.relay.valve_line
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Cycle Config
// ============================================================================

/// Periodic cycle timing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CycleConfig {
    /// How long the valve stays open and the pump runs, in seconds
    pub open_duration_secs: u32,
    /// Time between cycle starts, in seconds
    pub period_secs: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            open_duration_secs: 5,
            period_secs: 30,
        }
    }
}

impl CycleConfig {
    /// Set the open duration
    pub fn with_open_duration_secs(mut self, secs: u32) -> Self {
        self.open_duration_secs = secs;
        self
    }

    /// Set the period
    pub fn with_period_secs(mut self, secs: u32) -> Self {
        self.period_secs = secs;
        self
    }

    /// Open duration as a [`Duration`]
    pub fn open_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.open_duration_secs))
    }

    /// Period as a [`Duration`]
    pub fn period(&self) -> Duration {
        Duration::from_secs(u64::from(self.period_secs))
    }
}

// ============================================================================
// Relay Config
// ============================================================================

/// Relay selection
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayConfig {
    /// Use the software-only relay instead of output lines
    pub simulated: bool,
    /// Logical name of the valve output line
    pub valve_line: ShortString,
    /// Logical name of the pump output line
    pub pump_line: ShortString,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            simulated: false,
            valve_line: short_string(pins::VALVE),
            pump_line: short_string(pins::PUMP),
        }
    }
}

impl RelayConfig {
    /// Select the simulated relay
    pub fn with_simulated(mut self, simulated: bool) -> Self {
        self.simulated = simulated;
        self
    }

    /// Set the valve and pump line names
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if either name is longer than
    /// [`MAX_SHORT_STRING`] bytes.
    pub fn with_lines(mut self, valve: &str, pump: &str) -> Result<Self, ConfigError> {
        self.valve_line = bounded_string("valve line", valve)?;
        self.pump_line = bounded_string("pump line", pump)?;
        Ok(self)
    }
}

// ============================================================================
// Web Config
// ============================================================================

/// Web server configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_permissive: false,
        }
    }
}

impl WebConfig {
    /// Set the port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS mode
    pub fn with_cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }
}

// ============================================================================
// Auth Config
// ============================================================================

/// Basic auth credentials
#[derive(Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuthConfig {
    /// Expected username
    pub username: ShortString,
    /// Expected password
    #[cfg_attr(feature = "serde", serde(skip_serializing))]
    pub password: ShortString,
}

impl AuthConfig {
    /// Create credentials, rejecting values longer than [`MAX_SHORT_STRING`].
    ///
    /// Credentials are never truncated.
    pub fn new(username: &str, password: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            username: bounded_string("username", username)?,
            password: bounded_string("password", password)?,
        })
    }

    /// Whether no password is configured
    pub fn is_open(&self) -> bool {
        self.password.is_empty()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
