//! Mock output lines for testing without hardware.
//!
//! This module provides test doubles for the line-level traits, enabling
//! development and testing of [`LineRelay`] on desktop without GPIO.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockLine`] | [`OutputPin`] | Tracks level and write count, injects failures |
//! | [`MockLineProvider`] | [`LineProvider`] | Named lines, init and claim failures |
//! | [`LineJournal`] | - | Shared write log across several lines |
//!
//! `MockLine` handles are cheap clones of the same line, so a test can keep
//! a probe after handing the line to a provider.
//!
//! # Example
//!
//! ```rust
//! use pumpctl::hal::MockLine;
//! use embedded_hal::digital::OutputPin;
//!
//! let probe = MockLine::new();
//! let mut line = probe.clone();
//!
//! line.set_high().unwrap();
//! assert!(probe.is_high());
//!
//! probe.set_failing(true);
//! assert!(line.set_low().is_err());
//! assert!(probe.is_high()); // rejected writes leave the level alone
//! ```
//!
//! [`LineRelay`]: crate::hal::LineRelay
//! [`LineProvider`]: crate::traits::LineProvider

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin};

use crate::error::ConfigError;
use crate::traits::LineProvider;

// ============================================================================
// Line Journal
// ============================================================================

/// Ordered log of writes shared by several [`MockLine`]s.
///
/// Each entry is `(label, high)`.
#[derive(Clone, Debug, Default)]
pub struct LineJournal {
    entries: Arc<Mutex<Vec<(String, bool)>>>,
}

impl LineJournal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all writes so far, oldest first.
    pub fn entries(&self) -> Vec<(String, bool)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, label: &str, high: bool) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((label.to_string(), high));
    }
}

// ============================================================================
// Mock Line
// ============================================================================

/// Error returned by a [`MockLine`] set to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockLineError;

impl fmt::Display for MockLineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("mock line write rejected")
    }
}

impl embedded_hal::digital::Error for MockLineError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Debug, Default)]
struct LineProbe {
    high: bool,
    writes: usize,
    failing: bool,
}

/// Mock digital output line.
///
/// Records the current level and the number of accepted writes. Clones
/// share the same underlying line.
#[derive(Clone, Debug, Default)]
pub struct MockLine {
    probe: Arc<Mutex<LineProbe>>,
    journal: Option<(String, LineJournal)>,
}

impl MockLine {
    /// Creates a low line that accepts writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log accepted writes to `journal` under `label`.
    pub fn with_journal(mut self, label: &str, journal: &LineJournal) -> Self {
        self.journal = Some((label.to_string(), journal.clone()));
        self
    }

    /// Whether the line was last driven high.
    pub fn is_high(&self) -> bool {
        self.lock().high
    }

    /// Number of accepted writes.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LineProbe> {
        self.probe.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&mut self, high: bool) -> Result<(), MockLineError> {
        {
            let mut probe = self.lock();
            if probe.failing {
                return Err(MockLineError);
            }
            probe.high = high;
            probe.writes += 1;
        }
        if let Some((label, journal)) = &self.journal {
            journal.push(label, high);
        }
        Ok(())
    }
}

impl ErrorType for MockLine {
    type Error = MockLineError;
}

impl OutputPin for MockLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true)
    }
}

// ============================================================================
// Mock Line Provider
// ============================================================================

/// Mock platform handing out [`MockLine`]s by name.
///
/// Each line can be claimed once.
///
/// # Example
///
/// ```rust
/// use pumpctl::hal::{MockLine, MockLineProvider};
/// use pumpctl::traits::LineProvider;
///
/// let mut provider = MockLineProvider::new().with_line("P1_12", MockLine::new());
/// provider.init().unwrap();
///
/// assert!(provider.claim("P1_12").unwrap().is_some());
/// assert!(provider.claim("P1_12").unwrap().is_none());
/// assert!(provider.claim("P1_99").unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct MockLineProvider {
    lines: HashMap<String, MockLine>,
    unavailable: HashMap<String, String>,
    init_failure: Option<String>,
    initialized: bool,
}

impl MockLineProvider {
    /// Creates a provider with no lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a line under `name`.
    pub fn with_line(mut self, name: &str, line: MockLine) -> Self {
        self.lines.insert(name.to_string(), line);
        self
    }

    /// Make claiming `name` fail as if the line exists but cannot be
    /// configured as an output.
    ///
    /// Takes precedence over a line registered under the same name.
    pub fn with_unavailable_line(mut self, name: &str, reason: &str) -> Self {
        self.unavailable.insert(name.to_string(), reason.to_string());
        self
    }

    /// Make [`init`](LineProvider::init) fail with `reason`.
    pub fn with_init_failure(mut self, reason: &str) -> Self {
        self.init_failure = Some(reason.to_string());
        self
    }

    /// Whether `init` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl LineProvider for MockLineProvider {
    type Line = MockLine;

    fn init(&mut self) -> Result<(), ConfigError> {
        if let Some(reason) = &self.init_failure {
            return Err(ConfigError::PlatformInit(reason.clone()));
        }
        self.initialized = true;
        Ok(())
    }

    fn claim(&mut self, name: &str) -> Result<Option<MockLine>, ConfigError> {
        if !self.initialized {
            return Err(ConfigError::PlatformInit("platform not initialised".into()));
        }
        if let Some(reason) = self.unavailable.get(name) {
            return Err(ConfigError::LineUnavailable {
                name: name.into(),
                reason: reason.clone(),
            });
        }
        Ok(self.lines.remove(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let probe = MockLine::new();
        let mut line = probe.clone();

        line.set_high().unwrap();
        assert!(probe.is_high());
        assert_eq!(probe.writes(), 1);
    }

    #[test]
    fn failing_line_rejects_writes() {
        let probe = MockLine::new();
        let mut line = probe.clone();
        probe.set_failing(true);

        assert_eq!(line.set_high(), Err(MockLineError));
        assert!(!probe.is_high());
        assert_eq!(probe.writes(), 0);
    }

    #[test]
    fn journal_records_across_lines() {
        let journal = LineJournal::new();
        let mut a = MockLine::new().with_journal("a", &journal);
        let mut b = MockLine::new().with_journal("b", &journal);

        b.set_high().unwrap();
        a.set_low().unwrap();

        assert_eq!(
            journal.entries(),
            vec![("b".to_string(), true), ("a".to_string(), false)]
        );
    }

    #[test]
    fn provider_requires_init() {
        let mut provider = MockLineProvider::new().with_line("x", MockLine::new());
        assert!(provider.claim("x").is_err());

        provider.init().unwrap();
        assert!(provider.is_initialized());
        assert!(provider.claim("x").unwrap().is_some());
    }

    #[test]
    fn unavailable_line_errors_on_claim() {
        let mut provider = MockLineProvider::new()
            .with_line("x", MockLine::new())
            .with_unavailable_line("x", "busy");
        provider.init().unwrap();

        assert_eq!(
            provider.claim("x").unwrap_err(),
            ConfigError::LineUnavailable {
                name: "x".into(),
                reason: "busy".into(),
            }
        );
    }

    #[test]
    fn provider_init_failure() {
        let mut provider = MockLineProvider::new().with_init_failure("boom");
        assert_eq!(
            provider.init(),
            Err(ConfigError::PlatformInit("boom".into()))
        );
        assert!(!provider.is_initialized());
    }
}
