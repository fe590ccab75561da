//! ESP32 output lines using ESP-IDF GPIO drivers.
//!
//! Lines are addressed by their GPIO name, e.g. `GPIO2`. Names are trimmed
//! and case-insensitive.

use std::collections::HashMap;

use esp_idf_hal::gpio::{AnyOutputPin, Output, OutputPin as _, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use tracing::debug;

use super::{normalize_line_name, LINE_NAMES};
use crate::error::ConfigError;
use crate::traits::LineProvider;

/// A push-pull output line on an ESP32 GPIO.
pub type Esp32Line = PinDriver<'static, AnyOutputPin, Output>;

/// [`LineProvider`] over the ESP32-C3 GPIO bank.
///
/// [`init`](LineProvider::init) takes the chip peripherals, so only one
/// provider can be initialised per boot.
///
/// # Example
///
/// ```ignore
/// use pumpctl::hal::esp32::{pins, Esp32Lines};
/// use pumpctl::hal::LineRelay;
///
/// let relay = LineRelay::open(Esp32Lines::new(), pins::VALVE, pins::PUMP)?;
/// ```
#[derive(Default)]
pub struct Esp32Lines {
    pins: HashMap<&'static str, AnyOutputPin>,
    initialized: bool,
}

impl Esp32Lines {
    /// Creates an uninitialised provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineProvider for Esp32Lines {
    type Line = Esp32Line;

    fn init(&mut self) -> Result<(), ConfigError> {
        if self.initialized {
            return Ok(());
        }

        let peripherals =
            Peripherals::take().map_err(|e| ConfigError::PlatformInit(e.to_string()))?;
        let pins = peripherals.pins;

        let outputs = [
            pins.gpio0.downgrade_output(),
            pins.gpio1.downgrade_output(),
            pins.gpio2.downgrade_output(),
            pins.gpio3.downgrade_output(),
            pins.gpio4.downgrade_output(),
            pins.gpio5.downgrade_output(),
            pins.gpio6.downgrade_output(),
            pins.gpio7.downgrade_output(),
            pins.gpio8.downgrade_output(),
            pins.gpio9.downgrade_output(),
            pins.gpio10.downgrade_output(),
            pins.gpio20.downgrade_output(),
            pins.gpio21.downgrade_output(),
        ];
        self.pins = LINE_NAMES.into_iter().zip(outputs).collect();
        self.initialized = true;
        debug!(lines = self.pins.len(), "ESP32 GPIO bank ready");
        Ok(())
    }

    fn claim(&mut self, name: &str) -> Result<Option<Esp32Line>, ConfigError> {
        if !self.initialized {
            return Err(ConfigError::PlatformInit("peripherals not taken".into()));
        }

        let key = normalize_line_name(name);
        let Some(pin) = self.pins.remove(key.as_str()) else {
            return Ok(None);
        };

        PinDriver::output(pin)
            .map(Some)
            .map_err(|e| ConfigError::LineUnavailable {
                name: name.into(),
                reason: e.to_string(),
            })
    }
}
