//! Status LED lines.
//!
//! The board carries two indicator LEDs: red mirrors the latch state,
//! blue blinks as a liveness heartbeat. Both on-board LEDs are wired
//! active-low, which this driver hides.

use crate::traits::StatusLed;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::sys::EspError;

/// One status LED behind a GPIO line.
pub struct Esp32Led<'d> {
    pin: PinDriver<'d, AnyOutputPin, Output>,
    active_low: bool,
}

impl<'d> Esp32Led<'d> {
    /// Takes ownership of the LED pin; `active_low` matches the board
    /// wiring (the on-board LEDs sink current).
    pub fn new(pin: AnyOutputPin, active_low: bool) -> Result<Self, EspError> {
        let mut led = Self {
            pin: PinDriver::output(pin)?,
            active_low,
        };
        led.set(false)?;
        Ok(led)
    }
}

impl StatusLed for Esp32Led<'_> {
    type Error = EspError;

    fn set(&mut self, on: bool) -> Result<(), EspError> {
        let level = on != self.active_low;
        self.pin.set_level(level.into())
    }
}
