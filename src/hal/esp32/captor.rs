//! Reed captor input on a pulled-up GPIO.
//!
//! The reed contact shorts the line to ground when the door sits against
//! the frame magnet, so the raw level is high when the door is open and
//! the internal pull-up keeps the line defined while the contact floats.
//! [`crate::captor::CaptorMonitor`] maps the configured active level and
//! debounces.

use crate::traits::CaptorInput;
use esp_idf_hal::gpio::{AnyIOPin, Input, PinDriver, Pull};
use esp_idf_hal::sys::EspError;

/// Door-position reed contact behind a pulled-up input pin.
pub struct Esp32Captor<'d> {
    pin: PinDriver<'d, AnyIOPin, Input>,
}

impl<'d> Esp32Captor<'d> {
    /// Takes ownership of the captor pin and enables its pull-up.
    pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
        let mut pin = PinDriver::input(pin)?;
        pin.set_pull(Pull::Up)?;
        Ok(Self { pin })
    }
}

impl CaptorInput for Esp32Captor<'_> {
    type Error = EspError;

    fn is_high(&mut self) -> Result<bool, EspError> {
        Ok(self.pin.is_high())
    }
}
