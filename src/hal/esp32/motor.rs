//! Coil lines for a ULN2003-driven unipolar stepper (28BYJ-48 class).
//!
//! The four GPIO lines feed the ULN2003 darlington array inputs IN1..IN4;
//! the step sequencing itself lives in [`crate::motor::StepperDriver`].
//! This module only mirrors one coil pattern onto the pins.
//!
//! # Wiring
//!
//! - GPIO14 -> IN1
//! - GPIO12 -> IN2
//! - GPIO13 -> IN3
//! - GPIO15 -> IN4
//!
//! # Example
//!
//! ```ignore
//! use rs_doorman::hal::esp32::{Esp32Delay, Esp32Phases};
//! use rs_doorman::motor::StepperDriver;
//!
//! let peripherals = Peripherals::take()?;
//! let phases = Esp32Phases::new(
//!     peripherals.pins.gpio14.downgrade_output(),
//!     peripherals.pins.gpio12.downgrade_output(),
//!     peripherals.pins.gpio13.downgrade_output(),
//!     peripherals.pins.gpio15.downgrade_output(),
//! )?;
//! let motor = StepperDriver::new(phases, Esp32Delay::new());
//! ```

use crate::traits::PhaseOutput;
use esp_idf_hal::gpio::{AnyOutputPin, Output, PinDriver};
use esp_idf_hal::sys::EspError;

/// The four coil lines behind a ULN2003 driver board.
pub struct Esp32Phases<'d> {
    in1: PinDriver<'d, AnyOutputPin, Output>,
    in2: PinDriver<'d, AnyOutputPin, Output>,
    in3: PinDriver<'d, AnyOutputPin, Output>,
    in4: PinDriver<'d, AnyOutputPin, Output>,
}

impl<'d> Esp32Phases<'d> {
    /// Takes ownership of the four coil pins, all driven low initially
    /// (coils de-energized).
    pub fn new(
        in1: AnyOutputPin,
        in2: AnyOutputPin,
        in3: AnyOutputPin,
        in4: AnyOutputPin,
    ) -> Result<Self, EspError> {
        let mut phases = Self {
            in1: PinDriver::output(in1)?,
            in2: PinDriver::output(in2)?,
            in3: PinDriver::output(in3)?,
            in4: PinDriver::output(in4)?,
        };
        phases.set_phases([false, false, false, false])?;
        Ok(phases)
    }
}

impl PhaseOutput for Esp32Phases<'_> {
    type Error = EspError;

    fn set_phases(&mut self, pattern: [bool; 4]) -> Result<(), EspError> {
        self.in1.set_level(pattern[0].into())?;
        self.in2.set_level(pattern[1].into())?;
        self.in3.set_level(pattern[2].into())?;
        self.in4.set_level(pattern[3].into())?;
        Ok(())
    }
}
