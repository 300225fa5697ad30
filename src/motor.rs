//! Coil-sequencing driver for the 4-phase unipolar latch stepper.
//!
//! [`StepperDriver`] turns a step count into the classic four-pattern
//! full-step sequence, paced by a blocking microsecond delay derived from
//! the configured rpm. It implements [`StepperMotor`], the trait the door
//! controller actuates through, so tests can swap in
//! [`crate::hal::MockStepper`] instead.
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::motor::StepperDriver;
//! use rs_doorman::hal::{MockDelay, MockPhases};
//! use rs_doorman::traits::{SpinDirection, StepperMotor};
//!
//! let mut driver = StepperDriver::new(MockPhases::new(), MockDelay::new());
//! driver.actuate(SpinDirection::Forward, 4, 10).unwrap();
//! assert_eq!(driver.position(), 4);
//! ```

use crate::traits::{Delay, PhaseOutput, SpinDirection, StepperMotor};

/// Steps per full revolution of the geared latch stepper.
pub const MOTOR_STEPS: u32 = 2048;

/// Full-step energization sequence, one pattern per step position.
///
/// Walking the table forward spins one way, backward the other; the coil
/// lines are IN1..IN4.
const STEP_SEQUENCE: [[bool; 4]; 4] = [
    [true, false, true, false],
    [false, true, true, false],
    [false, true, false, true],
    [true, false, false, true],
];

/// Wall-clock duration of a traversal in milliseconds.
///
/// The door controller uses this to size its busy window; the driver
/// spends the same time stepping.
///
/// # Examples
///
/// ```
/// use rs_doorman::motor::traversal_ms;
///
/// // 1000 steps at 10 rpm on a 2048-step motor
/// assert_eq!(traversal_ms(1000, 10), 2929);
/// assert_eq!(traversal_ms(0, 10), 0);
/// ```
pub fn traversal_ms(steps: u32, speed_rpm: u32) -> u64 {
    if steps == 0 || speed_rpm == 0 {
        return 0;
    }
    (steps as u64 * 60_000) / (MOTOR_STEPS as u64 * speed_rpm as u64)
}

/// Per-step delay in microseconds for the given rpm.
fn step_delay_us(speed_rpm: u32) -> u32 {
    (60_000_000 / (MOTOR_STEPS as u64 * speed_rpm as u64)) as u32
}

/// Driver for a 4-phase unipolar stepper behind four GPIO lines.
///
/// Tracks the logical step position so that a traversal followed by an
/// equal traversal in the inverted direction lands back on the starting
/// coil pattern - the round-trip the latch mechanism depends on.
///
/// Actuation blocks the calling context for the full traversal; this is
/// the accepted trade-off of the single-loop controller.
pub struct StepperDriver<P: PhaseOutput, D: Delay> {
    phases: P,
    delay: D,
    /// Logical position in steps; the active pattern is `position mod 4`.
    position: i64,
}

impl<P: PhaseOutput, D: Delay> StepperDriver<P, D> {
    /// Creates a driver over the given phase lines and delay source.
    pub fn new(phases: P, delay: D) -> Self {
        Self {
            phases,
            delay,
            position: 0,
        }
    }

    /// Returns the logical position in steps since construction.
    #[inline]
    pub fn position(&self) -> i64 {
        self.position
    }

    /// Returns the coil pattern for the current position.
    pub fn current_pattern(&self) -> [bool; 4] {
        STEP_SEQUENCE[self.position.rem_euclid(4) as usize]
    }

    /// Consumes the driver, returning the phase lines.
    pub fn release(self) -> P {
        self.phases
    }
}

impl<P: PhaseOutput, D: Delay> StepperMotor for StepperDriver<P, D> {
    type Error = P::Error;

    fn actuate(
        &mut self,
        direction: SpinDirection,
        steps: u32,
        speed_rpm: u32,
    ) -> Result<(), Self::Error> {
        if steps == 0 {
            return Ok(());
        }
        let pause = step_delay_us(speed_rpm);
        let sign = direction.as_i32() as i64;
        for _ in 0..steps {
            self.position += sign;
            let pattern = STEP_SEQUENCE[self.position.rem_euclid(4) as usize];
            self.phases.set_phases(pattern)?;
            self.delay.delay_us(pause);
        }
        Ok(())
    }
}
