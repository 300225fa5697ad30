//! Hardware abstraction traits for the stepper, captor, LEDs, and timing.
//!
//! This module defines the hardware interfaces that allow rs-doorman to
//! work across different platforms (ESP32, desktop mocks, etc.).
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`StepperMotor`] | Latch actuation by a fixed number of steps |
//! | [`PhaseOutput`] | The four coil lines of a unipolar stepper |
//! | [`CaptorInput`] | Raw door-position contact sensor |
//! | [`StatusLed`] | Indicator LED lines |
//! | [`Clock`] | Time source for `no_std` environments |
//! | [`Delay`] | Blocking microsecond delay for step pacing |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).

/// Rotation direction of the latch stepper.
///
/// The configured direction is the one that retracts the latch; the
/// inverted direction re-engages it. Encoded as +1/-1 in the persisted
/// record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpinDirection {
    /// Positive rotation (+1 in the record).
    #[default]
    Forward,
    /// Negative rotation (-1 in the record).
    Reverse,
}

impl SpinDirection {
    /// Returns the opposite rotation.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_doorman::traits::SpinDirection;
    ///
    /// assert_eq!(SpinDirection::Forward.invert(), SpinDirection::Reverse);
    /// assert_eq!(SpinDirection::Reverse.invert(), SpinDirection::Forward);
    /// ```
    #[inline]
    pub const fn invert(self) -> Self {
        match self {
            SpinDirection::Forward => SpinDirection::Reverse,
            SpinDirection::Reverse => SpinDirection::Forward,
        }
    }

    /// Returns the signed unit used in the persisted record.
    #[inline]
    pub const fn as_i32(self) -> i32 {
        match self {
            SpinDirection::Forward => 1,
            SpinDirection::Reverse => -1,
        }
    }

    /// Parse the signed unit from the persisted record.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_doorman::traits::SpinDirection;
    ///
    /// assert_eq!(SpinDirection::from_i32(1), Some(SpinDirection::Forward));
    /// assert_eq!(SpinDirection::from_i32(-1), Some(SpinDirection::Reverse));
    /// assert_eq!(SpinDirection::from_i32(0), None);
    /// ```
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(SpinDirection::Forward),
            -1 => Some(SpinDirection::Reverse),
            _ => None,
        }
    }
}

/// Stepper motor trait - drives the latch by a fixed number of steps.
///
/// Implementations run the full traversal before returning: motion either
/// completes or the device resets. There is no partial or interruptible
/// actuation, so callers gate concurrent requests with a busy window
/// computed from [`crate::motor::traversal_ms`].
///
/// # Implementation Notes
///
/// - `steps == 0` must be a no-op returning `Ok(())`
/// - `speed_rpm` is validated at configuration time; implementations may
///   assume it is positive
/// - A traversal followed by one of equal step count in the inverted
///   direction must return the mechanism to its starting position
pub trait StepperMotor {
    /// Error type for motor operations.
    type Error;

    /// Drive exactly `steps` steps in `direction` at `speed_rpm`.
    fn actuate(
        &mut self,
        direction: SpinDirection,
        steps: u32,
        speed_rpm: u32,
    ) -> Result<(), Self::Error>;
}

/// The four coil-energization lines of a unipolar stepper.
///
/// [`crate::motor::StepperDriver`] translates step counts into a sequence
/// of phase patterns; implementors only mirror one pattern onto the four
/// GPIO lines.
pub trait PhaseOutput {
    /// Error type for pin operations.
    type Error;

    /// Energize the coils matching `pattern` (one flag per line, in
    /// IN1..IN4 order).
    fn set_phases(&mut self, pattern: [bool; 4]) -> Result<(), Self::Error>;
}

/// Raw door-position contact sensor (reed switch).
///
/// Returns the electrical level only; mapping the configured active level
/// to logical "open" and debouncing are done by
/// [`crate::captor::CaptorMonitor`].
pub trait CaptorInput {
    /// Error type for sensor reads.
    type Error;

    /// Returns true if the input line reads high.
    fn is_high(&mut self) -> Result<bool, Self::Error>;
}

/// A status indicator LED line.
pub trait StatusLed {
    /// Error type for pin operations.
    type Error;

    /// Turn the LED on or off.
    fn set(&mut self, on: bool) -> Result<(), Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for debounce and the
/// auto-close timer. On desktop, this can wrap `std::time::Instant`.
/// On embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use rs_doorman::traits::Clock;
/// use rs_doorman::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Blocking microsecond delay used to pace coil steps.
///
/// On ESP32 this wraps the esp-idf busy-wait delay; mocks record the
/// accumulated wait instead of sleeping.
pub trait Delay {
    /// Block for the specified number of microseconds.
    fn delay_us(&mut self, us: u32);
}
