//! ESP32 timing implementations: clock and step-pacing delay.

use crate::traits::{Clock, Delay};

/// ESP32 clock using the hardware timer.
///
/// Provides millisecond-resolution timing using the ESP-IDF
/// `esp_timer_get_time()` function, which returns microseconds since boot.
///
/// # Example
///
/// ```ignore
/// use rs_doorman::hal::esp32::Esp32Clock;
/// use rs_doorman::traits::Clock;
///
/// let clock = Esp32Clock::new();
/// let start = clock.now_ms();
/// // ... do work ...
/// let elapsed = clock.now_ms() - start;
/// ```
#[derive(Clone, Copy)]
pub struct Esp32Clock;

impl Esp32Clock {
    /// Creates a new ESP32 clock instance.
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Default for Esp32Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for Esp32Clock {
    #[inline]
    fn now_ms(&self) -> u64 {
        // esp_timer_get_time returns microseconds since boot
        // Safe: this is a simple read of the hardware timer, no side effects
        let micros = unsafe { esp_idf_hal::sys::esp_timer_get_time() };
        (micros / 1000) as u64
    }
}

/// Blocking delay for coil-step pacing.
///
/// Wraps the esp-idf delay provider, which busy-waits below the FreeRTOS
/// tick and yields above it. At the default 10rpm the ~3ms per-step pause
/// sits right at the tick boundary, so both paths get exercised.
pub struct Esp32Delay {
    inner: esp_idf_hal::delay::Delay,
}

impl Esp32Delay {
    /// Creates a delay source with the default busy-wait threshold.
    pub fn new() -> Self {
        Self {
            inner: esp_idf_hal::delay::Delay::new_default(),
        }
    }
}

impl Default for Esp32Delay {
    fn default() -> Self {
        Self::new()
    }
}

impl Delay for Esp32Delay {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.inner.delay_us(us);
    }
}
