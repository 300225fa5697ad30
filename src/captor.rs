//! Debounced door-position sensing.
//!
//! The captor is a reed contact on the door frame. Its raw level bounces
//! on every open/close, so [`CaptorMonitor`] only reports a change after
//! the new level has held for [`CAPTOR_DEBOUNCE_MS`]. The monitor is a
//! pure query layer: it never touches the door state machine, which
//! copies the debounced reading on each tick.
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::captor::CaptorMonitor;
//! use rs_doorman::hal::MockCaptor;
//!
//! // Active-low reed: low level means the door is open
//! let mut monitor = CaptorMonitor::new(MockCaptor::reading(true), false);
//! assert_eq!(monitor.sample(0).unwrap(), false); // high = closed
//! ```

use crate::traits::CaptorInput;

/// How long a raw level must hold before the reported state flips.
pub const CAPTOR_DEBOUNCE_MS: u64 = 50;

/// Debounce wrapper over the raw captor line.
///
/// `open_level` is the electrical level that means "door open"
/// (the original wiring pulls the line low when the reed closes, so
/// the firmware passes `false`).
pub struct CaptorMonitor<C: CaptorInput> {
    captor: C,
    open_level: bool,
    /// Last debounced (reported) state.
    stable_open: bool,
    /// Raw state seen on the previous sample.
    candidate_open: bool,
    /// When the candidate first differed from the stable state.
    candidate_since_ms: u64,
}

impl<C: CaptorInput> CaptorMonitor<C> {
    /// Creates a monitor over `captor`, treating `open_level` as open.
    ///
    /// The initial reported state is "closed" until a first sample says
    /// otherwise; callers sample once at boot before deriving the initial
    /// door phase.
    pub fn new(captor: C, open_level: bool) -> Self {
        Self {
            captor,
            open_level,
            stable_open: false,
            candidate_open: false,
            candidate_since_ms: 0,
        }
    }

    /// Adopt the current raw level as the stable state.
    ///
    /// Used once at boot to derive the initial door phase; the line has
    /// been idle for the whole power-up, so no hold window is needed.
    pub fn prime(&mut self) -> Result<bool, C::Error> {
        let raw_open = self.captor.is_high()? == self.open_level;
        self.stable_open = raw_open;
        self.candidate_open = raw_open;
        Ok(raw_open)
    }

    /// Samples the raw line and returns the debounced open state.
    ///
    /// A changed raw level must hold for [`CAPTOR_DEBOUNCE_MS`] before the
    /// reported state follows it; a level that reverts within the window
    /// resets it.
    pub fn sample(&mut self, now_ms: u64) -> Result<bool, C::Error> {
        let raw_open = self.captor.is_high()? == self.open_level;

        if raw_open == self.stable_open {
            // In agreement; drop any pending candidate
            self.candidate_open = raw_open;
            return Ok(self.stable_open);
        }

        if raw_open != self.candidate_open {
            // New level, start the hold window
            self.candidate_open = raw_open;
            self.candidate_since_ms = now_ms;
            return Ok(self.stable_open);
        }

        if now_ms.saturating_sub(self.candidate_since_ms) >= CAPTOR_DEBOUNCE_MS {
            self.stable_open = raw_open;
        }
        Ok(self.stable_open)
    }

    /// Returns the last debounced state without sampling.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.stable_open
    }

    /// Borrow the underlying sensor (mock scripting in tests).
    #[inline]
    pub fn captor_mut(&mut self) -> &mut C {
        &mut self.captor
    }
}
