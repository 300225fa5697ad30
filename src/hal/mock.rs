//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and storage traits,
//! enabling development and testing on desktop without a physical device.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockStepper`] | [`StepperMotor`] | Records actuations, optional failure |
//! | [`MockPhases`] | [`PhaseOutput`] | Captures coil patterns |
//! | [`MockCaptor`] | [`CaptorInput`] | Scriptable raw level |
//! | [`MockStorage`] | [`ConfigStorage`] | In-memory record, failure injection |
//! | [`MockClock`] | [`Clock`] | Controllable time source |
//! | [`MockDelay`] | [`Delay`] | Accumulates requested waits |
//! | [`MockLed`] | [`StatusLed`] | Tracks on/off changes |
//! | [`MockHttp`] | [`HttpServer`] | Queued request/response |
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::config::MotorConfig;
//! use rs_doorman::door::DoorController;
//! use rs_doorman::hal::MockStepper;
//!
//! let mut door = DoorController::new(MockStepper::new(), MotorConfig::default(), false);
//! door.open(0).unwrap();
//! assert_eq!(door.motor().actuations.len(), 1);
//! ```
//!
//! [`StepperMotor`]: crate::traits::StepperMotor
//! [`PhaseOutput`]: crate::traits::PhaseOutput
//! [`CaptorInput`]: crate::traits::CaptorInput
//! [`ConfigStorage`]: crate::traits::ConfigStorage
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay
//! [`StatusLed`]: crate::traits::StatusLed
//! [`HttpServer`]: crate::traits::HttpServer

use crate::store::RECORD_SIZE;
use crate::traits::{
    CaptorInput, Clock, ConfigStorage, Delay, HttpRequest, HttpResponse, HttpServer, PhaseOutput,
    SpinDirection, StatusLed, StepperMotor,
};

extern crate alloc;
use alloc::vec::Vec;

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock stepper for testing.
///
/// Records every actuation for verification and can simulate a hardware
/// failure.
///
/// # Example
///
/// ```rust
/// use rs_doorman::hal::MockStepper;
/// use rs_doorman::traits::{SpinDirection, StepperMotor};
///
/// let mut motor = MockStepper::new();
/// motor.actuate(SpinDirection::Forward, 1000, 10).unwrap();
/// assert_eq!(motor.actuations, vec![(SpinDirection::Forward, 1000, 10)]);
///
/// let mut broken = MockStepper::failing();
/// assert!(broken.actuate(SpinDirection::Forward, 1, 10).is_err());
/// ```
#[derive(Debug, Default)]
pub struct MockStepper {
    /// Every actuation as (direction, steps, speed_rpm).
    pub actuations: Vec<(SpinDirection, u32, u32)>,
    /// When true, every actuation fails.
    pub fail: bool,
}

impl MockStepper {
    /// Creates a working mock stepper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock stepper whose actuations always fail.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

impl StepperMotor for MockStepper {
    type Error = ();

    fn actuate(
        &mut self,
        direction: SpinDirection,
        steps: u32,
        speed_rpm: u32,
    ) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.actuations.push((direction, steps, speed_rpm));
        Ok(())
    }
}

/// Mock coil lines capturing every pattern the sequencer emits.
#[derive(Debug, Default)]
pub struct MockPhases {
    /// Patterns in emission order (IN1..IN4).
    pub patterns: Vec<[bool; 4]>,
}

impl MockPhases {
    /// Creates mock phase lines.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PhaseOutput for MockPhases {
    type Error = ();

    fn set_phases(&mut self, pattern: [bool; 4]) -> Result<(), ()> {
        self.patterns.push(pattern);
        Ok(())
    }
}

/// Mock captor line with a scriptable level.
///
/// # Example
///
/// ```rust
/// use rs_doorman::hal::MockCaptor;
/// use rs_doorman::traits::CaptorInput;
///
/// let mut captor = MockCaptor::reading(true);
/// assert!(captor.is_high().unwrap());
/// captor.set_level(false);
/// assert!(!captor.is_high().unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MockCaptor {
    level: bool,
}

impl MockCaptor {
    /// Creates a captor currently reading `level`.
    pub fn reading(level: bool) -> Self {
        Self { level }
    }

    /// Script the raw line level.
    pub fn set_level(&mut self, level: bool) {
        self.level = level;
    }
}

impl CaptorInput for MockCaptor {
    type Error = ();

    fn is_high(&mut self) -> Result<bool, ()> {
        Ok(self.level)
    }
}

/// Mock clock for testing.
///
/// Provides a controllable time source for testing time-dependent behavior.
///
/// # Example
///
/// ```rust
/// use rs_doorman::hal::MockClock;
/// use rs_doorman::traits::Clock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.set(1000);
/// assert_eq!(clock.now_ms(), 1000);
///
/// clock.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: u64,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&mut self, ms: u64) {
        self.current_ms = ms;
    }

    /// Advances the clock by the given duration.
    pub fn advance(&mut self, ms: u64) {
        self.current_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms
    }
}

/// Mock delay accumulating requested waits instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Sum of all requested delays in microseconds.
    pub total_us: u64,
}

impl MockDelay {
    /// Creates a mock delay source.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Delay for MockDelay {
    fn delay_us(&mut self, us: u32) {
        self.total_us += us as u64;
    }
}

/// Mock status LED tracking its level and the number of changes.
#[derive(Debug, Default)]
pub struct MockLed {
    /// Current level.
    pub on: bool,
    /// Number of `set` calls.
    pub changes: usize,
}

impl MockLed {
    /// Creates a mock LED, initially off.
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatusLed for MockLed {
    type Error = ();

    fn set(&mut self, on: bool) -> Result<(), ()> {
        self.on = on;
        self.changes += 1;
        Ok(())
    }
}

// ============================================================================
// Storage Mock
// ============================================================================

/// Mock record storage for testing.
///
/// Holds the configuration record in memory. Fresh storage reads as all
/// zeroes, which fails the magic-marker check exactly like erased flash.
/// Failures can be injected immediately or after a number of successful
/// writes.
///
/// # Example
///
/// ```rust
/// use rs_doorman::hal::MockStorage;
/// use rs_doorman::store::ConfigStore;
///
/// let mut store = ConfigStore::new(MockStorage::blank());
/// // Blank storage recovers to defaults
/// let config = store.load().unwrap();
/// assert_eq!(config.user_count(), 0);
/// ```
#[derive(Debug)]
pub struct MockStorage {
    /// The stored record bytes.
    pub record: Vec<u8>,
    /// Number of successful writes.
    pub writes: usize,
    /// When true, every write fails.
    pub fail_writes: bool,
    /// When set, writes fail once `writes` reaches this count.
    pub fail_after: Option<usize>,
}

impl MockStorage {
    /// Creates never-written storage (all zeroes).
    pub fn blank() -> Self {
        Self {
            record: alloc::vec![0u8; RECORD_SIZE],
            writes: 0,
            fail_writes: false,
            fail_after: None,
        }
    }

    /// Creates storage already holding `record`.
    pub fn with_record(record: &[u8]) -> Self {
        Self {
            record: record.to_vec(),
            ..Self::blank()
        }
    }

    /// Makes writes fail after `n` successful ones.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

impl ConfigStorage for MockStorage {
    type Error = ();

    fn read_record(&mut self, buf: &mut [u8]) -> Result<(), ()> {
        let len = buf.len().min(self.record.len());
        buf[..len].copy_from_slice(&self.record[..len]);
        Ok(())
    }

    fn write_record(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes || self.fail_after.is_some_and(|n| self.writes >= n) {
            return Err(());
        }
        self.record.clear();
        self.record.extend_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Network Mock
// ============================================================================

/// Mock HTTP server for testing.
///
/// Allows queuing requests and inspecting sent responses.
///
/// # Example
///
/// ```rust
/// use rs_doorman::hal::MockHttp;
/// use rs_doorman::traits::{HttpMethod, HttpRequest};
///
/// let mut http = MockHttp::new();
/// http.queue_request(HttpRequest {
///     method: HttpMethod::Get,
///     path: "/status".into(),
///     api_key: None,
///     body: None,
/// });
/// assert_eq!(http.requests.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockHttp {
    /// Queue of requests to be returned by `recv_request()`.
    pub requests: Vec<HttpRequest>,
    /// Responses that have been sent.
    pub responses: Vec<HttpResponse>,
}

impl MockHttp {
    /// Creates a new mock HTTP server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request to be returned.
    pub fn queue_request(&mut self, request: HttpRequest) {
        self.requests.push(request);
    }
}

impl HttpServer for MockHttp {
    type Error = ();

    async fn recv_request(&mut self) -> Option<HttpRequest> {
        if self.requests.is_empty() {
            None
        } else {
            Some(self.requests.remove(0))
        }
    }

    async fn send_response(&mut self, response: HttpResponse) -> Result<(), ()> {
        self.responses.push(response);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
