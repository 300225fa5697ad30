//! # rs-doorman
//!
//! A stepper-driven door latch controller with an authenticated web API
//! and persisted configuration.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for the stepper, the door-position
//!   captor, status LEDs, storage, and timing
//! - **Latch state machine**: open/close commands, captor fusion, and an
//!   auto-close safety timer with a busy-window guarantee (at most one
//!   traversal in flight)
//! - **Authenticated commands**: fixed-width key table checked with a
//!   constant-structure scan; `status` stays unauthenticated
//! - **Persisted configuration**: one fixed-layout record (Wi-Fi
//!   credentials, user table, motor tuning) with magic-marker recovery
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware, storage, and network abstractions
//! - `motor` - Coil sequencing for the 4-phase unipolar stepper
//! - `captor` - Debounced door-position sensing
//! - `door` - The latch state machine
//! - `auth` / `store` / `config` - Credentials and persisted configuration
//! - `dispatch` - Authentication and response-code mapping
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//! - `services` - Axum web API (feature `web`)
//!
//! ## Example
//!
//! ```rust
//! use rs_doorman::{
//!     CommandDispatcher, ConfigStore, DoorController, DoorPhase, DoorRequest,
//!     hal::{MockStepper, MockStorage},
//! };
//!
//! // Boot: load (or recover) the configuration
//! let mut store = ConfigStore::new(MockStorage::blank());
//! store.load().unwrap();
//! store.add_user("ABCDEFGHIJKLMNOPQRST", "alice").unwrap();
//!
//! // Wire the state machine to the (mock) hardware
//! let door = DoorController::new(MockStepper::new(), store.config().motor, false);
//! let mut dispatcher = CommandDispatcher::new(door, store);
//!
//! // A request with a valid key retracts the latch
//! let reply = dispatcher
//!     .dispatch(&DoorRequest::Open, Some("ABCDEFGHIJKLMNOPQRST"), 0)
//!     .unwrap();
//! assert_eq!(reply.status_code(), 200);
//! assert_eq!(dispatcher.status(0).phase, DoorPhase::LatchOpen);
//!
//! // The tick loop re-engages the latch after the safety delay
//! dispatcher.tick(rs_doorman::door::TIME_MS_BEFORE_CLOSING_LATCH, None).unwrap();
//! assert_eq!(
//!     dispatcher.status(rs_doorman::door::TIME_MS_BEFORE_CLOSING_LATCH).phase,
//!     DoorPhase::Closing,
//! );
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Credential checking against the configured user table.
pub mod auth;
/// Debounced door-position sensing.
pub mod captor;
/// Command kinds, capability requirements, and outcomes.
pub mod commands;
/// Device configuration types and validation.
pub mod config;
/// Command dispatch: authentication, invocation, response mapping.
pub mod dispatch;
/// The door/latch state machine.
pub mod door;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Request payload types for the `configure` command.
pub mod messages;
/// Coil sequencing for the 4-phase unipolar stepper.
pub mod motor;
/// Persisted configuration record and validated mutations.
pub mod store;
/// Core traits for hardware, storage, and network abstraction.
pub mod traits;

/// Network services for the HTTP command endpoint (feature-gated).
#[cfg(any(feature = "web", feature = "esp32-http"))]
pub mod services;

// Re-exports for convenience
pub use auth::AuthGate;
pub use captor::{CaptorMonitor, CAPTOR_DEBOUNCE_MS};
pub use commands::{CommandKind, DoorOutcome, RejectReason};
pub use config::{
    DeviceConfig, FixedStr, MotorConfig, UserCredential, ValidationError, KEY_SIZE,
    MAX_WIFI_PASS_SIZE, MAX_WIFI_SSID_SIZE, NB_USERS, USERNAME_SIZE,
};
pub use dispatch::{CommandDispatcher, DispatchError, Dispatched, DoorRequest};
pub use door::{DoorController, DoorPhase, DoorStatus, TIME_MS_BEFORE_CLOSING_LATCH};
pub use messages::{AddUserRequest, ConfigureRequest, MotorRequest, RemoveUserRequest, WifiRequest};
pub use motor::{traversal_ms, StepperDriver, MOTOR_STEPS};
pub use store::{ConfigStore, StorageError, MAGIC_NUMBER, RECORD_SIZE};
pub use traits::{
    // Hardware
    CaptorInput,
    Clock,
    ConfigStorage,
    Delay,
    // Network
    HttpMethod,
    HttpRequest,
    HttpResponse,
    HttpServer,
    PhaseOutput,
    SpinDirection,
    StatusLed,
    StepperMotor,
};

// Parsing function re-exports (serde-json-core based)
#[cfg(feature = "serde-json-core")]
pub use messages::parse_configure_request;
