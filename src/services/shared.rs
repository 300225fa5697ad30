//! Shared dispatcher state for the network services.
//!
//! [`SharedDoorState`] wraps the single [`CommandDispatcher`] in a mutex
//! with a unified time base so the HTTP handlers and the periodic tick
//! loop drive the same state machine.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_doorman::services::SharedDoorState;
//!
//! let state = Arc::new(SharedDoorState::new(dispatcher));
//!
//! // HTTP handlers dispatch commands
//! let reply = state.dispatch(&DoorRequest::Status, None);
//!
//! // The tick loop advances timers and the captor reading
//! state.with_dispatcher(|d| d.tick(state.now_ms(), Some(door_open)));
//! ```

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::dispatch::{CommandDispatcher, Dispatched, DoorRequest};
use crate::door::DoorStatus;
use crate::traits::{ConfigStorage, StepperMotor};

// ============================================================================
// Provider Trait
// ============================================================================

/// Trait for dispatching commands into the door controller.
///
/// This abstraction lets the shared HTTP endpoint logic
/// ([`crate::services::http_handler`]) work with different state
/// management strategies on different platforms.
pub trait DoorProvider: Send + Sync {
    /// Dispatch a command with the presented credential.
    ///
    /// `Err(())` means a collaborator (motor or storage) failed; the
    /// transport maps it to a 500.
    fn dispatch(&self, request: &DoorRequest, credential: Option<&str>) -> Result<Dispatched, ()>;

    /// Current door state snapshot.
    fn status(&self) -> DoorStatus;

    /// Current timestamp in milliseconds.
    fn now_ms(&self) -> u64;
}

// ============================================================================
// Shared Door State
// ============================================================================

/// Thread-safe wrapper around the command dispatcher.
///
/// # Thread Safety
///
/// A single `Mutex` guards the dispatcher. The 20ms tick loop and the
/// HTTP handlers both take it briefly; with the mock hardware a held
/// lock is microseconds. On real hardware a traversal blocks the lock
/// for its full duration, which is the single-actuation invariant
/// showing through: no other request is serviced while the motor moves.
pub struct SharedDoorState<M: StepperMotor, S: ConfigStorage> {
    dispatcher: Mutex<CommandDispatcher<M, S>>,
    /// Time base shared by every service using this state.
    start_time: Instant,
}

impl<M: StepperMotor, S: ConfigStorage> SharedDoorState<M, S> {
    /// Create new shared state wrapping a dispatcher.
    pub fn new(dispatcher: CommandDispatcher<M, S>) -> Self {
        Self {
            dispatcher: Mutex::new(dispatcher),
            start_time: Instant::now(),
        }
    }

    /// Milliseconds since this state was created.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Access the dispatcher with the lock held.
    ///
    /// The closure pattern prevents accidentally holding the lock across
    /// await points.
    pub fn with_dispatcher<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut CommandDispatcher<M, S>) -> R,
    {
        let mut guard = self.dispatcher.lock().unwrap();
        f(&mut guard)
    }

    /// Get a read-only state snapshot.
    pub fn status(&self) -> DoorStatus {
        let now_ms = self.now_ms();
        let guard = self.dispatcher.lock().unwrap();
        guard.status(now_ms)
    }
}

impl<M, S> DoorProvider for Arc<SharedDoorState<M, S>>
where
    M: StepperMotor + Send + 'static,
    S: ConfigStorage + Send + 'static,
{
    fn dispatch(&self, request: &DoorRequest, credential: Option<&str>) -> Result<Dispatched, ()> {
        let now_ms = self.now_ms();
        self.with_dispatcher(|dispatcher| {
            dispatcher
                .dispatch(request, credential, now_ms)
                .map_err(|_| ())
        })
    }

    fn status(&self) -> DoorStatus {
        SharedDoorState::status(self)
    }

    fn now_ms(&self) -> u64 {
        SharedDoorState::now_ms(self)
    }
}
