//! Command dispatch: authentication, invocation, response mapping.
//!
//! [`CommandDispatcher`] is the seam between the network transports and
//! the control core. It is the only layer that translates internal
//! results (door outcomes, validation failures, storage errors) into
//! user-visible responses:
//!
//! | Result | HTTP status |
//! |--------|-------------|
//! | success + state snapshot | 200 |
//! | missing/unknown credential | 401 |
//! | busy or invalid state | 409 |
//! | malformed/invalid payload | 400 |
//! | motor or storage failure | 500 |
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::dispatch::{CommandDispatcher, DoorRequest};
//! use rs_doorman::door::DoorController;
//! use rs_doorman::hal::{MockStepper, MockStorage};
//! use rs_doorman::store::ConfigStore;
//!
//! let mut store = ConfigStore::new(MockStorage::blank());
//! store.load().unwrap();
//! store.add_user("ABCDEFGHIJKLMNOPQRST", "alice").unwrap();
//!
//! let door = DoorController::new(MockStepper::new(), store.config().motor, false);
//! let mut dispatcher = CommandDispatcher::new(door, store);
//!
//! // Unauthenticated open is refused before the door is touched
//! let reply = dispatcher.dispatch(&DoorRequest::Open, None, 0).unwrap();
//! assert_eq!(reply.status_code(), 401);
//!
//! let reply = dispatcher
//!     .dispatch(&DoorRequest::Open, Some("ABCDEFGHIJKLMNOPQRST"), 0)
//!     .unwrap();
//! assert_eq!(reply.status_code(), 200);
//! ```

use crate::auth::AuthGate;
use crate::commands::{CommandKind, DoorOutcome, RejectReason};
use crate::config::{MotorConfig, ValidationError};
use crate::door::{DoorController, DoorStatus};
use crate::messages::ConfigureRequest;
use crate::store::{ConfigStore, StorageError};
use crate::traits::{ConfigStorage, SpinDirection, StepperMotor};

/// A decoded inbound request.
#[derive(Clone, Debug, PartialEq)]
pub enum DoorRequest {
    /// Retract the latch.
    Open,
    /// Re-engage the latch early.
    Close,
    /// Report the door state.
    Status,
    /// Apply configuration operations.
    Configure(ConfigureRequest),
}

impl DoorRequest {
    /// The command kind, for capability lookup.
    pub fn kind(&self) -> CommandKind {
        match self {
            DoorRequest::Open => CommandKind::Open,
            DoorRequest::Close => CommandKind::Close,
            DoorRequest::Status => CommandKind::Status,
            DoorRequest::Configure(_) => CommandKind::Configure,
        }
    }
}

/// A user-visible reply, short of transport encoding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Dispatched {
    /// The command was carried out; `result` names what happened.
    Ok {
        /// Machine-readable result tag ("opened", "already_open",
        /// "closing", "status", "configured").
        result: &'static str,
        /// State snapshot taken after the command.
        status: DoorStatus,
    },
    /// Missing or unknown credential; the door was not touched.
    Unauthorized,
    /// The door refused the command in its current state.
    Rejected {
        /// Busy or invalid-state.
        reason: RejectReason,
        /// State snapshot explaining the refusal.
        status: DoorStatus,
    },
    /// The payload failed validation; nothing was persisted
    /// (operations before the failing one may have been).
    Invalid {
        /// What was wrong.
        error: ValidationError,
    },
}

impl Dispatched {
    /// The HTTP status code this reply maps to.
    pub fn status_code(&self) -> u16 {
        match self {
            Dispatched::Ok { .. } => 200,
            Dispatched::Unauthorized => 401,
            Dispatched::Rejected { .. } => 409,
            Dispatched::Invalid { .. } => 400,
        }
    }
}

/// A collaborator failed while executing a command; maps to 500.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DispatchError<ME, SE> {
    /// The motor reported a hardware error mid-command.
    Motor(ME),
    /// The storage write failed; the previous record is intact.
    Storage(SE),
}

/// Authenticates and routes commands into the door controller and the
/// config store.
pub struct CommandDispatcher<M: StepperMotor, S: ConfigStorage> {
    door: DoorController<M>,
    store: ConfigStore<S>,
}

impl<M: StepperMotor, S: ConfigStorage> CommandDispatcher<M, S> {
    /// Creates a dispatcher over a door controller and a loaded store.
    pub fn new(door: DoorController<M>, store: ConfigStore<S>) -> Self {
        Self { door, store }
    }

    /// Authenticate (when the command requires it) and execute.
    pub fn dispatch(
        &mut self,
        request: &DoorRequest,
        credential: Option<&str>,
        now_ms: u64,
    ) -> Result<Dispatched, DispatchError<M::Error, S::Error>> {
        if request.kind().requires_auth() {
            let authorized = credential.is_some_and(|key| {
                AuthGate::new(&self.store.config().users)
                    .authenticate(key)
                    .is_some()
            });
            if !authorized {
                return Ok(Dispatched::Unauthorized);
            }
        }

        match request {
            DoorRequest::Status => Ok(Dispatched::Ok {
                result: "status",
                status: self.door.status(now_ms),
            }),
            DoorRequest::Open => {
                let outcome = self.door.open(now_ms).map_err(DispatchError::Motor)?;
                Ok(self.door_reply(outcome, now_ms))
            }
            DoorRequest::Close => {
                let outcome = self.door.close(now_ms).map_err(DispatchError::Motor)?;
                Ok(self.door_reply(outcome, now_ms))
            }
            DoorRequest::Configure(ops) => self.configure(ops, now_ms),
        }
    }

    /// Advance the door state machine (timers + captor reading).
    pub fn tick(&mut self, now_ms: u64, captor_open: Option<bool>) -> Result<(), M::Error> {
        self.door.tick(now_ms, captor_open)
    }

    /// Current state snapshot.
    pub fn status(&self, now_ms: u64) -> DoorStatus {
        self.door.status(now_ms)
    }

    /// The current configuration.
    pub fn config(&self) -> &crate::config::DeviceConfig {
        self.store.config()
    }

    /// Borrow the door controller (mock inspection in tests).
    pub fn door(&self) -> &DoorController<M> {
        &self.door
    }

    /// Apply configure operations in order: motor, wifi, add, remove.
    ///
    /// The first validation failure stops the sequence; earlier
    /// operations have already been persisted at that point.
    fn configure(
        &mut self,
        ops: &ConfigureRequest,
        now_ms: u64,
    ) -> Result<Dispatched, DispatchError<M::Error, S::Error>> {
        if ops.is_empty() {
            return Ok(Dispatched::Invalid {
                error: ValidationError::EmptyPayload,
            });
        }

        if let Some(motor) = &ops.motor {
            let Some(direction) = SpinDirection::from_i32(motor.direction) else {
                return Ok(Dispatched::Invalid {
                    error: ValidationError::DirectionOutOfRange,
                });
            };
            let tuning = MotorConfig {
                speed_rpm: motor.speed_rpm,
                direction,
                span: motor.span,
            };
            match self.store.set_motor_config(tuning) {
                Ok(()) => self.door.set_motor_config(tuning),
                Err(e) => return Ok(self.store_reply(e)?),
            }
        }

        if let Some(wifi) = &ops.wifi {
            if let Err(e) = self.store.set_wifi(&wifi.ssid, &wifi.password) {
                return Ok(self.store_reply(e)?);
            }
        }

        if let Some(add) = &ops.add_user {
            if let Err(e) = self.store.add_user(&add.key, &add.username) {
                return Ok(self.store_reply(e)?);
            }
        }

        if let Some(remove) = &ops.remove_user {
            if let Err(e) = self.store.remove_user(&remove.key) {
                return Ok(self.store_reply(e)?);
            }
        }

        Ok(Dispatched::Ok {
            result: "configured",
            status: self.door.status(now_ms),
        })
    }

    fn door_reply(&self, outcome: DoorOutcome, now_ms: u64) -> Dispatched {
        let status = self.door.status(now_ms);
        match outcome {
            DoorOutcome::Opened => Dispatched::Ok {
                result: "opened",
                status,
            },
            DoorOutcome::AlreadyOpen => Dispatched::Ok {
                result: "already_open",
                status,
            },
            DoorOutcome::CloseStarted => Dispatched::Ok {
                result: "closing",
                status,
            },
            DoorOutcome::Rejected { reason } => Dispatched::Rejected { reason, status },
        }
    }

    fn store_reply(
        &self,
        err: StorageError<S::Error>,
    ) -> Result<Dispatched, DispatchError<M::Error, S::Error>> {
        match err {
            StorageError::Validation(error) => Ok(Dispatched::Invalid { error }),
            StorageError::Io(e) => Err(DispatchError::Storage(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::DoorPhase;
    use crate::hal::{MockStepper, MockStorage};
    use crate::messages::{AddUserRequest, MotorRequest, RemoveUserRequest};
    use crate::motor::traversal_ms;

    const ALICE_KEY: &str = "ABCDEFGHIJKLMNOPQRST";

    fn dispatcher() -> CommandDispatcher<MockStepper, MockStorage> {
        let mut store = ConfigStore::new(MockStorage::blank());
        store.load().unwrap();
        store.add_user(ALICE_KEY, "alice").unwrap();
        let door = DoorController::new(MockStepper::new(), store.config().motor, false);
        CommandDispatcher::new(door, store)
    }

    fn hstr<const N: usize>(s: &str) -> heapless::String<N> {
        let mut h = heapless::String::new();
        h.push_str(s).unwrap();
        h
    }

    // =========================================================================
    // Capability / auth tests
    // =========================================================================

    #[test]
    fn status_needs_no_credential() {
        let mut d = dispatcher();
        let reply = d.dispatch(&DoorRequest::Status, None, 0).unwrap();
        assert_eq!(reply.status_code(), 200);
        assert!(matches!(reply, Dispatched::Ok { result: "status", .. }));
    }

    #[test]
    fn open_without_credential_is_unauthorized() {
        let mut d = dispatcher();
        let reply = d.dispatch(&DoorRequest::Open, None, 0).unwrap();
        assert_eq!(reply, Dispatched::Unauthorized);
        assert!(d.door().motor().actuations.is_empty());
    }

    #[test]
    fn open_with_wrong_credential_is_unauthorized() {
        let mut d = dispatcher();
        let reply = d
            .dispatch(&DoorRequest::Open, Some("wrongkey000000000000"), 0)
            .unwrap();
        assert_eq!(reply, Dispatched::Unauthorized);
        assert!(d.door().motor().actuations.is_empty());
    }

    #[test]
    fn open_with_valid_credential_actuates() {
        let mut d = dispatcher();
        let reply = d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();
        assert!(matches!(reply, Dispatched::Ok { result: "opened", .. }));
        assert_eq!(d.door().motor().actuations.len(), 1);
        assert_eq!(d.status(0).phase, DoorPhase::LatchOpen);
    }

    // =========================================================================
    // Response code mapping
    // =========================================================================

    #[test]
    fn second_open_maps_to_200_already_open() {
        let mut d = dispatcher();
        d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();
        let reply = d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 10).unwrap();
        assert_eq!(reply.status_code(), 200);
        assert!(matches!(
            reply,
            Dispatched::Ok {
                result: "already_open",
                ..
            }
        ));
    }

    #[test]
    fn close_while_opening_maps_to_409() {
        let mut d = dispatcher();
        d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();
        let reply = d.dispatch(&DoorRequest::Close, Some(ALICE_KEY), 1).unwrap();
        assert_eq!(reply.status_code(), 409);
        assert!(matches!(
            reply,
            Dispatched::Rejected {
                reason: RejectReason::Busy,
                ..
            }
        ));
    }

    #[test]
    fn close_while_closed_maps_to_409() {
        let mut d = dispatcher();
        let reply = d.dispatch(&DoorRequest::Close, Some(ALICE_KEY), 0).unwrap();
        assert_eq!(reply.status_code(), 409);
        assert!(matches!(
            reply,
            Dispatched::Rejected {
                reason: RejectReason::InvalidState,
                ..
            }
        ));
    }

    #[test]
    fn close_after_traversal_succeeds() {
        let mut d = dispatcher();
        d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();
        let t = traversal_ms(1000, 10);
        let reply = d.dispatch(&DoorRequest::Close, Some(ALICE_KEY), t).unwrap();
        assert!(matches!(reply, Dispatched::Ok { result: "closing", .. }));
    }

    // =========================================================================
    // Configure tests
    // =========================================================================

    #[test]
    fn configure_motor_updates_store_and_door() {
        let mut d = dispatcher();
        let ops = ConfigureRequest {
            motor: Some(MotorRequest {
                speed_rpm: 20,
                direction: -1,
                span: 500,
            }),
            ..Default::default()
        };
        let reply = d
            .dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap();
        assert_eq!(reply.status_code(), 200);

        assert_eq!(d.config().motor.speed_rpm, 20);
        assert_eq!(d.config().motor.span, 500);
        assert_eq!(d.door().motor_config().span, 500);

        // Next open uses the new tuning
        d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();
        assert_eq!(
            d.door().motor().actuations[0],
            (SpinDirection::Reverse, 500, 20)
        );
    }

    #[test]
    fn configure_rejects_invalid_direction() {
        let mut d = dispatcher();
        let ops = ConfigureRequest {
            motor: Some(MotorRequest {
                speed_rpm: 10,
                direction: 0,
                span: 1000,
            }),
            ..Default::default()
        };
        let reply = d
            .dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap();
        assert_eq!(reply.status_code(), 400);
        assert_eq!(
            reply,
            Dispatched::Invalid {
                error: ValidationError::DirectionOutOfRange
            }
        );
    }

    #[test]
    fn configure_rejects_zero_speed() {
        let mut d = dispatcher();
        let ops = ConfigureRequest {
            motor: Some(MotorRequest {
                speed_rpm: 0,
                direction: 1,
                span: 1000,
            }),
            ..Default::default()
        };
        let reply = d
            .dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap();
        assert_eq!(
            reply,
            Dispatched::Invalid {
                error: ValidationError::SpeedOutOfRange
            }
        );
        // Tuning unchanged
        assert_eq!(d.config().motor.speed_rpm, 10);
    }

    #[test]
    fn configure_empty_payload_is_invalid() {
        let mut d = dispatcher();
        let reply = d
            .dispatch(
                &DoorRequest::Configure(ConfigureRequest::default()),
                Some(ALICE_KEY),
                0,
            )
            .unwrap();
        assert_eq!(reply.status_code(), 400);
    }

    #[test]
    fn configure_adds_and_removes_users() {
        let mut d = dispatcher();
        let ops = ConfigureRequest {
            add_user: Some(AddUserRequest {
                key: hstr("bob-key-000000000000"),
                username: hstr("bob"),
            }),
            ..Default::default()
        };
        d.dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap();
        assert_eq!(d.config().user_count(), 2);

        // Bob can now open the door
        let reply = d
            .dispatch(&DoorRequest::Open, Some("bob-key-000000000000"), 0)
            .unwrap();
        assert_eq!(reply.status_code(), 200);

        let ops = ConfigureRequest {
            remove_user: Some(RemoveUserRequest {
                key: hstr("bob-key-000000000000"),
            }),
            ..Default::default()
        };
        d.dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap();
        assert_eq!(d.config().user_count(), 1);

        let reply = d
            .dispatch(&DoorRequest::Open, Some("bob-key-000000000000"), 10)
            .unwrap();
        assert_eq!(reply, Dispatched::Unauthorized);
    }

    #[test]
    fn configure_storage_failure_maps_to_error() {
        // Storage gives out after the boot write and the first add_user
        let mut store = ConfigStore::new(MockStorage::blank().failing_after(2));
        store.load().unwrap();
        store.add_user(ALICE_KEY, "alice").unwrap();
        let door = DoorController::new(MockStepper::new(), store.config().motor, false);
        let mut d = CommandDispatcher::new(door, store);

        let ops = ConfigureRequest {
            add_user: Some(AddUserRequest {
                key: hstr("bob-key-000000000000"),
                username: hstr("bob"),
            }),
            ..Default::default()
        };
        let err = d
            .dispatch(&DoorRequest::Configure(ops), Some(ALICE_KEY), 0)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Storage(())));
        assert_eq!(d.config().user_count(), 1);
    }

    // =========================================================================
    // Tick passthrough
    // =========================================================================

    #[test]
    fn tick_drives_auto_close_through_dispatcher() {
        let mut d = dispatcher();
        d.dispatch(&DoorRequest::Open, Some(ALICE_KEY), 0).unwrap();

        d.tick(crate::door::TIME_MS_BEFORE_CLOSING_LATCH, None)
            .unwrap();
        assert_eq!(
            d.status(crate::door::TIME_MS_BEFORE_CLOSING_LATCH).phase,
            DoorPhase::Closing
        );
        assert_eq!(d.door().motor().actuations.len(), 2);
    }
}
