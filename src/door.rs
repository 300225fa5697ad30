//! Door state machine: latch actuation, auto-close timer, captor fusion.
//!
//! This module provides [`DoorController`], the central component that
//! owns the door/latch state and decides when the motor moves.
//!
//! # Overview
//!
//! The controller:
//! - Accepts `open`/`close` commands from the dispatcher
//! - Retracts the latch on open and re-engages it after
//!   [`TIME_MS_BEFORE_CLOSING_LATCH`] (or an early `close`)
//! - Folds the debounced captor reading into its status snapshot
//! - Guarantees at most one motor actuation is in flight
//!
//! # Phases
//!
//! ```text
//!             open()                    timer / close()
//!   Closed ----------> LatchOpen ------------------------> Closing
//!     ^                                                       |
//!     +----------------- traversal elapsed -------------------+
//! ```
//!
//! `OpenUnlocked` is entered only at boot when the captor already reads
//! open: the door stands open, the latch was never retracted, and the
//! controller settles to `Closed` once the captor reports the door shut.
//!
//! # Busy window
//!
//! A traversal takes [`crate::motor::traversal_ms`] wall-clock time and
//! the hardware driver blocks for all of it. The controller mirrors that
//! as a `busy_until` marker so that any event loop can poll completion
//! and reject commands that would start a second traversal - there is no
//! cancellation, matching the mechanism.
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::door::{DoorController, DoorPhase, TIME_MS_BEFORE_CLOSING_LATCH};
//! use rs_doorman::config::MotorConfig;
//! use rs_doorman::hal::MockStepper;
//!
//! let mut door = DoorController::new(MockStepper::new(), MotorConfig::default(), false);
//! door.open(0).unwrap();
//! assert_eq!(door.status(0).phase, DoorPhase::LatchOpen);
//!
//! // The safety timer re-engages the latch without a close() call
//! door.tick(TIME_MS_BEFORE_CLOSING_LATCH, None).unwrap();
//! assert_eq!(door.status(TIME_MS_BEFORE_CLOSING_LATCH).phase, DoorPhase::Closing);
//! ```

use crate::commands::{DoorOutcome, RejectReason};
use crate::config::MotorConfig;
use crate::motor::traversal_ms;
use crate::traits::StepperMotor;

/// How long the latch stays retracted before the controller re-engages it.
pub const TIME_MS_BEFORE_CLOSING_LATCH: u64 = 5000;

/// The phase of the door/latch mechanism.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DoorPhase {
    /// Latch engaged, door shut.
    Closed,
    /// Latch retracted; the auto-close timer is running.
    LatchOpen,
    /// Door mechanically free without the latch having been retracted
    /// (boot-time state when the captor already reads open).
    OpenUnlocked,
    /// Latch re-engagement traversal in flight.
    Closing,
}

/// Snapshot of the door state for status reporting.
///
/// # Example
///
/// ```rust
/// use rs_doorman::door::{DoorController, DoorPhase};
/// use rs_doorman::config::MotorConfig;
/// use rs_doorman::hal::MockStepper;
///
/// let door = DoorController::new(MockStepper::new(), MotorConfig::default(), false);
/// let status = door.status(0);
/// assert_eq!(status.phase, DoorPhase::Closed);
/// assert!(!status.door_open);
/// assert!(!status.latch_open);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorStatus {
    /// Current phase of the mechanism.
    pub phase: DoorPhase,
    /// Debounced captor reading: is the door physically open.
    pub door_open: bool,
    /// True while the latch is retracted.
    pub latch_open: bool,
    /// When the latch was last retracted, if it currently is.
    pub latch_opened_at_ms: Option<u64>,
    /// True while a traversal is in flight.
    pub busy: bool,
}

/// The door state machine.
///
/// Owns the only mutable door state in the system. All inputs arrive
/// explicitly: commands through [`open`](Self::open)/[`close`](Self::close),
/// time and the captor reading through [`tick`](Self::tick). Nothing here
/// reads a clock or a pin on its own, which is what makes the machine
/// testable with a synthetic clock.
///
/// # Type Parameter
///
/// - `M`: The stepper implementation ([`StepperMotor`] trait)
pub struct DoorController<M: StepperMotor> {
    motor: M,
    motor_cfg: MotorConfig,
    phase: DoorPhase,
    door_open: bool,
    latch_open: bool,
    latch_opened_at_ms: u64,
    busy_until_ms: u64,
    close_delay_ms: u64,
}

impl<M: StepperMotor> DoorController<M> {
    /// Creates a controller. `initially_open` is the boot-time captor
    /// reading: a door already standing open starts in
    /// [`DoorPhase::OpenUnlocked`], otherwise [`DoorPhase::Closed`].
    pub fn new(motor: M, motor_cfg: MotorConfig, initially_open: bool) -> Self {
        Self {
            motor,
            motor_cfg,
            phase: if initially_open {
                DoorPhase::OpenUnlocked
            } else {
                DoorPhase::Closed
            },
            door_open: initially_open,
            latch_open: false,
            latch_opened_at_ms: 0,
            busy_until_ms: 0,
            close_delay_ms: TIME_MS_BEFORE_CLOSING_LATCH,
        }
    }

    /// Override the auto-close delay (tests use short delays).
    pub fn with_close_delay_ms(mut self, ms: u64) -> Self {
        self.close_delay_ms = ms;
        self
    }

    /// Retract the latch.
    ///
    /// From `Closed` this starts the opening traversal and the auto-close
    /// timer. From `LatchOpen` or `OpenUnlocked` it is an idempotent no-op
    /// reporting [`DoorOutcome::AlreadyOpen`]. While a re-engagement is in
    /// flight the command is rejected `Busy` and must be retried.
    pub fn open(&mut self, now_ms: u64) -> Result<DoorOutcome, M::Error> {
        match self.phase {
            DoorPhase::LatchOpen | DoorPhase::OpenUnlocked => Ok(DoorOutcome::AlreadyOpen),
            DoorPhase::Closing => Ok(DoorOutcome::Rejected {
                reason: RejectReason::Busy,
            }),
            DoorPhase::Closed => {
                if self.is_busy(now_ms) {
                    return Ok(DoorOutcome::Rejected {
                        reason: RejectReason::Busy,
                    });
                }
                self.motor.actuate(
                    self.motor_cfg.direction,
                    self.motor_cfg.span as u32,
                    self.motor_cfg.speed_rpm as u32,
                )?;
                self.latch_open = true;
                self.latch_opened_at_ms = now_ms;
                self.busy_until_ms = now_ms + self.traversal();
                self.phase = DoorPhase::LatchOpen;
                Ok(DoorOutcome::Opened)
            }
        }
    }

    /// Re-engage the latch ahead of the auto-close timer.
    ///
    /// Only meaningful in `LatchOpen`; rejected `Busy` while the opening
    /// traversal is still in flight, `InvalidState` from any other phase.
    pub fn close(&mut self, now_ms: u64) -> Result<DoorOutcome, M::Error> {
        match self.phase {
            DoorPhase::LatchOpen => {
                if self.is_busy(now_ms) {
                    return Ok(DoorOutcome::Rejected {
                        reason: RejectReason::Busy,
                    });
                }
                self.engage_latch(now_ms)?;
                Ok(DoorOutcome::CloseStarted)
            }
            _ => Ok(DoorOutcome::Rejected {
                reason: RejectReason::InvalidState,
            }),
        }
    }

    /// Advance timers and fold in the captor reading.
    ///
    /// Call on every loop iteration; the loop cadence bounds the timer
    /// resolution and must stay well under the close delay. Captor
    /// readings only refine `door_open` - a person pulling the door open
    /// after the latch released is expected, not an error. The single
    /// captor-driven phase change is `OpenUnlocked` settling to `Closed`,
    /// which involves no actuation.
    pub fn tick(&mut self, now_ms: u64, captor_open: Option<bool>) -> Result<(), M::Error> {
        if let Some(open) = captor_open {
            self.door_open = open;
            if self.phase == DoorPhase::OpenUnlocked && !open {
                self.phase = DoorPhase::Closed;
            }
        }

        if self.phase == DoorPhase::Closing && !self.is_busy(now_ms) {
            self.phase = DoorPhase::Closed;
        }

        if self.phase == DoorPhase::LatchOpen
            && !self.is_busy(now_ms)
            && now_ms.saturating_sub(self.latch_opened_at_ms) >= self.close_delay_ms
        {
            self.engage_latch(now_ms)?;
        }
        Ok(())
    }

    /// Returns true while a traversal is in flight.
    #[inline]
    pub fn is_busy(&self, now_ms: u64) -> bool {
        now_ms < self.busy_until_ms
    }

    /// Snapshot for status reporting.
    pub fn status(&self, now_ms: u64) -> DoorStatus {
        DoorStatus {
            phase: self.phase,
            door_open: self.door_open,
            latch_open: self.latch_open,
            latch_opened_at_ms: self.latch_open.then_some(self.latch_opened_at_ms),
            busy: self.is_busy(now_ms),
        }
    }

    /// Replace the motor tuning (after a `configure` command). Takes
    /// effect on the next traversal.
    pub fn set_motor_config(&mut self, motor_cfg: MotorConfig) {
        self.motor_cfg = motor_cfg;
    }

    /// The active motor tuning.
    #[inline]
    pub fn motor_config(&self) -> MotorConfig {
        self.motor_cfg
    }

    /// Borrow the underlying motor (mock inspection in tests).
    #[inline]
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Inverted-direction traversal that re-engages the latch.
    fn engage_latch(&mut self, now_ms: u64) -> Result<(), M::Error> {
        self.motor.actuate(
            self.motor_cfg.direction.invert(),
            self.motor_cfg.span as u32,
            self.motor_cfg.speed_rpm as u32,
        )?;
        self.latch_open = false;
        self.busy_until_ms = now_ms + self.traversal();
        self.phase = DoorPhase::Closing;
        Ok(())
    }

    fn traversal(&self) -> u64 {
        traversal_ms(self.motor_cfg.span as u32, self.motor_cfg.speed_rpm as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockStepper;
    use crate::motor::traversal_ms;
    use crate::traits::SpinDirection;

    fn door() -> DoorController<MockStepper> {
        DoorController::new(MockStepper::new(), MotorConfig::default(), false)
    }

    fn default_traversal() -> u64 {
        let cfg = MotorConfig::default();
        traversal_ms(cfg.span as u32, cfg.speed_rpm as u32)
    }

    // =========================================================================
    // open() tests
    // =========================================================================

    #[test]
    fn open_from_closed_retracts_latch() {
        let mut door = door();
        let outcome = door.open(100).unwrap();
        assert_eq!(outcome, DoorOutcome::Opened);

        let status = door.status(100);
        assert_eq!(status.phase, DoorPhase::LatchOpen);
        assert!(status.latch_open);
        assert_eq!(status.latch_opened_at_ms, Some(100));
        assert!(status.busy);

        assert_eq!(
            door.motor().actuations,
            vec![(SpinDirection::Forward, 1000, 10)]
        );
    }

    #[test]
    fn second_open_is_idempotent() {
        let mut door = door();
        door.open(0).unwrap();
        let outcome = door.open(10).unwrap();
        assert_eq!(outcome, DoorOutcome::AlreadyOpen);
        // No second actuation
        assert_eq!(door.motor().actuations.len(), 1);
        // Timer anchor unchanged
        assert_eq!(door.status(10).latch_opened_at_ms, Some(0));
    }

    #[test]
    fn open_while_boot_unlocked_is_already_open() {
        let mut door = DoorController::new(MockStepper::new(), MotorConfig::default(), true);
        assert_eq!(door.status(0).phase, DoorPhase::OpenUnlocked);
        assert_eq!(door.open(0).unwrap(), DoorOutcome::AlreadyOpen);
        assert!(door.motor().actuations.is_empty());
    }

    #[test]
    fn open_uses_configured_direction_and_span() {
        let cfg = MotorConfig::default()
            .with_direction(SpinDirection::Reverse)
            .with_span(400)
            .with_speed_rpm(20);
        let mut door = DoorController::new(MockStepper::new(), cfg, false);
        door.open(0).unwrap();
        assert_eq!(
            door.motor().actuations,
            vec![(SpinDirection::Reverse, 400, 20)]
        );
    }

    // =========================================================================
    // Safety timer tests
    // =========================================================================

    #[test]
    fn timer_reengages_at_deadline_not_before() {
        let mut door = door();
        door.open(0).unwrap();

        // One tick just before the deadline
        door.tick(TIME_MS_BEFORE_CLOSING_LATCH - 1, None).unwrap();
        assert_eq!(door.status(TIME_MS_BEFORE_CLOSING_LATCH - 1).phase, DoorPhase::LatchOpen);
        assert_eq!(door.motor().actuations.len(), 1);

        // At the deadline the latch re-engages with inverted direction
        door.tick(TIME_MS_BEFORE_CLOSING_LATCH, None).unwrap();
        let status = door.status(TIME_MS_BEFORE_CLOSING_LATCH);
        assert_eq!(status.phase, DoorPhase::Closing);
        assert!(!status.latch_open);
        assert_eq!(
            door.motor().actuations[1],
            (SpinDirection::Reverse, 1000, 10)
        );
    }

    #[test]
    fn closing_settles_to_closed_after_traversal() {
        let mut door = door();
        door.open(0).unwrap();
        door.tick(TIME_MS_BEFORE_CLOSING_LATCH, None).unwrap();

        let done = TIME_MS_BEFORE_CLOSING_LATCH + default_traversal();
        door.tick(done - 1, None).unwrap();
        assert_eq!(door.status(done - 1).phase, DoorPhase::Closing);

        door.tick(done, None).unwrap();
        assert_eq!(door.status(done).phase, DoorPhase::Closed);
        assert!(!door.status(done).busy);
    }

    #[test]
    fn timer_does_not_fire_while_opening_traversal_runs() {
        // Pathological tuning where the traversal outlasts the close delay
        let cfg = MotorConfig::default().with_speed_rpm(1).with_span(2048);
        let mut door =
            DoorController::new(MockStepper::new(), cfg, false).with_close_delay_ms(100);
        door.open(0).unwrap();

        // Deadline passed but still busy: no second actuation yet
        door.tick(200, None).unwrap();
        assert_eq!(door.motor().actuations.len(), 1);

        let traversal = traversal_ms(2048, 1);
        door.tick(traversal, None).unwrap();
        assert_eq!(door.motor().actuations.len(), 2);
    }

    // =========================================================================
    // close() tests
    // =========================================================================

    #[test]
    fn close_forces_early_reengagement() {
        let mut door = door();
        door.open(0).unwrap();

        let after_open = default_traversal();
        let outcome = door.close(after_open).unwrap();
        assert_eq!(outcome, DoorOutcome::CloseStarted);
        assert_eq!(door.status(after_open).phase, DoorPhase::Closing);
        assert_eq!(door.motor().actuations.len(), 2);
    }

    #[test]
    fn close_while_opening_is_busy() {
        let mut door = door();
        door.open(0).unwrap();

        let outcome = door.close(10).unwrap();
        assert_eq!(
            outcome,
            DoorOutcome::Rejected {
                reason: RejectReason::Busy
            }
        );
        assert_eq!(door.motor().actuations.len(), 1);
    }

    #[test]
    fn close_while_closed_is_invalid() {
        let mut door = door();
        let outcome = door.close(0).unwrap();
        assert_eq!(
            outcome,
            DoorOutcome::Rejected {
                reason: RejectReason::InvalidState
            }
        );
    }

    #[test]
    fn open_while_closing_is_busy() {
        let mut door = door();
        door.open(0).unwrap();
        let t = default_traversal();
        door.close(t).unwrap();

        let outcome = door.open(t + 1).unwrap();
        assert_eq!(
            outcome,
            DoorOutcome::Rejected {
                reason: RejectReason::Busy
            }
        );
    }

    #[test]
    fn reopen_after_full_cycle() {
        let mut door = door();
        door.open(0).unwrap();
        let t1 = default_traversal();
        door.close(t1).unwrap();
        let t2 = t1 + default_traversal();
        door.tick(t2, None).unwrap();

        assert_eq!(door.open(t2).unwrap(), DoorOutcome::Opened);
        assert_eq!(door.motor().actuations.len(), 3);
    }

    // =========================================================================
    // Captor fusion tests
    // =========================================================================

    #[test]
    fn captor_refines_door_open_without_actuation() {
        let mut door = door();
        door.open(0).unwrap();
        let t = default_traversal();

        // Person pulls the door open after the latch released
        door.tick(t, Some(true)).unwrap();
        let status = door.status(t);
        assert!(status.door_open);
        assert_eq!(status.phase, DoorPhase::LatchOpen);
        assert_eq!(door.motor().actuations.len(), 1);
    }

    #[test]
    fn boot_open_settles_to_closed_when_door_shuts() {
        let mut door = DoorController::new(MockStepper::new(), MotorConfig::default(), true);
        door.tick(100, Some(true)).unwrap();
        assert_eq!(door.status(100).phase, DoorPhase::OpenUnlocked);

        door.tick(200, Some(false)).unwrap();
        let status = door.status(200);
        assert_eq!(status.phase, DoorPhase::Closed);
        assert!(!status.door_open);
        assert!(door.motor().actuations.is_empty());
    }

    #[test]
    fn captor_open_while_closed_only_updates_status() {
        let mut door = door();
        door.tick(50, Some(true)).unwrap();
        let status = door.status(50);
        assert_eq!(status.phase, DoorPhase::Closed);
        assert!(status.door_open);
        assert!(door.motor().actuations.is_empty());
    }

    // =========================================================================
    // Motor failure propagation
    // =========================================================================

    #[test]
    fn motor_error_surfaces_and_state_keeps_captor_view() {
        let mut door = DoorController::new(MockStepper::failing(), MotorConfig::default(), false);
        assert!(door.open(0).is_err());

        // No assumed target state after a failed actuation
        let status = door.status(0);
        assert_eq!(status.phase, DoorPhase::Closed);
        assert!(!status.latch_open);
        assert!(!status.busy);
    }

    #[test]
    fn motor_config_update_applies_to_next_traversal() {
        let mut door = door();
        door.set_motor_config(MotorConfig::default().with_span(250));
        door.open(0).unwrap();
        assert_eq!(door.motor().actuations[0].1, 250);
    }
}
