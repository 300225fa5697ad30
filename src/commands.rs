//! Command kinds, capability requirements, and outcomes.
//!
//! Requests reach the device as one of four commands. Each kind carries a
//! capability requirement: driving the mechanism or rewriting the
//! configuration takes an authenticated user, reading status does not.
//! The dispatcher ([`crate::dispatch`]) checks the requirement before the
//! door controller ever sees the command.
//!
//! # Command Flow
//!
//! 1. The transport (axum or the ESP32 callback server) maps a request
//!    path to a [`CommandKind`] plus the presented credential
//! 2. [`crate::dispatch::CommandDispatcher`] authenticates when
//!    [`CommandKind::requires_auth`] says so
//! 3. The door controller returns a [`DoorOutcome`]; rejections carry a
//!    [`RejectReason`] that the dispatcher maps to a response code

/// The four externally reachable commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CommandKind {
    /// Retract the latch.
    Open,
    /// Re-engage the latch ahead of the auto-close timer.
    Close,
    /// Report the door state snapshot.
    Status,
    /// Mutate the persisted configuration.
    Configure,
}

impl CommandKind {
    /// Whether this command requires an authenticated user.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_doorman::commands::CommandKind;
    ///
    /// assert!(CommandKind::Open.requires_auth());
    /// assert!(CommandKind::Close.requires_auth());
    /// assert!(CommandKind::Configure.requires_auth());
    /// assert!(!CommandKind::Status.requires_auth());
    /// ```
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, CommandKind::Status)
    }

    /// Map a request route to a command kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_doorman::commands::CommandKind;
    ///
    /// assert_eq!(CommandKind::from_route("/open"), Some(CommandKind::Open));
    /// assert_eq!(CommandKind::from_route("/status"), Some(CommandKind::Status));
    /// assert_eq!(CommandKind::from_route("/nope"), None);
    /// ```
    pub fn from_route(route: &str) -> Option<Self> {
        match route {
            "/open" => Some(CommandKind::Open),
            "/close" => Some(CommandKind::Close),
            "/status" => Some(CommandKind::Status),
            "/configure" => Some(CommandKind::Configure),
            _ => None,
        }
    }
}

/// Result of applying an actuation command to the door controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorOutcome {
    /// The latch retraction traversal started.
    Opened,
    /// The latch is already retracted (or the door stands open
    /// unlatched); nothing was actuated. Not an error.
    AlreadyOpen,
    /// The re-engagement traversal started.
    CloseStarted,
    /// The command was rejected; see [`RejectReason`].
    Rejected {
        /// Why the command was rejected.
        reason: RejectReason,
    },
}

/// Reason an actuation command was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RejectReason {
    /// A traversal is in flight; retry once it completes.
    Busy,
    /// The command is not meaningful in the current phase
    /// (e.g. `close` while already closed).
    InvalidState,
}
