//! API request and response types for the HTTP endpoint.

use serde::{Deserialize, Serialize};

use crate::door::{DoorPhase, DoorStatus};

// ============================================================================
// Response Types
// ============================================================================

/// API response wrapper for consistent JSON structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (present when success=true)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error message (present when success=false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response with data
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Door state snapshot response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Current phase of the mechanism
    pub phase: DoorPhase,
    /// Debounced captor reading
    pub door_open: bool,
    /// True while the latch is retracted
    pub latch_open: bool,
    /// True while a traversal is in flight
    pub busy: bool,
    /// When the latch was retracted, if it currently is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latch_opened_at_ms: Option<u64>,
}

impl From<&DoorStatus> for StatusResponse {
    fn from(status: &DoorStatus) -> Self {
        Self {
            phase: status.phase,
            door_open: status.door_open,
            latch_open: status.latch_open,
            busy: status.busy,
            latch_opened_at_ms: status.latch_opened_at_ms,
        }
    }
}

/// Command result response: what happened plus the state afterwards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Result tag ("opened", "already_open", "closing", "configured")
    pub result: String,
    /// State snapshot taken after the command
    pub status: StatusResponse,
}

impl CommandResponse {
    /// Create a response for a carried-out command
    pub fn new(result: impl Into<String>, status: &DoorStatus) -> Self {
        Self {
            result: result.into(),
            status: StatusResponse::from(status),
        }
    }
}
