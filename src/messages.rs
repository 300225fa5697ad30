//! Request payload types for the `configure` command.
//!
//! These types are `no_std` compatible and can be deserialized using
//! either `serde_json` (desktop) or `serde-json-core` (embedded). One
//! payload can carry any combination of the four configuration
//! operations; the dispatcher applies them in order and rejects an empty
//! payload.
//!
//! # JSON Examples
//!
//! Motor tuning (direction is the record's signed unit):
//! ```json
//! {"motor": {"speed_rpm": 10, "direction": 1, "span": 1000}}
//! ```
//!
//! Wi-Fi credentials (applied at next boot):
//! ```json
//! {"wifi": {"ssid": "HomeNet", "password": "secret123"}}
//! ```
//!
//! User table:
//! ```json
//! {"add_user": {"key": "ABCDEFGHIJKLMNOPQRST", "username": "alice"}}
//! {"remove_user": {"key": "ABCDEFGHIJKLMNOPQRST"}}
//! ```

use heapless::String as HString;

use crate::config::{KEY_SIZE, MAX_WIFI_PASS_SIZE, MAX_WIFI_SSID_SIZE, USERNAME_SIZE};

/// Motor tuning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorRequest {
    /// Rotation speed in rpm (must be positive).
    pub speed_rpm: i32,
    /// Retract direction as +1 or -1.
    pub direction: i32,
    /// Traversal span in steps (must be positive).
    pub span: i32,
}

/// Wi-Fi credential operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiRequest {
    /// Network SSID.
    pub ssid: HString<MAX_WIFI_SSID_SIZE>,
    /// Network passphrase.
    pub password: HString<MAX_WIFI_PASS_SIZE>,
}

/// Add-user operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddUserRequest {
    /// Access key for the new user.
    pub key: HString<KEY_SIZE>,
    /// Display name for the new user.
    pub username: HString<USERNAME_SIZE>,
}

/// Remove-user operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoveUserRequest {
    /// Access key of the user to remove.
    pub key: HString<KEY_SIZE>,
}

/// The `configure` command payload.
///
/// All operations are optional; an empty payload is malformed.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigureRequest {
    /// Replace the motor tuning.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub motor: Option<MotorRequest>,
    /// Replace the Wi-Fi credentials.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub wifi: Option<WifiRequest>,
    /// Add a user to the table.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub add_user: Option<AddUserRequest>,
    /// Remove a user from the table.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub remove_user: Option<RemoveUserRequest>,
}

impl ConfigureRequest {
    /// Returns true if the payload carries no operation at all.
    pub fn is_empty(&self) -> bool {
        self.motor.is_none()
            && self.wifi.is_none()
            && self.add_user.is_none()
            && self.remove_user.is_none()
    }
}

// ============================================================================
// Parsing (serde-json-core for no_std compatibility)
// ============================================================================

/// Parse a configure payload from JSON bytes.
///
/// Works in both `std` and `no_std` environments using `serde-json-core`.
///
/// # Example
///
/// ```
/// use rs_doorman::messages::parse_configure_request;
///
/// let json = br#"{"motor": {"speed_rpm": 12, "direction": -1, "span": 800}}"#;
/// let req = parse_configure_request(json).unwrap();
/// let motor = req.motor.unwrap();
/// assert_eq!(motor.speed_rpm, 12);
/// assert_eq!(motor.direction, -1);
/// assert_eq!(motor.span, 800);
/// ```
#[cfg(feature = "serde-json-core")]
pub fn parse_configure_request(json: &[u8]) -> Option<ConfigureRequest> {
    serde_json_core::from_slice(json).ok().map(|(req, _)| req)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "serde")]
    fn hstr<const N: usize>(s: &str) -> HString<N> {
        let mut h = HString::new();
        h.push_str(s).unwrap();
        h
    }

    #[test]
    fn empty_payload_detected() {
        assert!(ConfigureRequest::default().is_empty());

        let req = ConfigureRequest {
            motor: Some(MotorRequest {
                speed_rpm: 10,
                direction: 1,
                span: 1000,
            }),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn motor_payload_serde() {
        let json = r#"{"motor": {"speed_rpm": 10, "direction": 1, "span": 1000}}"#;
        let req: ConfigureRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.motor,
            Some(MotorRequest {
                speed_rpm: 10,
                direction: 1,
                span: 1000
            })
        );
        assert!(req.wifi.is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn add_user_payload_serde() {
        let json = r#"{"add_user": {"key": "ABCDEFGHIJKLMNOPQRST", "username": "alice"}}"#;
        let req: ConfigureRequest = serde_json::from_str(json).unwrap();
        let add = req.add_user.unwrap();
        assert_eq!(add.key, hstr::<20>("ABCDEFGHIJKLMNOPQRST"));
        assert_eq!(add.username, hstr::<25>("alice"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn combined_payload_serde() {
        let json = r#"{
            "wifi": {"ssid": "HomeNet", "password": "secret123"},
            "remove_user": {"key": "old-key"}
        }"#;
        let req: ConfigureRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.wifi.unwrap().ssid, hstr::<33>("HomeNet"));
        assert_eq!(req.remove_user.unwrap().key, hstr::<20>("old-key"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn empty_json_deserializes_to_empty_payload() {
        let req: ConfigureRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_skips_absent_operations() {
        let req = ConfigureRequest {
            motor: Some(MotorRequest {
                speed_rpm: 10,
                direction: 1,
                span: 1000,
            }),
            ..Default::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("motor"));
        assert!(!json.contains("wifi"));
        assert!(!json.contains("add_user"));
    }

    #[cfg(feature = "serde-json-core")]
    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse_configure_request(b"{not json").is_none());
    }
}
