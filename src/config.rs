//! Device configuration: Wi-Fi credentials, authorized users, motor tuning.
//!
//! The configuration mirrors the record persisted in non-volatile storage:
//! every string field is a fixed-width, null-padded byte array so the record
//! can be addressed by offset (see [`crate::store`] for the layout). The
//! [`FixedStr`] wrapper keeps those semantics explicit while staying
//! ergonomic on desktop.
//!
//! # Example
//!
//! ```rust
//! use rs_doorman::config::{DeviceConfig, MotorConfig};
//! use rs_doorman::traits::SpinDirection;
//!
//! // Use defaults
//! let config = DeviceConfig::default();
//! assert_eq!(config.motor.speed_rpm, 10);
//!
//! // Or customize
//! let config = DeviceConfig::default()
//!     .with_wifi("shop-floor", "hunter2")
//!     .unwrap()
//!     .with_motor(MotorConfig::default().with_span(1500));
//! assert_eq!(config.wifi_ssid.as_str(), "shop-floor");
//! ```

use crate::traits::SpinDirection;

/// Maximum Wi-Fi SSID length in bytes (including padding).
pub const MAX_WIFI_SSID_SIZE: usize = 33;

/// Maximum Wi-Fi passphrase length in bytes (including padding).
pub const MAX_WIFI_PASS_SIZE: usize = 64;

/// Number of slots in the authorized-user table.
pub const NB_USERS: usize = 10;

/// Width of a user key in bytes. Keys may occupy the full width.
pub const KEY_SIZE: usize = 20;

/// Width of a username in bytes.
pub const USERNAME_SIZE: usize = 25;

/// Default motor speed in revolutions per minute.
pub const MOTOR_DEFAULT_SPEED: i32 = 10;

/// Default latch traversal span in steps.
pub const MOTOR_DEFAULT_SPAN: i32 = 1000;

// ============================================================================
// Fixed-width strings
// ============================================================================

/// A fixed-capacity, null-padded string.
///
/// This is the in-memory twin of a `char[N]` field in the persisted record:
/// up to `N` bytes of content, unused tail bytes zeroed. Content may occupy
/// the full width (keys do), so there is no terminator guarantee.
///
/// # Example
///
/// ```rust
/// use rs_doorman::config::FixedStr;
///
/// let s: FixedStr<8> = FixedStr::from_str("door").unwrap();
/// assert_eq!(s.as_str(), "door");
/// assert_eq!(s.raw()[4], 0); // null padding
/// assert!(FixedStr::<8>::from_str("too long to fit").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedStr<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedStr<N> {
    /// Creates an empty (all-zero) string.
    pub const fn empty() -> Self {
        Self { bytes: [0; N] }
    }

    /// Creates a fixed string from `s`, rejecting anything over `N` bytes.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ValidationError> {
        if s.len() > N {
            return Err(ValidationError::StringTooLong);
        }
        let mut bytes = [0u8; N];
        bytes[..s.len()].copy_from_slice(s.as_bytes());
        Ok(Self { bytes })
    }

    /// Creates a fixed string directly from raw record bytes.
    pub const fn from_raw(bytes: [u8; N]) -> Self {
        Self { bytes }
    }

    /// Returns the content up to the first null byte.
    pub fn as_str(&self) -> &str {
        let end = self.len();
        core::str::from_utf8(&self.bytes[..end]).unwrap_or("")
    }

    /// Returns the content length in bytes (position of the first null).
    pub fn len(&self) -> usize {
        self.bytes.iter().position(|&b| b == 0).unwrap_or(N)
    }

    /// Returns true if the first byte is null (vacant field).
    pub fn is_empty(&self) -> bool {
        self.bytes[0] == 0
    }

    /// Returns the full null-padded backing array.
    pub fn raw(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for FixedStr<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> core::fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

// ============================================================================
// Validation
// ============================================================================

/// A configuration value was rejected.
///
/// Validation happens when configuration is mutated or decoded, never at
/// actuation time: a [`MotorConfig`] that reaches the motor driver is
/// already known good.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValidationError {
    /// A string field exceeds its fixed width.
    StringTooLong,
    /// Motor speed must be strictly positive.
    SpeedOutOfRange,
    /// Motor span must be strictly positive.
    SpanOutOfRange,
    /// Motor direction must be +1 or -1.
    DirectionOutOfRange,
    /// The user table has no vacant slot left.
    TableFull,
    /// An active user already holds this key.
    DuplicateKey,
    /// A user key must not be empty.
    EmptyKey,
    /// No active user holds this key.
    UnknownUser,
    /// A configure payload carried no operation.
    EmptyPayload,
}

// ============================================================================
// Motor tuning
// ============================================================================

/// Stepper tuning for the latch traversal.
///
/// `span` is the number of steps for a full retract (or re-engage) of the
/// latch; `direction` is the rotation that retracts it. Both are persisted,
/// so mounting the motor mirrored only needs a `configure` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorConfig {
    /// Rotation speed in revolutions per minute.
    pub speed_rpm: i32,
    /// Rotation that retracts the latch.
    pub direction: SpinDirection,
    /// Steps for a full latch traversal.
    pub span: i32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            speed_rpm: MOTOR_DEFAULT_SPEED,
            direction: SpinDirection::Forward,
            span: MOTOR_DEFAULT_SPAN,
        }
    }
}

impl MotorConfig {
    /// Set the speed in rpm.
    pub fn with_speed_rpm(mut self, rpm: i32) -> Self {
        self.speed_rpm = rpm;
        self
    }

    /// Set the retract direction.
    pub fn with_direction(mut self, direction: SpinDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the traversal span in steps.
    pub fn with_span(mut self, span: i32) -> Self {
        self.span = span;
        self
    }

    /// Check the tuning invariants: positive speed and span.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.speed_rpm <= 0 {
            return Err(ValidationError::SpeedOutOfRange);
        }
        if self.span <= 0 {
            return Err(ValidationError::SpanOutOfRange);
        }
        Ok(())
    }
}

// ============================================================================
// User credentials
// ============================================================================

/// One slot of the authorized-user table.
///
/// A slot with an empty key is vacant. Keys are opaque fixed-width tokens
/// compared byte-for-byte by [`crate::auth::AuthGate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct UserCredential {
    /// Opaque access key, up to [`KEY_SIZE`] bytes.
    pub key: FixedStr<KEY_SIZE>,
    /// Display name, up to [`USERNAME_SIZE`] bytes.
    pub username: FixedStr<USERNAME_SIZE>,
}

impl UserCredential {
    /// Creates an active credential. The key must be non-empty and both
    /// fields must fit their fixed widths.
    pub fn new(key: &str, username: &str) -> Result<Self, ValidationError> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        Ok(Self {
            key: FixedStr::from_str(key)?,
            username: FixedStr::from_str(username)?,
        })
    }

    /// Creates a vacant slot.
    pub const fn vacant() -> Self {
        Self {
            key: FixedStr::empty(),
            username: FixedStr::empty(),
        }
    }

    /// Returns true if this slot holds no user.
    pub fn is_vacant(&self) -> bool {
        self.key.is_empty()
    }
}

// ============================================================================
// Device configuration
// ============================================================================

/// The complete persisted device configuration.
///
/// Read once at boot by [`crate::store::ConfigStore`], mutated only through
/// `configure` commands, and rewritten as a whole record on every change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Wi-Fi network SSID.
    pub wifi_ssid: FixedStr<MAX_WIFI_SSID_SIZE>,
    /// Wi-Fi passphrase.
    pub wifi_password: FixedStr<MAX_WIFI_PASS_SIZE>,
    /// Authorized-user table. Vacant slots have an empty key.
    pub users: [UserCredential; NB_USERS],
    /// Stepper tuning for the latch.
    pub motor: MotorConfig,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: FixedStr::empty(),
            wifi_password: FixedStr::empty(),
            users: [UserCredential::vacant(); NB_USERS],
            motor: MotorConfig::default(),
        }
    }
}

impl DeviceConfig {
    /// Set the Wi-Fi credentials.
    pub fn with_wifi(mut self, ssid: &str, password: &str) -> Result<Self, ValidationError> {
        self.wifi_ssid = FixedStr::from_str(ssid)?;
        self.wifi_password = FixedStr::from_str(password)?;
        Ok(self)
    }

    /// Set the motor tuning.
    pub fn with_motor(mut self, motor: MotorConfig) -> Self {
        self.motor = motor;
        self
    }

    /// Add a user and return the updated configuration.
    pub fn with_user(mut self, key: &str, username: &str) -> Result<Self, ValidationError> {
        self.add_user(key, username)?;
        Ok(self)
    }

    /// Number of active (non-vacant) user slots.
    pub fn user_count(&self) -> usize {
        self.users.iter().filter(|u| !u.is_vacant()).count()
    }

    /// Insert a user into the first vacant slot. The key must be unique
    /// among active slots.
    pub fn add_user(&mut self, key: &str, username: &str) -> Result<(), ValidationError> {
        let user = UserCredential::new(key, username)?;
        if self.users.iter().any(|u| !u.is_vacant() && u.key == user.key) {
            return Err(ValidationError::DuplicateKey);
        }
        match self.users.iter_mut().find(|u| u.is_vacant()) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(ValidationError::TableFull),
        }
    }

    /// Vacate the slot holding `key`.
    pub fn remove_user(&mut self, key: &str) -> Result<(), ValidationError> {
        let key = FixedStr::from_str(key)?;
        match self
            .users
            .iter_mut()
            .find(|u| !u.is_vacant() && u.key == key)
        {
            Some(slot) => {
                *slot = UserCredential::vacant();
                Ok(())
            }
            None => Err(ValidationError::UnknownUser),
        }
    }

    /// Check the whole configuration: motor invariants and key uniqueness.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.motor.validate()?;
        for (i, user) in self.users.iter().enumerate() {
            if user.is_vacant() {
                continue;
            }
            let dup = self.users[..i]
                .iter()
                .any(|other| !other.is_vacant() && other.key == user.key);
            if dup {
                return Err(ValidationError::DuplicateKey);
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // FixedStr tests
    // =========================================================================

    #[test]
    fn fixed_str_roundtrip() {
        let s: FixedStr<16> = FixedStr::from_str("hello").unwrap();
        assert_eq!(s.as_str(), "hello");
        assert_eq!(s.len(), 5);
        assert!(!s.is_empty());
    }

    #[test]
    fn fixed_str_full_width() {
        // A key may occupy every byte with no terminator
        let s: FixedStr<4> = FixedStr::from_str("abcd").unwrap();
        assert_eq!(s.as_str(), "abcd");
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn fixed_str_too_long() {
        assert_eq!(
            FixedStr::<4>::from_str("abcde"),
            Err(ValidationError::StringTooLong)
        );
    }

    #[test]
    fn fixed_str_empty() {
        let s: FixedStr<8> = FixedStr::empty();
        assert!(s.is_empty());
        assert_eq!(s.as_str(), "");
        assert_eq!(s, FixedStr::default());
    }

    #[test]
    fn fixed_str_null_padding() {
        let s: FixedStr<8> = FixedStr::from_str("ab").unwrap();
        assert_eq!(&s.raw()[2..], &[0, 0, 0, 0, 0, 0]);
    }

    // =========================================================================
    // MotorConfig tests
    // =========================================================================

    #[test]
    fn motor_config_default() {
        let motor = MotorConfig::default();
        assert_eq!(motor.speed_rpm, MOTOR_DEFAULT_SPEED);
        assert_eq!(motor.direction, SpinDirection::Forward);
        assert_eq!(motor.span, MOTOR_DEFAULT_SPAN);
        assert!(motor.validate().is_ok());
    }

    #[test]
    fn motor_config_builder() {
        let motor = MotorConfig::default()
            .with_speed_rpm(15)
            .with_direction(SpinDirection::Reverse)
            .with_span(2000);
        assert_eq!(motor.speed_rpm, 15);
        assert_eq!(motor.direction, SpinDirection::Reverse);
        assert_eq!(motor.span, 2000);
    }

    #[test]
    fn motor_config_rejects_zero_speed() {
        let motor = MotorConfig::default().with_speed_rpm(0);
        assert_eq!(motor.validate(), Err(ValidationError::SpeedOutOfRange));
    }

    #[test]
    fn motor_config_rejects_negative_span() {
        let motor = MotorConfig::default().with_span(-1);
        assert_eq!(motor.validate(), Err(ValidationError::SpanOutOfRange));
    }

    // =========================================================================
    // UserCredential tests
    // =========================================================================

    #[test]
    fn user_credential_new() {
        let user = UserCredential::new("ABCDEFGHIJKLMNOPQRST", "alice").unwrap();
        assert_eq!(user.key.as_str(), "ABCDEFGHIJKLMNOPQRST");
        assert_eq!(user.username.as_str(), "alice");
        assert!(!user.is_vacant());
    }

    #[test]
    fn user_credential_empty_key_rejected() {
        assert_eq!(
            UserCredential::new("", "ghost"),
            Err(ValidationError::EmptyKey)
        );
    }

    #[test]
    fn user_credential_oversized_key_rejected() {
        let long = "x".repeat(KEY_SIZE + 1);
        assert_eq!(
            UserCredential::new(&long, "bob"),
            Err(ValidationError::StringTooLong)
        );
    }

    #[test]
    fn user_credential_vacant() {
        let slot = UserCredential::vacant();
        assert!(slot.is_vacant());
    }

    // =========================================================================
    // DeviceConfig tests
    // =========================================================================

    #[test]
    fn device_config_default() {
        let config = DeviceConfig::default();
        assert!(config.wifi_ssid.is_empty());
        assert_eq!(config.user_count(), 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn device_config_add_user() {
        let mut config = DeviceConfig::default();
        config.add_user("key-one", "alice").unwrap();
        config.add_user("key-two", "bob").unwrap();
        assert_eq!(config.user_count(), 2);
    }

    #[test]
    fn device_config_duplicate_key_rejected() {
        let mut config = DeviceConfig::default();
        config.add_user("key-one", "alice").unwrap();
        assert_eq!(
            config.add_user("key-one", "mallory"),
            Err(ValidationError::DuplicateKey)
        );
    }

    #[test]
    fn device_config_table_full() {
        let mut config = DeviceConfig::default();
        for i in 0..NB_USERS {
            let key = format!("key-{i}");
            config.add_user(&key, "user").unwrap();
        }
        assert_eq!(
            config.add_user("one-more", "late"),
            Err(ValidationError::TableFull)
        );
    }

    #[test]
    fn device_config_remove_user() {
        let mut config = DeviceConfig::default();
        config.add_user("key-one", "alice").unwrap();
        config.remove_user("key-one").unwrap();
        assert_eq!(config.user_count(), 0);
        // Slot is reusable
        config.add_user("key-one", "alice").unwrap();
        assert_eq!(config.user_count(), 1);
    }

    #[test]
    fn device_config_remove_unknown_user() {
        let mut config = DeviceConfig::default();
        assert_eq!(
            config.remove_user("nobody"),
            Err(ValidationError::UnknownUser)
        );
    }

    #[test]
    fn device_config_wifi_builder() {
        let config = DeviceConfig::default()
            .with_wifi("HomeNet", "secret123")
            .unwrap();
        assert_eq!(config.wifi_ssid.as_str(), "HomeNet");
        assert_eq!(config.wifi_password.as_str(), "secret123");
    }

    #[test]
    fn device_config_wifi_ssid_too_long() {
        let long = "s".repeat(MAX_WIFI_SSID_SIZE + 1);
        assert!(DeviceConfig::default().with_wifi(&long, "pw").is_err());
    }
}
