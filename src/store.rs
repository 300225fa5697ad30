//! Persisted configuration record: layout, recovery, validated mutations.
//!
//! The whole [`DeviceConfig`] lives in one fixed-size record at a fixed
//! base address. Every field sits at a known offset and every string is
//! null-padded to its fixed width, so the record needs no length prefixes
//! or delimiters and stays bit-compatible with what earlier firmware
//! revisions wrote:
//!
//! ```text
//! offset   width  field
//!      0       9  magic marker ("42IsLife")
//!      9      33  Wi-Fi SSID
//!     42      64  Wi-Fi passphrase
//!    106     450  user table, 10 x (key[20] + username[25])
//!    556       4  motor speed (i32 LE)
//!    560       4  motor direction (i32 LE, +1/-1)
//!    564       4  motor span (i32 LE)
//! ```
//!
//! A record whose magic marker does not match is treated as absent:
//! [`ConfigStore::load`] synthesizes defaults, persists them, and carries
//! on. That is the only failure recovered silently - a failed write
//! surfaces to the caller and leaves both the stored record and the
//! in-memory configuration untouched.

use crate::config::{
    DeviceConfig, FixedStr, MotorConfig, UserCredential, ValidationError, KEY_SIZE,
    MAX_WIFI_PASS_SIZE, MAX_WIFI_SSID_SIZE, NB_USERS, USERNAME_SIZE,
};
use crate::traits::{ConfigStorage, SpinDirection};

/// The magic marker proving the record was written by this firmware.
pub const MAGIC_NUMBER: &str = "42IsLife";

/// Width of the magic marker field.
pub const MAGIC_NUMBER_SIZE: usize = 9;

/// Base address of the record in storage.
pub const RECORD_BASE_ADDRESS: usize = 0x00;

/// Total record size in bytes.
pub const RECORD_SIZE: usize = MAGIC_NUMBER_SIZE
    + MAX_WIFI_SSID_SIZE
    + MAX_WIFI_PASS_SIZE
    + NB_USERS * (KEY_SIZE + USERNAME_SIZE)
    + 3 * 4;

const SSID_OFFSET: usize = MAGIC_NUMBER_SIZE;
const PASS_OFFSET: usize = SSID_OFFSET + MAX_WIFI_SSID_SIZE;
const USERS_OFFSET: usize = PASS_OFFSET + MAX_WIFI_PASS_SIZE;
const MOTOR_OFFSET: usize = USERS_OFFSET + NB_USERS * (KEY_SIZE + USERNAME_SIZE);

// ============================================================================
// Errors
// ============================================================================

/// A storage operation failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageError<E> {
    /// A mutation was rejected before anything was written.
    Validation(ValidationError),
    /// The storage collaborator failed; the previously stored record is
    /// intact.
    Io(E),
}

impl<E> From<ValidationError> for StorageError<E> {
    fn from(err: ValidationError) -> Self {
        StorageError::Validation(err)
    }
}

// ============================================================================
// Record layout
// ============================================================================

/// Serialize a configuration into its fixed record layout.
pub fn encode_record(config: &DeviceConfig) -> [u8; RECORD_SIZE] {
    let mut buf = [0u8; RECORD_SIZE];

    buf[..MAGIC_NUMBER.len()].copy_from_slice(MAGIC_NUMBER.as_bytes());
    buf[SSID_OFFSET..SSID_OFFSET + MAX_WIFI_SSID_SIZE].copy_from_slice(config.wifi_ssid.raw());
    buf[PASS_OFFSET..PASS_OFFSET + MAX_WIFI_PASS_SIZE].copy_from_slice(config.wifi_password.raw());

    for (i, user) in config.users.iter().enumerate() {
        let base = USERS_OFFSET + i * (KEY_SIZE + USERNAME_SIZE);
        buf[base..base + KEY_SIZE].copy_from_slice(user.key.raw());
        buf[base + KEY_SIZE..base + KEY_SIZE + USERNAME_SIZE].copy_from_slice(user.username.raw());
    }

    buf[MOTOR_OFFSET..MOTOR_OFFSET + 4].copy_from_slice(&config.motor.speed_rpm.to_le_bytes());
    buf[MOTOR_OFFSET + 4..MOTOR_OFFSET + 8]
        .copy_from_slice(&config.motor.direction.as_i32().to_le_bytes());
    buf[MOTOR_OFFSET + 8..MOTOR_OFFSET + 12].copy_from_slice(&config.motor.span.to_le_bytes());

    buf
}

/// Deserialize a configuration from record bytes.
///
/// Returns `None` when the magic marker does not match or a field cannot
/// be decoded - either way the record is unusable and the caller falls
/// back to defaults.
pub fn decode_record(buf: &[u8; RECORD_SIZE]) -> Option<DeviceConfig> {
    let magic = &buf[..MAGIC_NUMBER_SIZE];
    if &magic[..MAGIC_NUMBER.len()] != MAGIC_NUMBER.as_bytes() {
        return None;
    }

    let mut ssid = [0u8; MAX_WIFI_SSID_SIZE];
    ssid.copy_from_slice(&buf[SSID_OFFSET..SSID_OFFSET + MAX_WIFI_SSID_SIZE]);
    let mut pass = [0u8; MAX_WIFI_PASS_SIZE];
    pass.copy_from_slice(&buf[PASS_OFFSET..PASS_OFFSET + MAX_WIFI_PASS_SIZE]);

    let mut users = [UserCredential::vacant(); NB_USERS];
    for (i, user) in users.iter_mut().enumerate() {
        let base = USERS_OFFSET + i * (KEY_SIZE + USERNAME_SIZE);
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&buf[base..base + KEY_SIZE]);
        let mut username = [0u8; USERNAME_SIZE];
        username.copy_from_slice(&buf[base + KEY_SIZE..base + KEY_SIZE + USERNAME_SIZE]);
        *user = UserCredential {
            key: FixedStr::from_raw(key),
            username: FixedStr::from_raw(username),
        };
    }

    let int_at = |offset: usize| {
        let mut b = [0u8; 4];
        b.copy_from_slice(&buf[offset..offset + 4]);
        i32::from_le_bytes(b)
    };
    let direction = SpinDirection::from_i32(int_at(MOTOR_OFFSET + 4))?;

    Some(DeviceConfig {
        wifi_ssid: FixedStr::from_raw(ssid),
        wifi_password: FixedStr::from_raw(pass),
        users,
        motor: MotorConfig {
            speed_rpm: int_at(MOTOR_OFFSET),
            direction,
            span: int_at(MOTOR_OFFSET + 8),
        },
    })
}

// ============================================================================
// Config store
// ============================================================================

/// Owns the in-memory configuration and keeps it in lockstep with storage.
///
/// Mutations validate first, write the whole record, and only then commit
/// the in-memory copy - so after any error the store still reflects what
/// is persisted.
pub struct ConfigStore<S: ConfigStorage> {
    storage: S,
    config: DeviceConfig,
}

impl<S: ConfigStorage> ConfigStore<S> {
    /// Creates a store over `storage` with defaults; call
    /// [`load`](Self::load) before trusting [`config`](Self::config).
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: DeviceConfig::default(),
        }
    }

    /// Read the persisted record.
    ///
    /// A record with a mismatched magic marker (or undecodable fields) is
    /// treated as uninitialized storage: defaults are synthesized,
    /// persisted, and returned. Loading again immediately afterwards
    /// yields the same defaults.
    pub fn load(&mut self) -> Result<&DeviceConfig, StorageError<S::Error>> {
        let mut buf = [0u8; RECORD_SIZE];
        self.storage
            .read_record(&mut buf)
            .map_err(StorageError::Io)?;

        match decode_record(&buf).filter(|cfg| cfg.validate().is_ok()) {
            Some(config) => {
                self.config = config;
            }
            None => {
                self.config = DeviceConfig::default();
                self.persist(&DeviceConfig::default())?;
            }
        }
        Ok(&self.config)
    }

    /// The current configuration.
    #[inline]
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Add a user and persist immediately.
    pub fn add_user(&mut self, key: &str, username: &str) -> Result<(), StorageError<S::Error>> {
        let mut next = self.config;
        next.add_user(key, username)?;
        self.commit(next)
    }

    /// Remove a user by key and persist immediately.
    pub fn remove_user(&mut self, key: &str) -> Result<(), StorageError<S::Error>> {
        let mut next = self.config;
        next.remove_user(key)?;
        self.commit(next)
    }

    /// Replace the motor tuning and persist immediately.
    pub fn set_motor_config(&mut self, motor: MotorConfig) -> Result<(), StorageError<S::Error>> {
        motor.validate()?;
        let mut next = self.config;
        next.motor = motor;
        self.commit(next)
    }

    /// Replace the Wi-Fi credentials and persist immediately. Takes
    /// effect at next boot (the configuration is read once at startup).
    pub fn set_wifi(&mut self, ssid: &str, password: &str) -> Result<(), StorageError<S::Error>> {
        let next = self.config.with_wifi(ssid, password)?;
        self.commit(next)
    }

    /// Validate, persist, and adopt `next`.
    fn commit(&mut self, next: DeviceConfig) -> Result<(), StorageError<S::Error>> {
        next.validate()?;
        self.persist(&next)?;
        self.config = next;
        Ok(())
    }

    fn persist(&mut self, config: &DeviceConfig) -> Result<(), StorageError<S::Error>> {
        let record = encode_record(config);
        self.storage
            .write_record(&record)
            .map_err(StorageError::Io)
    }
}
