//! Persistent storage abstraction for the configuration record.
//!
//! The configuration lives in one fixed-size record at a fixed base
//! address (see [`crate::store`] for the layout). This trait is the only
//! thing [`crate::store::ConfigStore`] needs from the storage hardware:
//! read the whole record, write the whole record.
//!
//! # Implementation Notes
//!
//! - `write_record` must replace the record atomically from the caller's
//!   perspective: after a failed write the previously stored record must
//!   still be readable intact. On ESP32 this falls out of storing the
//!   record as a single NVS blob.
//! - Reads of never-written storage should return whatever bytes are
//!   there (typically erased flash); the magic-marker check in
//!   [`crate::store::ConfigStore::load`] handles the rest.

/// Fixed-record storage for the device configuration.
pub trait ConfigStorage {
    /// Error type for storage operations.
    type Error;

    /// Read the record into `buf` (exactly the record size).
    fn read_record(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Replace the stored record with `data`.
    fn write_record(&mut self, data: &[u8]) -> Result<(), Self::Error>;
}
