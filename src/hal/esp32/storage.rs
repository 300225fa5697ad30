//! Configuration record storage in NVS.
//!
//! The ESP8266 original kept the record in raw EEPROM at a fixed base
//! address; on ESP-IDF the equivalent non-volatile home is an NVS blob.
//! The whole record is one blob, so replacement is atomic: a failed or
//! interrupted write leaves the previous blob readable.

use crate::store::RECORD_SIZE;
use crate::traits::ConfigStorage;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;

/// NVS namespace holding the configuration blob.
const NVS_NAMESPACE: &str = "doorman";

/// NVS key of the configuration blob.
const RECORD_KEY: &str = "config";

/// Configuration record storage backed by an NVS blob.
pub struct Esp32Storage {
    nvs: EspNvs<NvsDefault>,
}

impl Esp32Storage {
    /// Opens (or creates) the configuration namespace on the default
    /// NVS partition.
    pub fn new(partition: EspDefaultNvsPartition) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        Ok(Self { nvs })
    }
}

impl ConfigStorage for Esp32Storage {
    type Error = EspError;

    fn read_record(&mut self, buf: &mut [u8]) -> Result<(), EspError> {
        // A missing blob leaves the buffer zeroed; the magic-marker check
        // in ConfigStore::load treats that as uninitialized storage.
        buf.fill(0);
        let mut blob = [0u8; RECORD_SIZE];
        if let Some(stored) = self.nvs.get_blob(RECORD_KEY, &mut blob)? {
            let len = stored.len().min(buf.len());
            buf[..len].copy_from_slice(&stored[..len]);
        }
        Ok(())
    }

    fn write_record(&mut self, data: &[u8]) -> Result<(), EspError> {
        self.nvs.set_blob(RECORD_KEY, data)
    }
}
