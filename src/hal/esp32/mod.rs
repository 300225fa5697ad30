//! ESP32 hardware implementations (esp-idf based).
//!
//! Implements the traits from [`crate::traits`] for an ESP32 board wired
//! like the original appliance: ULN2003 stepper driver on four GPIOs,
//! reed captor on a pulled-up input, two status LEDs, configuration in
//! NVS, and the API served by the esp-idf HTTP server.

pub mod captor;
pub mod clock;
pub mod led;
pub mod motor;
pub mod storage;

#[cfg(feature = "wifi")]
pub mod wifi;

#[cfg(feature = "esp32-http")]
pub mod http;

pub use captor::Esp32Captor;
pub use clock::{Esp32Clock, Esp32Delay};
pub use led::Esp32Led;
pub use motor::Esp32Phases;
pub use storage::Esp32Storage;

#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "esp32-http")]
pub use http::{Esp32HttpServer, HTTP_SERVER_PORT};
