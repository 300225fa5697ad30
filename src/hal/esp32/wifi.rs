//! WiFi connection management for ESP32.
//!
//! Provides synchronous WiFi station mode connection using esp-idf-svc,
//! with a bounded overall connect deadline so a wrong passphrase or a
//! missing access point cannot hang the boot sequence forever.
//!
//! # Example
//!
//! ```ignore
//! use rs_doorman::hal::esp32::Esp32Wifi;
//!
//! let wifi = Esp32Wifi::connect(modem, sysloop, Some(nvs), "HomeNet", "secret123")?;
//! println!("IP: {:?}", wifi.ip_addr());
//! ```

use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

/// Overall deadline for reaching an associated, addressed state.
pub const MAX_WIFI_CONNECT_DELAY_MS: u64 = 20_000;

/// Pause between connection attempts.
pub const WIFI_DELAY_BETWEEN_CONNECT_MS: u64 = 250;

/// WiFi connection manager for ESP32.
///
/// Manages a station-mode WiFi connection. The connection is established
/// during construction and maintained for the lifetime of this struct.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> Esp32Wifi<'a> {
    /// Connect to the configured access point.
    ///
    /// This will:
    /// 1. Initialize the WiFi driver
    /// 2. Configure station mode with the provided credentials
    /// 3. Retry the association until it succeeds or
    ///    [`MAX_WIFI_CONNECT_DELAY_MS`] elapses
    /// 4. Wait for DHCP to assign an IP address
    ///
    /// # Errors
    ///
    /// Returns an error if WiFi initialization fails or the deadline
    /// passes without an association.
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        ssid: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        // esp-idf wants its own fixed-capacity strings
        let mut ssid_buf: heapless::String<32> = heapless::String::new();
        let _ = ssid_buf.push_str(ssid);

        let mut pass_buf: heapless::String<64> = heapless::String::new();
        let _ = pass_buf.push_str(password);

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: ssid_buf,
            password: pass_buf,
            ..Default::default()
        }))?;

        println!("[WiFi] Starting...");
        wifi.start()?;

        println!("[WiFi] Connecting to '{}'...", ssid);
        let deadline = Instant::now() + Duration::from_millis(MAX_WIFI_CONNECT_DELAY_MS);
        loop {
            match wifi.connect() {
                Ok(()) => break,
                Err(e) if Instant::now() >= deadline => {
                    anyhow::bail!("WiFi association timed out: {e}");
                }
                Err(_) => {
                    std::thread::sleep(Duration::from_millis(WIFI_DELAY_BETWEEN_CONNECT_MS));
                }
            }
        }

        println!("[WiFi] Waiting for DHCP...");
        wifi.wait_netif_up()?;

        if let Ok(ip_info) = wifi.wifi().sta_netif().get_ip_info() {
            println!("[WiFi] Connected! IP: {}", ip_info.ip);
        }

        Ok(Self { wifi })
    }

    /// Get the current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    /// Check if WiFi is connected.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    /// Disconnect from the current network.
    pub fn disconnect(&mut self) -> anyhow::Result<()> {
        self.wifi.disconnect()?;
        Ok(())
    }
}
