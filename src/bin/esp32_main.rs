//! ESP32 door-opener controller.
//!
//! This is the main entry point for the physical hardware controller.
//! It boots the persisted configuration, associates to WiFi, starts the
//! HTTP API, and runs a 50Hz control loop that:
//! - Samples and debounces the door captor
//! - Advances the latch state machine (auto-close timer)
//! - Mirrors the latch state on the red LED and blinks the blue one
//!
//! # Hardware Setup
//!
//! - GPIO14/12/13/15 -> ULN2003 IN1..IN4 (latch stepper)
//! - GPIO4           -> reed captor (pull-up, low = door open)
//! - GPIO16          -> red LED (latch open indicator)
//! - GPIO2           -> blue LED (heartbeat)
//!
//! # Build
//!
//! ```bash
//! # Full device (WiFi + HTTP API)
//! cargo build --bin esp32_main --features esp32-net
//!
//! # Provisioning credentials at compile time
//! WIFI_SSID=mynet WIFI_PASSWORD=secret cargo build --bin esp32_main --features esp32-net
//! ```

use esp_idf_hal::gpio::IOPin;
use esp_idf_hal::gpio::OutputPin;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use rs_doorman::captor::CaptorMonitor;
use rs_doorman::dispatch::CommandDispatcher;
use rs_doorman::door::DoorController;
use rs_doorman::hal::esp32::{Esp32Captor, Esp32Clock, Esp32Delay, Esp32Led, Esp32Phases, Esp32Storage};
use rs_doorman::motor::StepperDriver;
use rs_doorman::store::ConfigStore;
use rs_doorman::traits::{Clock, StatusLed};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Main loop interval in milliseconds (50Hz = 20ms)
const LOOP_INTERVAL_MS: u64 = 20;

/// Heartbeat LED half-period
const TIME_BETWEEN_BLINKS_MS: u64 = 800;

/// Raw captor level meaning "door open" (reed pulls the line low when
/// the door sits against the frame)
const CAPTOR_OPEN_LEVEL: bool = false;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();

    println!();
    println!("================================");
    println!("  rs-doorman Controller");
    println!("================================");
    println!();

    let peripherals = Peripherals::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // =========================================================================
    // Load persisted configuration (defaults on first boot)
    // =========================================================================
    let storage = Esp32Storage::new(nvs.clone())?;
    let mut store = ConfigStore::new(storage);
    let config = *store
        .load()
        .map_err(|e| anyhow::anyhow!("config load failed: {:?}", e))?;
    println!(
        "[OK] Config loaded ({} users, motor {}rpm span {})",
        config.user_count(),
        config.motor.speed_rpm,
        config.motor.span
    );

    // Compile-time credentials take over when the record has none
    let ssid = if config.wifi_ssid.is_empty() {
        option_env!("WIFI_SSID").unwrap_or("")
    } else {
        config.wifi_ssid.as_str()
    };
    let password = if config.wifi_ssid.is_empty() {
        option_env!("WIFI_PASSWORD").unwrap_or("")
    } else {
        config.wifi_password.as_str()
    };

    // =========================================================================
    // Status LEDs (GPIO16 red, GPIO2 blue; both active-low on-board)
    // =========================================================================
    let mut red_led = Esp32Led::new(peripherals.pins.gpio16.downgrade_output(), true)?;
    let mut blue_led = Esp32Led::new(peripherals.pins.gpio2.downgrade_output(), true)?;
    println!("[OK] LEDs initialized (GPIO16/GPIO2)");

    // =========================================================================
    // WiFi (required for the HTTP API)
    // =========================================================================
    #[cfg(feature = "wifi")]
    let _wifi = {
        use rs_doorman::hal::esp32::Esp32Wifi;

        if ssid.is_empty() {
            println!("[SKIP] WiFi not configured (set WIFI_SSID/WIFI_PASSWORD or /configure)");
            None
        } else {
            use esp_idf_svc::eventloop::EspSystemEventLoop;
            let sysloop = EspSystemEventLoop::take()?;
            let wifi = Esp32Wifi::connect(peripherals.modem, sysloop, Some(nvs), ssid, password)?;
            println!("[OK] WiFi connected: {:?}", wifi.ip_addr());
            Some(wifi)
        }
    };
    #[cfg(not(feature = "wifi"))]
    let _ = (ssid, password);

    // =========================================================================
    // Latch stepper (ULN2003 on GPIO14/12/13/15)
    // =========================================================================
    let phases = Esp32Phases::new(
        peripherals.pins.gpio14.downgrade_output(),
        peripherals.pins.gpio12.downgrade_output(),
        peripherals.pins.gpio13.downgrade_output(),
        peripherals.pins.gpio15.downgrade_output(),
    )?;
    let motor = StepperDriver::new(phases, Esp32Delay::new());
    println!("[OK] Stepper initialized (GPIO14/12/13/15)");

    // =========================================================================
    // Door captor (GPIO4, pull-up, active-low)
    // =========================================================================
    let captor_pin = peripherals.pins.gpio4.downgrade();
    let mut captor = CaptorMonitor::new(Esp32Captor::new(captor_pin)?, CAPTOR_OPEN_LEVEL);
    let initially_open = captor
        .prime()
        .map_err(|e| anyhow::anyhow!("captor read failed: {:?}", e))?;
    println!(
        "[OK] Captor initialized (GPIO4, door {})",
        if initially_open { "open" } else { "closed" }
    );

    // =========================================================================
    // State machine + dispatcher
    // =========================================================================
    let door = DoorController::new(motor, config.motor, initially_open);
    let dispatcher = Arc::new(Mutex::new(CommandDispatcher::new(door, store)));

    // =========================================================================
    // HTTP API
    // =========================================================================
    #[cfg(feature = "esp32-http")]
    let _server = {
        use rs_doorman::hal::esp32::{Esp32HttpServer, HTTP_SERVER_PORT};
        let server = Esp32HttpServer::new(HTTP_SERVER_PORT, Arc::clone(&dispatcher))?;
        println!("[OK] HTTP API on port {}", HTTP_SERVER_PORT);
        server
    };

    let clock = Esp32Clock::new();

    println!();
    println!("Endpoints:");
    println!("  GET  /status     - door state");
    println!("  POST /open       - retract latch (X-Api-Key)");
    println!("  POST /close      - re-engage latch (X-Api-Key)");
    println!("  POST /configure  - update configuration (X-Api-Key)");
    println!();
    println!("Starting control loop (50Hz)...");
    println!();

    let mut blue_on = false;
    let mut last_blink_ms = clock.now_ms();

    // =========================================================================
    // Main Control Loop (50Hz)
    // =========================================================================
    loop {
        let now = clock.now_ms();

        // ---------------------------------------------------------------------
        // Sample the captor and advance the state machine
        // ---------------------------------------------------------------------
        let door_open = captor.sample(now).ok();

        let status = {
            let mut guard = dispatcher.lock().unwrap();
            if let Err(e) = guard.tick(now, door_open) {
                println!("[WARN] motor fault during auto-close: {:?}", e);
            }
            guard.status(now)
        };

        // ---------------------------------------------------------------------
        // LEDs: red mirrors the latch, blue blinks as heartbeat
        // ---------------------------------------------------------------------
        let _ = red_led.set(status.latch_open);
        if now.saturating_sub(last_blink_ms) >= TIME_BETWEEN_BLINKS_MS {
            blue_on = !blue_on;
            last_blink_ms = now;
            let _ = blue_led.set(blue_on);
        }

        // Sleep until next tick
        thread::sleep(Duration::from_millis(LOOP_INTERVAL_MS));
    }
}
