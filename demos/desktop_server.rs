//! Desktop server example for exercising the web API without hardware.
//!
//! Runs the axum server over mock hardware, allowing you to:
//! - Access the control page at http://localhost:8080
//! - Drive all API endpoints with curl
//! - Watch the auto-close timer re-engage the latch
//!
//! # Usage
//!
//! ```sh
//! cargo run --example desktop_server --features web
//!
//! curl http://localhost:8080/status
//! curl -X POST -H 'X-Api-Key: ABCDEFGHIJKLMNOPQRST' http://localhost:8080/open
//! ```

use std::sync::Arc;
use std::time::Duration;

use rs_doorman::captor::CaptorMonitor;
use rs_doorman::dispatch::CommandDispatcher;
use rs_doorman::door::DoorController;
use rs_doorman::hal::{MockCaptor, MockStepper, MockStorage};
use rs_doorman::services::{build_router, SharedDoorState, WebServerConfig};
use rs_doorman::store::ConfigStore;

/// Demo credential pre-seeded into the user table.
const DEMO_KEY: &str = "ABCDEFGHIJKLMNOPQRST";

/// Raw captor level meaning "door open" (matches the device wiring).
const CAPTOR_OPEN_LEVEL: bool = false;

fn main() {
    // Initialize the tokio runtime
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");

    rt.block_on(async {
        println!("=================================");
        println!("  rs-doorman Desktop Server");
        println!("=================================");
        println!();

        // Boot sequence against in-memory storage
        let mut store = ConfigStore::new(MockStorage::blank());
        store.load().expect("config load");
        store.add_user(DEMO_KEY, "demo").expect("seed demo user");

        let door = DoorController::new(MockStepper::new(), store.config().motor, false);
        let dispatcher = CommandDispatcher::new(door, store);

        let web_config = WebServerConfig::default();
        println!("Control page: http://{}", web_config.addr);
        println!("Demo key:     {}", DEMO_KEY);
        println!();
        println!("Press Ctrl+C to stop.");
        println!();

        // Single shared state for handlers and the tick loop
        let state = Arc::new(SharedDoorState::new(dispatcher));
        spawn_tick_loop(Arc::clone(&state));

        let router = build_router(Arc::clone(&state), &web_config);
        let listener = tokio::net::TcpListener::bind(web_config.addr)
            .await
            .unwrap();
        axum::serve(listener, router).await.unwrap();
    });
}

/// Spawn the 20ms tick loop.
///
/// This task samples the (mock) captor, advances the auto-close timer,
/// and settles `Closing` back to `Closed` - the same loop the firmware
/// runs.
fn spawn_tick_loop(state: Arc<SharedDoorState<MockStepper, MockStorage>>) {
    tokio::spawn(async move {
        // The mock door never physically opens; the captor stays closed
        let mut captor = CaptorMonitor::new(MockCaptor::reading(true), CAPTOR_OPEN_LEVEL);
        let mut interval = tokio::time::interval(Duration::from_millis(20));
        loop {
            interval.tick().await;
            let now_ms = state.now_ms();
            let door_open = captor.sample(now_ms).ok();
            state.with_dispatcher(|dispatcher| {
                let _ = dispatcher.tick(now_ms, door_open);
            });
        }
    });
}
