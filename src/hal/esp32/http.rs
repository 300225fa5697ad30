//! HTTP server for the ESP32 door API.
//!
//! Runs the esp-idf-svc callback server over the same shared endpoint
//! logic as the desktop axum server
//! ([`crate::services::http_handler::HttpApiHandler`]), so both stacks
//! return identical responses and status codes. The handlers lock the
//! same dispatcher the main loop ticks; while the motor traverses, the
//! lock is held and no other request is serviced - the single-actuation
//! trade-off of the one-loop controller.
//!
//! # Endpoints
//!
//! - `GET /status` - Door state snapshot (unauthenticated)
//! - `GET/POST /open` - Retract the latch (requires key)
//! - `GET/POST /close` - Re-engage the latch early (requires key)
//! - `POST /configure` - Update persisted configuration (requires key)
//! - `GET /` - Minimal control page
//!
//! # Example
//!
//! ```ignore
//! use rs_doorman::hal::esp32::{Esp32HttpServer, HTTP_SERVER_PORT};
//! use std::sync::{Arc, Mutex};
//!
//! let dispatcher = Arc::new(Mutex::new(dispatcher));
//! let _server = Esp32HttpServer::new(HTTP_SERVER_PORT, dispatcher.clone())?;
//! ```

use crate::dispatch::{CommandDispatcher, Dispatched, DoorRequest};
use crate::door::DoorStatus;
use crate::services::http_handler::HttpApiHandler;
use crate::services::shared::DoorProvider;
use crate::traits::{Clock, ConfigStorage, HttpMethod, HttpRequest, StepperMotor};
use esp_idf_hal::io::Write;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method;
use esp_idf_svc::io::EspIOError;
use std::sync::{Arc, Mutex};

use super::clock::Esp32Clock;

/// TCP port of the on-device API.
pub const HTTP_SERVER_PORT: u16 = 80;

/// Largest accepted request body (configure payloads are small).
const MAX_BODY_BYTES: usize = 1024;

/// HTTP server for the door control API.
///
/// Holds the esp-idf server alive; dropping this struct stops it.
pub struct Esp32HttpServer {
    _server: EspHttpServer<'static>,
}

/// [`DoorProvider`] over the mutex-guarded dispatcher shared with the
/// main loop.
struct LockedDispatcher<M: StepperMotor, S: ConfigStorage> {
    dispatcher: Arc<Mutex<CommandDispatcher<M, S>>>,
    clock: Esp32Clock,
}

impl<M: StepperMotor, S: ConfigStorage> Clone for LockedDispatcher<M, S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            clock: self.clock,
        }
    }
}

impl<M, S> DoorProvider for LockedDispatcher<M, S>
where
    M: StepperMotor + Send + 'static,
    S: ConfigStorage + Send + 'static,
{
    fn dispatch(&self, request: &DoorRequest, credential: Option<&str>) -> Result<Dispatched, ()> {
        let now_ms = self.clock.now_ms();
        let mut guard = self.dispatcher.lock().unwrap();
        guard.dispatch(request, credential, now_ms).map_err(|_| ())
    }

    fn status(&self) -> DoorStatus {
        let now_ms = self.clock.now_ms();
        self.dispatcher.lock().unwrap().status(now_ms)
    }

    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl Esp32HttpServer {
    /// Start the API server over the shared dispatcher.
    pub fn new<M, S>(
        port: u16,
        dispatcher: Arc<Mutex<CommandDispatcher<M, S>>>,
    ) -> anyhow::Result<Self>
    where
        M: StepperMotor + Send + 'static,
        S: ConfigStorage + Send + 'static,
    {
        let server_config = Configuration {
            http_port: port,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&server_config)?;

        let provider = LockedDispatcher {
            dispatcher,
            clock: Esp32Clock::new(),
        };

        register(&mut server, "/status", Method::Get, provider.clone())?;
        register(&mut server, "/open", Method::Get, provider.clone())?;
        register(&mut server, "/open", Method::Post, provider.clone())?;
        register(&mut server, "/close", Method::Get, provider.clone())?;
        register(&mut server, "/close", Method::Post, provider.clone())?;
        register(&mut server, "/configure", Method::Post, provider)?;

        // GET / - Serve the control page (shared with desktop)
        server.fn_handler("/", Method::Get, move |req| {
            let html = include_str!("../../../www/index.html");
            let mut resp = req.into_response(200, None, &[("Content-Type", "text/html")])?;
            resp.write_all(html.as_bytes())?;
            Ok::<_, EspIOError>(())
        })?;

        println!("[HTTP] Server started on port {}", port);

        Ok(Self { _server: server })
    }
}

/// Register one route on the esp-idf server, adapting its request shape
/// to the shared handler.
fn register<M, S>(
    server: &mut EspHttpServer<'static>,
    path: &str,
    method: Method,
    provider: LockedDispatcher<M, S>,
) -> anyhow::Result<()>
where
    M: StepperMotor + Send + 'static,
    S: ConfigStorage + Send + 'static,
{
    let our_method = match method {
        Method::Post => HttpMethod::Post,
        _ => HttpMethod::Get,
    };

    server.fn_handler(path, method, move |mut req| {
        let api_key = req.header("X-Api-Key").map(String::from);
        let path = req.uri().to_string();

        let body = if our_method == HttpMethod::Post {
            let mut buf = [0u8; MAX_BODY_BYTES];
            let len = req.read(&mut buf).unwrap_or(0);
            (len > 0).then(|| buf[..len].to_vec())
        } else {
            None
        };

        let request = HttpRequest {
            method: our_method,
            path,
            api_key,
            body,
        };
        let response = HttpApiHandler::new(provider.clone()).handle(&request);

        let mut resp = req.into_response(
            response.status,
            None,
            &[("Content-Type", response.content_type)],
        )?;
        resp.write_all(&response.body)?;
        Ok::<_, EspIOError>(())
    })?;
    Ok(())
}
