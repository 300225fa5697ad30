//! Network services for the HTTP command endpoint.
//!
//! The endpoint logic is split the same way on every platform:
//!
//! - `shared`: one [`SharedDoorState`](shared::SharedDoorState) wraps the
//!   dispatcher for thread-safe access from handlers and the tick loop
//! - `api`: JSON response types
//! - `http_handler`: platform-agnostic routing/encoding over plain
//!   request/response types
//! - `web` (feature `web`): the axum server adapting to `http_handler`
//!
//! The ESP32 callback server (`hal::esp32::http`, feature `esp32-http`)
//! adapts to the same `http_handler`, so both stacks return identical
//! responses.
//!
//! ```ignore
//! use std::sync::Arc;
//! use rs_doorman::services::{build_router, SharedDoorState, WebServerConfig};
//!
//! let state = Arc::new(SharedDoorState::new(dispatcher));
//! let router = build_router(Arc::clone(&state), &WebServerConfig::default());
//! ```

// Shared state and endpoint logic (used by both web and esp32-http)
#[cfg(any(feature = "web", feature = "esp32-http"))]
pub mod shared;

#[cfg(any(feature = "web", feature = "esp32-http"))]
pub mod api;

#[cfg(any(feature = "web", feature = "esp32-http"))]
pub mod http_handler;

#[cfg(feature = "web")]
pub mod web;

// Re-exports
#[cfg(any(feature = "web", feature = "esp32-http"))]
pub use shared::*;

#[cfg(any(feature = "web", feature = "esp32-http"))]
pub use api::*;

#[cfg(any(feature = "web", feature = "esp32-http"))]
pub use http_handler::*;

#[cfg(feature = "web")]
pub use web::*;
