//! Axum-based HTTP server for the door controller API.
//!
//! Provides the endpoints:
//! - GET `/status` - Current door state (unauthenticated)
//! - GET/POST `/open` - Retract the latch (requires key)
//! - GET/POST `/close` - Re-engage the latch early (requires key)
//! - POST `/configure` - Update persisted configuration (requires key)
//! - GET `/` - Minimal control page
//!
//! The credential travels in the `X-Api-Key` header or a `key` query
//! parameter. All endpoint logic lives in
//! [`HttpApiHandler`](super::http_handler::HttpApiHandler); this module
//! only adapts axum requests to it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::traits::{ConfigStorage, HttpMethod, HttpRequest, HttpResponse, StepperMotor};

use super::api::ApiResponse;
use super::http_handler::HttpApiHandler;
use super::shared::SharedDoorState;

/// Largest accepted request body (configure payloads are small).
const MAX_BODY_BYTES: usize = 4096;

// ============================================================================
// Server Configuration
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_permissive: true,
        }
    }
}

impl WebServerConfig {
    /// Set the port to listen on
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Adapt an axum request to the shared endpoint handler.
async fn api_handler<M, S>(
    State(state): State<Arc<SharedDoorState<M, S>>>,
    request: Request,
) -> HttpResponse
where
    M: StepperMotor + Send + 'static,
    S: ConfigStorage + Send + 'static,
{
    let (parts, body) = request.into_parts();

    let method = match parts.method {
        Method::GET => HttpMethod::Get,
        Method::POST => HttpMethod::Post,
        _ => return HttpResponse::error(405, "method not allowed"),
    };

    let path = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let api_key = parts
        .headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .ok()
        .filter(|b| !b.is_empty())
        .map(|b| b.to_vec());

    let request = HttpRequest {
        method,
        path,
        api_key,
        body,
    };
    HttpApiHandler::new(state).handle(&request)
}

/// GET / - Serve the control page
async fn index() -> impl IntoResponse {
    Html(include_str!("../../www/index.html"))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::err("Not found")),
    )
}

// ============================================================================
// Router
// ============================================================================

/// Build the axum router for the door API.
pub fn build_router<M, S>(
    state: Arc<SharedDoorState<M, S>>,
    config: &WebServerConfig,
) -> Router
where
    M: StepperMotor + Send + 'static,
    S: ConfigStorage + Send + 'static,
{
    let mut router = Router::new()
        .route("/", get(index))
        .route("/status", get(api_handler))
        .route("/open", get(api_handler).post(api_handler))
        .route("/close", get(api_handler).post(api_handler))
        .route("/configure", post(api_handler))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
