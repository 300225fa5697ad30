//! Network abstraction types for the HTTP command endpoint.
//!
//! The door controller is driven over a small REST-ish API:
//!
//! ```text
//! GET  /status     - Door state snapshot (unauthenticated)
//! POST /open       - Retract the latch (requires key)
//! POST /close      - Re-engage the latch early (requires key)
//! POST /configure  - Update persisted configuration (requires key)
//! ```
//!
//! The credential travels in the `X-Api-Key` header or a `key` query
//! parameter. Desktop builds serve this API with axum
//! ([`crate::services::web`]); the ESP32 build uses the esp-idf-svc
//! callback server. The plain request/response types below exist so the
//! endpoint logic can be exercised with [`crate::hal::MockHttp`] without
//! either stack.

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

// ============================================================================
// HTTP Server Trait
// ============================================================================

/// Minimal HTTP server trait for mock-driven endpoint tests.
///
/// # Implementation Notes
///
/// - `recv_request` should block until a request arrives
/// - `send_response` must complete the HTTP transaction
/// - For production, use axum (`web` feature) or the ESP32 callback
///   server (`esp32-http` feature); neither goes through this trait
pub trait HttpServer {
    /// Error type for HTTP operations.
    type Error;

    /// Wait for and receive the next HTTP request.
    ///
    /// Returns `None` if the server is shutting down.
    fn recv_request(&mut self) -> impl core::future::Future<Output = Option<HttpRequest>>;

    /// Send an HTTP response for the current request.
    fn send_response(
        &mut self,
        response: HttpResponse,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// HTTP request methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    /// HTTP GET request (retrieve state; also accepted for open/close so
    /// bare-bones clients can drive the door from a browser address bar).
    Get,
    /// HTTP POST request (actions).
    Post,
}

/// An HTTP request received by the server.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method (GET or POST).
    pub method: HttpMethod,
    /// Request path, possibly with a query string (e.g. "/open?key=...").
    pub path: String,
    /// Presented credential from the `X-Api-Key` header, if any.
    pub api_key: Option<String>,
    /// Request body, if present (for POST).
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Returns the path without its query string.
    pub fn route(&self) -> &str {
        match self.path.split_once('?') {
            Some((route, _)) => route,
            None => &self.path,
        }
    }

    /// Returns the value of a query parameter, if present.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        let (_, query) = self.path.split_once('?')?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k == name).then_some(v)
        })
    }

    /// Returns the presented credential: header first, then `key` query
    /// parameter.
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().or_else(|| self.query_param("key"))
    }

    /// Returns the body as a UTF-8 string, if valid.
    pub fn body_str(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| core::str::from_utf8(b).ok())
    }
}

/// An HTTP response to send to the client.
#[derive(Debug)]
pub struct HttpResponse {
    /// HTTP status code (e.g., 200, 401, 409).
    pub status: u16,
    /// Content-Type header value.
    pub content_type: &'static str,
    /// Response body as bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a 200 OK response with JSON content.
    pub fn ok_json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    /// Creates a 200 OK response with HTML content.
    pub fn ok_html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body: body.as_bytes().to_vec(),
        }
    }

    /// Creates an error response with the given status code.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: alloc::format!(r#"{{"error":"{}"}}"#, message).into_bytes(),
        }
    }

    /// Creates a 401 Unauthorized response.
    pub fn unauthorized() -> Self {
        Self::error(401, "unauthorized")
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        Self::error(404, "not found")
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request(message: &str) -> Self {
        Self::error(400, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: path.into(),
            api_key: None,
            body: None,
        }
    }

    #[test]
    fn route_strips_query() {
        let req = request("/open?key=abc");
        assert_eq!(req.route(), "/open");

        let req = request("/status");
        assert_eq!(req.route(), "/status");
    }

    #[test]
    fn query_param_lookup() {
        let req = request("/open?key=abc&foo=1");
        assert_eq!(req.query_param("key"), Some("abc"));
        assert_eq!(req.query_param("foo"), Some("1"));
        assert_eq!(req.query_param("bar"), None);
    }

    #[test]
    fn credential_prefers_header() {
        let mut req = request("/open?key=from-query");
        req.api_key = Some("from-header".into());
        assert_eq!(req.credential(), Some("from-header"));

        let req = request("/open?key=from-query");
        assert_eq!(req.credential(), Some("from-query"));

        let req = request("/open");
        assert_eq!(req.credential(), None);
    }

    #[test]
    fn response_helpers() {
        let ok = HttpResponse::ok_json(r#"{"ok":true}"#);
        assert_eq!(ok.status, 200);
        assert_eq!(ok.content_type, "application/json");

        let unauth = HttpResponse::unauthorized();
        assert_eq!(unauth.status, 401);

        let bad = HttpResponse::bad_request("nope");
        assert_eq!(bad.status, 400);
        assert!(core::str::from_utf8(&bad.body).unwrap().contains("nope"));
    }
}
