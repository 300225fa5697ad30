//! Shared HTTP endpoint logic for both desktop and ESP32.
//!
//! This module provides platform-agnostic request handling over the
//! plain [`HttpRequest`]/[`HttpResponse`] types. The axum server
//! ([`crate::services::web`]) and the esp-idf-svc callback server
//! (`hal::esp32::http`) both translate their native requests into
//! [`HttpRequest`], call [`HttpApiHandler::handle`], and write the
//! returned [`HttpResponse`] out - so the response-code mapping lives in
//! exactly one place.
//!
//! # Example
//!
//! ```ignore
//! use rs_doorman::services::HttpApiHandler;
//!
//! let handler = HttpApiHandler::new(shared_state);
//! let response = handler.handle(&request);
//! assert_eq!(response.status, 200);
//! ```

use crate::commands::CommandKind;
use crate::dispatch::{Dispatched, DoorRequest};
use crate::messages::parse_configure_request;
use crate::traits::{HttpMethod, HttpRequest, HttpResponse};

use super::api::{ApiResponse, CommandResponse, StatusResponse};
use super::shared::DoorProvider;

/// Shared HTTP endpoint handler for both desktop and ESP32.
pub struct HttpApiHandler<P: DoorProvider> {
    state: P,
}

impl<P: DoorProvider> HttpApiHandler<P> {
    /// Create a new handler with the given provider.
    pub fn new(state: P) -> Self {
        Self { state }
    }

    /// Route a request, dispatch it, and encode the reply.
    pub fn handle(&self, req: &HttpRequest) -> HttpResponse {
        let Some(kind) = CommandKind::from_route(req.route()) else {
            return HttpResponse::not_found();
        };

        // /status is read-only; /configure carries a payload. Open and
        // close also accept GET so a browser address bar can drive them.
        match (kind, req.method) {
            (CommandKind::Status, HttpMethod::Get) => {}
            (CommandKind::Open | CommandKind::Close, _) => {}
            (CommandKind::Configure, HttpMethod::Post) => {}
            _ => return HttpResponse::error(405, "method not allowed"),
        }

        let request = match kind {
            CommandKind::Status => DoorRequest::Status,
            CommandKind::Open => DoorRequest::Open,
            CommandKind::Close => DoorRequest::Close,
            CommandKind::Configure => {
                let Some(body) = req.body.as_deref() else {
                    return HttpResponse::bad_request("missing configure payload");
                };
                match parse_configure_request(body) {
                    Some(ops) => DoorRequest::Configure(ops),
                    None => return HttpResponse::bad_request("invalid configure payload"),
                }
            }
        };

        match self.state.dispatch(&request, req.credential()) {
            Ok(reply) => encode_reply(&reply),
            Err(()) => HttpResponse::error(500, "controller error"),
        }
    }
}

/// Encode a dispatch reply as an HTTP response.
pub fn encode_reply(reply: &Dispatched) -> HttpResponse {
    match reply {
        Dispatched::Ok {
            result: "status",
            status,
        } => json_response(200, &ApiResponse::ok(StatusResponse::from(status))),
        Dispatched::Ok { result, status } => {
            json_response(200, &ApiResponse::ok(CommandResponse::new(*result, status)))
        }
        Dispatched::Unauthorized => {
            json_response(401, &ApiResponse::<()>::err("unauthorized"))
        }
        Dispatched::Rejected { reason, .. } => json_response(
            409,
            &ApiResponse::<()>::err(format!("{:?}", reason)),
        ),
        Dispatched::Invalid { error } => json_response(
            400,
            &ApiResponse::<()>::err(format!("{:?}", error)),
        ),
    }
}

// Axum integration: allow HttpResponse to be returned directly from handlers
#[cfg(feature = "web")]
impl axum::response::IntoResponse for HttpResponse {
    fn into_response(self) -> axum::response::Response {
        use axum::http::{header, StatusCode};
        use axum::response::Response;

        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, self.content_type)
            .body(axum::body::Body::from(self.body))
            .unwrap()
    }
}

fn json_response<T: serde::Serialize>(status: u16, body: &T) -> HttpResponse {
    match serde_json::to_string(body) {
        Ok(json) => HttpResponse {
            status,
            content_type: "application/json",
            body: json.into_bytes(),
        },
        Err(_) => HttpResponse::error(500, "encoding error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::CommandDispatcher;
    use crate::door::DoorController;
    use crate::hal::{MockStepper, MockStorage};
    use crate::services::shared::SharedDoorState;
    use crate::store::ConfigStore;
    use std::sync::Arc;

    const ALICE_KEY: &str = "ABCDEFGHIJKLMNOPQRST";

    fn handler() -> HttpApiHandler<Arc<SharedDoorState<MockStepper, MockStorage>>> {
        let mut store = ConfigStore::new(MockStorage::blank());
        store.load().unwrap();
        store.add_user(ALICE_KEY, "alice").unwrap();
        let door = DoorController::new(MockStepper::new(), store.config().motor, false);
        let state = Arc::new(SharedDoorState::new(CommandDispatcher::new(door, store)));
        HttpApiHandler::new(state)
    }

    fn get(path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: path.into(),
            api_key: None,
            body: None,
        }
    }

    fn post(path: &str, api_key: Option<&str>, body: Option<&str>) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: path.into(),
            api_key: api_key.map(Into::into),
            body: body.map(|b| b.as_bytes().to_vec()),
        }
    }

    #[test]
    fn status_is_open_to_everyone() {
        let handler = handler();
        let response = handler.handle(&get("/status"));
        assert_eq!(response.status, 200);
        let body = core::str::from_utf8(&response.body).unwrap();
        assert!(body.contains(r#""phase":"closed""#));
    }

    #[test]
    fn open_without_key_is_401() {
        let handler = handler();
        let response = handler.handle(&post("/open", None, None));
        assert_eq!(response.status, 401);
    }

    #[test]
    fn open_with_header_key_is_200() {
        let handler = handler();
        let response = handler.handle(&post("/open", Some(ALICE_KEY), None));
        assert_eq!(response.status, 200);
        let body = core::str::from_utf8(&response.body).unwrap();
        assert!(body.contains(r#""result":"opened""#));
        assert!(body.contains(r#""phase":"latch_open""#));
    }

    #[test]
    fn open_with_query_key_is_200() {
        let handler = handler();
        let response = handler.handle(&get(&format!("/open?key={ALICE_KEY}")));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn close_while_closed_is_409() {
        let handler = handler();
        let response = handler.handle(&post("/close", Some(ALICE_KEY), None));
        assert_eq!(response.status, 409);
    }

    #[test]
    fn configure_requires_post() {
        let handler = handler();
        let response = handler.handle(&get("/configure"));
        assert_eq!(response.status, 405);
    }

    #[test]
    fn configure_with_bad_json_is_400() {
        let handler = handler();
        let response = handler.handle(&post("/configure", Some(ALICE_KEY), Some("{oops")));
        assert_eq!(response.status, 400);
    }

    #[test]
    fn configure_motor_is_200() {
        let handler = handler();
        let body = r#"{"motor": {"speed_rpm": 12, "direction": 1, "span": 900}}"#;
        let response = handler.handle(&post("/configure", Some(ALICE_KEY), Some(body)));
        assert_eq!(response.status, 200);
    }

    #[test]
    fn unknown_route_is_404() {
        let handler = handler();
        let response = handler.handle(&get("/reboot"));
        assert_eq!(response.status, 404);
    }
}
