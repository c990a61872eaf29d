//! HTTP helpers for the events Lambda.

use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use serde::Serialize;
use tracing::debug;

use crate::auth::{extract_user, AuthenticatedUser};
use crate::Error;

const ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token,X-Amz-User-Agent,Origin";
const ALLOW_METHODS: &str = "OPTIONS,GET,PUT,POST,DELETE";
const MAX_AGE: &str = "86400";

/// The parts of an API Gateway request the gateway looks at.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    pub path: String,
    /// Declared `Origin` header
    pub origin: Option<String>,
    /// Verified caller, if the authorizer supplied one
    pub caller: Option<AuthenticatedUser>,
    /// Request body; empty bodies are `None`
    pub body: Option<Vec<u8>>,
}

impl InboundRequest {
    pub fn from_lambda(event: &Request) -> Self {
        let caller = match extract_user(event) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("No caller identity: {}", e);
                None
            }
        };

        let origin = event
            .headers()
            .get("origin")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body: &[u8] = event.body().as_ref();

        Self {
            method: event.method().clone(),
            path: event.uri().path().to_string(),
            origin,
            caller,
            body: (!body.is_empty()).then(|| body.to_vec()),
        }
    }
}

/// `{"message": ...}` body used for acknowledgments and errors.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: None,
        }
    }
}

/// Cross-origin headers mirroring the caller's origin.
pub fn cors_headers(origin: &str) -> [(&'static str, &str); 5] {
    [
        ("access-control-allow-origin", origin),
        ("access-control-allow-headers", ALLOW_HEADERS),
        ("access-control-allow-methods", ALLOW_METHODS),
        ("access-control-allow-credentials", "true"),
        ("access-control-max-age", MAX_AGE),
    ]
}

/// Create a JSON response with the given status code, data and CORS headers.
pub fn json_response<T: Serialize>(
    status: u16,
    origin: &str,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    let mut builder = Response::builder()
        .status(status)
        .header("content-type", "application/json");
    for (name, value) in cors_headers(origin) {
        builder = builder.header(name, value);
    }

    Ok(builder.body(Body::from(serde_json::to_string(data)?))?)
}

/// Empty 200 answer to a CORS preflight.
pub fn preflight_response(origin: &str) -> Result<Response<Body>, lambda_http::Error> {
    let mut builder = Response::builder().status(200);
    for (name, value) in cors_headers(origin) {
        builder = builder.header(name, value);
    }

    Ok(builder.body(Body::Empty)?)
}

/// Render an error as its status code and message body.
///
/// Server errors carry the underlying cause in `error`.
pub fn error_response(err: &Error, origin: &str) -> Result<Response<Body>, lambda_http::Error> {
    let status = err.status_code();
    let body = MessageBody {
        message: err.public_message(),
        error: (status == 500).then(|| err.to_string()),
    };
    json_response(status, origin, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn body_json(response: &Response<Body>) -> Value {
        serde_json::from_slice(response.body().as_ref()).unwrap()
    }

    #[test]
    fn test_json_response_carries_cors() {
        let response = json_response(201, "https://main.amplifyapp.com", &MessageBody::new("ok")).unwrap();

        assert_eq!(response.status(), 201);
        let headers = response.headers();
        assert_eq!(headers["content-type"], "application/json");
        assert_eq!(headers["access-control-allow-origin"], "https://main.amplifyapp.com");
        assert_eq!(headers["access-control-allow-credentials"], "true");
        assert_eq!(headers["access-control-allow-methods"], ALLOW_METHODS);
        assert_eq!(headers["access-control-max-age"], "86400");
        assert_eq!(body_json(&response), serde_json::json!({"message": "ok"}));
    }

    #[test]
    fn test_error_bodies() {
        let response = error_response(&Error::Forbidden("Only the organizer can update the event".into()), "o").unwrap();
        assert_eq!(response.status(), 403);
        assert_eq!(
            body_json(&response),
            serde_json::json!({"message": "Only the organizer can update the event"})
        );

        let response = error_response(&Error::Aws("Failed to scan events: timeout".into()), "o").unwrap();
        assert_eq!(response.status(), 500);
        assert_eq!(
            body_json(&response),
            serde_json::json!({
                "message": "Internal server error",
                "error": "AWS error: Failed to scan events: timeout",
            })
        );
    }

    #[test]
    fn test_preflight_is_empty() {
        let response = preflight_response("http://localhost:3000").unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.body().is_empty());
        assert_eq!(response.headers()["access-control-allow-origin"], "http://localhost:3000");
    }

    #[test]
    fn test_from_lambda_reads_origin_and_body() {
        let request = lambda_http::http::Request::builder()
            .method("POST")
            .uri("/prod/events")
            .header("origin", "https://main.amplifyapp.com")
            .body(Body::from(r#"{"title":"Ridge Hike"}"#))
            .unwrap();

        let inbound = InboundRequest::from_lambda(&request);
        assert_eq!(inbound.method, Method::POST);
        assert_eq!(inbound.path, "/prod/events");
        assert_eq!(inbound.origin.as_deref(), Some("https://main.amplifyapp.com"));
        assert_eq!(inbound.body.as_deref(), Some(br#"{"title":"Ridge Hike"}"#.as_slice()));
        assert!(inbound.caller.is_none());
    }

    #[test]
    fn test_from_lambda_empty_body() {
        let request = lambda_http::http::Request::builder()
            .method("PUT")
            .uri("/events/e1")
            .body(Body::Text(String::new()))
            .unwrap();

        assert!(InboundRequest::from_lambda(&request).body.is_none());
    }
}
