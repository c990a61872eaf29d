//! Maps method + path + body onto a gateway operation.

use lambda_http::http::Method;
use serde_json::{Map, Value};

use crate::gateway::Operation;
use crate::models::EventPatch;
use crate::{Error, Result};

const RESOURCE: &str = "events";

/// Resource addressed by a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/events`
    Collection,
    /// `/events/{id}`
    Item(String),
}

/// Resolve a path, tolerating a single leading stage segment such as `/prod`.
pub fn route(path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let start = segments.iter().position(|s| *s == RESOURCE)?;
    if start > 1 {
        return None;
    }

    match &segments[start + 1..] {
        [] => Some(Route::Collection),
        [id] => urlencoding::decode(id).ok().map(|id| Route::Item(id.into_owned())),
        _ => None,
    }
}

/// Build the operation for a routed request.
pub fn operation(method: &Method, route: Route, body: Option<&[u8]>) -> Result<Operation> {
    match (method, route) {
        (&Method::GET, Route::Collection) => Ok(Operation::List),
        (&Method::GET, Route::Item(id)) => Ok(Operation::Get { id }),
        (&Method::POST, Route::Collection) => {
            let body = body.ok_or_else(|| Error::BadRequest("Missing request body".to_string()))?;
            let payload: Map<String, Value> = parse_body(body)?;
            Ok(Operation::Create { payload })
        }
        (&Method::PUT, Route::Item(id)) => {
            let patch = match body {
                Some(body) => EventPatch::from_payload(parse_body(body)?)?,
                None => EventPatch::default(),
            };
            Ok(Operation::Update { id, patch })
        }
        (&Method::DELETE, Route::Item(id)) => Ok(Operation::Delete { id }),
        (&Method::PUT, Route::Collection) | (&Method::DELETE, Route::Collection) => {
            Err(Error::BadRequest("Event ID is required".to_string()))
        }
        _ => Err(Error::MethodNotAllowed),
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::BadRequest(format!("Invalid request body: {}", e)))
}
