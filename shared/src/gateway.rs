//! Event Store Gateway.
//!
//! Resolves a request into one of five operations and runs it against the
//! events table. Update and delete only go through for the organizer.

use std::sync::Arc;

use chrono::Utc;
use lambda_http::http::Method;
use lambda_http::{Body, Response};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::auth::AuthenticatedUser;
use crate::http::{error_response, json_response, preflight_response, InboundRequest, MessageBody};
use crate::models::{organizer_of, Event, EventPatch, Record};
use crate::router;
use crate::store::EventTable;
use crate::{Error, Result};

/// Operation requested by the caller.
#[derive(Debug)]
pub enum Operation {
    List,
    Get { id: String },
    Create { payload: Map<String, Value> },
    Update { id: String, patch: EventPatch },
    Delete { id: String },
}

/// Successful result of an operation.
#[derive(Debug)]
pub enum Outcome {
    Events(Vec<Record>),
    Event(Record),
    Created(Event),
    Updated,
    Deleted,
}

impl Outcome {
    fn render(&self, origin: &str) -> std::result::Result<Response<Body>, lambda_http::Error> {
        match self {
            Outcome::Events(records) => json_response(200, origin, records),
            Outcome::Event(record) => json_response(200, origin, record),
            Outcome::Created(event) => json_response(201, origin, event),
            Outcome::Updated => json_response(200, origin, &MessageBody::new("Event updated successfully")),
            Outcome::Deleted => json_response(200, origin, &MessageBody::new("Event deleted successfully")),
        }
    }
}

/// Dispatches operations against a single events table.
#[derive(Clone)]
pub struct Gateway {
    table: Arc<dyn EventTable>,
    default_origin: String,
}

impl Gateway {
    pub fn new(table: Arc<dyn EventTable>, default_origin: impl Into<String>) -> Self {
        Self {
            table,
            default_origin: default_origin.into(),
        }
    }

    /// Serve one HTTP request.
    ///
    /// Every outcome, including errors, becomes a response carrying CORS
    /// headers. Only a failure to build the response itself is returned as
    /// an error.
    pub async fn handle(
        &self,
        request: InboundRequest,
    ) -> std::result::Result<Response<Body>, lambda_http::Error> {
        info!(method = %request.method, path = %request.path, "Handling request");

        let origin = request
            .origin
            .clone()
            .unwrap_or_else(|| self.default_origin.clone());

        if request.method == Method::OPTIONS {
            return preflight_response(&origin);
        }

        match self.dispatch(request).await {
            Ok(outcome) => outcome.render(&origin),
            Err(e) => {
                if e.status_code() >= 500 {
                    error!("Request failed: {}", e);
                } else {
                    warn!(status = e.status_code(), "Request rejected: {}", e);
                }
                error_response(&e, &origin)
            }
        }
    }

    async fn dispatch(&self, request: InboundRequest) -> Result<Outcome> {
        let caller = request
            .caller
            .ok_or_else(|| Error::Unauthenticated("No verified caller identity".to_string()))?;

        let route = router::route(&request.path).ok_or_else(|| Error::NotFound("Not found".to_string()))?;
        let operation = router::operation(&request.method, route, request.body.as_deref())?;

        self.execute(operation, &caller).await
    }

    /// Run an operation on behalf of a verified caller.
    pub async fn execute(&self, operation: Operation, caller: &AuthenticatedUser) -> Result<Outcome> {
        match operation {
            Operation::List => Ok(Outcome::Events(self.table.scan().await?)),

            Operation::Get { id } => self
                .table
                .get(&id)
                .await?
                .map(Outcome::Event)
                .ok_or_else(not_found),

            Operation::Create { payload } => {
                let event = Event::create(payload, &caller.user_id, Utc::now())?;
                self.table.put(&event.to_record()?).await?;

                info!(event_id = %event.id, organizer_id = %event.organizer_id, "Created event");
                Ok(Outcome::Created(event))
            }

            Operation::Update { id, patch } => {
                self.authorize(&id, caller, "update").await?;

                let changes = patch.into_changes(Utc::now())?;
                self.table.update(&id, &changes).await?;

                info!(event_id = %id, attributes = changes.len(), "Updated event");
                Ok(Outcome::Updated)
            }

            Operation::Delete { id } => {
                self.authorize(&id, caller, "delete").await?;
                self.table.delete(&id).await?;

                info!(event_id = %id, "Deleted event");
                Ok(Outcome::Deleted)
            }
        }
    }

    /// Load the event and check the caller organizes it.
    ///
    /// A stored record without an organizer can be changed by nobody.
    async fn authorize(&self, id: &str, caller: &AuthenticatedUser, action: &str) -> Result<Record> {
        let record = self.table.get(id).await?.ok_or_else(not_found)?;

        if organizer_of(&record) != Some(caller.user_id.as_str()) {
            return Err(Error::Forbidden(format!(
                "Only the organizer can {} the event",
                action
            )));
        }

        Ok(record)
    }
}

fn not_found() -> Error {
    Error::NotFound("Event not found".to_string())
}
