//! Shared library for the trekking events Lambda.
//!
//! This crate provides the event model, the table access layer and the
//! gateway that serves `/events` requests.

pub mod auth;
pub mod config;
pub mod dynamo;
pub mod error;
pub mod gateway;
pub mod http;
pub mod models;
pub mod router;
pub mod store;

pub use auth::{extract_user, extract_user_from_context, AuthenticatedUser};
pub use config::{Backend, Config};
pub use dynamo::DynamoEventTable;
pub use error::{Error, Result};
pub use gateway::{Gateway, Operation, Outcome};
pub use http::InboundRequest;
pub use models::{Difficulty, Event, EventPatch, Record};
pub use store::{EventTable, InMemoryEventTable, UpdateExpression};
