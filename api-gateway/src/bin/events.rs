//! Events Lambda - CRUD operations for trekking events.
//!
//! Endpoints:
//! - GET /events - List events
//! - POST /events - Create event
//! - GET /events/{id} - Get event
//! - PUT /events/{id} - Update event (organizer only)
//! - DELETE /events/{id} - Delete event (organizer only)

use std::sync::Arc;

use aws_sdk_dynamodb::config::Region;
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::{Backend, Config, DynamoEventTable, EventTable, Gateway, InMemoryEventTable, InboundRequest};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    gateway: Gateway,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;

        let table: Arc<dyn EventTable> = match config.backend {
            Backend::DynamoDb => {
                let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                    .region(Region::new(config.aws_region.clone()))
                    .load()
                    .await;
                let client = aws_sdk_dynamodb::Client::new(&aws_config);
                Arc::new(DynamoEventTable::new(client, config.events_table.clone()))
            }
            Backend::Memory => Arc::new(InMemoryEventTable::new()),
        };

        info!(
            table = %config.events_table,
            backend = ?config.backend,
            "Events gateway initialized"
        );

        Ok(Self {
            gateway: Gateway::new(table, config.default_origin),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    state.gateway.handle(InboundRequest::from_lambda(&event)).await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
