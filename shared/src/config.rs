//! Configuration management for the events Lambda.

use std::env;

use crate::{Error, Result};

/// Fallback CORS origin when a request carries no `Origin` header.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Where event records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// DynamoDB table named by `EVENTS_TABLE`
    DynamoDb,
    /// Process-local map, for local runs
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the events table
    pub events_table: String,
    /// Storage backend
    pub backend: Backend,
    /// AWS region
    pub aws_region: String,
    /// CORS origin used when the request does not declare one
    pub default_origin: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("EVENTS_BACKEND").as_deref() {
            None | Some("dynamodb") => Backend::DynamoDb,
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(Error::Config(format!(
                    "EVENTS_BACKEND must be 'dynamodb' or 'memory', got '{}'",
                    other
                )))
            }
        };

        let events_table = match (lookup("EVENTS_TABLE"), backend) {
            (Some(table), _) if !table.is_empty() => table,
            (_, Backend::Memory) => "events".to_string(),
            (_, Backend::DynamoDb) => {
                return Err(Error::Config("EVENTS_TABLE not set".to_string()))
            }
        };

        Ok(Self {
            events_table,
            backend,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            default_origin: lookup("DEFAULT_ORIGIN").unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_dynamodb_defaults() {
        let config = Config::from_lookup(lookup(&[("EVENTS_TABLE", "EventsTable-abc")])).unwrap();
        assert_eq!(config.backend, Backend::DynamoDb);
        assert_eq!(config.events_table, "EventsTable-abc");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.default_origin, DEFAULT_ORIGIN);
    }

    #[test]
    fn test_dynamodb_requires_table() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_memory_backend_needs_no_table() {
        let config = Config::from_lookup(lookup(&[
            ("EVENTS_BACKEND", "memory"),
            ("DEFAULT_ORIGIN", "https://main.amplifyapp.com"),
        ]))
        .unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.events_table, "events");
        assert_eq!(config.default_origin, "https://main.amplifyapp.com");
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let err = Config::from_lookup(lookup(&[("EVENTS_BACKEND", "postgres")])).unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }
}
