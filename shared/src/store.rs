//! Table access for event records.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::{Changes, Record};
use crate::{Error, Result};

/// Key-value table holding every event, keyed by `id`.
///
/// Each method is a single round trip; callers get no locking or versioning.
#[async_trait]
pub trait EventTable: Send + Sync {
    /// Read every record.
    async fn scan(&self) -> Result<Vec<Record>>;

    /// Point read.
    async fn get(&self, id: &str) -> Result<Option<Record>>;

    /// Write a full record, replacing any previous one with the same id.
    async fn put(&self, record: &Record) -> Result<()>;

    /// Overwrite the given attributes of an existing record.
    ///
    /// Returns `Error::NotFound` if the record no longer exists.
    async fn update(&self, id: &str, changes: &Changes) -> Result<()>;

    /// Remove a record. Removing a missing record is not an error.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// `SET` update expression with its placeholder maps.
///
/// Placeholders are positional (`#f0 = :v0`) so any attribute name can be
/// set.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, Value>,
}

impl UpdateExpression {
    /// Build the expression for a set of assignments. `None` if there is
    /// nothing to set.
    pub fn set(changes: &Changes) -> Option<Self> {
        if changes.is_empty() {
            return None;
        }

        let mut clauses = Vec::with_capacity(changes.len());
        let mut names = HashMap::with_capacity(changes.len());
        let mut values = HashMap::with_capacity(changes.len());

        for (i, (name, value)) in changes.iter().enumerate() {
            clauses.push(format!("#f{0} = :v{0}", i));
            names.insert(format!("#f{}", i), name.clone());
            values.insert(format!(":v{}", i), value.clone());
        }

        Some(Self {
            expression: format!("SET {}", clauses.join(", ")),
            names,
            values,
        })
    }
}

/// Process-local table.
#[derive(Debug, Default)]
pub struct InMemoryEventTable {
    items: RwLock<HashMap<String, Record>>,
}

impl InMemoryEventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl EventTable for InMemoryEventTable {
    async fn scan(&self) -> Result<Vec<Record>> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn put(&self, record: &Record) -> Result<()> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Internal("Record has no id".to_string()))?;

        self.items.write().await.insert(id.to_string(), record.clone());
        Ok(())
    }

    async fn update(&self, id: &str, changes: &Changes) -> Result<()> {
        let mut items = self.items.write().await;
        let record = items
            .get_mut(id)
            .ok_or_else(|| Error::NotFound("Event not found".to_string()))?;

        for (name, value) in changes {
            record.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.items.write().await.remove(id);
        Ok(())
    }
}
