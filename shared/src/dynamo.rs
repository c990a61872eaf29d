//! DynamoDB-backed event table.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use tracing::debug;

use crate::models::{Changes, Record};
use crate::store::{EventTable, UpdateExpression};
use crate::{Error, Result};

/// A DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

const KEY_ATTRIBUTE: &str = "id";

/// Events table in DynamoDB, partitioned on `id`.
#[derive(Debug, Clone)]
pub struct DynamoEventTable {
    client: DynamoClient,
    table_name: String,
}

impl DynamoEventTable {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    fn key(id: &str) -> AttributeValue {
        AttributeValue::S(id.to_string())
    }
}

#[async_trait]
impl EventTable for DynamoEventTable {
    async fn scan(&self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| Error::Aws(format!("Failed to scan events: {}", e)))?;

            for item in output.items.unwrap_or_default() {
                records.push(from_item(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => {
                    debug!("Scan page returned, continuing from last evaluated key");
                    start_key = Some(key);
                }
                _ => break,
            }
        }

        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<Record>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to get event: {}", e)))?;

        output.item.map(from_item).transpose()
    }

    async fn put(&self, record: &Record) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(record)?))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to put event: {}", e)))?;

        Ok(())
    }

    async fn update(&self, id: &str, changes: &Changes) -> Result<()> {
        let Some(update) = UpdateExpression::set(changes) else {
            return Ok(());
        };

        let mut names = update.names;
        names.insert("#pk".to_string(), KEY_ATTRIBUTE.to_string());

        let mut values = Item::with_capacity(update.values.len());
        for (placeholder, value) in update.values {
            let attribute = serde_dynamo::to_attribute_value(value)
                .map_err(|e| Error::Internal(format!("Failed to convert attribute: {}", e)))?;
            values.insert(placeholder, attribute);
        }

        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .update_expression(update.expression)
            .condition_expression("attribute_exists(#pk)")
            .set_expression_attribute_names(Some(names))
            .set_expression_attribute_values(Some(values))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false) =>
            {
                Err(Error::NotFound("Event not found".to_string()))
            }
            Err(e) => Err(Error::Aws(format!("Failed to update event: {}", e))),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(KEY_ATTRIBUTE, Self::key(id))
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to delete event: {}", e)))?;

        Ok(())
    }
}

/// Convert a record into a DynamoDB item.
pub fn to_item(record: &Record) -> Result<Item> {
    serde_dynamo::to_item(record).map_err(|e| Error::Internal(format!("Failed to convert event: {}", e)))
}

/// Read a DynamoDB item back as stored, without imposing the event model.
pub fn from_item(item: Item) -> Result<Record> {
    serde_dynamo::from_item(item).map_err(|e| Error::Internal(format!("Failed to read event: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Event;
    use chrono::Utc;
    use serde_json::{json, Map, Value};

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    #[test]
    fn test_item_shape() {
        let payload = match json!({
            "title": "Ridge Hike",
            "difficulty": "hard",
            "maxParticipants": 8,
            "requirements": ["boots", "water"],
            "route": {"distanceKm": 12.5, "loop": true},
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let record = Event::create(payload, "u1", Utc::now()).unwrap().to_record().unwrap();

        let item = to_item(&record).unwrap();
        assert_eq!(item.get("organizerId"), Some(&s("u1")));
        assert_eq!(item.get("maxParticipants"), Some(&AttributeValue::N("8".to_string())));
        assert_eq!(item.get("participants"), Some(&AttributeValue::L(Vec::new())));
        assert_eq!(
            item.get("requirements"),
            Some(&AttributeValue::L(vec![s("boots"), s("water")]))
        );
        assert!(!item.contains_key("updatedAt"));

        assert_eq!(from_item(item).unwrap(), record);
    }

    #[test]
    fn test_off_model_item_reads_verbatim() {
        let item: Item = HashMap::from([
            ("id".to_string(), s("e1")),
            ("organizerId".to_string(), s("u1")),
            ("createdAt".to_string(), s("2024-05-01T10:00:00.000Z")),
            ("maxParticipants".to_string(), s("10")),
            ("difficulty".to_string(), s("brutal")),
        ]);

        let record = from_item(item).unwrap();

        let mut expected = Map::new();
        expected.insert("id".to_string(), json!("e1"));
        expected.insert("organizerId".to_string(), json!("u1"));
        expected.insert("createdAt".to_string(), json!("2024-05-01T10:00:00.000Z"));
        expected.insert("maxParticipants".to_string(), json!("10"));
        expected.insert("difficulty".to_string(), json!("brutal"));
        assert_eq!(record, expected);
    }
}
