//! Event records and the payloads that create or change them.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

/// Attributes only the server may write.
pub const SERVER_OWNED_ATTRIBUTES: [&str; 5] =
    ["id", "organizerId", "createdAt", "updatedAt", "participants"];

/// A stored event exactly as the table holds it.
///
/// Reads hand records back untouched, so items written by other clients of
/// the table never have to fit [`Event`].
pub type Record = Map<String, Value>;

/// Organizer of a stored record, if it has one.
pub fn organizer_of(record: &Record) -> Option<&str> {
    record.get("organizerId").and_then(Value::as_str)
}

/// Trek difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Extreme,
}

/// A newly created trekking event.
///
/// Attributes the creator sent that are not modelled here are kept in
/// `extra` and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub organizer_id: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_point: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// Build a new record from a creation payload.
    ///
    /// Any client-supplied server-owned attribute is discarded; `id`,
    /// `createdAt` and `organizerId` come from the server.
    pub fn create(mut payload: Map<String, Value>, organizer_id: &str, now: DateTime<Utc>) -> Result<Self> {
        for key in SERVER_OWNED_ATTRIBUTES {
            payload.remove(key);
        }

        payload.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        payload.insert("organizerId".to_string(), Value::String(organizer_id.to_string()));
        payload.insert("createdAt".to_string(), Value::String(timestamp(now)));
        payload.insert("participants".to_string(), Value::Array(Vec::new()));

        serde_json::from_value(Value::Object(payload))
            .map_err(|e| Error::BadRequest(format!("Invalid event: {}", e)))
    }

    /// The event as a table record.
    pub fn to_record(&self) -> Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            _ => Err(Error::Internal("Event did not serialize to an object".to_string())),
        }
    }
}

/// Partial update of an event.
///
/// Modelled attributes are type-checked; any other attribute merges as sent.
/// Server-owned attributes are refused.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub max_participants: Option<u32>,
    pub duration: Option<String>,
    pub meeting_point: Option<String>,
    pub requirements: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ordered attribute assignments for a partial update.
pub type Changes = Vec<(String, Value)>;

impl EventPatch {
    /// Check an update payload and split it into modelled and free attributes.
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self> {
        if let Some(key) = payload
            .keys()
            .find(|key| key.is_empty() || SERVER_OWNED_ATTRIBUTES.contains(&key.as_str()))
        {
            return Err(Error::BadRequest(format!("Attribute '{}' cannot be updated", key)));
        }

        serde_json::from_value(Value::Object(payload))
            .map_err(|e| Error::BadRequest(format!("Invalid request body: {}", e)))
    }

    /// Flatten the patch into attribute assignments, stamping `updatedAt`.
    ///
    /// `null` values are skipped, so an update never clears an attribute.
    pub fn into_changes(self, now: DateTime<Utc>) -> Result<Changes> {
        let mut changes = Changes::new();

        push(&mut changes, "title", self.title)?;
        push(&mut changes, "description", self.description)?;
        push(&mut changes, "date", self.date)?;
        push(&mut changes, "location", self.location)?;
        push(&mut changes, "difficulty", self.difficulty)?;
        push(&mut changes, "maxParticipants", self.max_participants)?;
        push(&mut changes, "duration", self.duration)?;
        push(&mut changes, "meetingPoint", self.meeting_point)?;
        push(&mut changes, "requirements", self.requirements)?;
        for (name, value) in self.extra {
            if !value.is_null() {
                changes.push((name, value));
            }
        }
        push(&mut changes, "updatedAt", Some(timestamp(now)))?;

        Ok(changes)
    }
}

fn push<T: Serialize>(changes: &mut Changes, name: &str, value: Option<T>) -> Result<()> {
    if let Some(value) = value {
        changes.push((name.to_string(), serde_json::to_value(value)?));
    }
    Ok(())
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
