//! Persisted record representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::cast::{decode_datetime, encode_datetime};

/// A persisted entity: identity, owning model and a bag of attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Record ID
    pub id: Uuid,
    /// Name of the model this record belongs to
    pub model: String,
    /// Column values
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Create an empty record with a fresh ID
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), model)
    }

    /// Create an empty record with a known ID
    pub fn with_id(id: Uuid, model: impl Into<String>) -> Self {
        Self {
            id,
            model: model.into(),
            attributes: Map::new(),
        }
    }

    /// Builder-style attribute assignment
    pub fn with_attribute(mut self, column: impl Into<String>, value: Value) -> Self {
        self.set(column, value);
        self
    }

    /// Builder-style datetime assignment
    pub fn with_datetime(mut self, column: impl Into<String>, instant: DateTime<Utc>) -> Self {
        self.set_datetime(column, Some(instant));
        self
    }

    /// Raw attribute value. `null` reads as absent.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column).filter(|v| !v.is_null())
    }

    /// Set an attribute
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.attributes.insert(column.into(), value);
    }

    /// Decoded datetime attribute
    pub fn datetime(&self, column: &str) -> Option<DateTime<Utc>> {
        self.get(column).and_then(decode_datetime)
    }

    /// Set or clear a datetime attribute
    pub fn set_datetime(&mut self, column: impl Into<String>, instant: Option<DateTime<Utc>>) {
        let value = instant.map(encode_datetime).unwrap_or(Value::Null);
        self.set(column, value);
    }

    /// Attributes plus `id`, as one JSON object
    pub fn to_document(&self) -> Value {
        let mut doc = self.attributes.clone();
        doc.insert("id".to_string(), Value::String(self.id.to_string()));
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_null_reads_as_absent() {
        let record = Record::new("articles").with_attribute("expired_at", Value::Null);
        assert!(record.get("expired_at").is_none());
        assert!(record.datetime("expired_at").is_none());
    }

    #[test]
    fn test_datetime_roundtrip_through_attribute() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut record = Record::new("articles");
        record.set_datetime("published_at", Some(at));

        assert_eq!(record.get("published_at"), Some(&json!("2024-01-01T00:00:00Z")));
        assert_eq!(record.datetime("published_at"), Some(at));

        record.set_datetime("published_at", None);
        assert!(record.datetime("published_at").is_none());
    }

    #[test]
    fn test_document_includes_id() {
        let record = Record::new("articles").with_attribute("title", json!("Hello"));
        let doc = record.to_document();
        assert_eq!(doc["title"], "Hello");
        assert_eq!(doc["id"], json!(record.id.to_string()));
    }

    #[test]
    fn test_serde_shape() {
        let record = Record::new("articles").with_attribute("title", json!("Hello"));
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["model"], "articles");
        assert_eq!(encoded["attributes"]["title"], "Hello");

        let decoded: Record = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
