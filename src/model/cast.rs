//! Attribute casts
//!
//! A cast tells the executor how to compare a column and tells records how
//! to encode values written to it. Datetimes are stored as RFC 3339 UTC
//! strings.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cast {
    /// RFC 3339 instant, compared chronologically
    Datetime,
    /// Plain string
    String,
    /// 64-bit integer
    Integer,
    /// 64-bit float
    Float,
    /// Boolean
    Boolean,
    /// Arbitrary JSON, compared only by equality
    Json,
}

impl Cast {
    /// Returns the cast name
    pub fn as_str(&self) -> &'static str {
        match self {
            Cast::Datetime => "datetime",
            Cast::String => "string",
            Cast::Integer => "integer",
            Cast::Float => "float",
            Cast::Boolean => "boolean",
            Cast::Json => "json",
        }
    }
}

/// Encodes an instant the way datetime columns store it
pub fn encode_datetime(instant: DateTime<Utc>) -> Value {
    Value::String(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Encodes an instant for a column with the given cast.
///
/// Numeric columns hold unix seconds; everything else holds RFC 3339.
pub fn encode_instant(cast: Option<Cast>, instant: DateTime<Utc>) -> Value {
    match cast {
        Some(Cast::Integer) | Some(Cast::Float) => Value::from(instant.timestamp()),
        _ => encode_datetime(instant),
    }
}

/// Decodes a stored datetime.
///
/// Accepts RFC 3339 strings and integer unix seconds. Anything else
/// (including null) decodes to `None`.
pub fn decode_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        _ => None,
    }
}
