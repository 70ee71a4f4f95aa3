//! Upstream record types.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Field holding the rich-text body of a record.
pub const BODY_FIELD: &str = "body";

/// Field holding the locale tag of a record.
pub const LOCALE_FIELD: &str = "locale";

/// Errors raised while decoding a record from upstream JSON.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The record is not a JSON object.
    #[error("Record is not an object: {0}")]
    NotAnObject(String),

    /// The record has no `id` field.
    #[error("Record has no id")]
    MissingId,

    /// The `id` field is neither a string nor an unsigned integer.
    #[error("Record id is not a string or integer: {0}")]
    InvalidId(String),
}

/// Stable identifier of an upstream record, unique within a locale and index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(u64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RecordId {
    fn from(id: u64) -> Self {
        RecordId::Number(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId::Text(id)
    }
}

impl TryFrom<&Value> for RecordId {
    type Error = RecordError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => n
                .as_u64()
                .map(RecordId::Number)
                .ok_or_else(|| RecordError::InvalidId(n.to_string())),
            Value::String(s) if !s.is_empty() => Ok(RecordId::Text(s.clone())),
            other => Err(RecordError::InvalidId(other.to_string())),
        }
    }
}

/// One unit of upstream content.
///
/// The `body` and `locale` fields are lifted out of the payload because the
/// transformer inspects them; every other field is carried through untouched
/// and in upstream order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub locale: Option<String>,
    pub body: Option<Value>,
    pub payload: IndexMap<String, Value>,
}

impl Record {
    /// Create an empty record with the given id.
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            locale: None,
            body: None,
            payload: IndexMap::new(),
        }
    }

    /// Set the locale tag.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the rich-text body.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Add a pass-through payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Build a record from an id and a flat field map.
    ///
    /// A `null` body is treated as absent. A non-string `locale` stays in the
    /// payload.
    pub fn from_fields(id: impl Into<RecordId>, fields: Map<String, Value>) -> Self {
        let mut record = Record::new(id);
        for (key, value) in fields {
            match key.as_str() {
                BODY_FIELD => {
                    if !value.is_null() {
                        record.body = Some(value);
                    }
                }
                LOCALE_FIELD if value.is_string() => {
                    record.locale = value.as_str().map(str::to_string);
                }
                _ => {
                    record.payload.insert(key, value);
                }
            }
        }
        record
    }

    /// Decode a record from an upstream JSON entry.
    ///
    /// Accepts both the flattened shape `{"id": 1, "title": ..}` and the
    /// wrapped shape `{"id": 1, "attributes": {"title": ..}}`.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let Value::Object(mut object) = value else {
            return Err(RecordError::NotAnObject(value.to_string()));
        };

        let id = object.remove("id").ok_or(RecordError::MissingId)?;
        let id = RecordId::try_from(&id)?;

        let fields = match object.remove("attributes") {
            Some(Value::Object(attributes)) => {
                let mut fields = object;
                fields.extend(attributes);
                fields
            }
            Some(other) => {
                object.insert("attributes".to_string(), other);
                object
            }
            None => object,
        };

        Ok(Record::from_fields(id, fields))
    }
}
