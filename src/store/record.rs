//! # Record
//!
//! An open-ended JSON object with one distinguished field, `id`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field used as the lookup key for update and delete
pub const ID_FIELD: &str = "id";

/// A loosely-schema'd row: field name to JSON value.
///
/// Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Create an empty record carrying only an id
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.set(ID_FIELD, Value::String(id.into()));
        record
    }

    /// The record's `id`, if it is a string
    pub fn id(&self) -> Option<&str> {
        self.get_str(ID_FIELD)
    }

    /// A field's raw JSON value
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A field's value if it is a string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Set a field, returning the previous value
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Rebuild this record as `{id, ...fields}` with `id` forced to `id`.
    pub(crate) fn rekeyed(mut self, id: &str) -> Self {
        self.0.remove(ID_FIELD);
        let mut out = Map::with_capacity(self.0.len() + 1);
        out.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        out.extend(self.0);
        Self(out)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Only JSON objects are records; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
