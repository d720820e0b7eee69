//! A single record (row)

use std::fmt;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::object::KnackObject;

/// One decoded record row, bound to its object for field-name lookups
///
/// Iteration and length cover the row's own storage keys (`id`,
/// `field_1`, `field_1_raw`, ...), never the human field names.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    object: KnackObject,
    raw: Map<String, Value>,
}

impl Record {
    pub fn new(object: KnackObject, raw: Map<String, Value>) -> Self {
        Self { object, raw }
    }

    pub fn object(&self) -> &KnackObject {
        &self.object
    }

    pub fn id(&self) -> Option<&str> {
        self.raw.get("id").and_then(Value::as_str)
    }

    /// Value stored under a raw field key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    /// Values for a human field name: `{key: formatted, key_raw: raw}`
    ///
    /// Either entry is left out when the row has no data for it. The name
    /// must resolve to exactly one field of the object.
    pub fn field(&self, name: &str) -> Result<Map<String, Value>> {
        let field = self.object.field(name)?;

        let mut values = Map::new();
        if let Some(value) = self.raw.get(&field.key) {
            values.insert(field.key.clone(), value.clone());
        }
        let raw_key = field.raw_key();
        if let Some(value) = self.raw.get(&raw_key) {
            values.insert(raw_key, value.clone());
        }
        Ok(values)
    }

    /// Mapping-style access: a storage key returns its value as-is,
    /// anything else is treated as a field name (see [`Record::field`])
    pub fn lookup(&self, identifier: &str) -> Result<Value> {
        match self.raw.get(identifier) {
            Some(value) => Ok(value.clone()),
            None => self.field(identifier).map(Value::Object),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.raw.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_raw(self) -> Map<String, Value> {
        self.raw
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/records/{}", self.object, self.id().unwrap_or_default())
    }
}
