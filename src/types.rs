//! Wire types for Knack API payloads
//!
//! Includes object summaries, field descriptors and record pages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Object Metadata
// ============================================================================

/// One entry of the `GET /objects` listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSummary {
    /// Opaque object key (e.g. `object_1`)
    pub key: String,
    /// Human-readable name, not guaranteed unique
    #[serde(default)]
    pub name: String,
    /// Remaining listing attributes, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope of `GET /objects`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ObjectListing {
    #[serde(default)]
    pub objects: Vec<ObjectSummary>,
}

/// Field (column) descriptor from an object's metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Storage key used in record rows (e.g. `field_1`)
    pub key: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// Knack field type (e.g. `short_text`, `number`, `connection`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Field {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            field_type: None,
            extra: Map::new(),
        }
    }

    /// Set the field type
    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Key of the secondary raw representation in record rows
    pub fn raw_key(&self) -> String {
        raw_key(&self.key)
    }
}

/// `field_1` -> `field_1_raw`
pub(crate) fn raw_key(field_key: &str) -> String {
    format!("{}_raw", field_key)
}

// ============================================================================
// Record Pages
// ============================================================================

/// One page of `GET /objects/{key}/records`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RecordPage {
    #[serde(default)]
    pub records: Vec<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub current_page: Option<u64>,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub total_pages: Option<u64>,
    #[serde(default, deserialize_with = "lenient_counter")]
    pub total_records: Option<u64>,
}

/// Page counters arrive as numbers or numeric strings (`"current_page": "1"`)
fn lenient_counter<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("Invalid page counter: {}", n))),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("Cannot convert '{}' to page counter", s))),
        Some(other) => Err(D::Error::custom(format!(
            "Invalid page counter: {}",
            other
        ))),
    }
}
