//! A single resolved Knack object (table)

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::client::KnackApp;
use crate::error::{KnackError, Result};
use crate::query::RecordQuery;
use crate::record::Record;
use crate::records::RecordCollection;
use crate::types::Field;

/// One Knack object with its metadata
///
/// Metadata is fetched once, when the object is resolved, and never
/// refreshed. Clones share it. Two objects compare equal when they have
/// the same key on the same endpoint.
#[derive(Clone)]
pub struct KnackObject {
    app: KnackApp,
    inner: Arc<ObjectInner>,
}

struct ObjectInner {
    key: String,
    name: String,
    fields: Vec<Field>,
    metadata: Map<String, Value>,
}

impl KnackObject {
    /// Wrap the `"object"` payload of `GET /objects/{key}`
    pub fn from_metadata(app: KnackApp, metadata: Map<String, Value>) -> Result<Self> {
        let key = metadata
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| KnackError::invalid_response("object metadata has no key"))?
            .to_string();
        let name = metadata
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let fields = match metadata.get("fields") {
            None | Some(Value::Null) => Vec::new(),
            Some(fields) => serde_json::from_value(fields.clone())?,
        };

        Ok(Self {
            app,
            inner: Arc::new(ObjectInner {
                key,
                name,
                fields,
                metadata,
            }),
        })
    }

    pub fn app(&self) -> &KnackApp {
        &self.app
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Field descriptors, in metadata order
    pub fn fields(&self) -> &[Field] {
        &self.inner.fields
    }

    /// Field descriptor for a human field name
    ///
    /// Exactly one field must carry the name: none is `FieldNotFound`,
    /// several is `DuplicateField`.
    pub fn field(&self, name: &str) -> Result<&Field> {
        let mut matches = self.inner.fields.iter().filter(|field| field.name == name);
        match (matches.next(), matches.next()) {
            (Some(field), None) => Ok(field),
            (Some(_), Some(_)) => Err(KnackError::DuplicateField(name.to_string())),
            (None, _) => Err(KnackError::field_not_found(name)),
        }
    }

    /// Storage key for a human field name
    pub fn field_key(&self, name: &str) -> Result<&str> {
        self.field(name).map(|field| field.key.as_str())
    }

    // =========================================================================
    // Metadata Introspection
    // =========================================================================

    /// Raw metadata attribute (`"key"`, `"name"`, `"fields"`, ...)
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.inner.metadata.get(attribute)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.metadata.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.metadata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.metadata.is_empty()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.inner.metadata
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Lazy record listing; nothing is fetched until it is walked
    pub fn get_records(&self, query: RecordQuery) -> RecordCollection {
        RecordCollection::new(self.clone(), query)
    }

    /// Fetch a single record by id
    pub async fn get_record(&self, record_id: &str) -> Result<Record> {
        self.get_records(RecordQuery::new().record_id(record_id))
            .first()
            .await?
            .ok_or_else(|| KnackError::record_not_found(record_id))
    }
}

impl PartialEq for KnackObject {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.app.endpoint() == other.app.endpoint()
    }
}

impl fmt::Display for KnackObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/objects/{}", self.app, self.key())
    }
}

impl fmt::Debug for KnackObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnackObject")
            .field("key", &self.inner.key)
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::config::KnackConfig;
    use crate::transport::testing::ScriptedTransport;

    const ENDPOINT: &str = "https://localhost/v1";

    fn app_with(transport: ScriptedTransport) -> (KnackApp, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let config = KnackConfig::builder("app_id", "api_key")
            .endpoint(ENDPOINT)
            .build();
        (KnackApp::with_transport(config, transport.clone()), transport)
    }

    fn object(app: KnackApp, metadata: Value) -> KnackObject {
        match metadata {
            Value::Object(map) => KnackObject::from_metadata(app, map).unwrap(),
            _ => panic!("metadata must be an object"),
        }
    }

    fn dogs(app: KnackApp) -> KnackObject {
        object(
            app,
            json!({
                "key": "object_1",
                "name": "Dogs",
                "fields": [
                    {"key": "field_1", "name": "Breed", "type": "short_text"},
                    {"key": "field_2", "name": "Age", "type": "number"},
                    {"key": "field_3", "name": "Owner", "type": "name"},
                    {"key": "field_4", "name": "Owner", "type": "email"}
                ]
            }),
        )
    }

    // =========================================================================
    // Metadata Tests
    // =========================================================================

    #[test]
    fn test_display() {
        let (app, _) = app_with(ScriptedTransport::new());
        let object = object(app, json!({"key": "object_1"}));
        assert_eq!(object.to_string(), "https://localhost/v1/objects/object_1");
    }

    #[test]
    fn test_metadata_keys() {
        let (app, _) = app_with(ScriptedTransport::new());
        let object = object(app, json!({"key": "object_1", "name": "Object1"}));

        let mut keys: Vec<_> = object.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["key", "name"]);
        assert_eq!(object.len(), 2);
        assert_eq!(object.get("name"), Some(&json!("Object1")));
        assert!(object.fields().is_empty());
    }

    #[test]
    fn test_metadata_without_key() {
        let (app, _) = app_with(ScriptedTransport::new());
        let mut map = Map::new();
        map.insert("name".into(), json!("Nameless"));
        let err = KnackObject::from_metadata(app, map).unwrap_err();
        assert!(matches!(err, KnackError::InvalidResponse(_)));
    }

    #[test]
    fn test_equality_by_key() {
        let (app, _) = app_with(ScriptedTransport::new());
        let a = object(app.clone(), json!({"key": "object_1", "name": "Dogs"}));
        let b = object(app.clone(), json!({"key": "object_1", "name": "Renamed"}));
        let c = object(app, json!({"key": "object_2", "name": "Dogs"}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    // =========================================================================
    // Field Resolution Tests
    // =========================================================================

    #[test]
    fn test_field_key() {
        let (app, _) = app_with(ScriptedTransport::new());
        let object = dogs(app);
        assert_eq!(object.field_key("Breed").unwrap(), "field_1");
        assert_eq!(object.field("Age").unwrap().field_type.as_deref(), Some("number"));
    }

    #[test]
    fn test_field_key_not_found() {
        let (app, _) = app_with(ScriptedTransport::new());
        let err = dogs(app).field_key("Color").unwrap_err();
        assert!(matches!(err, KnackError::FieldNotFound(name) if name == "Color"));
    }

    #[test]
    fn test_field_key_duplicate() {
        let (app, _) = app_with(ScriptedTransport::new());
        let err = dogs(app).field_key("Owner").unwrap_err();
        assert!(matches!(err, KnackError::DuplicateField(name) if name == "Owner"));
    }

    // =========================================================================
    // Record Access Tests
    // =========================================================================

    #[test]
    fn test_get_records_is_lazy() {
        let (app, transport) = app_with(ScriptedTransport::new());
        let object = dogs(app);
        let records = object.get_records(RecordQuery::new());

        assert_eq!(records.object(), &object);
        assert_eq!(records.query(), &RecordQuery::new());
        assert!(transport.urls().is_empty());
    }

    #[tokio::test]
    async fn test_get_record() {
        let url = format!("{}/objects/object_1/records?page=1&record_id=abc", ENDPOINT);
        let (app, transport) = app_with(ScriptedTransport::new().respond(
            &url,
            200,
            json!({
                "records": [{"id": "abc", "field_1": "Lab"}],
                "current_page": 1,
                "total_pages": 1,
                "total_records": 1
            }),
        ));

        let record = dogs(app).get_record("abc").await.unwrap();
        assert_eq!(record.id(), Some("abc"));
        assert_eq!(transport.urls(), vec![url]);
    }

    #[tokio::test]
    async fn test_get_record_not_found() {
        let url = format!("{}/objects/object_1/records?page=1&record_id=missing", ENDPOINT);
        let (app, _) = app_with(ScriptedTransport::new().respond(
            &url,
            200,
            json!({"records": [], "current_page": 1, "total_pages": 0, "total_records": 0}),
        ));

        let err = dogs(app).get_record("missing").await.unwrap_err();
        assert!(matches!(err, KnackError::RecordNotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_get_record_on_400() {
        let (app, _) = app_with(ScriptedTransport::new());
        let err = dogs(app).get_record("missing").await.unwrap_err();
        assert!(matches!(err, KnackError::RecordNotFound(_)));
    }
}
