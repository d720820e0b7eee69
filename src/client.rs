//! KnackApp - Main entry point for a Knack application
//!
//! Owns credentials and endpoint, issues requests by path and classifies
//! the HTTP status of each response. Everything else (objects, records)
//! is reached from here.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use reqwest::Method;
use serde_json::{Value, json};

use crate::collection::ObjectCollection;
use crate::config::KnackConfig;
use crate::error::{KnackError, Result};
use crate::object::KnackObject;
use crate::query::RecordQuery;
use crate::records::RecordCollection;
use crate::transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
use crate::types::{ObjectListing, ObjectSummary};

pub const HEADER_APP_ID: &str = "X-Knack-Application-Id";
pub const HEADER_API_KEY: &str = "X-Knack-REST-API-Key";

/// Client for one Knack application
///
/// Cheap to clone; clones share configuration and transport. Nothing
/// fetched through the client is cached here: every call to
/// [`KnackApp::objects`] lists the objects again.
#[derive(Clone)]
pub struct KnackApp {
    inner: Arc<AppInner>,
}

struct AppInner {
    config: KnackConfig,
    headers: BTreeMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl KnackApp {
    /// Create a client using the default `reqwest` transport
    pub fn new(config: KnackConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on top of an existing transport
    pub fn with_transport(config: KnackConfig, transport: Arc<dyn Transport>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(HEADER_APP_ID.to_string(), config.app_id.clone());
        headers.insert(HEADER_API_KEY.to_string(), config.api_key.clone());

        Self {
            inner: Arc::new(AppInner {
                config,
                headers,
                transport,
            }),
        }
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &KnackConfig {
        &self.inner.config
    }

    pub fn endpoint(&self) -> &str {
        &self.inner.config.endpoint
    }

    /// Headers attached to every request
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.inner.headers
    }

    /// Join the endpoint with path segments and an optional query string
    pub fn url(&self, path: &[&str], query: Option<&str>) -> String {
        let mut url = self.endpoint().to_string();
        for segment in path {
            url.push('/');
            url.push_str(&urlencoding::encode(segment.trim_matches('/')));
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    // =========================================================================
    // Raw Requests
    // =========================================================================

    /// Send a request and return the raw response, whatever its status
    pub async fn request(&self, method: Method, path: &[&str]) -> Result<TransportResponse> {
        self.send(method, self.url(path, None), None).await
    }

    /// GET a path and decode the JSON body
    ///
    /// Status 200 returns the body, 400 is `NotFound`, anything else is
    /// `ApiResponse`.
    pub async fn get_json(&self, path: &[&str]) -> Result<Value> {
        let url = self.url(path, None);
        let response = self.send(Method::GET, url.clone(), None).await?;
        classify(&url, response)
    }

    /// Same as [`KnackApp::get_json`] with a serialised query string
    pub async fn get_json_with_query(&self, path: &[&str], query: &str) -> Result<Value> {
        let url = self.url(path, Some(query));
        let response = self.send(Method::GET, url.clone(), None).await?;
        classify(&url, response)
    }

    /// POST a JSON body and decode the JSON response
    pub async fn post_json(&self, path: &[&str], body: &Value) -> Result<Value> {
        let url = self.url(path, None);
        let response = self
            .send(Method::POST, url.clone(), Some(body.clone()))
            .await?;
        classify(&url, response)
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<TransportResponse> {
        debug!("{} {}", method, url);
        self.inner
            .transport
            .send(TransportRequest {
                method,
                url,
                headers: self.inner.headers.clone(),
                body,
            })
            .await
    }

    // =========================================================================
    // Objects
    // =========================================================================

    /// List all objects of the application
    pub async fn objects(&self) -> Result<ObjectCollection> {
        let listing: ObjectListing = serde_json::from_value(self.get_json(&["objects"]).await?)?;
        Ok(ObjectCollection::new(self.clone(), listing.objects))
    }

    /// Keys of all objects, in listing order
    pub async fn object_keys(&self) -> Result<Vec<String>> {
        Ok(self.objects().await?.keys().map(str::to_string).collect())
    }

    pub async fn object_count(&self) -> Result<usize> {
        Ok(self.objects().await?.len())
    }

    /// Resolve an object by key or name
    pub async fn get(&self, identifier: &str) -> Result<KnackObject> {
        self.objects().await?.get(identifier).await
    }

    /// Listing entries carrying `name`, in listing order
    pub async fn objects_named(&self, name: &str) -> Result<Vec<ObjectSummary>> {
        Ok(self
            .objects()
            .await?
            .iter()
            .filter(|summary| summary.name == name)
            .cloned()
            .collect())
    }

    /// Fetch one object's metadata by key
    pub async fn get_object(&self, object_key: &str) -> Result<KnackObject> {
        let response = self.get_json(&["objects", object_key]).await?;
        self.object_from_response(object_key, response)
    }

    /// Record collection for an object key; the object metadata is fetched
    /// here, the records only when the collection is walked
    pub async fn get_records(
        &self,
        object_key: &str,
        query: RecordQuery,
    ) -> Result<RecordCollection> {
        Ok(self.get_object(object_key).await?.get_records(query))
    }

    /// Create a new, empty object
    pub async fn create_object(&self, name: &str) -> Result<KnackObject> {
        let response = self.post_json(&["objects"], &json!({ "name": name })).await?;
        self.object_from_response(name, response)
    }

    fn object_from_response(&self, requested: &str, mut response: Value) -> Result<KnackObject> {
        match response.get_mut("object").map(Value::take) {
            Some(Value::Object(metadata)) if !metadata.is_empty() => {
                KnackObject::from_metadata(self.clone(), metadata)
            }
            _ => Err(KnackError::object_not_found(requested)),
        }
    }
}

/// Map a response status onto the error taxonomy
fn classify(url: &str, response: TransportResponse) -> Result<Value> {
    match response.status {
        200 => response.json(),
        400 => Err(KnackError::not_found(url)),
        status => {
            warn!("{} answered with status {}", url, status);
            Err(KnackError::api_response(status, &response.headers))
        }
    }
}

impl fmt::Display for KnackApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

impl fmt::Debug for KnackApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnackApp")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
