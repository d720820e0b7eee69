//! Object listing and identifier resolution
//!
//! An `ObjectCollection` is one snapshot of `GET /objects`. It resolves a
//! caller-supplied identifier, either an object key or a human name, to a
//! single key and fetches that object's metadata.

use std::collections::HashMap;
use std::fmt;

use crate::client::KnackApp;
use crate::error::{KnackError, Result};
use crate::object::KnackObject;
use crate::types::ObjectSummary;

/// Snapshot of an application's objects, in listing order
#[derive(Debug, Clone)]
pub struct ObjectCollection {
    app: KnackApp,
    objects: Vec<ObjectSummary>,
    /// key -> listing position
    keys: HashMap<String, usize>,
    /// name -> listing positions
    names: HashMap<String, Vec<usize>>,
}

impl ObjectCollection {
    /// Build a collection from an already fetched listing
    pub fn new(app: KnackApp, objects: Vec<ObjectSummary>) -> Self {
        let mut keys = HashMap::new();
        let mut names: HashMap<String, Vec<usize>> = HashMap::new();

        for (idx, summary) in objects.iter().enumerate() {
            keys.entry(summary.key.clone()).or_insert(idx);
            names.entry(summary.name.clone()).or_default().push(idx);
        }

        Self {
            app,
            objects,
            keys,
            names,
        }
    }

    pub fn app(&self) -> &KnackApp {
        &self.app
    }

    /// Listing entries, in server order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectSummary> {
        self.objects.iter()
    }

    /// Object keys, in server order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|summary| summary.key.as_str())
    }

    /// Object names, in server order (may repeat)
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|summary| summary.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether `identifier` is a known key or name
    pub fn contains(&self, identifier: &str) -> bool {
        self.keys.contains_key(identifier) || self.names.contains_key(identifier)
    }

    /// Resolve a key or name to an object key without touching the network
    ///
    /// Keys win over names. A name shared by several objects is
    /// `DuplicateObject`; an unknown identifier is `ObjectNotFound`.
    pub fn resolve_key(&self, identifier: &str) -> Result<&str> {
        if let Some(&idx) = self.keys.get(identifier) {
            return Ok(self.objects[idx].key.as_str());
        }

        match self.names.get(identifier).map(Vec::as_slice) {
            Some([idx]) => Ok(self.objects[*idx].key.as_str()),
            Some([_, _, ..]) => Err(KnackError::DuplicateObject(identifier.to_string())),
            _ => Err(KnackError::object_not_found(identifier)),
        }
    }

    /// Resolve `identifier` and fetch the object's metadata
    ///
    /// A not-found answer for a key present in this snapshot (the object
    /// was deleted since) is reported as `ObjectNotFound`.
    pub async fn get(&self, identifier: &str) -> Result<KnackObject> {
        let key = self.resolve_key(identifier)?;
        self.app.get_object(key).await.map_err(|err| match err {
            KnackError::NotFound(_) => KnackError::object_not_found(identifier),
            other => other,
        })
    }
}

impl fmt::Display for ObjectCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/objects", self.app)
    }
}
