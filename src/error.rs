//! Error types for Knack API operations

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors that can occur while talking to the Knack API
#[derive(Debug, Error)]
pub enum KnackError {
    /// The service answered 400 for the requested resource
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("More than one field named '{0}'")]
    DuplicateField(String),

    #[error("More than one object named '{0}'")]
    DuplicateObject(String),

    /// Any status other than 200 or 400. Carries only the `X-*` response
    /// headers; the body is never kept.
    #[error("API response error: status {status}, headers {headers:?}")]
    ApiResponse {
        status: u16,
        headers: BTreeMap<String, String>,
    },

    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KnackError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn object_not_found(msg: impl Into<String>) -> Self {
        Self::ObjectNotFound(msg.into())
    }

    pub fn record_not_found(msg: impl Into<String>) -> Self {
        Self::RecordNotFound(msg.into())
    }

    pub fn field_not_found(msg: impl Into<String>) -> Self {
        Self::FieldNotFound(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an `ApiResponse` error, keeping only the `X-*` headers
    pub fn api_response(status: u16, headers: &BTreeMap<String, String>) -> Self {
        let headers = headers
            .iter()
            .filter(|(name, _)| name.to_ascii_lowercase().starts_with("x-"))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Self::ApiResponse { status, headers }
    }

    /// True for the generic not-found kind and all of its specialisations
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::ObjectNotFound(_)
                | Self::RecordNotFound(_)
                | Self::FieldNotFound(_)
        )
    }
}

impl From<reqwest::Error> for KnackError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, KnackError>;
