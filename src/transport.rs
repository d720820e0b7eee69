//! HTTP transport boundary
//!
//! The client never talks to the network directly; it hands a
//! [`TransportRequest`] to a [`Transport`] and classifies the status of the
//! returned [`TransportResponse`]. Non-2xx statuses are data here, not errors.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::error::Result;

/// One outgoing HTTP request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    /// JSON body, sent for POST/PUT requests
    pub body: Option<Value>,
}

/// Status, headers and raw body of a completed request
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Decode the body as JSON. An empty body decodes to `null`.
    pub fn json(&self) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs a single HTTP request
///
/// Implementations must report every received status through
/// [`TransportResponse::status`] and only fail for transport-level problems
/// (connection refused, TLS, timeout), as `KnackError::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Default transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Wrap an already configured `reqwest::Client`
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = self.client.request(request.method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_json() {
        let response = TransportResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: br#"{"fizz": "buzz"}"#.to_vec(),
        };
        assert_eq!(response.json().unwrap(), serde_json::json!({"fizz": "buzz"}));
    }

    #[test]
    fn test_response_empty_body_is_null() {
        let response = TransportResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: b"  \n".to_vec(),
        };
        assert_eq!(response.json().unwrap(), Value::Null);
    }

    #[test]
    fn test_response_invalid_json() {
        let response = TransportResponse {
            status: 200,
            headers: BTreeMap::new(),
            body: b"<html>".to_vec(),
        };
        assert!(matches!(
            response.json(),
            Err(crate::error::KnackError::Json(_))
        ));
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(Some(Duration::from_secs(1))).is_ok());
    }
}
