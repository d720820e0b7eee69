//! # knackhq
//!
//! Client for the Knack hosted tabular-data REST API.
//!
//! Knack applications hold *objects* (tables) made of *fields* (columns)
//! and paginated *records* (rows). This crate exposes them as plain Rust
//! types and turns lookups by key or by human-readable name, and walks over
//! paginated listings, into authenticated requests.
//!
//! ## Features
//!
//! - **Identifier Resolution**: Reach objects by key (`object_1`) or by name (`Dogs`)
//! - **Lazy Pagination**: Record listings are streams that fetch one page at a time
//! - **Field Names**: Read record values by storage key or by human field name
//! - **Filters**: Typed filter predicates, sent as percent-encoded JSON
//! - **Clear Errors**: Not-found, duplicate-name and API failures are distinct kinds
//! - **Pluggable Transport**: `reqwest` by default, any [`Transport`] for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use futures::TryStreamExt;
//! use knackhq::{KnackApp, KnackConfig, RecordQuery, SortOrder, filters};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credentials from KNACKHQ_APP_ID / KNACKHQ_API_KEY / KNACKHQ_ENDPOINT
//!     let app = KnackApp::new(KnackConfig::from_env()?)?;
//!
//!     // Resolve an object by name (or key)
//!     let dogs = app.get("Dogs").await?;
//!     let breed = dogs.field_key("Breed")?;
//!
//!     // Walk every page of a filtered listing
//!     let query = RecordQuery::new()
//!         .filter(filters::is(breed, "Lab"))
//!         .sort(breed, SortOrder::Asc)
//!         .rows_per_page(100);
//!     let records = dogs.get_records(query);
//!
//!     let mut stream = std::pin::pin!(records.stream());
//!     while let Some(record) = stream.try_next().await? {
//!         println!("{}: {:?}", record, record.field("Breed")?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! The client is configured using `KnackConfig`:
//!
//! ```rust
//! use std::time::Duration;
//! use knackhq::KnackConfig;
//!
//! let config = KnackConfig::builder("app-id", "api-key")
//!     .endpoint("https://api.knackhq.com/v1") // Default endpoint
//!     .timeout(Duration::from_secs(30))       // Per-request timeout
//!     .build();
//! ```
//!
//! ## Caching
//!
//! Object metadata is fetched once per [`KnackObject`] and kept for its
//! lifetime. The object listing and record pages are fetched again on every
//! call; nothing else is cached.

pub mod client;
pub mod collection;
pub mod config;
pub mod error;
pub mod object;
pub mod query;
pub mod record;
pub mod records;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::KnackApp;
pub use collection::ObjectCollection;
pub use config::{DEFAULT_ENDPOINT, KnackConfig, KnackConfigBuilder};
pub use error::{KnackError, Result};
pub use object::KnackObject;
pub use query::{Filter, RecordQuery, SortOrder, decode_filters, filters};
pub use record::Record;
pub use records::RecordCollection;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use types::{Field, ObjectSummary};

// Re-export the HTTP method type used by `KnackApp::request`
pub use reqwest::Method;
