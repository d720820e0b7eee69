//! Paginated record listing
//!
//! A `RecordCollection` is a view: an object plus a query. Walking it issues
//! one `GET /objects/{key}/records` per page, strictly in order, starting
//! from the query's page (default 1) and following `current_page` /
//! `total_pages` until the last page. Nothing is cached between walks.

use std::fmt;

use futures::{Stream, TryStreamExt, stream};
use log::debug;

use crate::error::{KnackError, Result};
use crate::object::KnackObject;
use crate::query::RecordQuery;
use crate::record::Record;
use crate::types::RecordPage;

/// Lazy, restartable listing of an object's records
#[derive(Debug, Clone)]
pub struct RecordCollection {
    object: KnackObject,
    query: RecordQuery,
}

impl RecordCollection {
    pub fn new(object: KnackObject, query: RecordQuery) -> Self {
        Self { object, query }
    }

    pub fn object(&self) -> &KnackObject {
        &self.object
    }

    pub fn query(&self) -> &RecordQuery {
        &self.query
    }

    /// One item per fetched page
    ///
    /// A 400 or an empty body on the starting page means "no records" and
    /// ends the stream without an error. Any failure after that is yielded
    /// once and ends the stream.
    ///
    /// The walk advances from the page it asked for, so a server that keeps
    /// reporting the same `current_page` still gets each page once.
    pub fn pages(&self) -> impl Stream<Item = Result<Vec<Record>>> + '_ {
        let start = self.query.start_page();

        stream::try_unfold(Some(start), move |next| async move {
            let Some(page) = next else {
                return Ok(None);
            };

            let response = match self.fetch_page(page).await {
                Ok(Some(response)) => response,
                Ok(None) | Err(KnackError::NotFound(_)) if page == start => {
                    debug!("{} has no records for this query", self);
                    return Ok(None);
                }
                Ok(None) => {
                    return Err(KnackError::invalid_response(format!(
                        "empty body for page {} of {}",
                        page, self
                    )));
                }
                Err(err) => return Err(err),
            };

            let current = response.current_page.unwrap_or(page);
            let total = response.total_pages.unwrap_or(current);
            debug!("{}: page {} of {}", self, current, total);

            let records = response
                .records
                .into_iter()
                .map(|raw| Record::new(self.object.clone(), raw))
                .collect();

            let next = page.max(current) + 1;
            let next = (next <= total).then_some(next);
            Ok(Some((records, next)))
        })
    }

    /// Every record of every page, in page order then in-page order
    pub fn stream(&self) -> impl Stream<Item = Result<Record>> + '_ {
        self.pages()
            .map_ok(|records| stream::iter(records.into_iter().map(Ok::<Record, KnackError>)))
            .try_flatten()
    }

    /// Walk all pages and collect the records
    pub async fn collect_all(&self) -> Result<Vec<Record>> {
        self.stream().try_collect().await
    }

    /// First record of the listing, fetching only as many pages as needed
    pub async fn first(&self) -> Result<Option<Record>> {
        let mut records = std::pin::pin!(self.stream());
        records.try_next().await
    }

    /// `total_records` reported for the starting page; does not walk the
    /// listing
    pub async fn total_records(&self) -> Result<u64> {
        let page = self.query.start_page();
        match self.fetch_page(page).await {
            Ok(Some(response)) => Ok(response
                .total_records
                .unwrap_or(response.records.len() as u64)),
            Ok(None) | Err(KnackError::NotFound(_)) => Ok(0),
            Err(err) => Err(err),
        }
    }

    /// `None` when the service answered with an empty body
    async fn fetch_page(&self, page: u64) -> Result<Option<RecordPage>> {
        let query = self.query.to_query_string(page);
        let response = self
            .object
            .app()
            .get_json_with_query(&["objects", self.object.key(), "records"], &query)
            .await?;
        if response.is_null() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(response)?))
    }
}

impl fmt::Display for RecordCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/records", self.object)
    }
}
