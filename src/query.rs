//! Record query parameters
//!
//! Includes RecordQuery, Filter and SortOrder. Filters are sent as
//! percent-encoded JSON; every other parameter is a plain key/value pair.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{KnackError, Result};

/// Sort direction for `sort_order`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Parse `asc` / `desc`, ignoring case
    pub fn parse(order: &str) -> Option<Self> {
        match order.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Filter predicate `{field, operator, value?}`
///
/// Operators are passed through as-is; the service validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: None,
        }
    }

    /// Set the comparison value
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("field".into(), Value::String(self.field.clone()));
        map.insert("operator".into(), Value::String(self.operator.clone()));
        if let Some(value) = &self.value {
            map.insert("value".into(), value.clone());
        }
        Value::Object(map)
    }
}

/// Helper functions for common filter operators
pub mod filters {
    use super::*;

    /// field is value
    pub fn is(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::new(field, "is").value(value)
    }

    /// field is not value
    pub fn is_not(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::new(field, "is not").value(value)
    }

    /// field contains value
    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::new(field, "contains").value(value)
    }

    /// field is higher than value
    pub fn higher_than(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::new(field, "higher than").value(value)
    }

    /// field is lower than value
    pub fn lower_than(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::new(field, "lower than").value(value)
    }

    /// field has no value
    pub fn is_blank(field: impl Into<String>) -> Filter {
        Filter::new(field, "is blank")
    }

    /// field has a value
    pub fn is_not_blank(field: impl Into<String>) -> Filter {
        Filter::new(field, "is not blank")
    }
}

/// Query parameters for a record listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordQuery {
    /// First page to fetch (default: 1)
    pub page: Option<u64>,
    pub rows_per_page: Option<u64>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
    /// Restrict the listing to a single record
    pub record_id: Option<String>,
    /// Filter descriptors, serialised as one JSON array
    pub filters: Vec<Value>,
    /// Any other parameters, sent as plain pairs after the known ones
    pub params: BTreeMap<String, String>,
}

impl RecordQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the page walk at `page`
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn rows_per_page(mut self, rows: u64) -> Self {
        self.rows_per_page = Some(rows);
        self
    }

    /// Set sorting
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    pub fn record_id(mut self, id: impl Into<String>) -> Self {
        self.record_id = Some(id.into());
        self
    }

    /// Add a filter predicate
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter.to_value());
        self
    }

    /// Add a filter descriptor verbatim
    pub fn raw_filter(mut self, filter: Value) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add an extra plain parameter
    ///
    /// Known parameter names (`page`, `rows_per_page`, `sort_field`,
    /// `sort_order`, `record_id`, `filters`) set the matching typed field,
    /// so each is sent exactly once. A value that does not parse for its
    /// field is dropped with a warning.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        match key.as_str() {
            "page" | "rows_per_page" => match value.trim().parse::<u64>() {
                Ok(n) if key == "page" => self.page = Some(n),
                Ok(n) => self.rows_per_page = Some(n),
                Err(_) => warn!("ignoring non-numeric {} parameter: {:?}", key, value),
            },
            "sort_field" => self.sort_field = Some(value),
            "sort_order" => match SortOrder::parse(&value) {
                Some(order) => self.sort_order = Some(order),
                None => warn!("ignoring unknown sort_order: {:?}", value),
            },
            "record_id" => self.record_id = Some(value),
            "filters" => match serde_json::from_str::<Value>(&value) {
                Ok(Value::Array(filters)) => self.filters.extend(filters),
                Ok(filter @ Value::Object(_)) => self.filters.push(filter),
                _ => warn!("ignoring filters parameter that is not JSON: {:?}", value),
            },
            _ => {
                self.params.insert(key, value);
            }
        }
        self
    }

    /// Page the walk starts from
    pub fn start_page(&self) -> u64 {
        self.page.unwrap_or(1)
    }

    /// Serialise the query for `page`, in a fixed parameter order
    pub fn to_query_string(&self, page: u64) -> String {
        let mut pairs = vec![encode_pair("page", &page.to_string())];

        if let Some(rows) = self.rows_per_page {
            pairs.push(encode_pair("rows_per_page", &rows.to_string()));
        }
        if let Some(field) = &self.sort_field {
            pairs.push(encode_pair("sort_field", field));
        }
        if let Some(order) = self.sort_order {
            pairs.push(encode_pair("sort_order", order.as_str()));
        }
        if let Some(id) = &self.record_id {
            pairs.push(encode_pair("record_id", id));
        }
        for (key, value) in &self.params {
            pairs.push(encode_pair(key, value));
        }
        if !self.filters.is_empty() {
            let json = Value::Array(self.filters.clone()).to_string();
            pairs.push(encode_pair("filters", &json));
        }

        pairs.join("&")
    }
}

fn encode_pair(key: &str, value: &str) -> String {
    format!(
        "{}={}",
        urlencoding::encode(key),
        urlencoding::encode(value)
    )
}

/// Recover the filter descriptors from a serialised query string
pub fn decode_filters(query: &str) -> Result<Vec<Value>> {
    let query = query.split_once('?').map_or(query, |(_, q)| q);

    for pair in query.split('&') {
        if let Some(encoded) = pair.strip_prefix("filters=") {
            let json = urlencoding::decode(encoded)
                .map_err(|e| KnackError::invalid_response(format!("Bad filter encoding: {}", e)))?;
            return match serde_json::from_str(&json)? {
                Value::Array(filters) => Ok(filters),
                other => Ok(vec![other]),
            };
        }
    }

    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // =========================================================================
    // Builder Tests
    // =========================================================================

    #[test]
    fn test_default_query() {
        let query = RecordQuery::new();
        assert_eq!(query.start_page(), 1);
        assert!(query.filters.is_empty());
        assert_eq!(query.to_query_string(1), "page=1");
    }

    #[test]
    fn test_explicit_start_page() {
        let query = RecordQuery::new().page(3);
        assert_eq!(query.start_page(), 3);
        assert_eq!(query.to_query_string(4), "page=4");
    }

    #[test]
    fn test_parameter_order() {
        let query = RecordQuery::new()
            .rows_per_page(25)
            .sort("field_1", SortOrder::Desc)
            .record_id("abc123")
            .param("format", "raw");

        assert_eq!(
            query.to_query_string(2),
            "page=2&rows_per_page=25&sort_field=field_1&sort_order=desc&record_id=abc123&format=raw"
        );
    }

    #[test]
    fn test_known_params_set_typed_fields() {
        let query = RecordQuery::new()
            .param("page", "3")
            .param("rows_per_page", "10")
            .param("sort_field", "field_1")
            .param("sort_order", "DESC")
            .param("record_id", "abc");

        assert_eq!(query.start_page(), 3);
        assert!(query.params.is_empty());
        assert_eq!(
            query.to_query_string(3),
            "page=3&rows_per_page=10&sort_field=field_1&sort_order=desc&record_id=abc"
        );
    }

    #[test]
    fn test_filters_param_joins_typed_filters() {
        let query = RecordQuery::new()
            .filter(filters::is("field_1", "Lab"))
            .param("filters", r#"[{"field":"field_2","operator":"is blank"}]"#);

        let qs = query.to_query_string(1);
        assert_eq!(qs.matches("filters=").count(), 1);
        assert_eq!(
            decode_filters(&qs).unwrap(),
            vec![
                json!({"field": "field_1", "operator": "is", "value": "Lab"}),
                json!({"field": "field_2", "operator": "is blank"}),
            ]
        );
    }

    #[test]
    fn test_unparseable_known_param_is_dropped() {
        let query = RecordQuery::new().param("page", "two").param("sort_order", "up");
        assert_eq!(query.start_page(), 1);
        assert_eq!(query.to_query_string(1), "page=1");
    }

    #[test]
    fn test_plain_values_are_percent_encoded() {
        let query = RecordQuery::new().param("search", "a b&c");
        assert_eq!(query.to_query_string(1), "page=1&search=a%20b%26c");
    }

    // =========================================================================
    // Filter Tests
    // =========================================================================

    #[test]
    fn test_filter_helpers() {
        assert_eq!(
            filters::is("field_1", "Lab"),
            Filter {
                field: "field_1".into(),
                operator: "is".into(),
                value: Some(json!("Lab")),
            }
        );
        assert_eq!(filters::is_not_blank("field_2").value, None);
        assert_eq!(filters::higher_than("field_3", 10).operator, "higher than");
    }

    #[test]
    fn test_filters_are_encoded_json() {
        let query = RecordQuery::new().filter(filters::is("field_1", "Lab"));
        let qs = query.to_query_string(1);

        assert!(qs.starts_with("page=1&filters="));
        assert!(!qs.contains('{'));
        assert!(!qs.contains('"'));
        assert!(!qs.contains(' '));
    }

    #[test]
    fn test_filters_round_trip() {
        let query = RecordQuery::new()
            .filter(filters::is("field_1", "test"))
            .filter(filters::is_not_blank("field_2"))
            .filter(filters::lower_than("field_3", 4.5));

        let decoded = decode_filters(&query.to_query_string(1)).unwrap();
        let decoded: Vec<Filter> = decoded
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();

        assert_eq!(
            decoded,
            vec![
                filters::is("field_1", "test"),
                filters::is_not_blank("field_2"),
                filters::lower_than("field_3", 4.5),
            ]
        );
    }

    #[test]
    fn test_raw_filter_passes_through() {
        let rule = json!({"match": "or", "rules": [{"field": "field_1", "operator": "is", "value": 1}]});
        let query = RecordQuery::new().raw_filter(rule.clone());

        let decoded = decode_filters(&format!("records?{}", query.to_query_string(1))).unwrap();
        assert_eq!(decoded, vec![rule]);
    }

    #[test]
    fn test_decode_without_filters() {
        assert!(decode_filters("page=1&rows_per_page=10").unwrap().is_empty());
    }

    #[test]
    fn test_sort_order_serialization() {
        assert_eq!(serde_json::to_string(&SortOrder::Asc).unwrap(), "\"asc\"");
        assert_eq!(SortOrder::Desc.as_str(), "desc");
    }
}
