//! Typed page envelope for API responses
//!
//! Every speedrun.com response is shaped as `{"data": ..., "pagination"?: ...}`.
//! `data` is an array for collection endpoints and an object for single-entity
//! endpoints; `pagination` only appears on paginated collections.

use serde::Deserialize;
use serde_json::{Map, Value};

/// One decoded API response body
///
/// A missing `data` field is a deserialization error by construction: the
/// field has no default, so `serde_json::from_str` rejects bodies without it.
#[derive(Debug, Deserialize)]
pub struct PageEnvelope {
    /// The payload: an array of records, or a single record object
    pub data: Value,
    /// Pagination metadata, absent on unpaginated responses
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination metadata attached to a collection response
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    /// Offset of this page within the full result set
    #[serde(default)]
    pub offset: Option<u64>,
    /// Maximum page size requested
    #[serde(default)]
    pub max: Option<u64>,
    /// Number of records in this page
    #[serde(default)]
    pub size: Option<u64>,
    /// Navigation links; a `rel = "next"` entry means more results exist
    #[serde(default)]
    pub links: Vec<PaginationLink>,
}

/// A single pagination navigation link
#[derive(Debug, Deserialize)]
pub struct PaginationLink {
    pub rel: String,
    pub uri: String,
}

impl PageEnvelope {
    /// Returns the URI of the next page, if the response links to one
    pub fn next_uri(&self) -> Option<&str> {
        self.pagination
            .as_ref()?
            .links
            .iter()
            .find(|link| link.rel == "next")
            .map(|link| link.uri.as_str())
    }

    /// Consumes the envelope, returning its records
    ///
    /// Fails if `data` is not an array of objects.
    pub fn into_records(self) -> Result<Vec<Map<String, Value>>, String> {
        match self.data {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(format!(
                        "expected record object in data array, got {}",
                        type_name(&other)
                    )),
                })
                .collect(),
            other => Err(format!("expected data array, got {}", type_name(&other))),
        }
    }

    /// Consumes the envelope, returning its single record
    ///
    /// Fails if `data` is not an object. Used for single-entity endpoints
    /// like `users/{id}`.
    pub fn into_record(self) -> Result<Map<String, Value>, String> {
        match self.data {
            Value::Object(record) => Ok(record),
            other => Err(format!("expected data object, got {}", type_name(&other))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
