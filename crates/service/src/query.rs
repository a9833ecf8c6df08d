//! Typed construction of data-service URLs.
//!
//! Table paths, object names and filter values go through `reqwest::Url`'s
//! segment and query-pair encoders, so names such as `"Neon Glow"` or values
//! containing `&` cannot leak into the surrounding URL structure.

use reqwest::Url;
use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// Row selection for a table call: an optional column projection plus
/// equality filters, rendered as PostgREST `select=` and `col=eq.value` pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    columns: Vec<String>,
    filters: Vec<(String, String)>,
}

impl Query {
    /// Every row, every column.
    pub fn all() -> Self { Self::default() }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn filters(&self) -> &[(String, String)] { &self.filters }

    pub fn select_clause(&self) -> String {
        if self.columns.is_empty() { "*".to_string() } else { self.columns.join(",") }
    }

    /// Append this query to `url`. The projection only applies to reads.
    pub fn apply(&self, url: &mut Url, with_select: bool) {
        if !with_select && self.filters.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        if with_select {
            pairs.append_pair("select", &self.select_clause());
        }
        for (column, value) in &self.filters {
            pairs.append_pair(column, &format!("eq.{value}"));
        }
    }

    /// Whether a JSON row satisfies every equality filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|(column, expected)| {
            row.get(column).and_then(as_text).as_deref() == Some(expected.as_str())
        })
    }

    /// Restrict a JSON row to the projected columns.
    pub fn project(&self, row: &Value) -> Value {
        if self.columns.is_empty() {
            return row.clone();
        }
        let mut out = Map::new();
        for column in &self.columns {
            if let Some(v) = row.get(column) {
                out.insert(column.clone(), v.clone());
            }
        }
        Value::Object(out)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a service base URL, rejecting anything that cannot carry a path.
pub fn parse_base(base: &str) -> Result<Url, ServiceError> {
    let url = Url::parse(base.trim())
        .map_err(|e| ServiceError::Validation(format!("invalid base url {base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ServiceError::Validation(format!("invalid base url {base}")));
    }
    Ok(url)
}

/// `base` extended by `segments`, each percent-encoded as a single path segment.
pub fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ServiceError> {
    let mut url = base.clone();
    url.set_query(None);
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ServiceError::Validation(format!("invalid base url {base}")))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}
