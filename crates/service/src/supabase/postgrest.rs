use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, Url};
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::ServiceError;
use crate::query::{join_segments, parse_base, Query};
use crate::store::TableStore;

use super::error_message;

/// `TableStore` over the PostgREST endpoint at `{base}/rest/v1`.
#[derive(Clone)]
pub struct PostgrestClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Result<Self, ServiceError> {
        Ok(Self { http, base: parse_base(base_url)?, api_key: api_key.to_string() })
    }

    fn table_url(&self, table: &str, query: &Query, with_select: bool) -> Result<Url, ServiceError> {
        let mut url = join_segments(&self.base, &["rest", "v1", table])?;
        query.apply(&mut url, with_select);
        Ok(url)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key).bearer_auth(&self.api_key)
    }

    async fn send(&self, op: &str, table: &str, req: RequestBuilder) -> Result<Response, ServiceError> {
        let resp = self.authorized(req).send().await.map_err(|e| {
            error!(op, table, error = %e, "data service request failed");
            ServiceError::from(e)
        })?;
        let status = resp.status();
        debug!(op, table, %status, "data service responded");
        if !status.is_success() {
            let message = error_message(resp).await;
            error!(op, table, %status, %message, "data service rejected request");
            return Err(ServiceError::Upstream(message));
        }
        Ok(resp)
    }
}

/// PostgREST answers with an array, a single object or nothing at all.
async fn rows(resp: Response) -> Result<Vec<Value>, ServiceError> {
    let body = resp.bytes().await?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Array(rows)) => Ok(rows),
        Ok(row @ Value::Object(_)) => Ok(vec![row]),
        Ok(other) => Err(ServiceError::Upstream(format!("unexpected data service payload: {other}"))),
        Err(e) => Err(ServiceError::upstream("cannot decode data service payload", e)),
    }
}

#[async_trait]
impl TableStore for PostgrestClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ServiceError> {
        let url = self.table_url(table, query, true)?;
        let resp = self.send("select", table, self.http.get(url)).await?;
        rows(resp).await
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, ServiceError> {
        let url = self.table_url(table, &Query::all(), false)?;
        let req = self.http.post(url).header("Prefer", "return=representation").json(&row);
        let resp = self.send("insert", table, req).await?;
        rows(resp).await
    }

    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, ServiceError> {
        let url = self.table_url(table, query, false)?;
        let req = self.http.patch(url).header("Prefer", "return=representation").json(&patch);
        let resp = self.send("update", table, req).await?;
        rows(resp).await
    }

    async fn delete(&self, table: &str, query: &Query) -> Result<(), ServiceError> {
        let url = self.table_url(table, query, false)?;
        let req = self.http.delete(url).header("Prefer", "return=minimal");
        self.send("delete", table, req).await?;
        Ok(())
    }
}
