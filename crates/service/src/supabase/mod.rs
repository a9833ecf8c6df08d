//! reqwest-backed implementations of the collaborator traits against a
//! Supabase project (PostgREST tables plus the storage API).

use std::sync::Arc;

use configs::{HttpConfig, SupabaseConfig};
use reqwest::Response;
use tracing::warn;

use crate::errors::ServiceError;
use crate::store::{ImageFetcher, ObjectStore, TableStore};

pub mod fetch;
pub mod postgrest;
pub mod storage;

pub use fetch::HttpImageFetcher;
pub use postgrest::PostgrestClient;
pub use storage::StorageClient;

/// One shared HTTP client with bounded connect and request timeouts.
pub fn build_http_client(cfg: &HttpConfig) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .connect_timeout(cfg.connect_timeout())
        .timeout(cfg.request_timeout())
        .build()
        .map_err(|e| ServiceError::upstream("cannot build http client", e))
}

/// The production collaborators, sharing one HTTP client.
#[derive(Clone)]
pub struct SupabaseBackends {
    pub tables: Arc<dyn TableStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub fetcher: Arc<dyn ImageFetcher>,
}

impl SupabaseBackends {
    pub fn connect(cfg: &SupabaseConfig, http: reqwest::Client) -> Result<Self, ServiceError> {
        let tables = PostgrestClient::new(http.clone(), &cfg.url, &cfg.anon_key)?;
        let objects = StorageClient::new(
            http.clone(),
            &cfg.url,
            &cfg.bucket,
            &cfg.anon_key,
            &cfg.service_role_key,
        )?;
        Ok(Self {
            tables: Arc::new(tables),
            objects: Arc::new(objects),
            fetcher: Arc::new(HttpImageFetcher::new(http)),
        })
    }
}

/// Best-effort human readable message from an error body: the `message` or
/// `error` field of a JSON body, else the raw text.
pub(crate) async fn error_message(resp: Response) -> String {
    let status = resp.status();
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(%status, error = %e, "cannot read error body from data service");
            return status.to_string();
        }
    };
    let from_json = serde_json::from_str::<serde_json::Value>(&body).ok().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(*key).and_then(|m| m.as_str()).map(str::to_string))
    });
    match from_json {
        Some(msg) => msg,
        None if body.trim().is_empty() => status.to_string(),
        None => body,
    }
}
