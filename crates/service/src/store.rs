//! Collaborator seams between the gateways and the hosted data service.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use models::StoredObject;

use crate::errors::ServiceError;
use crate::query::Query;

/// Row-level access to the relational store. Rows travel as JSON objects;
/// the gateways own the typed decoding.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ServiceError>;

    /// Insert one row and return the stored representation(s).
    async fn insert(&self, table: &str, row: Value) -> Result<Vec<Value>, ServiceError>;

    /// Merge `patch` into every matching row and return the affected rows.
    async fn update(&self, table: &str, query: &Query, patch: Value) -> Result<Vec<Value>, ServiceError>;

    /// Remove matching rows. Matching nothing is not an error.
    async fn delete(&self, table: &str, query: &Query) -> Result<(), ServiceError>;
}

/// The image bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `bytes` under `name`, replacing any existing object of that name.
    async fn put_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError>;

    async fn list_objects(&self) -> Result<Vec<StoredObject>, ServiceError>;

    /// Public read URL for `name`. Readability is not verified.
    fn public_url(&self, name: &str) -> Result<String, ServiceError>;
}

/// Downloads source images (e.g. freshly generated ones) before upload.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError>;
}

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_unix(&self) -> i64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 { chrono::Utc::now().timestamp() }
}

/// Decode data-service rows; a row that does not fit `T` is an upstream fault.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<Vec<T>, ServiceError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| ServiceError::upstream(&format!("unexpected {what} row"), e)))
        .collect()
}

/// The single stored row an insert is expected to echo back.
pub(crate) fn first_row<T: DeserializeOwned>(rows: Vec<Value>, what: &str) -> Result<T, ServiceError> {
    decode_rows::<T>(rows, what)?
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::Upstream(format!("data service returned no {what} row")))
}
