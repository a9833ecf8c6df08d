use async_trait::async_trait;
use reqwest::{header, Url};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use models::StoredObject;

use crate::errors::ServiceError;
use crate::query::{join_segments, parse_base};
use crate::store::ObjectStore;

use super::error_message;

/// Listing page size; the storage API caps a single page at 1000.
pub const LIST_PAGE_SIZE: usize = 1000;

/// Upper bound on listing pages fetched for one call.
pub const MAX_LIST_PAGES: usize = 100;

/// `ObjectStore` over `{base}/storage/v1` for one bucket.
///
/// Uploads use the anonymous key; listing needs the service-role key.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base: Url,
    bucket: String,
    anon_key: String,
    service_key: String,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    limit: usize,
    offset: usize,
    #[serde(rename = "sortBy")]
    sort_by: SortBy<'a>,
}

#[derive(Serialize)]
struct SortBy<'a> {
    column: &'a str,
    order: &'a str,
}

impl StorageClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        bucket: &str,
        anon_key: &str,
        service_key: &str,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http,
            base: parse_base(base_url)?,
            bucket: bucket.to_string(),
            anon_key: anon_key.to_string(),
            service_key: service_key.to_string(),
        })
    }

    async fn list_page(&self, offset: usize) -> Result<Vec<StoredObject>, ServiceError> {
        let url = join_segments(&self.base, &["storage", "v1", "object", "list", &self.bucket])?;
        let body = ListRequest {
            prefix: "",
            limit: LIST_PAGE_SIZE,
            offset,
            sort_by: SortBy { column: "name", order: "asc" },
        };
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = error_message(resp).await;
            error!(bucket = %self.bucket, %status, %message, "bucket listing failed");
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                message: "Supabase API error".into(),
            });
        }
        resp.json::<Vec<StoredObject>>()
            .await
            .map_err(|e| ServiceError::upstream("cannot decode bucket listing", e))
    }
}

#[async_trait]
impl ObjectStore for StorageClient {
    async fn put_object(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), ServiceError> {
        let url = join_segments(&self.base, &["storage", "v1", "object", &self.bucket, name])?;
        let size = bytes.len();
        info!(bucket = %self.bucket, object = name, size, "uploading object");
        let resp = self
            .http
            .put(url)
            .bearer_auth(&self.anon_key)
            .header("apikey", &self.anon_key)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = error_message(resp).await;
            error!(bucket = %self.bucket, object = name, %status, %message, "upload rejected");
            return Err(ServiceError::Upstream(format!("Failed to upload image: {message}")));
        }
        Ok(())
    }

    /// Pages through the whole bucket until a short page comes back.
    async fn list_objects(&self) -> Result<Vec<StoredObject>, ServiceError> {
        let mut objects: Vec<StoredObject> = Vec::new();
        let mut offset = 0;
        let mut previous_first: Option<String> = None;
        for page_no in 0..MAX_LIST_PAGES {
            let page = self.list_page(offset).await?;
            let fetched = page.len();
            let first = page.first().map(|o| o.name.clone());
            if page_no > 0 && first.is_some() && first == previous_first {
                warn!(bucket = %self.bucket, offset, "listing repeated a page, offset ignored by store");
                break;
            }
            objects.extend(page);
            if fetched < LIST_PAGE_SIZE {
                break;
            }
            if page_no + 1 == MAX_LIST_PAGES {
                warn!(bucket = %self.bucket, pages = MAX_LIST_PAGES, "listing truncated at page limit");
            }
            previous_first = first;
            offset += fetched;
        }
        debug!(bucket = %self.bucket, count = objects.len(), "bucket listed");
        Ok(objects)
    }

    fn public_url(&self, name: &str) -> Result<String, ServiceError> {
        let url = join_segments(&self.base, &["storage", "v1", "object", "public", &self.bucket, name])?;
        Ok(url.to_string())
    }
}
