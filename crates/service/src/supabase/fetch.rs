use async_trait::async_trait;
use tracing::{error, info};

use crate::errors::ServiceError;
use crate::store::ImageFetcher;

/// Plain HTTP GET, buffering the whole body. Source images are small and
/// bounded, so no streaming.
#[derive(Clone)]
pub struct HttpImageFetcher {
    http: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new(http: reqwest::Client) -> Self { Self { http } }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        info!(source = url, "fetching source image");
        let resp = self.http.get(url).send().await.map_err(|e| {
            error!(source = url, error = %e, "image fetch failed");
            ServiceError::upstream("Failed to fetch image", e)
        })?;
        let status = resp.status();
        if !status.is_success() {
            error!(source = url, %status, "image source returned an error status");
            return Err(ServiceError::UpstreamStatus {
                status: status.as_u16(),
                message: "Failed to fetch image".into(),
            });
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ServiceError::upstream("Failed to read image data", e))?;
        Ok(bytes.to_vec())
    }
}
