use std::sync::Arc;

use tracing::{debug, info, instrument};

use models::image::IMAGE_CONTENT_TYPE;
use models::ImageName;

use crate::errors::ServiceError;
use crate::store::{Clock, ImageFetcher, ObjectStore};

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Images gateway: copies generated images into the bucket and finds the
/// newest one for a dress-code/event-type pair.
pub struct ImageService {
    objects: Arc<dyn ObjectStore>,
    fetcher: Arc<dyn ImageFetcher>,
    clock: Arc<dyn Clock>,
}

impl ImageService {
    pub fn new(objects: Arc<dyn ObjectStore>, fetcher: Arc<dyn ImageFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self { objects, fetcher, clock }
    }

    /// Download `image_url` and store it as `{dress_code}-{event_type}-{now}.png`,
    /// returning the stored object's public URL.
    ///
    /// Two saves of the same pair within one second write the same name and the
    /// later one wins.
    #[instrument(skip(self, image_url))]
    pub async fn save(
        &self,
        image_url: Option<&str>,
        dress_code: Option<&str>,
        event_type: Option<&str>,
    ) -> Result<String, ServiceError> {
        let (Some(image_url), Some(dress_code), Some(event_type)) =
            (required(image_url), required(dress_code), required(event_type))
        else {
            return Err(ServiceError::Validation("Missing imageUrl, dressCode, or eventType".into()));
        };

        let bytes = self.fetcher.fetch(image_url).await?;
        let name = ImageName::new(dress_code, event_type, self.clock.now_unix()).to_string();
        debug!(%name, size = bytes.len(), "uploading image");
        self.objects.put_object(&name, bytes, IMAGE_CONTENT_TYPE).await?;
        let url = self.objects.public_url(&name)?;
        info!(%name, "image saved");
        Ok(url)
    }

    /// Public URL of the most recent image saved for the pair, judged by the
    /// timestamp embedded in the name rather than listing order.
    #[instrument(skip(self))]
    pub async fn find_latest(&self, dress_code: Option<&str>, event_type: Option<&str>) -> Result<String, ServiceError> {
        let (Some(dress_code), Some(event_type)) = (required(dress_code), required(event_type)) else {
            return Err(ServiceError::Validation("Missing dressCode or eventType".into()));
        };

        let objects = self.objects.list_objects().await?;
        let latest = objects
            .iter()
            .filter_map(|o| ImageName::parse_timestamp(&o.name, dress_code, event_type).map(|ts| (ts, &o.name)))
            .max_by_key(|(ts, _)| *ts);
        match latest {
            Some((_, name)) => self.objects.public_url(name),
            None => Err(ServiceError::NotFound("Image not found".into())),
        }
    }
}
