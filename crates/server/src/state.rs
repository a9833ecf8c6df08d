use std::sync::Arc;

use service::store::{Clock, ImageFetcher, ObjectStore, SystemClock, TableStore};
use service::supabase::SupabaseBackends;
use service::{DressCodeService, EventService, ImageService, InvitationService};

/// Shared, immutable handler state. Built once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub invitations: Arc<InvitationService>,
    pub dress_codes: Arc<DressCodeService>,
    pub images: Arc<ImageService>,
}

impl AppState {
    pub fn new(
        tables: Arc<dyn TableStore>,
        objects: Arc<dyn ObjectStore>,
        fetcher: Arc<dyn ImageFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            events: Arc::new(EventService::new(tables.clone())),
            invitations: Arc::new(InvitationService::new(tables.clone())),
            dress_codes: Arc::new(DressCodeService::new(tables)),
            images: Arc::new(ImageService::new(objects, fetcher, clock)),
        }
    }

    pub fn from_backends(backends: SupabaseBackends) -> Self {
        Self::new(backends.tables, backends.objects, backends.fetcher, Arc::new(SystemClock))
    }
}
