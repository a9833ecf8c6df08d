use std::sync::Arc;

use tracing::{info, instrument, warn};

use models::DressCode;

use crate::errors::ServiceError;
use crate::query::Query;
use crate::store::{decode_rows, TableStore};

pub const DRESS_CODES_TABLE: &str = "dress_codes";

/// Dress codes gateway. The table is append-only reference data: there is no
/// update, no delete and no uniqueness check on `(name, event_type)`.
pub struct DressCodeService {
    store: Arc<dyn TableStore>,
}

impl DressCodeService {
    pub fn new(store: Arc<dyn TableStore>) -> Self { Self { store } }

    /// All dress codes, or only those whose `event_type` equals `event_type`
    /// exactly. An empty filter counts as no filter.
    pub async fn list(&self, event_type: Option<&str>) -> Result<Vec<DressCode>, ServiceError> {
        let mut query = Query::all().columns(&["name", "event_type"]);
        if let Some(event_type) = event_type.filter(|t| !t.is_empty()) {
            query = query.eq("event_type", event_type);
        }
        let rows = self.store.select(DRESS_CODES_TABLE, &query).await?;
        let codes: Vec<DressCode> = decode_rows(rows, "dress code")?;
        if codes.is_empty() {
            warn!(event_type = ?event_type, "no dress codes found");
        }
        Ok(codes)
    }

    #[instrument(skip(self, code), fields(name = %code.name, event_type = %code.event_type))]
    pub async fn insert(&self, code: DressCode) -> Result<(), ServiceError> {
        code.validate()?;
        let row = serde_json::to_value(&code).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let rows = self.store.insert(DRESS_CODES_TABLE, row).await?;
        if rows.is_empty() {
            warn!("insert reported no affected rows");
            return Err(ServiceError::Upstream("No dress code was inserted".into()));
        }
        info!("dress code inserted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTableStore;

    async fn seeded() -> (Arc<MemoryTableStore>, DressCodeService) {
        let store = Arc::new(MemoryTableStore::new());
        let svc = DressCodeService::new(store.clone());
        for (name, event_type) in [("Neon Glow", "party"), ("Great Gatsby", "party"), ("Corporate Chic", "business"), ("Pool Party", "party-night")] {
            svc.insert(DressCode::new(name, event_type)).await.unwrap();
        }
        (store, svc)
    }

    #[tokio::test]
    async fn filter_is_exact_match() {
        let (_, svc) = seeded().await;
        let party = svc.list(Some("party")).await.unwrap();
        assert_eq!(party.len(), 2);
        assert!(party.iter().all(|c| c.event_type == "party"));
        assert!(svc.list(Some("part")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_filter_lists_everything() {
        let (_, svc) = seeded().await;
        assert_eq!(svc.list(Some("")).await.unwrap().len(), 4);
        assert_eq!(svc.list(None).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn list_projects_name_and_event_type() {
        let (store, svc) = seeded().await;
        assert!(store.rows(DRESS_CODES_TABLE)[0].get("id").is_some());
        // DressCode rejects unknown fields, so decoding only works on the projection.
        assert_eq!(svc.list(Some("business")).await.unwrap(), vec![DressCode::new("Corporate Chic", "business")]);
    }

    #[tokio::test]
    async fn duplicates_are_allowed() {
        let (_, svc) = seeded().await;
        svc.insert(DressCode::new("Neon Glow", "party")).await.unwrap();
        assert_eq!(svc.list(Some("party")).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn blank_name_never_reaches_the_store() {
        let store = Arc::new(MemoryTableStore::new());
        let svc = DressCodeService::new(store.clone());
        assert!(matches!(svc.insert(DressCode::new(" ", "party")).await, Err(ServiceError::Model(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn zero_affected_rows_is_upstream_error() {
        let store = Arc::new(MemoryTableStore::new());
        store.set_swallow_inserts(true);
        let svc = DressCodeService::new(store);
        let err = svc.insert(DressCode::new("Neon Glow", "party")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(msg) if msg == "No dress code was inserted"));
    }
}
