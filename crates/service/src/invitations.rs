use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use models::{Invitation, InvitationStatus, NewInvitation};

use crate::errors::ServiceError;
use crate::query::Query;
use crate::store::{decode_rows, first_row, TableStore};

pub const INVITATIONS_TABLE: &str = "invitations";

/// Invitations gateway over the `invitations` table.
pub struct InvitationService {
    store: Arc<dyn TableStore>,
}

impl InvitationService {
    pub fn new(store: Arc<dyn TableStore>) -> Self { Self { store } }

    /// The referenced event is not checked; integrity is left to the data service.
    #[instrument(skip(self, new), fields(event_id = %new.event_id))]
    pub async fn create(&self, new: NewInvitation) -> Result<Invitation, ServiceError> {
        let row = serde_json::to_value(&new).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let rows = self.store.insert(INVITATIONS_TABLE, row).await?;
        let invitation: Invitation = first_row(rows, "invitation")?;
        info!(id = %invitation.id, "invitation created");
        Ok(invitation)
    }

    pub async fn list(&self) -> Result<Vec<Invitation>, ServiceError> {
        let rows = self.store.select(INVITATIONS_TABLE, &Query::all()).await?;
        decode_rows(rows, "invitation")
    }

    /// Mark an invitation accepted. Repeating it is harmless; an id that
    /// matches no row is `NotFound`.
    #[instrument(skip(self))]
    pub async fn accept(&self, id: &str) -> Result<(), ServiceError> {
        let patch = json!({ "status": InvitationStatus::Accepted.as_str() });
        let affected = self
            .store
            .update(INVITATIONS_TABLE, &Query::all().eq("id", id), patch)
            .await?;
        if affected.is_empty() {
            warn!("accept matched no invitation");
            return Err(ServiceError::not_found("Invitation"));
        }
        info!("invitation accepted");
        Ok(())
    }
}
