use std::sync::Arc;

use tracing::{info, instrument};

use models::{Event, NewEvent};

use crate::errors::ServiceError;
use crate::query::Query;
use crate::store::{decode_rows, first_row, TableStore};

pub const EVENTS_TABLE: &str = "events";

/// Events gateway: create, list, fetch and delete rows of the `events` table.
pub struct EventService {
    store: Arc<dyn TableStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn TableStore>) -> Self { Self { store } }

    #[instrument(skip(self, new), fields(name = %new.name))]
    pub async fn create(&self, new: NewEvent) -> Result<Event, ServiceError> {
        let row = serde_json::to_value(&new).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let rows = self.store.insert(EVENTS_TABLE, row).await?;
        let event: Event = first_row(rows, "event")?;
        info!(id = %event.id, "event created");
        Ok(event)
    }

    /// All events in whatever order the data service returns them.
    pub async fn list(&self) -> Result<Vec<Event>, ServiceError> {
        let rows = self.store.select(EVENTS_TABLE, &Query::all()).await?;
        decode_rows(rows, "event")
    }

    pub async fn get(&self, id: &str) -> Result<Event, ServiceError> {
        let rows = self.store.select(EVENTS_TABLE, &Query::all().eq("id", id)).await?;
        let mut events: Vec<Event> = decode_rows(rows, "event")?;
        match events.len() {
            0 => Err(ServiceError::not_found("Event")),
            1 => Ok(events.remove(0)),
            n => Err(ServiceError::Upstream(format!("{n} events share id {id}"))),
        }
    }

    /// Idempotent: deleting a missing id succeeds.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store.delete(EVENTS_TABLE, &Query::all().eq("id", id)).await?;
        info!("event deleted");
        Ok(())
    }
}
