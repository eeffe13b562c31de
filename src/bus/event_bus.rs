use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use super::event_types::{Action, Category};

const BUS_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    /// Order of publication on this bus.
    pub seq: i64,
    pub category: Category,
    pub action: Action,
    /// Identifier of the resource the event concerns, when there is one.
    pub resource_id: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl BusEvent {
    /// Qualified wire name, e.g. `subscriber.created`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.category, self.action)
    }

    pub fn is(&self, category: Category, action: Action) -> bool {
        self.category == category && self.action == action
    }
}

pub struct EventBus {
    tx: broadcast::Sender<BusEvent>,
    next_seq: AtomicI64,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            next_seq: AtomicI64::new(0),
        }
    }

    /// Stamp and publish one event. Publishing with no subscribers is a
    /// no-op, not an error.
    pub fn emit(
        &self,
        category: Category,
        action: Action,
        resource_id: Option<String>,
        payload: serde_json::Value,
    ) -> BusEvent {
        let event = BusEvent {
            id: Uuid::new_v4().to_string(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            category,
            action,
            resource_id,
            payload,
            created_at: Utc::now().to_rfc3339(),
        };
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(name = %event.name(), "event published with no subscribers");
        }
        event
    }

    /// Get a new receiver for this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.tx.subscribe()
    }
}
