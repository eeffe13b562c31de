//! User-facing success/error notifications.
//!
//! Stores report the outcome of every write through a `NotificationSink`
//! instead of rendering toasts themselves. Embedders pick the sink: logs,
//! an in-memory buffer, or the event bus for a UI layer listening there.

use std::sync::Arc;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::bus::{Action, Category, EventBus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, message: &str) {
        self.notify(Notification {
            severity: Severity::Success,
            message: message.to_string(),
        });
    }

    fn error(&self, message: &str) {
        self.notify(Notification {
            severity: Severity::Error,
            message: message.to_string(),
        });
    }
}

/// Logs notifications through `tracing`. The default sink.
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => tracing::info!("{}", notification.message),
            Severity::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Collects notifications in memory; tests inspect what the user would
/// have been shown.
#[derive(Default)]
pub struct BufferSink {
    entries: Mutex<Vec<Notification>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<Notification> {
        self.entries.lock().expect("notification buffer poisoned").clone()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().expect("notification buffer poisoned"))
    }
}

impl NotificationSink for BufferSink {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .expect("notification buffer poisoned")
            .push(notification);
    }
}

/// Forwards notifications onto the event bus under the `notification`
/// category, for UI layers that already subscribe there.
pub struct BusSink {
    bus: Arc<EventBus>,
}

impl BusSink {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }
}

impl NotificationSink for BusSink {
    fn notify(&self, notification: Notification) {
        let payload = serde_json::to_value(&notification).unwrap_or_default();
        self.bus
            .emit(Category::Notification, Action::Shown, None, payload);
    }
}
