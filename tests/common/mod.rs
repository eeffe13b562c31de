//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::{json, Value};
use tempfile::TempDir;

use fooodis_admin::{AdminConfig, AdminContext, BufferSink};

pub const TEST_DEBOUNCE: Duration = Duration::from_millis(40);

/// Context wired to a mock server and a throwaway cache dir, with a
/// buffering notification sink for inspection.
pub fn test_context(server: &MockServer, cache_dir: &TempDir) -> (AdminContext, Arc<BufferSink>) {
    let sink = Arc::new(BufferSink::new());
    let config = AdminConfig::new(server.base_url(), cache_dir.path())
        .with_search_debounce(TEST_DEBOUNCE);
    let context = AdminContext::new(config).with_sink(sink.clone());
    (context, sink)
}

/// Context pointing at a port nothing listens on, reusing an existing
/// cache dir, for offline-fallback scenarios.
pub fn offline_context(cache_dir: &TempDir) -> AdminContext {
    AdminContext::new(AdminConfig::new("http://127.0.0.1:1", cache_dir.path()))
}

pub fn subscriber_json(id: &str, email: &str, status: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "name": null,
        "status": status,
        "source": "manual",
        "subscribed_at": "2026-08-01T00:00:00Z"
    })
}

pub fn subscribers_page(subscribers: Vec<Value>, total: u64) -> Value {
    let stats = json!({
        "total": total,
        "active": subscribers.len(),
        "unsubscribed": 0,
        "bounced": 0
    });
    json!({
        "subscribers": subscribers,
        "stats": stats,
        "pagination": {"total": total, "limit": 20, "offset": 0, "hasMore": false}
    })
}

pub fn ticket_json(id: &str, number: &str, subject: &str, status: &str) -> Value {
    json!({
        "id": id,
        "ticket_number": number,
        "subject": subject,
        "status": status,
        "priority": "medium",
        "category": "general",
        "customer_name": "Jamie",
        "customer_email": "jamie@example.com",
        "messages": [],
        "created_at": "2026-08-01T00:00:00Z",
        "updated_at": "2026-08-01T00:00:00Z"
    })
}

pub fn tickets_page(tickets: Vec<Value>, total: u64) -> Value {
    json!({
        "success": true,
        "data": {
            "tickets": tickets,
            "stats": {"total": total, "open": total, "in_progress": 0, "resolved": 0, "closed": 0},
            "pagination": {"total": total, "limit": 20, "offset": 0, "hasMore": false}
        }
    })
}

pub fn media_json(id: &str, filename: &str, folder: &str) -> Value {
    json!({
        "id": id,
        "filename": filename,
        "folder": folder,
        "mime_type": "image/jpeg",
        "url": format!("https://cdn.fooodis.com/{folder}/{filename}"),
        "size": 102400,
        "created_at": "2026-08-01T00:00:00Z"
    })
}

pub fn media_page(media: Vec<Value>, total: u64) -> Value {
    json!({
        "media": media,
        "pagination": {"total": total, "limit": 20, "offset": 0, "hasMore": false}
    })
}
