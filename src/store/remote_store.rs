//! `RemoteStore`: one resource type's collection, reconciled with the server.
//!
//! Reads are network-first with cache fallback and never fail; writes are
//! surfaced to the notification sink and returned to the caller so form
//! flows can stay open on error. Nothing is retried automatically — a write
//! that fails while offline is gone unless the user retries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use super::cache::{CacheSnapshot, SnapshotStore};
use super::filter::FilterCriteria;
use super::resource::{CreateOutcome, Pagination, Resource};
use crate::api::{ApiClient, ApiError};
use crate::bus::{Action, EventBus};
use crate::notify::NotificationSink;

struct StoreState<R: Resource> {
    items: Vec<R>,
    stats: R::Stats,
    pagination: Pagination,
}

pub struct RemoteStore<R: Resource> {
    api: ApiClient,
    bus: Arc<EventBus>,
    snapshots: Arc<SnapshotStore>,
    sink: Arc<dyn NotificationSink>,
    state: Mutex<StoreState<R>>,
    /// Tickets for the stale-response guard: a load result only applies if
    /// no newer load was issued while it was in flight.
    load_seq: AtomicU64,
}

impl<R: Resource> RemoteStore<R> {
    pub fn new(
        api: ApiClient,
        bus: Arc<EventBus>,
        snapshots: Arc<SnapshotStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            api,
            bus,
            snapshots,
            sink,
            state: Mutex::new(StoreState {
                items: Vec::new(),
                stats: R::Stats::default(),
                pagination: Pagination::default(),
            }),
            load_seq: AtomicU64::new(0),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load one page of the collection. On success the in-memory collection
    /// and stats are replaced wholesale and a snapshot is persisted; on any
    /// failure the last snapshot (or an empty page with zeroed stats) is
    /// served instead. Never returns an error.
    pub async fn load(&self, criteria: &FilterCriteria) -> (Vec<R>, R::Stats) {
        let ticket = self.load_seq.fetch_add(1, Ordering::SeqCst);

        let fetched = match self
            .api
            .get_json(R::ENDPOINT, &criteria.query_pairs())
            .await
        {
            Ok(body) => R::parse_page(body),
            Err(err) => Err(err),
        };

        // Last-issued-wins: a newer load superseded this one while it was in
        // flight, so neither its page nor its failure fallback may touch the
        // state.
        if self.load_seq.load(Ordering::SeqCst) != ticket + 1 {
            tracing::debug!(kind = R::KIND, ticket, "discarding stale load response");
            return self.current();
        }

        match fetched {
            Ok(mut page) => {
                // The server is trusted for ordering, not for page size.
                page.items.truncate(criteria.limit as usize);

                {
                    let mut state = self.state.lock().expect("store mutex poisoned");
                    state.items = page.items.clone();
                    state.stats = page.stats.clone();
                    state.pagination = page.pagination.clone();
                }

                let snapshot = CacheSnapshot::now(page.items.clone(), page.stats.clone());
                if let Err(err) = self.snapshots.store(R::CACHE_KEY, &snapshot) {
                    tracing::warn!(kind = R::KIND, "failed to persist cache snapshot: {err}");
                }

                tracing::debug!(kind = R::KIND, count = page.items.len(), "loaded page");
                self.emit(
                    Action::Loaded,
                    None,
                    json!({
                        "count": page.items.len(),
                        "total": page.pagination.total,
                    }),
                );
                (page.items, page.stats)
            }
            Err(err) => {
                tracing::warn!(kind = R::KIND, "load failed, falling back to cache: {err}");
                let fallback = self.snapshots.read::<CacheSnapshot<R>>(R::CACHE_KEY);
                let (items, stats) = match fallback {
                    Some(snapshot) => (snapshot.items, snapshot.stats),
                    None => (Vec::new(), R::Stats::default()),
                };
                {
                    let mut state = self.state.lock().expect("store mutex poisoned");
                    state.items = items.clone();
                    state.stats = stats.clone();
                }
                (items, stats)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// POST a new record. Optimistic only after confirmation: the response
    /// record is prepended and stats are bumped, unless the server reported
    /// an `existing`/`reactivated` duplicate.
    pub async fn create(&self, body: Value) -> Result<CreateOutcome<R>, ApiError> {
        let result = self.api.post_json(R::ENDPOINT, &body).await;
        match result.and_then(R::parse_created) {
            Ok(outcome) => {
                if !outcome.existing && !outcome.reactivated {
                    if let Some(record) = &outcome.record {
                        self.absorb_created(record);
                    }
                }

                let resource_id = outcome.record.as_ref().map(|r| r.id().to_string());
                let payload = outcome
                    .record
                    .as_ref()
                    .and_then(|r| serde_json::to_value(r).ok())
                    .unwrap_or(Value::Null);
                self.emit(Action::Created, resource_id, payload);

                let message = outcome
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{} created", R::KIND));
                self.sink.success(&message);
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(kind = R::KIND, "create failed: {err}");
                self.sink.error(&format!("Error creating {}: {err}", R::KIND));
                Err(err)
            }
        }
    }

    /// PUT a partial update. Pessimistic: local state is only touched after
    /// the server confirms, and the record keeps its array position.
    pub async fn update(&self, id: &str, patch: Value) -> Result<R, ApiError> {
        let result = self.api.put_json(&self.item_path(id), &patch).await;
        match result.and_then(R::parse_updated) {
            Ok(record) => {
                {
                    let mut state = self.state.lock().expect("store mutex poisoned");
                    if let Some(slot) = state.items.iter_mut().find(|r| r.matches_id(id)) {
                        *slot = record.clone();
                    }
                }

                let payload = serde_json::to_value(&record).unwrap_or(Value::Null);
                self.emit(Action::Updated, Some(record.id().to_string()), payload);
                self.sink.success(&format!("{} updated", R::KIND));
                Ok(record)
            }
            Err(err) => {
                tracing::error!(kind = R::KIND, id, "update failed: {err}");
                self.sink.error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }

    /// DELETE a record and drop it from the local collection.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        match self.api.delete(&self.item_path(id), &[]).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().expect("store mutex poisoned");
                    if let Some(position) = state.items.iter().position(|r| r.matches_id(id)) {
                        let removed = state.items.remove(position);
                        removed.record_removed(&mut state.stats);
                        state.pagination.total = state.pagination.total.saturating_sub(1);
                    }
                }

                self.emit(Action::Deleted, Some(id.to_string()), json!({ "id": id }));
                self.sink.success(&format!("{} deleted", R::KIND));
                Ok(())
            }
            Err(err) => {
                tracing::error!(kind = R::KIND, id, "delete failed: {err}");
                self.sink.error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Local state
    // -----------------------------------------------------------------------

    pub fn items(&self) -> Vec<R> {
        self.state.lock().expect("store mutex poisoned").items.clone()
    }

    pub fn stats(&self) -> R::Stats {
        self.state.lock().expect("store mutex poisoned").stats.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .pagination
            .clone()
    }

    pub fn find(&self, id: &str) -> Option<R> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .items
            .iter()
            .find(|r| r.matches_id(id))
            .cloned()
    }

    fn current(&self) -> (Vec<R>, R::Stats) {
        let state = self.state.lock().expect("store mutex poisoned");
        (state.items.clone(), state.stats.clone())
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", R::ENDPOINT)
    }

    /// Prepend a confirmed new record and bump stats; shared by `create`
    /// and the media upload path.
    pub(crate) fn absorb_created(&self, record: &R) {
        let mut state = self.state.lock().expect("store mutex poisoned");
        record.record_added(&mut state.stats);
        state.items.insert(0, record.clone());
        state.pagination.total += 1;
    }

    pub(crate) fn emit(&self, action: Action, resource_id: Option<String>, payload: Value) {
        self.bus.emit(R::CATEGORY, action, resource_id, payload);
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn sink(&self) -> &dyn NotificationSink {
        self.sink.as_ref()
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }
}
