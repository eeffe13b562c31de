//! The `Resource` trait: what a domain type must provide so a
//! `RemoteStore` can manage it.
//!
//! The three Fooodis APIs use different response envelopes (tickets wrap
//! everything in `{success, data}`, subscribers and media are flat), so
//! envelope decoding lives on the resource, not the store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::bus::Category;

/// Server-side pagination echo. `hasMore` is the wire spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default, alias = "hasMore")]
    pub has_more: bool,
}

/// One decoded page of a collection listing.
#[derive(Debug, Clone)]
pub struct ListPage<R: Resource> {
    pub items: Vec<R>,
    pub stats: R::Stats,
    pub pagination: Pagination,
}

/// Outcome of a create call. The subscriber endpoint is idempotent and
/// reports `existing`/`reactivated` instead of failing on duplicates; in
/// either of those cases the local collection must not be touched.
#[derive(Debug, Clone)]
pub struct CreateOutcome<R: Resource> {
    pub record: Option<R>,
    pub existing: bool,
    pub reactivated: bool,
    pub message: Option<String>,
}

pub trait Resource:
    std::fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Stats: std::fmt::Debug
        + Clone
        + Default
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    /// Lowercase singular kind, used in log lines and notifications.
    const KIND: &'static str;
    /// Bus category this resource publishes under.
    const CATEGORY: Category;
    /// Collection endpoint, e.g. `/api/tickets`.
    const ENDPOINT: &'static str;
    /// Snapshot file stem for the cache-of-last-resort.
    const CACHE_KEY: &'static str;

    fn id(&self) -> &str;

    /// Whether `id` refers to this record. Tickets also answer to their
    /// human-facing ticket number.
    fn matches_id(&self, id: &str) -> bool {
        self.id() == id
    }

    fn parse_page(body: Value) -> Result<ListPage<Self>, ApiError>;
    fn parse_created(body: Value) -> Result<CreateOutcome<Self>, ApiError>;
    fn parse_updated(body: Value) -> Result<Self, ApiError>;

    /// Optimistic stats bump after this record entered the collection.
    fn record_added(&self, stats: &mut Self::Stats);
    /// Stats decrement after this record left the collection.
    fn record_removed(&self, stats: &mut Self::Stats);
}

/// Decode a typed list out of `body[field]`, tolerating a missing field
/// (the APIs omit empty arrays).
pub(crate) fn decode_list<T: DeserializeOwned>(
    body: &Value,
    field: &str,
) -> Result<Vec<T>, ApiError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| ApiError::Decode(format!("bad `{field}` array: {e}"))),
    }
}

pub(crate) fn decode_field<T: DeserializeOwned>(body: &Value, field: &str) -> Result<T, ApiError> {
    let value = body
        .get(field)
        .ok_or_else(|| ApiError::Decode(format!("missing `{field}`")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| ApiError::Decode(format!("bad `{field}`: {e}")))
}

pub(crate) fn decode_pagination(body: &Value) -> Pagination {
    body.get("pagination")
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}
