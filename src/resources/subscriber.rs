//! Email subscribers.
//!
//! The subscriber API uses flat envelopes and an idempotent create: posting
//! an address that already exists answers with `existing` (or `reactivated`
//! when a previously unsubscribed address comes back) instead of an error,
//! and the local collection must not change in that case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::ApiError;
use crate::bus::Category;
use crate::render::LineItem;
use crate::store::remote_store::RemoteStore;
use crate::store::resource::{
    decode_field, decode_list, decode_pagination, CreateOutcome, ListPage, Resource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberStatus {
    Active,
    Unsubscribed,
    Bounced,
}

impl SubscriberStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Unsubscribed => "unsubscribed",
            Self::Bounced => "bounced",
        }
    }
}

impl fmt::Display for SubscriberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "unsubscribed" => Ok(Self::Unsubscribed),
            "bounced" => Ok(Self::Bounced),
            _ => Err(format!("unknown subscriber status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub status: SubscriberStatus,
    #[serde(default)]
    pub source: Option<String>,
    pub subscribed_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriberStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub active: u64,
    #[serde(default)]
    pub unsubscribed: u64,
    #[serde(default)]
    pub bounced: u64,
}

impl SubscriberStats {
    fn counter(&mut self, status: SubscriberStatus) -> &mut u64 {
        match status {
            SubscriberStatus::Active => &mut self.active,
            SubscriberStatus::Unsubscribed => &mut self.unsubscribed,
            SubscriberStatus::Bounced => &mut self.bounced,
        }
    }
}

/// Body for a manual subscriber create.
pub fn new_subscriber_body(email: &str, name: Option<&str>, source: Option<&str>) -> Value {
    json!({
        "email": email,
        "name": name,
        "source": source.unwrap_or("manual"),
    })
}

impl Resource for Subscriber {
    type Stats = SubscriberStats;

    const KIND: &'static str = "subscriber";
    const CATEGORY: Category = Category::Subscriber;
    const ENDPOINT: &'static str = "/api/subscribers";
    const CACHE_KEY: &'static str = "email_subscribers_cache";

    fn id(&self) -> &str {
        &self.id
    }

    fn parse_page(body: Value) -> Result<ListPage<Self>, ApiError> {
        Ok(ListPage {
            items: decode_list(&body, "subscribers")?,
            stats: body
                .get("stats")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            pagination: decode_pagination(&body),
        })
    }

    fn parse_created(body: Value) -> Result<CreateOutcome<Self>, ApiError> {
        let existing = body.get("existing").and_then(Value::as_bool).unwrap_or(false);
        let reactivated = body
            .get("reactivated")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        let record = match body.get("subscriber") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value(value.clone())
                    .map_err(|e| ApiError::Decode(format!("bad subscriber record: {e}")))?,
            ),
        };
        Ok(CreateOutcome {
            record,
            existing,
            reactivated,
            message,
        })
    }

    fn parse_updated(body: Value) -> Result<Self, ApiError> {
        decode_field(&body, "subscriber")
    }

    fn record_added(&self, stats: &mut SubscriberStats) {
        stats.total += 1;
        *stats.counter(self.status) += 1;
    }

    fn record_removed(&self, stats: &mut SubscriberStats) {
        stats.total = stats.total.saturating_sub(1);
        let counter = stats.counter(self.status);
        *counter = counter.saturating_sub(1);
    }
}

impl LineItem for Subscriber {
    fn summary_line(&self) -> String {
        format!(
            "{} · {}{}",
            self.email,
            self.status,
            self.source
                .as_deref()
                .map(|s| format!(" ({s})"))
                .unwrap_or_default()
        )
    }

    fn detail_lines(&self) -> Vec<String> {
        vec![
            self.email.clone(),
            self.name.clone().unwrap_or_else(|| "(no name)".to_string()),
            format!("{} since {}", self.status, self.subscribed_at),
        ]
    }
}

impl RemoteStore<Subscriber> {
    pub async fn unsubscribe(&self, id: &str) -> Result<Subscriber, ApiError> {
        self.update(id, json!({ "status": SubscriberStatus::Unsubscribed.as_str() }))
            .await
    }

    pub async fn reactivate(&self, id: &str) -> Result<Subscriber, ApiError> {
        self.update(id, json!({ "status": SubscriberStatus::Active.as_str() }))
            .await
    }
}
