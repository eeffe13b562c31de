//! Support tickets.
//!
//! The ticket API wraps every response in `{success, data}`; the helpers
//! here unwrap that envelope once so the store never sees it. Tickets are
//! addressable by internal id or by the human-facing `TKT-...` number.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::ApiError;
use crate::bus::{Action, Category};
use crate::render::LineItem;
use crate::store::remote_store::RemoteStore;
use crate::store::resource::{
    decode_field, decode_list, decode_pagination, CreateOutcome, ListPage, Resource,
};

// ---------------------------------------------------------------------------
// Status and priority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    pub const fn all() -> &'static [TicketStatus] {
        &[
            TicketStatus::Open,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
            TicketStatus::Closed,
        ]
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "in_progress" | "in-progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("unknown ticket status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(format!("unknown ticket priority: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketMessage {
    pub id: String,
    pub content: String,
    pub author_type: String,
    pub author_name: String,
    #[serde(default)]
    pub is_internal: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub ticket_number: String,
    pub subject: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub messages: Vec<TicketMessage>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub open: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub resolved: u64,
    #[serde(default)]
    pub closed: u64,
}

impl TicketStats {
    fn counter(&mut self, status: TicketStatus) -> &mut u64 {
        match status {
            TicketStatus::Open => &mut self.open,
            TicketStatus::InProgress => &mut self.in_progress,
            TicketStatus::Resolved => &mut self.resolved,
            TicketStatus::Closed => &mut self.closed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCategory {
    pub id: String,
    pub name: String,
    pub color: String,
}

/// Category catalog served when `/api/tickets/categories` is unreachable.
pub fn default_categories() -> Vec<TicketCategory> {
    let entries = [
        ("general", "General", "#478ac9"),
        ("technical", "Technical", "#e74c3c"),
        ("billing", "Billing", "#27ae60"),
        ("feature", "Feature Request", "#9b59b6"),
        ("feedback", "Feedback", "#f39c12"),
    ];
    entries
        .into_iter()
        .map(|(id, name, color)| TicketCategory {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Wire envelope
// ---------------------------------------------------------------------------

fn envelope_data(body: Value) -> Result<Value, ApiError> {
    if !body.get("success").and_then(Value::as_bool).unwrap_or(false) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("ticket API reported failure");
        return Err(ApiError::Decode(message.to_string()));
    }
    body.get("data")
        .cloned()
        .ok_or_else(|| ApiError::Decode("missing `data` in ticket response".to_string()))
}

impl Resource for Ticket {
    type Stats = TicketStats;

    const KIND: &'static str = "ticket";
    const CATEGORY: Category = Category::Ticket;
    const ENDPOINT: &'static str = "/api/tickets";
    const CACHE_KEY: &'static str = "support_tickets_cache";

    fn id(&self) -> &str {
        &self.id
    }

    fn matches_id(&self, id: &str) -> bool {
        self.id == id || self.ticket_number == id
    }

    fn parse_page(body: Value) -> Result<ListPage<Self>, ApiError> {
        let data = envelope_data(body)?;
        Ok(ListPage {
            items: decode_list(&data, "tickets")?,
            stats: data
                .get("stats")
                .and_then(|v| serde_json::from_value(v.clone()).ok())
                .unwrap_or_default(),
            pagination: decode_pagination(&data),
        })
    }

    fn parse_created(body: Value) -> Result<CreateOutcome<Self>, ApiError> {
        let data = envelope_data(body)?;
        let ticket: Ticket = serde_json::from_value(data)
            .map_err(|e| ApiError::Decode(format!("bad ticket record: {e}")))?;
        let message = Some(format!("Ticket #{} created", ticket.ticket_number));
        Ok(CreateOutcome {
            record: Some(ticket),
            existing: false,
            reactivated: false,
            message,
        })
    }

    fn parse_updated(body: Value) -> Result<Self, ApiError> {
        let data = envelope_data(body)?;
        decode_field(&data, "ticket")
    }

    fn record_added(&self, stats: &mut TicketStats) {
        stats.total += 1;
        *stats.counter(self.status) += 1;
    }

    fn record_removed(&self, stats: &mut TicketStats) {
        stats.total = stats.total.saturating_sub(1);
        let counter = stats.counter(self.status);
        *counter = counter.saturating_sub(1);
    }
}

impl LineItem for Ticket {
    fn summary_line(&self) -> String {
        format!(
            "[{}] {} · {} · {}",
            self.ticket_number, self.subject, self.status, self.priority
        )
    }

    fn detail_lines(&self) -> Vec<String> {
        vec![
            format!("{} — {}", self.ticket_number, self.subject),
            format!("from {} <{}>", self.customer_name, self.customer_email),
            format!(
                "{} / {} / {}",
                self.status,
                self.priority,
                if self.category.is_empty() {
                    "uncategorized"
                } else {
                    &self.category
                }
            ),
            format!("{} message(s)", self.messages.len()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Ticket-specific store operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReplyOptions {
    pub author_name: Option<String>,
    pub is_internal: bool,
    /// Transition the ticket to resolved along with the reply.
    pub resolve: bool,
    /// Transition the ticket to closed; wins over `resolve`.
    pub close: bool,
}

impl RemoteStore<Ticket> {
    /// Post an admin reply to a ticket thread, optionally transitioning the
    /// ticket status in the same call.
    pub async fn reply(
        &self,
        id: &str,
        content: &str,
        options: ReplyOptions,
    ) -> Result<TicketMessage, ApiError> {
        let update_status = if options.close {
            Some(TicketStatus::Closed.as_str())
        } else if options.resolve {
            Some(TicketStatus::Resolved.as_str())
        } else {
            None
        };
        let body = json!({
            "content": content,
            "author_type": "admin",
            "author_name": options.author_name.as_deref().unwrap_or("Support Team"),
            "is_internal": options.is_internal,
            "update_status": update_status,
        });

        let path = format!("{}/{id}/messages", Ticket::ENDPOINT);
        let result = self.api().post_json(&path, &body).await;
        match result.and_then(|b| envelope_data(b).and_then(|data| decode_field(&data, "message"))) {
            Ok(message) => {
                self.emit(
                    Action::Replied,
                    Some(id.to_string()),
                    serde_json::to_value(&message).unwrap_or(Value::Null),
                );
                self.sink().success("Reply sent");
                Ok(message)
            }
            Err(err) => {
                tracing::error!(id, "ticket reply failed: {err}");
                self.sink().error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }

    /// Fetch the ticket category catalog, with the built-in defaults as
    /// fallback. Soft like `load`: never errors.
    pub async fn categories(&self) -> Vec<TicketCategory> {
        let path = format!("{}/categories", Ticket::ENDPOINT);
        match self.api().get_json(&path, &[]).await {
            Ok(body) => envelope_data(body)
                .and_then(|data| decode_list(&data, "categories"))
                .ok()
                .filter(|categories: &Vec<TicketCategory>| !categories.is_empty())
                .unwrap_or_else(default_categories),
            Err(err) => {
                tracing::warn!("category load failed, using defaults: {err}");
                default_categories()
            }
        }
    }
}
