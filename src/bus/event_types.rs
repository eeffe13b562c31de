//! The typed event vocabulary.
//!
//! Every event a manager publishes is a `(Category, Action)` pair; the wire
//! name is always `<category>.<action>` (`ticket.created`,
//! `media.folder_created`). Keeping both sides as enums lets subscribers
//! match on them instead of splitting strings, and makes an unknown event
//! name a compile error rather than a silent miss.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which dashboard section an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ticket,
    Subscriber,
    Media,
    Notification,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ticket => "ticket",
            Self::Subscriber => "subscriber",
            Self::Media => "media",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What happened to the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Ready,
    Loaded,
    Created,
    Updated,
    Deleted,
    Replied,
    Uploaded,
    Selected,
    FolderCreated,
    FolderDeleted,
    /// A user-facing notification was surfaced (the `notification` category).
    Shown,
}

impl Action {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Loaded => "loaded",
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::Replied => "replied",
            Self::Uploaded => "uploaded",
            Self::Selected => "selected",
            Self::FolderCreated => "folder_created",
            Self::FolderDeleted => "folder_deleted",
            Self::Shown => "shown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
