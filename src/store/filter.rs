//! Filter criteria and the search debouncer.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// The active status/search/pagination parameters controlling what a store
/// loads. Changing any dimension invalidates the current page, so every
/// setter resets `offset` to 0 — except `set_offset`, which is how explicit
/// pagination moves through an otherwise unchanged filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub folder: Option<String>,
    pub search: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PAGE_SIZE)
    }
}

impl FilterCriteria {
    pub fn new(limit: u32) -> Self {
        Self {
            status: None,
            priority: None,
            category: None,
            folder: None,
            search: None,
            limit,
            offset: 0,
        }
    }

    /// The dashboard uses `"all"` as the no-filter sentinel; treat it and
    /// blank strings as unset.
    fn normalize(value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
            .map(str::to_string)
    }

    pub fn set_status(&mut self, value: Option<&str>) {
        self.status = Self::normalize(value);
        self.offset = 0;
    }

    pub fn set_priority(&mut self, value: Option<&str>) {
        self.priority = Self::normalize(value);
        self.offset = 0;
    }

    pub fn set_category(&mut self, value: Option<&str>) {
        self.category = Self::normalize(value);
        self.offset = 0;
    }

    pub fn set_folder(&mut self, value: Option<&str>) {
        self.folder = Self::normalize(value);
        self.offset = 0;
    }

    pub fn set_search(&mut self, value: &str) {
        let trimmed = value.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.offset = 0;
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Query pairs for a collection GET. `limit` and `offset` are always
    /// present; dimensions only when set.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("limit".to_string(), self.limit.to_string()),
            ("offset".to_string(), self.offset.to_string()),
        ];
        for (key, value) in [
            ("status", &self.status),
            ("priority", &self.priority),
            ("category", &self.category),
            ("folder", &self.folder),
            ("search", &self.search),
        ] {
            if let Some(value) = value {
                pairs.push((key.to_string(), value.clone()));
            }
        }
        pairs
    }
}

/// Coalesces rapid search-text changes into one reload: each `spawn` aborts
/// the previously scheduled work, so only the last change inside the quiet
/// window fires. The pending timer is also aborted on drop, so a disposed
/// manager leaves no task behind.
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn spawn<F>(&self, work: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            work.await;
        });

        let mut pending = self.pending.lock().expect("debouncer mutex poisoned");
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .expect("debouncer mutex poisoned")
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
