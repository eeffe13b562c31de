//! Runtime configuration for the admin client.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the Fooodis API, without a trailing `/api`.
    pub base_url: String,
    /// Directory holding cache snapshot files.
    pub data_dir: PathBuf,
    /// Page size used for collection loads.
    pub page_size: u32,
    /// Quiet window before a search-text change triggers a reload.
    pub search_debounce: Duration,
}

impl AdminConfig {
    pub fn new(base_url: impl Into<String>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            data_dir: data_dir.into(),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }

    /// Build a config from environment variables, with a `.env` file
    /// honored when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("FOOODIS_API_BASE_URL")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| "https://fooodis.com".to_string());

        let mut config = Self::new(base_url, admin_data_dir());
        if let Some(page_size) = std::env::var("FOOODIS_PAGE_SIZE")
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|v| *v > 0)
        {
            config.page_size = page_size;
        }
        config
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_search_debounce(mut self, debounce: Duration) -> Self {
        self.search_debounce = debounce;
        self
    }
}

fn admin_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("FOOODIS_DATA_DIR") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(app_data) = std::env::var("APPDATA") {
            return PathBuf::from(app_data).join("FooodisAdmin");
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".fooodis-admin");
    }

    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".fooodis-admin");
    }

    PathBuf::from(".fooodis-admin")
}
