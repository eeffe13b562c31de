//! Media library files and folders.
//!
//! Media rows live in flat `{media, pagination}` envelopes with no server
//! stats block; the total mirrors pagination. Uploads go through multipart
//! rather than the generic JSON create, and folder management rides on the
//! same endpoint under `/folders`.
//!
//! `MediaSelectorProvider` is the single, explicitly chosen seam for
//! "pick an image" flows; callers receive a provider instead of overriding
//! a shared entry point.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::ApiError;
use crate::bus::{Action, Category};
use crate::render::LineItem;
use crate::store::filter::FilterCriteria;
use crate::store::remote_store::RemoteStore;
use crate::store::resource::{
    decode_field, decode_list, decode_pagination, CreateOutcome, ListPage, Resource,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub folder: String,
    pub mime_type: String,
    pub url: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaStats {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFolder {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub file_count: u64,
}

/// Folder catalog served when `/api/media/folders` is unreachable.
pub fn default_folders() -> Vec<MediaFolder> {
    let entries = [
        ("all", "All Media"),
        ("uploads", "Uploads"),
        ("blog-images", "Blog Images"),
        ("ai-generated", "AI Generated"),
    ];
    entries
        .into_iter()
        .map(|(name, display_name)| MediaFolder {
            name: name.to_string(),
            display_name: display_name.to_string(),
            file_count: 0,
        })
        .collect()
}

impl Resource for MediaFile {
    type Stats = MediaStats;

    const KIND: &'static str = "media";
    const CATEGORY: Category = Category::Media;
    const ENDPOINT: &'static str = "/api/media";
    const CACHE_KEY: &'static str = "fooodis-media-library";

    fn id(&self) -> &str {
        &self.id
    }

    fn parse_page(body: Value) -> Result<ListPage<Self>, ApiError> {
        let pagination = decode_pagination(&body);
        Ok(ListPage {
            items: decode_list(&body, "media")?,
            stats: MediaStats {
                total: pagination.total,
            },
            pagination,
        })
    }

    fn parse_created(body: Value) -> Result<CreateOutcome<Self>, ApiError> {
        let record = decode_media_record(body)?;
        let message = Some(format!("{} uploaded", record.filename));
        Ok(CreateOutcome {
            record: Some(record),
            existing: false,
            reactivated: false,
            message,
        })
    }

    fn parse_updated(body: Value) -> Result<Self, ApiError> {
        decode_media_record(body)
    }

    fn record_added(&self, stats: &mut MediaStats) {
        stats.total += 1;
    }

    fn record_removed(&self, stats: &mut MediaStats) {
        stats.total = stats.total.saturating_sub(1);
    }
}

/// Media endpoints answer either `{media: {...}}` or the bare record.
fn decode_media_record(body: Value) -> Result<MediaFile, ApiError> {
    match body.get("media") {
        Some(value) if !value.is_null() => serde_json::from_value(value.clone())
            .map_err(|e| ApiError::Decode(format!("bad media record: {e}"))),
        _ => serde_json::from_value(body)
            .map_err(|e| ApiError::Decode(format!("bad media record: {e}"))),
    }
}

impl LineItem for MediaFile {
    fn summary_line(&self) -> String {
        format!("[{}] {} ({})", self.folder, self.filename, self.mime_type)
    }

    fn detail_lines(&self) -> Vec<String> {
        vec![
            self.filename.clone(),
            self.url.clone(),
            format!(
                "{} · {} · {} bytes",
                self.folder,
                self.mime_type,
                self.size.unwrap_or(0)
            ),
        ]
    }
}

// ---------------------------------------------------------------------------
// Upload, batch delete, folders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    pub folder: Option<String>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
}

/// Per-id results of a batch delete; one failing id does not abort the rest.
#[derive(Debug, Default)]
pub struct BatchRemoval {
    pub deleted: Vec<String>,
    pub failures: Vec<(String, ApiError)>,
}

impl RemoteStore<MediaFile> {
    /// Multipart upload. On success the new file is prepended to the local
    /// collection and `media.uploaded` is published.
    pub async fn upload(
        &self,
        filename: &str,
        bytes: Vec<u8>,
        options: UploadOptions,
    ) -> Result<MediaFile, ApiError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text(
                "folder",
                options.folder.unwrap_or_else(|| "uploads".to_string()),
            );
        if let Some(alt_text) = options.alt_text {
            form = form.text("alt_text", alt_text);
        }
        if let Some(caption) = options.caption {
            form = form.text("caption", caption);
        }

        let result = self.api().post_multipart(MediaFile::ENDPOINT, form).await;
        match result.and_then(decode_media_record) {
            Ok(record) => {
                self.absorb_created(&record);
                self.emit(
                    Action::Uploaded,
                    Some(record.id.clone()),
                    serde_json::to_value(&record).unwrap_or(Value::Null),
                );
                self.sink().success(&format!("{} uploaded", record.filename));
                Ok(record)
            }
            Err(err) => {
                tracing::error!(filename, "upload failed: {err}");
                self.sink().error(&format!("Error uploading {filename}: {err}"));
                Err(err)
            }
        }
    }

    /// Delete several files, collecting per-id failures instead of stopping
    /// at the first error.
    pub async fn remove_batch(&self, ids: &[String]) -> BatchRemoval {
        let mut outcome = BatchRemoval::default();
        for id in ids {
            match self.remove(id).await {
                Ok(()) => outcome.deleted.push(id.clone()),
                Err(err) => outcome.failures.push((id.clone(), err)),
            }
        }
        outcome
    }

    /// Folder catalog with the built-in defaults as fallback; soft like
    /// `load`.
    pub async fn folders(&self) -> Vec<MediaFolder> {
        let path = format!("{}/folders", MediaFile::ENDPOINT);
        match self.api().get_json(&path, &[]).await {
            Ok(body) => serde_json::from_value::<Vec<MediaFolder>>(body)
                .ok()
                .filter(|folders| !folders.is_empty())
                .unwrap_or_else(default_folders),
            Err(err) => {
                tracing::warn!("folder load failed, using defaults: {err}");
                default_folders()
            }
        }
    }

    pub async fn create_folder(
        &self,
        name: &str,
        description: &str,
    ) -> Result<MediaFolder, ApiError> {
        let path = format!("{}/folders", MediaFile::ENDPOINT);
        let body = json!({ "name": name, "description": description });
        let result = self.api().post_json(&path, &body).await;
        match result.and_then(|b| decode_field(&b, "folder")) {
            Ok(folder) => {
                self.emit(
                    Action::FolderCreated,
                    None,
                    serde_json::to_value(&folder).unwrap_or(Value::Null),
                );
                self.sink().success(&format!("Folder {name} created"));
                Ok(folder)
            }
            Err(err) => {
                tracing::error!(name, "folder create failed: {err}");
                self.sink().error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }

    pub async fn delete_folder(&self, name: &str) -> Result<(), ApiError> {
        let path = format!("{}/folders", MediaFile::ENDPOINT);
        match self
            .api()
            .delete(&path, &[("name".to_string(), name.to_string())])
            .await
        {
            Ok(()) => {
                self.emit(Action::FolderDeleted, None, json!({ "name": name }));
                self.sink().success(&format!("Folder {name} deleted"));
                Ok(())
            }
            Err(err) => {
                tracing::error!(name, "folder delete failed: {err}");
                self.sink().error(&format!("Error: {err}"));
                Err(err)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Media selection seam
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MediaSelectRequest {
    /// Restrict the pick to one folder.
    pub folder: Option<String>,
    /// Pick this specific file; otherwise the first file of the page wins.
    pub id: Option<String>,
}

/// The one registered strategy for "pick an image" flows. Contexts receive
/// a provider explicitly; there is no global override chain.
#[async_trait]
pub trait MediaSelectorProvider: Send + Sync {
    async fn select(&self, request: MediaSelectRequest) -> Result<Option<MediaFile>, ApiError>;
}

/// Default provider: picks out of the media library through the store.
pub struct LibraryPicker {
    store: Arc<RemoteStore<MediaFile>>,
    page_size: u32,
}

impl LibraryPicker {
    pub fn new(store: Arc<RemoteStore<MediaFile>>, page_size: u32) -> Self {
        Self { store, page_size }
    }
}

#[async_trait]
impl MediaSelectorProvider for LibraryPicker {
    async fn select(&self, request: MediaSelectRequest) -> Result<Option<MediaFile>, ApiError> {
        let mut criteria = FilterCriteria::new(self.page_size);
        criteria.set_folder(request.folder.as_deref());
        let (items, _) = self.store.load(&criteria).await;

        let picked = match request.id.as_deref() {
            Some(id) => items.into_iter().find(|file| file.matches_id(id)),
            None => items.into_iter().next(),
        };
        if let Some(file) = &picked {
            self.store.emit(
                Action::Selected,
                Some(file.id.clone()),
                serde_json::to_value(file).unwrap_or(Value::Null),
            );
        }
        Ok(picked)
    }
}
