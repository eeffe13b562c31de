//! Fooodis admin client library.
//!
//! Headless backend for the Fooodis admin dashboard. It manages the three
//! admin resource collections (support tickets, email subscribers, media
//! files) against the platform REST API:
//! - Paginated, filterable loads with a durable cache-snapshot fallback
//! - Optimistic create / pessimistic update / delete reconciliation
//! - Cross-manager notification over an in-process event bus
//!
//! # Architecture
//!
//! - `api`: HTTP transport with the typed `ApiError` taxonomy
//! - `store`: generic `RemoteStore` / `ResourceManager` pattern
//! - `resources`: ticket, subscriber, and media domain types
//! - `render`: view seam (full-rebuild renderers, selection reapply)
//! - `bus`: broadcast event bus connecting independent managers
//! - `notify`: user-facing success/error notification sinks

pub mod api;
pub mod bus;
pub mod config;
pub mod notify;
pub mod render;
pub mod resources;
pub mod store;

use std::sync::Arc;

pub use api::{ApiClient, ApiError};
pub use bus::{Action, BusEvent, Category, EventBus};
pub use config::AdminConfig;
pub use notify::{BufferSink, Notification, NotificationSink, Severity, TracingSink};
pub use render::{NullRenderer, Renderer, TextRenderer, ViewState};
pub use resources::media::MediaFile;
pub use resources::subscriber::Subscriber;
pub use resources::ticket::Ticket;
pub use store::cache::SnapshotStore;
pub use store::filter::FilterCriteria;
pub use store::manager::ResourceManager;
pub use store::remote_store::RemoteStore;
pub use store::resource::{CreateOutcome, ListPage, Pagination, Resource};

/// Initialize tracing for binaries and tools embedding this crate.
/// Library consumers that configure their own subscriber should not call this.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fooodis_admin=debug,info".parse().expect("valid env filter")),
        )
        .init();
}

/// Shared wiring for one dashboard session: the API client, the event bus,
/// the snapshot store, and the notification sink. Managers built from the
/// same context see each other's events on the bus.
pub struct AdminContext {
    pub config: AdminConfig,
    api: ApiClient,
    bus: Arc<EventBus>,
    snapshots: Arc<SnapshotStore>,
    sink: Arc<dyn NotificationSink>,
}

impl AdminContext {
    pub fn new(config: AdminConfig) -> Self {
        let api = ApiClient::new(&config.base_url);
        let snapshots = Arc::new(SnapshotStore::new(&config.data_dir));
        Self {
            config,
            api,
            bus: Arc::new(EventBus::new()),
            snapshots,
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the default tracing-backed notification sink.
    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn bus(&self) -> Arc<EventBus> {
        self.bus.clone()
    }

    fn store<R: Resource>(&self) -> Arc<RemoteStore<R>> {
        Arc::new(RemoteStore::new(
            self.api.clone(),
            self.bus.clone(),
            self.snapshots.clone(),
            self.sink.clone(),
        ))
    }

    pub fn ticket_store(&self) -> Arc<RemoteStore<Ticket>> {
        self.store()
    }

    pub fn subscriber_store(&self) -> Arc<RemoteStore<Subscriber>> {
        self.store()
    }

    pub fn media_store(&self) -> Arc<RemoteStore<MediaFile>> {
        self.store()
    }

    fn manager<R: Resource>(&self, renderer: Box<dyn Renderer<R>>) -> ResourceManager<R> {
        ResourceManager::new(
            self.store(),
            renderer,
            self.config.page_size,
            self.config.search_debounce,
        )
    }

    pub fn ticket_manager(&self, renderer: Box<dyn Renderer<Ticket>>) -> ResourceManager<Ticket> {
        self.manager(renderer)
    }

    pub fn subscriber_manager(
        &self,
        renderer: Box<dyn Renderer<Subscriber>>,
    ) -> ResourceManager<Subscriber> {
        self.manager(renderer)
    }

    pub fn media_manager(
        &self,
        renderer: Box<dyn Renderer<MediaFile>>,
    ) -> ResourceManager<MediaFile> {
        self.manager(renderer)
    }
}
