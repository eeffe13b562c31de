//! `ResourceManager`: filter state, selection, and rendering on top of a
//! `RemoteStore`.
//!
//! One manager per dashboard section. Every state change ends in a full
//! re-render; selection survives re-renders because it is tracked here by
//! id and reapplied from the view state, not read back from the output.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use super::filter::{Debouncer, FilterCriteria};
use super::remote_store::RemoteStore;
use super::resource::{CreateOutcome, Resource};
use crate::api::ApiError;
use crate::bus::Action;
use crate::render::{Renderer, ViewState};

/// Everything the debounced search task needs to share with the manager.
struct ManagerState<R: Resource> {
    store: Arc<RemoteStore<R>>,
    criteria: Mutex<FilterCriteria>,
    selected: Mutex<Option<String>>,
    renderer: Mutex<Box<dyn Renderer<R>>>,
}

impl<R: Resource> ManagerState<R> {
    fn criteria(&self) -> FilterCriteria {
        self.criteria.lock().expect("criteria mutex poisoned").clone()
    }

    fn selected_id(&self) -> Option<String> {
        self.selected.lock().expect("selection mutex poisoned").clone()
    }

    async fn reload(&self) -> (Vec<R>, R::Stats) {
        let criteria = self.criteria();
        let loaded = self.store.load(&criteria).await;
        self.render();
        loaded
    }

    /// Full rebuild of the view from current store state.
    fn render(&self) {
        let view = ViewState {
            items: self.store.items(),
            stats: self.store.stats(),
            pagination: self.store.pagination(),
            selected_id: self.selected_id(),
        };
        self.renderer
            .lock()
            .expect("renderer mutex poisoned")
            .render(&view);
    }
}

pub struct ResourceManager<R: Resource> {
    state: Arc<ManagerState<R>>,
    debouncer: Debouncer,
}

impl<R: Resource> ResourceManager<R> {
    pub fn new(
        store: Arc<RemoteStore<R>>,
        renderer: Box<dyn Renderer<R>>,
        page_size: u32,
        search_debounce: Duration,
    ) -> Self {
        Self {
            state: Arc::new(ManagerState {
                store,
                criteria: Mutex::new(FilterCriteria::new(page_size)),
                selected: Mutex::new(None),
                renderer: Mutex::new(renderer),
            }),
            debouncer: Debouncer::new(search_debounce),
        }
    }

    /// Initial load. Publishes `<kind>.ready` once the first page (or its
    /// cache fallback) is in place.
    pub async fn init(&self) {
        let (items, _) = self.state.reload().await;
        self.state
            .store
            .emit(Action::Ready, None, json!({ "count": items.len() }));
    }

    pub async fn refresh(&self) {
        self.state.reload().await;
    }

    // -----------------------------------------------------------------------
    // Filters and pagination
    // -----------------------------------------------------------------------

    pub fn criteria(&self) -> FilterCriteria {
        self.state.criteria()
    }

    async fn apply<F: FnOnce(&mut FilterCriteria)>(&self, mutate: F) {
        {
            let mut criteria = self.state.criteria.lock().expect("criteria mutex poisoned");
            mutate(&mut criteria);
        }
        self.state.reload().await;
    }

    pub async fn set_status_filter(&self, value: Option<&str>) {
        self.apply(|c| c.set_status(value)).await;
    }

    pub async fn set_priority_filter(&self, value: Option<&str>) {
        self.apply(|c| c.set_priority(value)).await;
    }

    pub async fn set_category_filter(&self, value: Option<&str>) {
        self.apply(|c| c.set_category(value)).await;
    }

    pub async fn set_folder_filter(&self, value: Option<&str>) {
        self.apply(|c| c.set_folder(value)).await;
    }

    /// Explicit pagination: only the offset changes.
    pub async fn set_page(&self, offset: u32) {
        self.apply(|c| c.set_offset(offset)).await;
    }

    /// Debounced search. The criteria update is immediate; the reload fires
    /// once the quiet window elapses, and typing again restarts the window.
    pub fn search(&self, text: &str) {
        {
            let mut criteria = self.state.criteria.lock().expect("criteria mutex poisoned");
            criteria.set_search(text);
        }
        let state = self.state.clone();
        self.debouncer.spawn(async move {
            state.reload().await;
        });
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn select(&self, id: &str) {
        {
            let mut selected = self.state.selected.lock().expect("selection mutex poisoned");
            *selected = Some(id.to_string());
        }
        self.state
            .store
            .emit(Action::Selected, Some(id.to_string()), json!({ "id": id }));
        self.state.render();
    }

    pub fn clear_selection(&self) {
        {
            let mut selected = self.state.selected.lock().expect("selection mutex poisoned");
            *selected = None;
        }
        self.state.render();
    }

    pub fn selected_id(&self) -> Option<String> {
        self.state.selected_id()
    }

    // -----------------------------------------------------------------------
    // Write passthroughs
    // -----------------------------------------------------------------------

    pub async fn create(&self, body: Value) -> Result<CreateOutcome<R>, ApiError> {
        let outcome = self.state.store.create(body).await;
        if outcome.is_ok() {
            self.state.render();
        }
        outcome
    }

    pub async fn update(&self, id: &str, patch: Value) -> Result<R, ApiError> {
        let updated = self.state.store.update(id, patch).await;
        if updated.is_ok() {
            self.state.render();
        }
        updated
    }

    /// Delete a record. If it was the selected one, the selection is
    /// cleared so the detail pane empties on the next render.
    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let target = self.state.store.find(id);
        self.state.store.remove(id).await?;

        let clear = {
            let selected = self.state.selected.lock().expect("selection mutex poisoned");
            match selected.as_deref() {
                Some(sel) => {
                    sel == id || target.as_ref().map_or(false, |t| t.matches_id(sel))
                }
                None => false,
            }
        };
        if clear {
            let mut selected = self.state.selected.lock().expect("selection mutex poisoned");
            *selected = None;
        }

        self.state.render();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn render(&self) {
        self.state.render();
    }

    pub fn store(&self) -> Arc<RemoteStore<R>> {
        self.state.store.clone()
    }

    /// Cancel pending debounced work. Also happens automatically on drop.
    pub fn dispose(&self) {
        self.debouncer.cancel();
    }
}
