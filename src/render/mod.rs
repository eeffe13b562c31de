//! The view seam.
//!
//! Renderers rebuild their entire output from a `ViewState` on every call —
//! there is no diffing, and nothing from the previous render survives. The
//! selected row is reapplied from `ViewState::selected_id` each time, so
//! selection belongs to the manager, never to the rendered output.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};

use crate::store::resource::{Pagination, Resource};

/// Everything a renderer needs for one full rebuild.
#[derive(Debug, Clone)]
pub struct ViewState<R: Resource> {
    pub items: Vec<R>,
    pub stats: R::Stats,
    pub pagination: Pagination,
    pub selected_id: Option<String>,
}

impl<R: Resource> ViewState<R> {
    pub fn selected(&self) -> Option<&R> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|item| item.matches_id(id))
    }
}

pub trait Renderer<R: Resource>: Send {
    fn render(&mut self, view: &ViewState<R>);
}

/// How a resource shows up in a line-oriented view.
pub trait LineItem {
    fn summary_line(&self) -> String;

    fn detail_lines(&self) -> Vec<String> {
        vec![self.summary_line()]
    }
}

/// Discards every render. For headless embedders that only want the
/// stores and the event bus.
pub struct NullRenderer;

impl<R: Resource> Renderer<R> for NullRenderer {
    fn render(&mut self, _view: &ViewState<R>) {}
}

/// Renders the collection and a detail pane into a shared string buffer,
/// one summary line per record with the selected row marked. Used by tests
/// and CLI embeddings.
pub struct TextRenderer {
    buffer: Arc<Mutex<String>>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(String::new())),
        }
    }

    /// Handle for inspecting the latest render output.
    pub fn handle(&self) -> Arc<Mutex<String>> {
        self.buffer.clone()
    }
}

impl<R: Resource + LineItem> Renderer<R> for TextRenderer {
    fn render(&mut self, view: &ViewState<R>) {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} {}(s), {} total",
            view.items.len(),
            R::KIND,
            view.pagination.total
        );

        for item in &view.items {
            let marker = match view.selected_id.as_deref() {
                Some(id) if item.matches_id(id) => '>',
                _ => ' ',
            };
            let _ = writeln!(out, "{marker} {}", item.summary_line());
        }

        let _ = writeln!(out, "--- detail ---");
        match view.selected() {
            Some(item) => {
                for line in item.detail_lines() {
                    let _ = writeln!(out, "{line}");
                }
            }
            None => {
                let _ = writeln!(out, "(nothing selected)");
            }
        }

        *self.buffer.lock().expect("render buffer poisoned") = out;
    }
}
