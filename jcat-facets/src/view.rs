//! UI-visible state derived from catalog events

use crate::query::FacetResults;
use jcat_common::events::CatalogEvent;
use jcat_common::FilterPath;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Bootstrap in progress
    pub loading: bool,
    /// Dismissible message for the user
    pub notice: Option<String>,
    /// Filter sheet open
    pub filters_open: bool,
    pub path: FilterPath,
    pub results: Option<Arc<FacetResults>>,
    /// Set once a `FilterPathChanged` arrived; from then on events own `path`
    path_from_events: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the state
    pub fn apply(&mut self, event: &CatalogEvent) {
        match event {
            CatalogEvent::BootstrapStarted { .. } => self.loading = true,
            CatalogEvent::BootstrapSkipped { .. } | CatalogEvent::BootstrapCompleted { .. } => {
                self.loading = false
            }
            CatalogEvent::BootstrapFailed { message, .. } => {
                self.loading = false;
                self.notice = Some(format!("Could not download the catalog: {}", message));
            }
            CatalogEvent::Notice { message, .. } => self.notice = Some(message.clone()),
            CatalogEvent::FilterPathChanged { path, .. } => {
                self.path = path.clone();
                self.path_from_events = true;
            }
            CatalogEvent::ResultsPublished { .. } => {}
        }
    }

    /// Accept newer results; older revisions are ignored
    ///
    /// Results may lag the latest path change, so they only seed `path`
    /// until the first `FilterPathChanged` event is seen.
    pub fn set_results(&mut self, results: Arc<FacetResults>) {
        let newer = self
            .results
            .as_ref()
            .map(|current| results.revision > current.revision)
            .unwrap_or(true);
        if newer {
            if !self.path_from_events {
                self.path = results.path.clone();
            }
            self.results = Some(results);
        }
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn toggle_filters_panel(&mut self) {
        self.filters_open = !self.filters_open;
    }

    pub fn active_filter_count(&self) -> usize {
        self.path.len()
    }
}
