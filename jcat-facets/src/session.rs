//! Filter session
//!
//! Owns the active filter path and the published catalog snapshot, and keeps
//! derived [`FacetResults`] up to date whenever either changes.
//!
//! Writers (filter transitions, snapshot swaps) are serialized through one
//! async mutex. The recompute task reads both inputs from `watch` channels
//! and only publishes a result if neither input moved while it was
//! computing, so a stale result is never published after a fresher one.

use crate::query::{self, FacetResults};
use crate::reducer;
use crate::snapshot::CatalogSnapshot;
use chrono::Utc;
use jcat_common::config::CountPolicy;
use jcat_common::db::FilterPathStore;
use jcat_common::events::{CatalogEvent, EventBus};
use jcat_common::{Category, FilterPath};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A catalog snapshot tagged with a publish generation
#[derive(Debug, Clone)]
struct VersionedSnapshot {
    generation: u64,
    snapshot: Arc<CatalogSnapshot>,
}

struct Inner {
    store: Arc<dyn FilterPathStore>,
    events: EventBus,
    policy: CountPolicy,
    /// Serializes every mutation of path or snapshot
    write_lock: Mutex<()>,
    snapshot_tx: watch::Sender<VersionedSnapshot>,
    path_tx: watch::Sender<FilterPath>,
    results_tx: watch::Sender<Arc<FacetResults>>,
    cancel: CancellationToken,
}

/// Reactive owner of the filter path and its derived results
pub struct FilterSession {
    inner: Arc<Inner>,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl FilterSession {
    /// Restore the persisted path and start the recompute task
    ///
    /// A path that cannot be loaded is reported as a notice and the session
    /// starts unfiltered.
    pub async fn open(
        store: Arc<dyn FilterPathStore>,
        snapshot: Arc<CatalogSnapshot>,
        policy: CountPolicy,
        events: EventBus,
    ) -> Self {
        let path = match store.load().await {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not restore filter path, starting unfiltered: {}", e);
                events.emit_lossy(CatalogEvent::notice(format!(
                    "Saved filters could not be restored: {}",
                    e
                )));
                FilterPath::new()
            }
        };
        info!("Filter session opened with {} active filters", path.len());

        let mut initial = query::evaluate(&snapshot, &path, policy);
        initial.revision = 1;
        initial.catalog_generation = 1;

        let (snapshot_tx, snapshot_rx) = watch::channel(VersionedSnapshot {
            generation: 1,
            snapshot,
        });
        let (path_tx, path_rx) = watch::channel(path);
        let (results_tx, _) = watch::channel(Arc::new(initial));

        let inner = Arc::new(Inner {
            store,
            events,
            policy,
            write_lock: Mutex::new(()),
            snapshot_tx,
            path_tx,
            results_tx,
            cancel: CancellationToken::new(),
        });

        let task = tokio::spawn(run_recompute(Arc::clone(&inner), snapshot_rx, path_rx));

        Self {
            inner,
            task: std::sync::Mutex::new(Some(task)),
        }
    }

    /// Select if inactive, deselect if active
    pub async fn toggle(&self, category: Category, entity_id: i64, entity_name: &str) -> FilterPath {
        self.transition(|path, snapshot| {
            reducer::toggle(path, category, entity_id, entity_name, snapshot)
        })
        .await
    }

    pub async fn select(&self, category: Category, entity_id: i64, entity_name: &str) -> FilterPath {
        self.transition(|path, snapshot| {
            reducer::apply_selection(path, category, entity_id, entity_name, snapshot)
        })
        .await
    }

    pub async fn deselect(&self, category: Category, entity_id: i64) -> FilterPath {
        self.transition(|path, _| reducer::apply_deselection(path, category, entity_id))
            .await
    }

    /// Drop every active filter
    pub async fn clear_filters(&self) {
        let _guard = self.inner.write_lock.lock().await;
        if self.inner.path_tx.borrow().is_empty() {
            return;
        }

        self.inner.path_tx.send_replace(FilterPath::new());
        self.inner.events.emit_lossy(CatalogEvent::FilterPathChanged {
            path: FilterPath::new(),
            timestamp: Utc::now(),
        });
        info!("Filters cleared");

        if let Err(e) = self.inner.store.clear().await {
            self.report_persist_failure(e);
        }
    }

    /// Publish a new catalog snapshot; the filter path is kept as is
    pub async fn replace_snapshot(&self, snapshot: Arc<CatalogSnapshot>) {
        let _guard = self.inner.write_lock.lock().await;
        let generation = self.inner.snapshot_tx.borrow().generation + 1;
        self.inner.snapshot_tx.send_replace(VersionedSnapshot {
            generation,
            snapshot,
        });
        debug!("Published catalog snapshot generation {}", generation);
    }

    pub fn current_path(&self) -> FilterPath {
        self.inner.path_tx.borrow().clone()
    }

    pub fn current_snapshot(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.inner.snapshot_tx.borrow().snapshot)
    }

    /// Latest published results (may lag the current path)
    pub fn results(&self) -> Arc<FacetResults> {
        Arc::clone(&self.inner.results_tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<FacetResults>> {
        self.inner.results_tx.subscribe()
    }

    /// Wait until the published results reflect the current path and snapshot
    ///
    /// After [`shutdown`](Self::shutdown) nothing recomputes, so this returns
    /// the last published results instead of waiting.
    pub async fn settled(&self) -> Arc<FacetResults> {
        let mut rx = self.subscribe();
        loop {
            {
                let results = rx.borrow_and_update();
                if self.is_current(&results) {
                    return Arc::clone(&results);
                }
            }
            tokio::select! {
                biased;
                _ = self.inner.cancel.cancelled() => return self.results(),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return self.results();
                    }
                }
            }
        }
    }

    /// Stop the recompute task; results stop updating
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let task = self
            .task
            .lock()
            .ok()
            .and_then(|mut guard| guard.take());
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Recompute task ended abnormally: {}", e);
            }
        }
        debug!("Filter session shut down");
    }

    fn is_current(&self, results: &FacetResults) -> bool {
        results.path == *self.inner.path_tx.borrow()
            && results.catalog_generation == self.inner.snapshot_tx.borrow().generation
    }

    async fn transition<F>(&self, reduce: F) -> FilterPath
    where
        F: FnOnce(&FilterPath, &CatalogSnapshot) -> FilterPath,
    {
        let _guard = self.inner.write_lock.lock().await;
        let snapshot = self.current_snapshot();
        let current = self.current_path();

        let next = reduce(&current, snapshot.as_ref());
        if next == current {
            return next;
        }

        self.inner.path_tx.send_replace(next.clone());
        self.inner.events.emit_lossy(CatalogEvent::FilterPathChanged {
            path: next.clone(),
            timestamp: Utc::now(),
        });
        debug!("Filter path now {:?}", next);

        // In-memory state is authoritative; a failed save only loses the
        // selection across restarts.
        if let Err(e) = self.inner.store.save(&next).await {
            self.report_persist_failure(e);
        }

        next
    }

    fn report_persist_failure(&self, e: jcat_common::Error) {
        warn!("Failed to persist filter path: {}", e);
        self.inner.events.emit_lossy(CatalogEvent::notice(format!(
            "Filters could not be saved: {}",
            e
        )));
    }
}

impl Drop for FilterSession {
    fn drop(&mut self) {
        self.inner.cancel.cancel();
    }
}

async fn run_recompute(
    inner: Arc<Inner>,
    mut snapshot_rx: watch::Receiver<VersionedSnapshot>,
    mut path_rx: watch::Receiver<FilterPath>,
) {
    let mut revision = inner.results_tx.borrow().revision;

    loop {
        tokio::select! {
            _ = inner.cancel.cancelled() => break,
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = path_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        // Recompute until a result survives without being superseded
        loop {
            if inner.cancel.is_cancelled() {
                return;
            }

            let versioned = snapshot_rx.borrow_and_update().clone();
            let path = path_rx.borrow_and_update().clone();
            let policy = inner.policy;

            let computed = tokio::task::spawn_blocking(move || {
                let mut results = query::evaluate(&versioned.snapshot, &path, policy);
                results.catalog_generation = versioned.generation;
                results
            })
            .await;

            let superseded = snapshot_rx.has_changed().unwrap_or(false)
                || path_rx.has_changed().unwrap_or(false);
            if superseded {
                debug!("Discarding superseded recompute");
                continue;
            }

            match computed {
                Ok(mut results) => {
                    revision += 1;
                    results.revision = revision;
                    let video_count = results.videos.len();
                    inner.results_tx.send_replace(Arc::new(results));
                    inner.events.emit_lossy(CatalogEvent::ResultsPublished {
                        revision,
                        video_count,
                        timestamp: Utc::now(),
                    });
                }
                Err(e) => error!("Recompute failed: {}", e),
            }
            break;
        }
    }

    debug!("Recompute task stopped");
}
