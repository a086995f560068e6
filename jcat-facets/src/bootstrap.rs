//! Bootstrap loader
//!
//! On first run the local store is empty and the whole catalog is fetched
//! from a remote source. The replace is all-or-nothing: a failed fetch,
//! a timeout, a cancellation or a failed write leaves the previous local
//! data exactly as it was.

use crate::session::FilterSession;
use crate::snapshot::CatalogSnapshot;
use async_trait::async_trait;
use chrono::Utc;
use jcat_common::db::{self, CatalogCounts, CatalogPayload};
use jcat_common::events::{CatalogEvent, EventBus};
use jcat_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Source of a complete catalog document
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name for logs
    fn source_id(&self) -> &str;

    /// Fetch the whole catalog
    async fn fetch(&self) -> Result<CatalogPayload>;
}

/// Catalog fetched as one JSON document over HTTP
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jcat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    fn source_id(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<CatalogPayload> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", status, self.url)));
        }

        response
            .json::<CatalogPayload>()
            .await
            .map_err(|e| Error::Network(format!("Invalid catalog document: {}", e)))
    }
}

/// Result of a bootstrap attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Local data already present; nothing fetched
    Skipped,
    /// Store replaced with the fetched catalog
    Loaded(CatalogCounts),
}

/// One-shot fetch-and-replace of the entity store
pub struct BootstrapLoader {
    pool: SqlitePool,
    source: Arc<dyn CatalogSource>,
    events: EventBus,
    timeout: Duration,
}

impl BootstrapLoader {
    pub fn new(
        pool: SqlitePool,
        source: Arc<dyn CatalogSource>,
        events: EventBus,
        timeout: Duration,
    ) -> Self {
        Self {
            pool,
            source,
            events,
            timeout,
        }
    }

    /// Bootstrap only when the local store is empty
    pub async fn run_if_empty(
        &self,
        session: &FilterSession,
        cancel: &CancellationToken,
    ) -> Result<BootstrapOutcome> {
        if !db::is_catalog_empty(&self.pool).await? {
            info!("Local catalog present, skipping bootstrap");
            self.events.emit_lossy(CatalogEvent::BootstrapSkipped {
                timestamp: Utc::now(),
            });
            return Ok(BootstrapOutcome::Skipped);
        }

        self.run(session, cancel).await.map(BootstrapOutcome::Loaded)
    }

    /// Fetch and replace unconditionally
    ///
    /// On success the snapshot is built from the payload as written and
    /// published to `session`; nothing is read back after the commit. The
    /// filter path is left alone even if it now names missing ids.
    pub async fn run(
        &self,
        session: &FilterSession,
        cancel: &CancellationToken,
    ) -> Result<CatalogCounts> {
        self.events.emit_lossy(CatalogEvent::BootstrapStarted {
            timestamp: Utc::now(),
        });
        info!("Bootstrapping catalog from {}", self.source.source_id());

        match self.fetch_and_replace(cancel).await {
            Ok(written) => {
                let counts = written.counts();
                session
                    .replace_snapshot(Arc::new(CatalogSnapshot::from_payload(written)))
                    .await;
                self.events.emit_lossy(CatalogEvent::BootstrapCompleted {
                    counts,
                    timestamp: Utc::now(),
                });
                info!("Bootstrap complete: {} videos", counts.videos);
                Ok(counts)
            }
            Err(e) => {
                warn!("Bootstrap failed, keeping local data: {}", e);
                self.events.emit_lossy(CatalogEvent::BootstrapFailed {
                    message: e.to_string(),
                    timestamp: Utc::now(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_and_replace(&self, cancel: &CancellationToken) -> Result<CatalogPayload> {
        let payload = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(Error::Cancelled),
            fetched = tokio::time::timeout(self.timeout, self.source.fetch()) => match fetched {
                Ok(result) => result?,
                Err(_) => return Err(Error::Timeout(self.timeout.as_millis() as u64)),
            },
        };

        // Last point at which cancelling has no effect on the store
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        db::replace_catalog(&self.pool, &payload).await
    }
}
