//! Catalog composition root
//!
//! Wires one entity store, one filter session and an optional bootstrap
//! loader together from a [`JcatConfig`]. No global state: everything is
//! owned by the returned [`Catalog`].

use crate::bootstrap::{BootstrapLoader, BootstrapOutcome, CatalogSource, HttpCatalogSource};
use crate::session::FilterSession;
use crate::snapshot::CatalogSnapshot;
use jcat_common::config::JcatConfig;
use jcat_common::db::{self, SqliteFilterPathStore};
use jcat_common::events::EventBus;
use jcat_common::Result;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct Catalog {
    pub pool: SqlitePool,
    pub session: FilterSession,
    pub events: EventBus,
    loader: Option<BootstrapLoader>,
    cancel: CancellationToken,
}

impl Catalog {
    /// Open the on-disk store named by `config`
    pub async fn open(config: &JcatConfig, cli_root: Option<&str>) -> Result<Self> {
        let db_path = config.database_path(cli_root);
        info!("Database path: {}", db_path.display());
        let pool = db::init_database(&db_path).await?;

        let source: Option<Arc<dyn CatalogSource>> = match &config.bootstrap_url {
            Some(url) => Some(Arc::new(HttpCatalogSource::new(
                url.clone(),
                config.bootstrap_timeout(),
            )?)),
            None => None,
        };

        Self::with_pool(pool, source, config).await
    }

    /// Build around an existing pool and optional catalog source
    pub async fn with_pool(
        pool: SqlitePool,
        source: Option<Arc<dyn CatalogSource>>,
        config: &JcatConfig,
    ) -> Result<Self> {
        let events = EventBus::new(config.event_capacity);
        let snapshot = CatalogSnapshot::from_payload(db::load_catalog(&pool).await?);

        let session = FilterSession::open(
            Arc::new(SqliteFilterPathStore::new(pool.clone())),
            Arc::new(snapshot),
            config.counts,
            events.clone(),
        )
        .await;

        let loader = source.map(|source| {
            BootstrapLoader::new(pool.clone(), source, events.clone(), config.bootstrap_timeout())
        });

        Ok(Self {
            pool,
            session,
            events,
            loader,
            cancel: CancellationToken::new(),
        })
    }

    /// Bootstrap from the configured source if the store is empty
    ///
    /// Without a configured source this is always [`BootstrapOutcome::Skipped`].
    pub async fn bootstrap_if_empty(&self) -> Result<BootstrapOutcome> {
        match &self.loader {
            Some(loader) => loader.run_if_empty(&self.session, &self.cancel).await,
            None => Ok(BootstrapOutcome::Skipped),
        }
    }

    /// Cancel an in-flight bootstrap
    pub fn cancel_bootstrap(&self) {
        self.cancel.cancel();
    }

    pub async fn close(self) {
        self.cancel.cancel();
        self.session.shutdown().await;
        self.pool.close().await;
    }
}
