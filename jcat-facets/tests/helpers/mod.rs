//! Test helpers for jcat-facets integration tests
//!
//! - `sample_catalog()`: small jazz catalog shared by query and session tests
//! - Fake catalog sources and filter path stores
//! - `init_tracing()`: test log output

#![allow(dead_code)]

use async_trait::async_trait;
use jcat_common::db::{
    Artist, CatalogPayload, Duration, FilterPathStore, Instrument, Quote, Video, VideoArtist,
    VideoType,
};
use jcat_common::{Error, FilterPath, Result};
use jcat_facets::CatalogSource;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness; RUST_LOG selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const PIANO: i64 = 10;
pub const TRUMPET: i64 = 20;
pub const DRUMS: i64 = 30;

pub const BILL_EVANS: i64 = 1;
pub const RED_GARLAND: i64 = 2;
pub const MILES_DAVIS: i64 = 3;

pub const SHORT: i64 = 1;
pub const LONG: i64 = 2;

pub const LIVE: i64 = 1;
pub const STUDIO: i64 = 2;

pub const PEACE_PIECE: i64 = 100;
pub const REDS_BLUES: i64 = 101;
pub const SO_WHAT: i64 = 102;
pub const BLUE_IN_GREEN: i64 = 103;

pub fn video(id: i64, name: &str, duration_id: i64, type_id: i64) -> Video {
    Video {
        id,
        name: name.to_string(),
        duration_text: "5:00".to_string(),
        path: format!("/videos/{}", id),
        location_id: format!("loc{}", id),
        availability: true,
        duration_id: Some(duration_id),
        type_id: Some(type_id),
    }
}

pub fn artist(id: i64, name: &str, surname: &str, instrument_id: i64, rank: Option<i64>) -> Artist {
    Artist {
        id,
        name: name.to_string(),
        surname: surname.to_string(),
        instrument_id: Some(instrument_id),
        rank,
    }
}

fn link(artist_id: i64, video_id: i64) -> VideoArtist {
    VideoArtist { artist_id, video_id }
}

/// Catalog used across tests
///
/// | video          | duration | type   | artists             |
/// |----------------|----------|--------|---------------------|
/// | Peace Piece    | Short    | Studio | Bill Evans          |
/// | Red's Blues    | Long     | Live   | Red Garland         |
/// | So What        | Long     | Live   | Miles, Red Garland  |
/// | Blue in Green  | Short    | Studio | Miles, Bill Evans   |
///
/// Drums has no artists.
pub fn sample_catalog() -> CatalogPayload {
    CatalogPayload {
        instruments: vec![
            Instrument { id: PIANO, name: "Piano".into() },
            Instrument { id: TRUMPET, name: "Trumpet".into() },
            Instrument { id: DRUMS, name: "Drums".into() },
        ],
        types: vec![
            VideoType { id: LIVE, name: "Live".into() },
            VideoType { id: STUDIO, name: "Studio".into() },
        ],
        durations: vec![
            Duration {
                id: SHORT,
                name: "Short".into(),
                description: "Under 8 minutes".into(),
            },
            Duration {
                id: LONG,
                name: "Long".into(),
                description: "8 minutes or more".into(),
            },
        ],
        videos: vec![
            video(PEACE_PIECE, "Peace Piece", SHORT, STUDIO),
            video(REDS_BLUES, "Red's Blues", LONG, LIVE),
            video(SO_WHAT, "So What", LONG, LIVE),
            video(BLUE_IN_GREEN, "Blue in Green", SHORT, STUDIO),
        ],
        artists: vec![
            artist(BILL_EVANS, "Bill", "Evans", PIANO, Some(5)),
            artist(RED_GARLAND, "Red", "Garland", PIANO, None),
            artist(MILES_DAVIS, "Miles", "Davis", TRUMPET, Some(9)),
        ],
        quotes: vec![Quote {
            id: 1,
            text: "Do not fear mistakes. There are none.".into(),
            artist_id: Some(MILES_DAVIS),
            video_id: Some(SO_WHAT),
        }],
        video_artists: vec![
            link(BILL_EVANS, PEACE_PIECE),
            link(RED_GARLAND, REDS_BLUES),
            link(MILES_DAVIS, SO_WHAT),
            link(RED_GARLAND, SO_WHAT),
            link(MILES_DAVIS, BLUE_IN_GREEN),
            link(BILL_EVANS, BLUE_IN_GREEN),
        ],
    }
}

/// Source that returns a fixed payload and counts fetches
pub struct StaticSource {
    pub payload: CatalogPayload,
    pub fetches: AtomicUsize,
}

impl StaticSource {
    pub fn new(payload: CatalogPayload) -> Self {
        Self {
            payload,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticSource {
    fn source_id(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<CatalogPayload> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// Source that always fails with a network error
pub struct OfflineSource;

#[async_trait]
impl CatalogSource for OfflineSource {
    fn source_id(&self) -> &str {
        "offline"
    }

    async fn fetch(&self) -> Result<CatalogPayload> {
        Err(Error::Network("connection refused".into()))
    }
}

/// Source that never answers
pub struct HangingSource;

#[async_trait]
impl CatalogSource for HangingSource {
    fn source_id(&self) -> &str {
        "hanging"
    }

    async fn fetch(&self) -> Result<CatalogPayload> {
        std::future::pending::<Result<CatalogPayload>>().await
    }
}

/// Source whose video rows cannot be decoded once they are written
///
/// Installs a trigger that stores text in the boolean `availability`
/// column, so any later `load_catalog` fails.
pub struct UnreadableAfterWriteSource {
    pub pool: SqlitePool,
    pub payload: CatalogPayload,
}

#[async_trait]
impl CatalogSource for UnreadableAfterWriteSource {
    fn source_id(&self) -> &str {
        "unreadable-after-write"
    }

    async fn fetch(&self) -> Result<CatalogPayload> {
        sqlx::query(
            r#"
            CREATE TRIGGER IF NOT EXISTS garble_availability AFTER INSERT ON videos
            BEGIN
                UPDATE videos SET availability = 'garbled' WHERE id = NEW.id;
            END
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(self.payload.clone())
    }
}

/// Filter path store whose writes always fail
pub struct ReadOnlyStore;

#[async_trait]
impl FilterPathStore for ReadOnlyStore {
    async fn save(&self, _path: &FilterPath) -> Result<()> {
        Err(Error::Internal("store is read-only".into()))
    }

    async fn load(&self) -> Result<FilterPath> {
        Ok(FilterPath::new())
    }

    async fn clear(&self) -> Result<()> {
        Err(Error::Internal("store is read-only".into()))
    }
}
