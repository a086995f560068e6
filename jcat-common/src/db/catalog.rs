//! Catalog table access
//!
//! The catalog is only ever written as a whole: [`replace_catalog`] swaps
//! every table inside a single transaction, so readers never observe a
//! partially replaced store.

use crate::db::models::{
    Artist, CatalogPayload, Duration, Instrument, Quote, Video, VideoArtist,
    VideoType,
};
use crate::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// True if the store holds no videos and no instruments
pub async fn is_catalog_empty(pool: &SqlitePool) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM videos) + (SELECT COUNT(*) FROM instruments)",
    )
    .fetch_one(pool)
    .await?;

    Ok(count == 0)
}

/// Read every catalog table, each in id order
pub async fn load_catalog(pool: &SqlitePool) -> Result<CatalogPayload> {
    // One read transaction gives a consistent view across tables
    let mut tx = pool.begin().await?;

    let instruments = sqlx::query_as::<_, Instrument>("SELECT id, name FROM instruments ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;
    let types = sqlx::query_as::<_, VideoType>("SELECT id, name FROM types ORDER BY id")
        .fetch_all(&mut *tx)
        .await?;
    let durations = sqlx::query_as::<_, Duration>(
        "SELECT id, name, description FROM durations ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;
    let videos = sqlx::query_as::<_, Video>(
        "SELECT id, name, duration_text, path, location_id, availability, duration_id, type_id
         FROM videos ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;
    let artists = sqlx::query_as::<_, Artist>(
        "SELECT id, name, surname, instrument_id, rank FROM artists ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;
    let quotes = sqlx::query_as::<_, Quote>(
        "SELECT id, text, artist_id, video_id FROM quotes ORDER BY id",
    )
    .fetch_all(&mut *tx)
    .await?;
    let video_artists = sqlx::query_as::<_, VideoArtist>(
        "SELECT artist_id, video_id FROM video_artists ORDER BY video_id, artist_id",
    )
    .fetch_all(&mut *tx)
    .await?;

    tx.commit().await?;

    let payload = CatalogPayload {
        instruments,
        types,
        durations,
        videos,
        artists,
        quotes,
        video_artists,
    };
    debug!("Loaded catalog: {:?}", payload.counts());
    Ok(payload)
}

/// Replace the entire catalog atomically
///
/// Dangling optional references are cleared and dangling associations are
/// dropped before insert. If any statement fails the transaction is rolled
/// back and the previous catalog is left untouched.
///
/// Returns the payload exactly as written, so callers can build in-memory
/// state from it without reading the store back.
pub async fn replace_catalog(pool: &SqlitePool, payload: &CatalogPayload) -> Result<CatalogPayload> {
    let payload = sanitize(payload);

    let mut tx = pool.begin().await?;

    // Children first
    for table in [
        "video_artists",
        "quotes",
        "videos",
        "artists",
        "types",
        "durations",
        "instruments",
    ] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    for instrument in &payload.instruments {
        sqlx::query("INSERT INTO instruments (id, name) VALUES (?, ?)")
            .bind(instrument.id)
            .bind(&instrument.name)
            .execute(&mut *tx)
            .await?;
    }

    for duration in &payload.durations {
        sqlx::query("INSERT INTO durations (id, name, description) VALUES (?, ?, ?)")
            .bind(duration.id)
            .bind(&duration.name)
            .bind(&duration.description)
            .execute(&mut *tx)
            .await?;
    }

    for video_type in &payload.types {
        sqlx::query("INSERT INTO types (id, name) VALUES (?, ?)")
            .bind(video_type.id)
            .bind(&video_type.name)
            .execute(&mut *tx)
            .await?;
    }

    for artist in &payload.artists {
        sqlx::query(
            "INSERT INTO artists (id, name, surname, instrument_id, rank) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(artist.id)
        .bind(&artist.name)
        .bind(&artist.surname)
        .bind(artist.instrument_id)
        .bind(artist.rank)
        .execute(&mut *tx)
        .await?;
    }

    for video in &payload.videos {
        sqlx::query(
            r#"
            INSERT INTO videos
                (id, name, duration_text, path, location_id, availability, duration_id, type_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(video.id)
        .bind(&video.name)
        .bind(&video.duration_text)
        .bind(&video.path)
        .bind(&video.location_id)
        .bind(video.availability)
        .bind(video.duration_id)
        .bind(video.type_id)
        .execute(&mut *tx)
        .await?;
    }

    for link in &payload.video_artists {
        sqlx::query("INSERT OR IGNORE INTO video_artists (artist_id, video_id) VALUES (?, ?)")
            .bind(link.artist_id)
            .bind(link.video_id)
            .execute(&mut *tx)
            .await?;
    }

    for quote in &payload.quotes {
        sqlx::query("INSERT INTO quotes (id, text, artist_id, video_id) VALUES (?, ?, ?, ?)")
            .bind(quote.id)
            .bind(&quote.text)
            .bind(quote.artist_id)
            .bind(quote.video_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!("Catalog replaced: {:?}", payload.counts());
    Ok(payload)
}

/// Clear references to ids the payload does not contain
fn sanitize(payload: &CatalogPayload) -> CatalogPayload {
    let instrument_ids: HashSet<i64> = payload.instruments.iter().map(|i| i.id).collect();
    let duration_ids: HashSet<i64> = payload.durations.iter().map(|d| d.id).collect();
    let type_ids: HashSet<i64> = payload.types.iter().map(|t| t.id).collect();
    let artist_ids: HashSet<i64> = payload.artists.iter().map(|a| a.id).collect();
    let video_ids: HashSet<i64> = payload.videos.iter().map(|v| v.id).collect();

    let mut out = payload.clone();
    let mut cleared = 0usize;

    let mut keep_known = |slot: &mut Option<i64>, known: &HashSet<i64>| {
        if matches!(slot, Some(id) if !known.contains(id)) {
            *slot = None;
            cleared += 1;
        }
    };

    for artist in &mut out.artists {
        keep_known(&mut artist.instrument_id, &instrument_ids);
    }
    for video in &mut out.videos {
        keep_known(&mut video.duration_id, &duration_ids);
        keep_known(&mut video.type_id, &type_ids);
    }
    for quote in &mut out.quotes {
        keep_known(&mut quote.artist_id, &artist_ids);
        keep_known(&mut quote.video_id, &video_ids);
    }

    let before = out.video_artists.len();
    out.video_artists
        .retain(|l| artist_ids.contains(&l.artist_id) && video_ids.contains(&l.video_id));
    let dropped = before - out.video_artists.len();

    if cleared > 0 || dropped > 0 {
        warn!(
            "Catalog payload had dangling references: {} cleared, {} associations dropped",
            cleared, dropped
        );
    }

    out
}
