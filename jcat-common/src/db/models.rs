//! Database models

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Instrument {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artist {
    pub id: i64,
    pub name: String,
    pub surname: String,
    /// Cleared when the instrument is deleted
    pub instrument_id: Option<i64>,
    pub rank: Option<i64>,
}

/// Coarse video-length bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Duration {
    pub id: i64,
    pub name: String,
    pub description: String,
}

/// Video category bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: i64,
    pub name: String,
    /// Human readable length, e.g. "7:42"
    pub duration_text: String,
    pub path: String,
    /// Opaque handle passed to the embedded player
    pub location_id: String,
    pub availability: bool,
    pub duration_id: Option<i64>,
    pub type_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: i64,
    pub text: String,
    pub artist_id: Option<i64>,
    pub video_id: Option<i64>,
}

/// Video ↔ artist association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VideoArtist {
    pub artist_id: i64,
    pub video_id: i64,
}

/// Complete catalog contents, as delivered by bootstrap or read back from the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub instruments: Vec<Instrument>,
    #[serde(default)]
    pub types: Vec<VideoType>,
    #[serde(default)]
    pub durations: Vec<Duration>,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub quotes: Vec<Quote>,
    #[serde(default)]
    pub video_artists: Vec<VideoArtist>,
}

impl CatalogPayload {
    pub fn counts(&self) -> CatalogCounts {
        CatalogCounts {
            instruments: self.instruments.len(),
            types: self.types.len(),
            durations: self.durations.len(),
            videos: self.videos.len(),
            artists: self.artists.len(),
            quotes: self.quotes.len(),
            video_artists: self.video_artists.len(),
        }
    }
}

/// Row counts per catalog table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub instruments: usize,
    pub types: usize,
    pub durations: usize,
    pub videos: usize,
    pub artists: usize,
    pub quotes: usize,
    pub video_artists: usize,
}
