//! Immutable in-memory catalog snapshot
//!
//! Built once per store publish and shared behind an `Arc`. Every derived
//! query reads a snapshot, never the database.

use jcat_common::db::{
    Artist, CatalogPayload, Duration, Instrument, Quote, Video, VideoType,
};
use jcat_common::display::artist_display_name;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Artist → instrument lookup used by the filter reducer
pub trait InstrumentLookup {
    /// Instrument `(id, name)` played by `artist_id`, if both exist
    fn instrument_of_artist(&self, artist_id: i64) -> Option<(i64, String)>;
}

/// Id-indexed catalog with video ↔ artist adjacency
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    instruments: HashMap<i64, Instrument>,
    artists: HashMap<i64, Artist>,
    durations: HashMap<i64, Duration>,
    types: HashMap<i64, VideoType>,
    videos: HashMap<i64, Video>,
    quotes: Vec<Quote>,
    artists_by_video: HashMap<i64, BTreeSet<i64>>,
    videos_by_artist: HashMap<i64, BTreeSet<i64>>,
}

impl CatalogSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Index a payload; associations naming unknown ids are ignored
    pub fn from_payload(payload: CatalogPayload) -> Self {
        let mut snapshot = Self {
            instruments: payload.instruments.into_iter().map(|i| (i.id, i)).collect(),
            artists: payload.artists.into_iter().map(|a| (a.id, a)).collect(),
            durations: payload.durations.into_iter().map(|d| (d.id, d)).collect(),
            types: payload.types.into_iter().map(|t| (t.id, t)).collect(),
            videos: payload.videos.into_iter().map(|v| (v.id, v)).collect(),
            quotes: payload.quotes,
            ..Default::default()
        };
        snapshot.quotes.sort_by_key(|q| q.id);

        for link in payload.video_artists {
            if !snapshot.videos.contains_key(&link.video_id)
                || !snapshot.artists.contains_key(&link.artist_id)
            {
                continue;
            }
            snapshot
                .artists_by_video
                .entry(link.video_id)
                .or_default()
                .insert(link.artist_id);
            snapshot
                .videos_by_artist
                .entry(link.artist_id)
                .or_default()
                .insert(link.video_id);
        }

        snapshot
    }

    pub fn instrument(&self, id: i64) -> Option<&Instrument> {
        self.instruments.get(&id)
    }

    pub fn artist(&self, id: i64) -> Option<&Artist> {
        self.artists.get(&id)
    }

    pub fn duration(&self, id: i64) -> Option<&Duration> {
        self.durations.get(&id)
    }

    pub fn video_type(&self, id: i64) -> Option<&VideoType> {
        self.types.get(&id)
    }

    pub fn instruments(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.values()
    }

    pub fn artists(&self) -> impl Iterator<Item = &Artist> {
        self.artists.values()
    }

    pub fn durations(&self) -> impl Iterator<Item = &Duration> {
        self.durations.values()
    }

    pub fn video_types(&self) -> impl Iterator<Item = &VideoType> {
        self.types.values()
    }

    pub fn videos(&self) -> impl Iterator<Item = &Video> {
        self.videos.values()
    }

    /// Artist ids associated with a video
    pub fn artist_ids_for_video(&self, video_id: i64) -> impl Iterator<Item = i64> + '_ {
        self.artists_by_video
            .get(&video_id)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Artists of a video, rank descending then name
    pub fn artists_for_video(&self, video_id: i64) -> Vec<&Artist> {
        let mut artists: Vec<&Artist> = self
            .artist_ids_for_video(video_id)
            .filter_map(|id| self.artists.get(&id))
            .collect();
        artists.sort_by(|a, b| compare_artists(a, b));
        artists
    }

    /// Videos featuring an artist, by name
    pub fn videos_for_artist(&self, artist_id: i64) -> Vec<&Video> {
        let mut videos: Vec<&Video> = self
            .videos_by_artist
            .get(&artist_id)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.videos.get(id))
            .collect();
        videos.sort_by(|a, b| compare_names(&a.name, a.id, &b.name, b.id));
        videos
    }

    pub fn quotes_for_video(&self, video_id: i64) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| q.video_id == Some(video_id))
            .collect()
    }

    pub fn quotes_for_artist(&self, artist_id: i64) -> Vec<&Quote> {
        self.quotes
            .iter()
            .filter(|q| q.artist_id == Some(artist_id))
            .collect()
    }
}

impl InstrumentLookup for CatalogSnapshot {
    fn instrument_of_artist(&self, artist_id: i64) -> Option<(i64, String)> {
        let instrument_id = self.artists.get(&artist_id)?.instrument_id?;
        let instrument = self.instruments.get(&instrument_id)?;
        Some((instrument.id, instrument.name.clone()))
    }
}

/// Case-insensitive name order with id as the final tie-break
pub(crate) fn compare_names(a_name: &str, a_id: i64, b_name: &str, b_id: i64) -> Ordering {
    a_name
        .to_lowercase()
        .cmp(&b_name.to_lowercase())
        .then_with(|| a_name.cmp(b_name))
        .then_with(|| a_id.cmp(&b_id))
}

/// Rank descending (unranked last), then display name, then id
pub(crate) fn compare_artists(a: &Artist, b: &Artist) -> Ordering {
    let rank_order = match (a.rank, b.rank) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    rank_order.then_with(|| {
        compare_names(&artist_display_name(a), a.id, &artist_display_name(b), b.id)
    })
}
