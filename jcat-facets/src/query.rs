//! Derived-query engine
//!
//! Given a filter path and a catalog snapshot, computes the matching videos
//! and, for every category, the candidates still reachable under the
//! filters of the *other* categories, each with a count.
//!
//! Every evaluation is a full pass over the snapshot. Entries naming ids the
//! snapshot does not contain match no video.

use crate::snapshot::{compare_artists, compare_names, CatalogSnapshot};
use jcat_common::config::{CountMode, CountPolicy};
use jcat_common::db::{Artist, Video};
use jcat_common::display::artist_display_name;
use jcat_common::{Category, FilterPath};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A selectable facet value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub count: usize,
    /// True if this candidate is the active selection of its category
    pub selected: bool,
}

/// Everything derived from one filter path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FacetResults {
    /// Publish counter; 0 for results not produced by a session
    pub revision: u64,
    /// Generation of the catalog snapshot these results were computed from
    pub catalog_generation: u64,
    pub path: FilterPath,
    pub videos: Vec<Video>,
    pub instruments: Vec<Candidate>,
    pub artists: Vec<Candidate>,
    pub durations: Vec<Candidate>,
    pub types: Vec<Candidate>,
}

impl FacetResults {
    pub fn candidates(&self, category: Category) -> &[Candidate] {
        match category {
            Category::Instrument => &self.instruments,
            Category::Artist => &self.artists,
            Category::Duration => &self.durations,
            Category::Type => &self.types,
        }
    }

    pub fn video_ids(&self) -> Vec<i64> {
        self.videos.iter().map(|v| v.id).collect()
    }
}

#[derive(Default)]
struct Tally {
    videos: usize,
    artists: HashSet<i64>,
}

/// Query evaluator bound to one snapshot
pub struct FacetQuery<'a> {
    snapshot: &'a CatalogSnapshot,
    policy: CountPolicy,
}

impl<'a> FacetQuery<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot, policy: CountPolicy) -> Self {
        Self { snapshot, policy }
    }

    /// Compute videos and all four candidate lists for `path`
    pub fn evaluate(&self, path: &FilterPath) -> FacetResults {
        let mut videos: Vec<Video> = self
            .snapshot
            .videos()
            .filter(|v| self.matches(v, path, None))
            .cloned()
            .collect();
        videos.sort_by(|a, b| compare_names(&a.name, a.id, &b.name, b.id));

        FacetResults {
            revision: 0,
            catalog_generation: 0,
            path: path.clone(),
            videos,
            instruments: self.candidates(path, Category::Instrument),
            artists: self.candidates(path, Category::Artist),
            durations: self.candidates(path, Category::Duration),
            types: self.candidates(path, Category::Type),
        }
    }

    /// Videos matching every entry of `path`
    pub fn matching_videos(&self, path: &FilterPath) -> Vec<&'a Video> {
        let mut videos: Vec<&Video> = self
            .snapshot
            .videos()
            .filter(|v| self.matches(v, path, None))
            .collect();
        videos.sort_by(|a, b| compare_names(&a.name, a.id, &b.name, b.id));
        videos
    }

    /// Candidate list for `category` under the other categories' filters
    pub fn candidates(&self, path: &FilterPath, category: Category) -> Vec<Candidate> {
        let selected = path.selected(category);
        let instrument_scope = match category {
            Category::Artist => path.selected(Category::Instrument),
            _ => None,
        };
        let constrained = path.entries().iter().any(|e| e.category != category);

        let snapshot: &'a CatalogSnapshot = self.snapshot;
        let tallies = self.tally(path, category);
        let mode = self.mode(category);

        let mut out: Vec<(Candidate, Option<&'a Artist>)> = Vec::new();
        let mut push = |id: i64, name: String, artist: Option<&'a Artist>| {
            let count = tallies
                .get(&id)
                .map(|t| match mode {
                    CountMode::Videos => t.videos,
                    CountMode::Artists => t.artists.len(),
                })
                .unwrap_or(0);
            let is_selected = selected == Some(id);
            let reachable = tallies.get(&id).map(|t| t.videos > 0).unwrap_or(false);
            if !constrained || reachable || is_selected {
                out.push((
                    Candidate {
                        id,
                        name,
                        count,
                        selected: is_selected,
                    },
                    artist,
                ));
            }
        };

        match category {
            Category::Instrument => {
                for instrument in snapshot.instruments() {
                    push(instrument.id, instrument.name.clone(), None);
                }
            }
            Category::Artist => {
                for artist in snapshot.artists() {
                    let in_scope = match instrument_scope {
                        Some(instrument_id) => artist.instrument_id == Some(instrument_id),
                        None => true,
                    };
                    if in_scope || selected == Some(artist.id) {
                        push(artist.id, artist_display_name(artist), Some(artist));
                    }
                }
            }
            Category::Duration => {
                for duration in snapshot.durations() {
                    push(duration.id, duration.name.clone(), None);
                }
            }
            Category::Type => {
                for video_type in snapshot.video_types() {
                    push(video_type.id, video_type.name.clone(), None);
                }
            }
        }

        out.sort_by(|(a, a_artist), (b, b_artist)| match (a_artist, b_artist) {
            (Some(x), Some(y)) => compare_artists(x, y),
            _ => compare_names(&a.name, a.id, &b.name, b.id),
        });
        out.into_iter().map(|(candidate, _)| candidate).collect()
    }

    fn mode(&self, category: Category) -> CountMode {
        match category {
            Category::Instrument => self.policy.instrument,
            Category::Artist => self.policy.artist,
            Category::Duration => self.policy.duration,
            Category::Type => self.policy.video_type,
        }
    }

    /// Per-entity tallies over the videos matching every filter except `category`'s
    fn tally(&self, path: &FilterPath, category: Category) -> HashMap<i64, Tally> {
        let mut tallies: HashMap<i64, Tally> = HashMap::new();

        for video in self.snapshot.videos() {
            if !self.matches(video, path, Some(category)) {
                continue;
            }

            match category {
                Category::Instrument => {
                    let mut seen: HashSet<i64> = HashSet::new();
                    for artist_id in self.snapshot.artist_ids_for_video(video.id) {
                        let Some(instrument_id) =
                            self.snapshot.artist(artist_id).and_then(|a| a.instrument_id)
                        else {
                            continue;
                        };
                        let tally = tallies.entry(instrument_id).or_default();
                        tally.artists.insert(artist_id);
                        if seen.insert(instrument_id) {
                            tally.videos += 1;
                        }
                    }
                }
                Category::Artist => {
                    for artist_id in self.snapshot.artist_ids_for_video(video.id) {
                        let tally = tallies.entry(artist_id).or_default();
                        tally.videos += 1;
                        tally.artists.insert(artist_id);
                    }
                }
                Category::Duration | Category::Type => {
                    let key = match category {
                        Category::Duration => video.duration_id,
                        _ => video.type_id,
                    };
                    if let Some(id) = key {
                        let tally = tallies.entry(id).or_default();
                        tally.videos += 1;
                        tally.artists.extend(self.snapshot.artist_ids_for_video(video.id));
                    }
                }
            }
        }

        tallies
    }

    /// True if `video` satisfies every entry of `path` except `skip`'s
    fn matches(&self, video: &Video, path: &FilterPath, skip: Option<Category>) -> bool {
        path.entries()
            .iter()
            .filter(|e| Some(e.category) != skip)
            .all(|e| self.matches_entry(video, e.category, e.entity_id))
    }

    fn matches_entry(&self, video: &Video, category: Category, entity_id: i64) -> bool {
        match category {
            Category::Instrument => {
                self.snapshot.instrument(entity_id).is_some()
                    && self.snapshot.artist_ids_for_video(video.id).any(|artist_id| {
                        self.snapshot
                            .artist(artist_id)
                            .map(|a| a.instrument_id == Some(entity_id))
                            .unwrap_or(false)
                    })
            }
            Category::Artist => {
                self.snapshot.artist(entity_id).is_some()
                    && self
                        .snapshot
                        .artist_ids_for_video(video.id)
                        .any(|artist_id| artist_id == entity_id)
            }
            Category::Duration => {
                self.snapshot.duration(entity_id).is_some() && video.duration_id == Some(entity_id)
            }
            Category::Type => {
                self.snapshot.video_type(entity_id).is_some() && video.type_id == Some(entity_id)
            }
        }
    }
}

/// Evaluate `path` against `snapshot` in one call
pub fn evaluate(snapshot: &CatalogSnapshot, path: &FilterPath, policy: CountPolicy) -> FacetResults {
    FacetQuery::new(snapshot, policy).evaluate(path)
}
