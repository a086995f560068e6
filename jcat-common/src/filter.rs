//! Filter path types
//!
//! A filter path is the ordered list of active facet selections. At most one
//! entry per [`Category`] may be present; order only matters for display.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facet category
///
/// Numeric codes are persisted in the `filter_path` table and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Instrument,
    Artist,
    Duration,
    Type,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 4] = [
        Category::Instrument,
        Category::Artist,
        Category::Duration,
        Category::Type,
    ];

    /// Persisted numeric code
    pub fn code(self) -> i64 {
        match self {
            Category::Instrument => 1,
            Category::Artist => 2,
            Category::Duration => 3,
            Category::Type => 4,
        }
    }

    /// Decode a persisted numeric code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Category::Instrument),
            2 => Some(Category::Artist),
            3 => Some(Category::Duration),
            4 => Some(Category::Type),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Instrument => "instrument",
            Category::Artist => "artist",
            Category::Duration => "duration",
            Category::Type => "type",
        };
        f.write_str(s)
    }
}

/// One active facet selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    pub category: Category,
    pub entity_id: i64,
    pub entity_name: String,
}

impl FilterEntry {
    pub fn new(category: Category, entity_id: i64, entity_name: impl Into<String>) -> Self {
        Self {
            category,
            entity_id,
            entity_name: entity_name.into(),
        }
    }

    /// True if this entry selects exactly `(category, entity_id)`
    pub fn matches(&self, category: Category, entity_id: i64) -> bool {
        self.category == category && self.entity_id == entity_id
    }
}

/// Ordered set of active facet selections
///
/// Serialized as a plain list; deserializing goes through
/// [`FilterPath::from_entries`], so duplicate categories collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FilterEntry>", into = "Vec<FilterEntry>")]
pub struct FilterPath {
    entries: Vec<FilterEntry>,
}

impl FilterPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from raw entries, keeping the last entry per category
    pub fn from_entries(entries: Vec<FilterEntry>) -> Self {
        let mut path = Self { entries };
        path.dedup_by_category();
        path
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active entry for `category`, if any
    pub fn entry(&self, category: Category) -> Option<&FilterEntry> {
        self.entries.iter().find(|e| e.category == category)
    }

    /// Selected entity id for `category`, if any
    pub fn selected(&self, category: Category) -> Option<i64> {
        self.entry(category).map(|e| e.entity_id)
    }

    /// True if `(category, entity_id)` is an active selection
    pub fn contains(&self, category: Category, entity_id: i64) -> bool {
        self.entries.iter().any(|e| e.matches(category, entity_id))
    }

    /// True if no category appears more than once
    pub fn is_well_formed(&self) -> bool {
        let mut seen = [false; 4];
        for entry in &self.entries {
            let slot = (entry.category.code() - 1) as usize;
            if seen[slot] {
                return false;
            }
            seen[slot] = true;
        }
        true
    }

    /// Collapse duplicate categories; the last entry per category wins
    /// and takes the position of the first occurrence.
    pub fn dedup_by_category(&mut self) {
        if self.is_well_formed() {
            return;
        }
        let mut out: Vec<FilterEntry> = Vec::with_capacity(self.entries.len());
        for entry in self.entries.drain(..) {
            match out.iter_mut().find(|e| e.category == entry.category) {
                Some(existing) => *existing = entry,
                None => out.push(entry),
            }
        }
        self.entries = out;
    }

    /// Remove every entry of `category`
    pub fn remove_category(&mut self, category: Category) {
        self.entries.retain(|e| e.category != category);
    }

    /// Replace the entry for the new entry's category in place, or append it
    pub fn upsert(&mut self, entry: FilterEntry) {
        match self.entries.iter().position(|e| e.category == entry.category) {
            Some(idx) => {
                self.entries[idx] = entry;
                // Only the first occurrence is replaced; drop any stragglers.
                let category = self.entries[idx].category;
                let mut i = 0;
                self.entries.retain(|e| {
                    let keep = e.category != category || i == idx;
                    i += 1;
                    keep
                });
            }
            None => self.entries.push(entry),
        }
    }

    /// Insert `entry` immediately before the entry of `before`, or append
    pub fn insert_before(&mut self, before: Category, entry: FilterEntry) {
        match self.entries.iter().position(|e| e.category == before) {
            Some(idx) => self.entries.insert(idx, entry),
            None => self.entries.push(entry),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_entries(self) -> Vec<FilterEntry> {
        self.entries
    }
}

impl From<Vec<FilterEntry>> for FilterPath {
    fn from(entries: Vec<FilterEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<FilterPath> for Vec<FilterEntry> {
    fn from(path: FilterPath) -> Self {
        path.into_entries()
    }
}
