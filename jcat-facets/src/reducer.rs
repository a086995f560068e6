//! Filter reducer
//!
//! Pure transitions over a [`FilterPath`]. Every function is total: unknown
//! ids are accepted as opaque values and the result always holds at most one
//! entry per category.
//!
//! Rules:
//! - a selection replaces any entry of the same category
//! - selecting an instrument drops the selected artist
//! - selecting an artist with no instrument active adds that artist's
//!   instrument, if the catalog knows it
//! - deselecting the instrument also drops the artist

use crate::snapshot::InstrumentLookup;
use jcat_common::{Category, FilterEntry, FilterPath};
use tracing::error;

/// Select `(category, entity_id)`, replacing any entry of that category
pub fn apply_selection(
    path: &FilterPath,
    category: Category,
    entity_id: i64,
    entity_name: &str,
    lookup: &impl InstrumentLookup,
) -> FilterPath {
    let mut next = path.clone();
    next.upsert(FilterEntry::new(category, entity_id, entity_name));

    match category {
        Category::Instrument => next.remove_category(Category::Artist),
        Category::Artist if next.entry(Category::Instrument).is_none() => {
            if let Some((instrument_id, instrument_name)) = lookup.instrument_of_artist(entity_id) {
                next.insert_before(
                    Category::Artist,
                    FilterEntry::new(Category::Instrument, instrument_id, instrument_name),
                );
            }
        }
        _ => {}
    }

    finish(next)
}

/// Remove `(category, entity_id)` if it is active
///
/// Removing the instrument also removes the artist. A pair that is not
/// active leaves the path unchanged.
pub fn apply_deselection(path: &FilterPath, category: Category, entity_id: i64) -> FilterPath {
    if !path.contains(category, entity_id) {
        return path.clone();
    }

    let mut next = path.clone();
    next.remove_category(category);
    if category == Category::Instrument {
        next.remove_category(Category::Artist);
    }

    finish(next)
}

/// Deselect if `(category, entity_id)` is active, otherwise select it
pub fn toggle(
    path: &FilterPath,
    category: Category,
    entity_id: i64,
    entity_name: &str,
    lookup: &impl InstrumentLookup,
) -> FilterPath {
    if path.contains(category, entity_id) {
        apply_deselection(path, category, entity_id)
    } else {
        apply_selection(path, category, entity_id, entity_name, lookup)
    }
}

/// Enforce one entry per category
///
/// A duplicate here is a reducer bug: debug builds panic, release builds
/// log and keep the last entry per category.
fn finish(mut path: FilterPath) -> FilterPath {
    if !path.is_well_formed() {
        debug_assert!(false, "filter path has duplicate categories: {:?}", path);
        error!("Filter path had duplicate categories, de-duplicating: {:?}", path);
        path.dedup_by_category();
    }
    path
}
