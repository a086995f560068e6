//! # JCAT Facets
//!
//! Faceted browsing over the jazz catalog:
//! - Filter reducer (instrument / artist / duration / type selections)
//! - Derived-query engine (matching videos, candidates with counts)
//! - Filter session with latest-wins recomputation
//! - Bootstrap loader for first-run catalog download
//! - View state glue

pub mod app;
pub mod bootstrap;
pub mod query;
pub mod reducer;
pub mod session;
pub mod snapshot;
pub mod view;

pub use app::Catalog;
pub use bootstrap::{BootstrapLoader, BootstrapOutcome, CatalogSource, HttpCatalogSource};
pub use query::{evaluate, Candidate, FacetQuery, FacetResults};
pub use session::FilterSession;
pub use snapshot::{CatalogSnapshot, InstrumentLookup};
pub use view::ViewState;
