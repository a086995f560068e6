//! # JCAT Common Library
//!
//! Shared code for the jazz catalog browser:
//! - Catalog entity models and the SQLite entity store
//! - Filter path types and their persistence
//! - Configuration loading
//! - Catalog event bus
//! - Display helpers for catalog records

pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod events;
pub mod filter;

pub use error::{Error, Result};
pub use filter::{Category, FilterEntry, FilterPath};
