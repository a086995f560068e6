//! Database models and queries

pub mod catalog;
pub mod filter_path;
pub mod init;
pub mod models;

pub use catalog::*;
pub use filter_path::*;
pub use init::*;
pub use models::*;
