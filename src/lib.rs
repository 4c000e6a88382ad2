//! `lostfile` - Find lost directories and files by fuzzy name and glob pattern.

#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod crawler;
pub mod error;
pub mod search;
pub mod session;
pub mod similarity;
pub mod types;

pub use error::{Error, Result};
pub use search::{Finder, search_directories, search_files};
pub use types::WalkOptions;
