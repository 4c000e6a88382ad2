//! Common types and constants for `lostfile`

use std::ffi::OsString;
use std::path::PathBuf;

/// Minimum similarity score a name needs to count as a fuzzy match
pub const SIMILARITY_CUTOFF: f32 = 0.6;

/// Maximum number of directory matches kept per visited directory
pub const MAX_DIR_MATCHES: usize = 5;

/// Glob pattern that matches every file name
pub const DEFAULT_PATTERN: &str = "*";

/// One directory yielded by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path of the visited directory
    pub dir:     PathBuf,
    /// Names of its immediate subdirectories, in listing order
    pub subdirs: Vec<OsString>,
    /// Names of its immediate files, in listing order
    pub files:   Vec<OsString>,
}

/// Options controlling how the directory tree is walked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Deepest level to descend to, the root being level 0 (`None` = unlimited)
    pub max_depth:    Option<usize>,
    /// Descend into symlinked directories
    pub follow_links: bool,
    /// Sort names within each directory instead of keeping listing order
    pub sorted:       bool,
}

const _: () = {
    assert!(SIMILARITY_CUTOFF > 0.0 && SIMILARITY_CUTOFF <= 1.0);
    assert!(MAX_DIR_MATCHES > 0);
    assert!(!DEFAULT_PATTERN.is_empty());
};
