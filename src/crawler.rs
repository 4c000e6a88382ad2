//! Directory crawler implementation

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{WalkEntry, WalkOptions};

/// Top-down directory crawler
///
/// Yields one [`WalkEntry`] per readable directory, parent before children,
/// children in listing order. Unreadable directories are skipped.
#[derive(Debug)]
pub struct Crawler {
    /// Directories still to visit with their depths, next one on top
    stack:      Vec<(PathBuf, usize)>,
    /// Walk options
    options:    WalkOptions,
    /// Canonical paths of visited directories, tracked only when following links
    visited:    HashSet<PathBuf>,
    /// Number of file names seen
    file_count: usize,
    /// Number of directories yielded
    dir_count:  usize,
}

impl Crawler {
    /// Create a new crawler starting at the given path
    #[must_use]
    pub fn new(start_path: &Path, options: WalkOptions) -> Self {
        Self {
            stack: vec![(start_path.to_path_buf(), 0)],
            options,
            visited: HashSet::new(),
            file_count: 0,
            dir_count: 0,
        }
    }

    /// Get the current progress of the crawl
    ///
    /// Returns a tuple of:
    /// - Number of file names seen so far
    /// - Number of directories yielded so far
    #[must_use = "Progress information should be used for monitoring"]
    pub const fn progress(&self) -> (usize, usize) {
        (self.file_count, self.dir_count)
    }

    /// Read one directory, or `None` if it cannot be read
    ///
    /// Alongside the entry, returns which subdirectories are symlinks, in the
    /// same order as `subdirs`.
    fn read(&self, dir: &Path) -> Option<(WalkEntry, Vec<bool>)> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return None;
            },
        };

        let mut subdirs = Vec::new();
        let mut files = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                    continue;
                },
            };

            match Self::kind(&entry) {
                Kind::Dir { link } => subdirs.push((entry.file_name(), link)),
                Kind::File => files.push(entry.file_name()),
            }
        }

        if self.options.sorted {
            subdirs.sort_unstable();
            files.sort_unstable();
        }

        let (subdirs, links) = subdirs.into_iter().unzip();
        Some((WalkEntry { dir: dir.to_path_buf(), subdirs, files }, links))
    }

    /// Directories and symlinks resolving to directories count as directories
    fn kind(entry: &fs::DirEntry) -> Kind {
        match entry.file_type() {
            Ok(ft) if ft.is_symlink() => {
                if fs::metadata(entry.path()).is_ok_and(|m| m.is_dir()) {
                    Kind::Dir { link: true }
                } else {
                    Kind::File
                }
            },
            Ok(ft) if ft.is_dir() => Kind::Dir { link: false },
            _ => Kind::File,
        }
    }

    /// Whether a subdirectory of an already visited directory should be entered
    fn should_descend(&mut self, path: &Path, link: bool) -> bool {
        if !self.options.follow_links {
            return !link;
        }

        match fs::canonicalize(path) {
            Ok(canonical) => {
                if self.visited.insert(canonical) {
                    true
                } else {
                    debug!(dir = %path.display(), "skipping already visited directory");
                    false
                }
            },
            Err(e) => {
                debug!(dir = %path.display(), error = %e, "skipping unresolvable directory");
                false
            },
        }
    }
}

/// How a directory entry is classified
#[derive(Debug, Clone, Copy)]
enum Kind {
    /// A directory, possibly reached through a symlink
    Dir {
        /// Entry itself is a symlink
        link: bool,
    },
    /// Anything else, dangling symlinks included
    File,
}

impl Iterator for Crawler {
    type Item = WalkEntry;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((dir, depth)) = self.stack.pop() {
            if depth == 0 && self.options.follow_links {
                if let Ok(canonical) = fs::canonicalize(&dir) {
                    self.visited.insert(canonical);
                }
            }

            let Some((entry, links)) = self.read(&dir) else {
                continue;
            };

            if self.options.max_depth.is_none_or(|max| depth < max) {
                let mut children = Vec::with_capacity(entry.subdirs.len());
                for (name, link) in entry.subdirs.iter().zip(links) {
                    let path = dir.join(name);
                    if self.should_descend(&path, link) {
                        children.push((path, depth + 1));
                    }
                }
                // Reverse so the first listed subdirectory is popped first
                self.stack.extend(children.into_iter().rev());
            }

            self.dir_count += 1;
            self.file_count += entry.files.len();
            return Some(entry);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempfile::TempDir;

    use super::*;

    fn sorted() -> WalkOptions {
        WalkOptions { sorted: true, ..WalkOptions::default() }
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let mut crawler = Crawler::new(temp_dir.path(), WalkOptions::default());

        let entry = crawler.next().unwrap();
        assert_eq!(entry.dir, temp_dir.path());
        assert!(entry.subdirs.is_empty());
        assert!(entry.files.is_empty());

        assert!(crawler.next().is_none());
    }

    #[test]
    fn test_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut crawler = Crawler::new(&temp_dir.path().join("missing"), WalkOptions::default());
        assert!(crawler.next().is_none());
        assert_eq!(crawler.progress(), (0, 0));
    }

    #[test]
    fn test_file_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain.txt");
        File::create(&file).unwrap();
        assert_eq!(Crawler::new(&file, WalkOptions::default()).count(), 0);
    }

    #[test]
    fn test_mixed_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("file1.txt")).unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(subdir.join("file2.txt")).unwrap();

        let entries: Vec<_> = Crawler::new(temp_dir.path(), WalkOptions::default()).collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].subdirs, ["subdir"]);
        assert_eq!(entries[0].files, ["file1.txt"]);
        assert_eq!(entries[1].dir, subdir);
        assert_eq!(entries[1].files, ["file2.txt"]);
    }

    #[test]
    fn test_top_down_order() {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["a", "a/x", "a/x/deep", "b", "b/y", "c"] {
            fs::create_dir(temp_dir.path().join(dir)).unwrap();
        }

        let visited: Vec<_> = Crawler::new(temp_dir.path(), sorted())
            .map(|e| e.dir.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
            .collect();

        let expected: Vec<PathBuf> =
            ["", "a", "a/x", "a/x/deep", "b", "b/y", "c"].iter().map(PathBuf::from).collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_sorted_names() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["zeta", "alpha", "mid"] {
            File::create(temp_dir.path().join(name)).unwrap();
            fs::create_dir(temp_dir.path().join(format!("{name}_dir"))).unwrap();
        }

        let entry = Crawler::new(temp_dir.path(), sorted()).next().unwrap();
        assert_eq!(entry.files, ["alpha", "mid", "zeta"]);
        assert_eq!(entry.subdirs, ["alpha_dir", "mid_dir", "zeta_dir"]);
    }

    #[test]
    fn test_max_depth() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("one/two/three")).unwrap();

        let options = WalkOptions { max_depth: Some(1), ..WalkOptions::default() };
        let entries: Vec<_> = Crawler::new(temp_dir.path(), options).collect();
        assert_eq!(entries.len(), 2);
        // Names at the depth limit are still listed, just not entered
        assert_eq!(entries[1].subdirs, ["two"]);

        let options = WalkOptions { max_depth: Some(0), ..WalkOptions::default() };
        assert_eq!(Crawler::new(temp_dir.path(), options).count(), 1);
    }

    #[test]
    fn test_progress_reporting() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..3 {
            let subdir = temp_dir.path().join(format!("dir_{i}"));
            fs::create_dir(&subdir).unwrap();
            for j in 0..2 {
                File::create(subdir.join(format!("file_{j}.txt"))).unwrap();
            }
        }

        let mut crawler = Crawler::new(temp_dir.path(), WalkOptions::default());
        assert_eq!(crawler.progress(), (0, 0));

        let mut last_files = 0;
        let mut last_dirs = 0;
        while let Some(entry) = crawler.next() {
            let (files, dirs) = crawler.progress();
            assert_eq!(files, last_files + entry.files.len());
            assert_eq!(dirs, last_dirs + 1);
            last_files = files;
            last_dirs = dirs;
        }

        assert_eq!(crawler.progress(), (6, 4));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_dir_listed_not_entered() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir(&real).unwrap();
        File::create(real.join("inside.txt")).unwrap();
        symlink(&real, temp_dir.path().join("link")).unwrap();

        let entries: Vec<_> = Crawler::new(temp_dir.path(), sorted()).collect();
        assert_eq!(entries[0].subdirs, ["link", "real"]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].dir, real);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let inner = temp_dir.path().join("a/b");
        fs::create_dir_all(&inner).unwrap();
        symlink(temp_dir.path(), inner.join("back")).unwrap();

        let options = WalkOptions { follow_links: true, sorted: true, ..WalkOptions::default() };
        let visited: Vec<_> = Crawler::new(temp_dir.path(), options).map(|e| e.dir).collect();

        // root, a, a/b; the link back to root is listed but never re-entered
        assert_eq!(visited.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_follow_links_enters_symlinked_dir_once() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir(&real).unwrap();
        symlink(&real, temp_dir.path().join("alias")).unwrap();

        let options = WalkOptions { follow_links: true, sorted: true, ..WalkOptions::default() };
        let visited: Vec<_> = Crawler::new(temp_dir.path(), options).map(|e| e.dir).collect();

        assert_eq!(visited, [temp_dir.path().to_path_buf(), temp_dir.path().join("alias")]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_names_kept() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9");
        File::create(temp_dir.path().join(name)).unwrap();
        fs::create_dir(temp_dir.path().join(OsStr::from_bytes(b"dir\xff"))).unwrap();

        let entries: Vec<_> = Crawler::new(temp_dir.path(), WalkOptions::default()).collect();
        assert_eq!(entries[0].files, [name]);
        assert_eq!(entries[0].subdirs, [OsStr::from_bytes(b"dir\xff")]);
        assert_eq!(entries.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_a_file() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        symlink(temp_dir.path().join("nowhere"), temp_dir.path().join("dangling")).unwrap();

        let entry = Crawler::new(temp_dir.path(), WalkOptions::default()).next().unwrap();
        assert_eq!(entry.files, ["dangling"]);
        assert!(entry.subdirs.is_empty());
    }
}
