//! Directory and file search

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use arrayvec::ArrayVec;
use tracing::{debug, trace};

use crate::crawler::Crawler;
use crate::error::{Error, Result};
use crate::similarity::close_match;
use crate::types::{MAX_DIR_MATCHES, WalkOptions};

/// Glob matcher for file names with `fnmatch` rules
///
/// Braces and backslashes are literal, an unclosed `[` is literal, and `[!..]`
/// negates a class. Every pattern compiles; one whose class can hold no
/// character never matches.
#[derive(Debug)]
struct GlobMatcher {
    /// Compiled glob pattern, `None` when nothing can match
    glob: Option<globset::GlobMatcher>,
}

impl GlobMatcher {
    /// Create a new glob matcher
    ///
    /// # Errors
    /// Returns error if globset rejects the translated pattern
    fn new(pattern: &str) -> Result<Self> {
        let Some(translated) = translate(pattern) else {
            debug!(pattern, "pattern has an empty class and matches nothing");
            return Ok(Self { glob: None });
        };

        let glob = globset::GlobBuilder::new(&translated)
            .case_insensitive(cfg!(any(windows, target_os = "macos")))
            .literal_separator(true)
            .backslash_escape(false)
            .build()
            .map_err(|e| Error::pattern(&format!("Invalid pattern {pattern:?}: {}", e.kind())))?;

        Ok(Self { glob: Some(glob.compile_matcher()) })
    }

    /// Check if a file name matches the pattern
    fn is_match(&self, name: &OsStr) -> bool {
        self.glob.as_ref().is_some_and(|glob| glob.is_match(Path::new(name)))
    }
}

/// Rewrite an `fnmatch` pattern in globset syntax
///
/// Returns `None` if a character class is empty after dropping reversed
/// ranges, since such a pattern matches no name.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => {
                while chars.get(i) == Some(&'*') {
                    i += 1;
                }
                out.push('*');
            },
            '[' => {
                let mut j = i;
                if chars.get(j) == Some(&'!') {
                    j += 1;
                }
                if chars.get(j) == Some(&']') {
                    j += 1;
                }
                while j < chars.len() && chars[j] != ']' {
                    j += 1;
                }
                if j >= chars.len() {
                    out.push_str("[[]");
                    continue;
                }
                push_class(&mut out, &chars[i..j])?;
                i = j + 1;
            },
            '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            },
            c => out.push(c),
        }
    }
    Some(out)
}

/// Characters with a position-dependent meaning inside a globset class, ascending
const CLASS_SPECIAL: [char; 4] = ['!', '-', ']', '^'];

/// Append one bracket expression, given the text between `[` and `]`
fn push_class(out: &mut String, body: &[char]) -> Option<()> {
    let (negated, body) = match body.split_first() {
        Some((&'!', rest)) => (true, rest),
        _ => (false, body),
    };

    let mut ranges = Vec::new();
    let mut k = 0;
    while k < body.len() {
        if k + 2 < body.len() && body[k + 1] == '-' {
            if body[k] <= body[k + 2] {
                ranges.push((body[k], body[k + 2]));
            }
            k += 3;
        } else {
            ranges.push((body[k], body[k]));
            k += 1;
        }
    }

    if ranges.is_empty() {
        if negated {
            out.push('?');
            return Some(());
        }
        return None;
    }

    // Pull special characters out of ranges so they can be placed safely
    let mut plain = Vec::new();
    let mut special = Vec::new();
    for (lo, hi) in ranges {
        let mut start = lo;
        for &c in &CLASS_SPECIAL {
            if (start..=hi).contains(&c) {
                if start < c {
                    plain.push((start, prev_char(c)));
                }
                if !special.contains(&c) {
                    special.push(c);
                }
                start = next_char(c);
            }
        }
        if start <= hi {
            plain.push((start, hi));
        }
    }

    let has = |c: char| special.contains(&c);
    let leads_safely = has(']') || !plain.is_empty() || has('-');
    if !negated && !leads_safely {
        // Only `^` and `!`: a class would read as negated, so spell it out
        match (has('^'), has('!')) {
            (true, true) => out.push_str("{^,!}"),
            (true, false) => out.push('^'),
            _ => out.push('!'),
        }
        return Some(());
    }

    out.push('[');
    if negated {
        out.push('!');
    }
    // `]` is literal only in first place, `-` in first or last place
    let leading_dash = !has(']') && plain.is_empty() && has('-');
    if has(']') {
        out.push(']');
    } else if leading_dash {
        out.push('-');
    }
    for (lo, hi) in plain {
        out.push(lo);
        if lo != hi {
            out.push('-');
            out.push(hi);
        }
    }
    for c in ['^', '!'] {
        if has(c) {
            out.push(c);
        }
    }
    if has('-') && !leading_dash {
        out.push('-');
    }
    out.push(']');
    Some(())
}

/// ASCII neighbours of the class specials, which are all ASCII
const fn prev_char(c: char) -> char {
    (c as u8 - 1) as char
}

/// See [`prev_char`]
const fn next_char(c: char) -> char {
    (c as u8 + 1) as char
}

/// Runs directory and file searches with a fixed set of walk options
#[derive(Debug, Clone, Copy, Default)]
pub struct Finder {
    /// Options handed to every crawl
    options: WalkOptions,
}

impl Finder {
    /// Creates a finder that walks with the given options
    #[must_use]
    pub const fn new(options: WalkOptions) -> Self {
        Self { options }
    }

    /// Find directories whose names are close to `keyword`
    ///
    /// At each visited directory, up to [`MAX_DIR_MATCHES`] subdirectories
    /// scoring at least the similarity cutoff are kept, best first. Ties keep
    /// listing order. An empty keyword matches nothing.
    #[must_use]
    pub fn directories(&self, root: &Path, keyword: &str) -> Vec<PathBuf> {
        let mut matches = Vec::new();
        if keyword.trim().is_empty() {
            debug!("empty directory keyword, nothing to match");
            return matches;
        }

        let mut crawler = Crawler::new(root, self.options);
        for entry in crawler.by_ref() {
            let mut best = ArrayVec::<(f32, usize), MAX_DIR_MATCHES>::new();

            for (idx, name) in entry.subdirs.iter().enumerate() {
                let Some(score) = close_match(keyword, &name.to_string_lossy()) else {
                    continue;
                };
                // First slot holding a strictly lower score; equal scores stay ahead
                let pos = best.iter().position(|&(s, _)| s < score).unwrap_or(best.len());
                if pos == MAX_DIR_MATCHES {
                    continue;
                }
                if best.is_full() {
                    best.pop();
                }
                best.insert(pos, (score, idx));
            }

            for (score, idx) in best {
                let path = entry.dir.join(&entry.subdirs[idx]);
                trace!(path = %path.display(), score, "directory match");
                matches.push(path);
            }
        }

        let (files, dirs) = crawler.progress();
        debug!(keyword, dirs, files, matches = matches.len(), "directory search finished");
        matches
    }

    /// Find files matching the glob `pattern` and, when given, close to `keyword`
    ///
    /// A missing or empty keyword turns fuzzy filtering off. Files are kept in
    /// listing order.
    ///
    /// # Errors
    /// Returns error if globset rejects the translated pattern
    pub fn files(&self, root: &Path, pattern: &str, keyword: Option<&str>) -> Result<Vec<PathBuf>> {
        let glob = GlobMatcher::new(pattern)?;
        let keyword = keyword.filter(|k| !k.trim().is_empty());

        let mut matches = Vec::new();
        let mut crawler = Crawler::new(root, self.options);
        for entry in crawler.by_ref() {
            for name in entry.files.iter().filter(|name| glob.is_match(name)) {
                if let Some(keyword) = keyword {
                    let Some(score) = close_match(keyword, &name.to_string_lossy()) else {
                        continue;
                    };
                    trace!(file = ?name, score, "file match");
                }
                matches.push(entry.dir.join(name));
            }
        }

        let (files, dirs) = crawler.progress();
        debug!(pattern, keyword, dirs, files, matches = matches.len(), "file search finished");
        Ok(matches)
    }
}

/// Find directories under `root` whose names are close to `keyword`
///
/// Walks with [`WalkOptions::default`]; see [`Finder::directories`].
#[must_use]
pub fn search_directories(root: &Path, keyword: &str) -> Vec<PathBuf> {
    Finder::default().directories(root, keyword)
}

/// Find files under `root` matching `pattern`, optionally close to `keyword`
///
/// Walks with [`WalkOptions::default`]; see [`Finder::files`].
///
/// # Errors
/// Returns error if globset rejects the translated pattern
pub fn search_files(root: &Path, pattern: &str, keyword: Option<&str>) -> Result<Vec<PathBuf>> {
    Finder::default().files(root, pattern, keyword)
}
