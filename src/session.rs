//! Interactive prompt flow

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::search::Finder;
use crate::types::DEFAULT_PATTERN;

/// Search mode picked at the first prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pick a folder by keyword, then search the files in it
    Directory,
    /// Search files by glob pattern under the root
    Pattern,
}

impl Mode {
    /// Parse the mode selector typed by the user
    ///
    /// # Errors
    /// Returns `InvalidMode` for anything other than `1` or `2`
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim() {
            "1" => Ok(Self::Directory),
            "2" => Ok(Self::Pattern),
            other => Err(Error::InvalidMode(other.to_owned())),
        }
    }
}

/// Prompt-driven search over a reader and a writer
#[derive(Debug)]
pub struct Session<R, W> {
    /// User input
    input:  R,
    /// Prompts and results
    output: W,
    /// Search runner
    finder: Finder,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Create a new session
    pub const fn new(input: R, output: W, finder: Finder) -> Self {
        Self { input, output, finder }
    }

    /// Run one search starting at `root` and print the files found
    ///
    /// Returns the matching files in the order they were printed.
    ///
    /// # Errors
    /// Returns error if:
    /// - The mode selector or menu choice is invalid
    /// - No directory matches the keyword
    /// - Globset rejects the translated pattern
    /// - Reading input or writing output fails
    pub fn run(&mut self, root: &Path) -> Result<Vec<PathBuf>> {
        let mode = Mode::parse(&self.prompt(
            "Enter 1 to search in a local folder using keywords, or 2 to search for a file \
             pattern: ",
        )?)?;

        let (root, pattern) = match mode {
            Mode::Directory => (self.pick_directory(root)?, DEFAULT_PATTERN.to_owned()),
            Mode::Pattern => {
                let pattern = self.prompt("Enter the pattern to search for: ")?;
                let pattern = if pattern.is_empty() { DEFAULT_PATTERN.to_owned() } else { pattern };
                (root.to_path_buf(), pattern)
            },
        };

        let keyword =
            self.prompt("Enter a keyword to search for in the filenames (or leave blank to skip): ")?;
        let keyword = (!keyword.is_empty()).then_some(keyword.as_str());

        info!(root = %root.display(), pattern = pattern.as_str(), keyword, "searching files");
        let results = self.finder.files(&root, &pattern, keyword)?;

        writeln!(self.output, "\nFound {} file(s):", results.len())?;
        for file in &results {
            writeln!(self.output, "{}", file.display())?;
        }
        self.output.flush()?;

        Ok(results)
    }

    /// Ask for a folder keyword and let the user choose among the matches
    fn pick_directory(&mut self, root: &Path) -> Result<PathBuf> {
        let keyword = self.prompt("Enter a keyword to search for directories: ")?;

        info!(root = %root.display(), keyword = keyword.as_str(), "searching directories");
        let mut directories = self.finder.directories(root, &keyword);
        if directories.is_empty() {
            return Err(Error::NoDirectories(keyword));
        }

        writeln!(self.output, "Select a directory to search in:")?;
        for (i, directory) in directories.iter().enumerate() {
            writeln!(self.output, "{}. {}", i + 1, directory.display())?;
        }

        let choice = self.prompt("Enter the number of the directory: ")?;
        let max = directories.len();
        match choice.parse::<usize>() {
            Ok(n) if (1..=max).contains(&n) => Ok(directories.swap_remove(n - 1)),
            _ => Err(Error::InvalidSelection { input: choice, max }),
        }
    }

    /// Print a prompt and read one trimmed line
    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }
}
