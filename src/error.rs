//! Error types for `lostfile`

use std::path::PathBuf;

use arrayvec::ArrayString;
use thiserror::Error;

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `lostfile` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for `lostfile`
///
/// Unreadable directories never show up here: the walker skips them.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal or filesystem IO failed
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),

    /// Translated glob pattern was rejected by globset, with fixed-size message buffer
    #[error("Error: {0}")]
    Pattern(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// Mode selector was neither `1` nor `2`
    #[error("Error: Invalid option {0:?}")]
    InvalidMode(String),

    /// Menu selection was not a number in range
    #[error("Error: Invalid selection {input:?}, expected a number from 1 to {max}")]
    InvalidSelection {
        /// What the user typed
        input: String,
        /// Highest valid menu number
        max:   usize,
    },

    /// Directory keyword search found nothing to pick from
    #[error("Error: No matching directories found for {0:?}")]
    NoDirectories(String),

    /// Root does not exist or is not a directory
    #[error("Error: Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// No root was given and the home directory is unknown
    #[error("Error: Could not determine the home directory")]
    NoHomeDir,
}

impl Error {
    /// Create a new pattern error
    ///
    /// Messages longer than `MAX_ERROR_LENGTH` are truncated.
    pub fn pattern(msg: &str) -> Self {
        let mut buf = ArrayString::new();
        for c in msg.chars() {
            if buf.try_push(c).is_err() {
                break;
            }
        }
        Self::Pattern(Box::new(buf))
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> ArrayString<MAX_ERROR_LENGTH> {
        let tip = match self {
            Self::Io(_) => "Tip: Check that the terminal is readable and try again",
            Self::Pattern(_) => "Tip: Use *, ? and [abc] only",
            Self::InvalidMode(_) => "Tip: Enter 1 to search folders or 2 to search files",
            Self::InvalidSelection { .. } => "Tip: Pick one of the numbers shown in the list",
            Self::NoDirectories(_) => "Tip: Try a shorter keyword or a different root",
            Self::NotADirectory(_) => "Tip: Pass an existing directory with --root",
            Self::NoHomeDir => "Tip: Pass the directory to search with --root",
        };

        let mut msg = ArrayString::new();
        for c in self.to_string().chars().chain(['\n']).chain(tip.chars()) {
            if msg.try_push(c).is_err() {
                break;
            }
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_message_truncated() {
        let long = "x".repeat(MAX_ERROR_LENGTH * 2);
        let Error::Pattern(buf) = Error::pattern(&long) else {
            panic!("Expected pattern error");
        };
        assert_eq!(buf.len(), MAX_ERROR_LENGTH);
    }

    #[test]
    fn test_pattern_message_truncates_on_char_boundary() {
        let long = "é".repeat(MAX_ERROR_LENGTH);
        let Error::Pattern(buf) = Error::pattern(&long) else {
            panic!("Expected pattern error");
        };
        assert!(buf.len() <= MAX_ERROR_LENGTH);
        assert!(buf.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_user_message_has_tip() {
        let msg = Error::InvalidMode("3".into()).user_message();
        assert!(msg.starts_with("Error: Invalid option \"3\""));
        assert!(msg.contains("\nTip: "));
    }

    #[test]
    fn test_selection_display() {
        let err = Error::InvalidSelection { input: "9".into(), max: 2 };
        assert_eq!(err.to_string(), "Error: Invalid selection \"9\", expected a number from 1 to 2");
    }
}
