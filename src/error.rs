//! Error types for the to-do list core.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for list, store and shell operations
#[derive(Error, Debug)]
pub enum TodoError {
    /// Item number was not a positive integer
    #[error("invalid item number `{0}`")]
    InvalidNumber(String),

    /// Item number is outside the list
    #[error("no item {number} (list has {len} items)")]
    NoSuchItem {
        /// 1-based number the user asked for
        number: usize,
        /// Current list length
        len: usize,
    },

    /// Item text was blank after normalization
    #[error("a todo cannot be empty")]
    EmptyItem,

    /// Reading or writing a file failed
    #[error("{action} `{}`: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file did not parse
    #[error("config `{}`: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Interactive line editor failed
    #[error("line editor: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// Web page template failed to load or render
    #[error("template: {0}")]
    Template(#[from] minijinja::Error),
}

impl TodoError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TodoError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// User-input mistakes the shell reports and keeps going after.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TodoError::InvalidNumber(_) | TodoError::NoSuchItem { .. } | TodoError::EmptyItem
        )
    }
}

/// Result type alias for to-do operations
pub type Result<T> = std::result::Result<T, TodoError>;
