//! Unified error type for the false-trip pipeline.
//!
//! Only host-level failures are errors: an unreadable input root, an unwritable
//! report, a broken configuration file or an intermediate record that has lost
//! its fields. Bad points, short trips and unparseable trip IDs inside a list
//! degrade to defaults and never surface here.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FalseTripError>;

#[derive(Debug, Error)]
pub enum FalseTripError {
    #[error("I/O error while {context} ({}): {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input root {} does not exist or is not a directory", .path.display())]
    InputRoot { path: PathBuf },

    #[error("malformed record '{line}': {reason}")]
    MalformedRecord { line: String, reason: &'static str },

    #[error("invalid configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl FalseTripError {
    pub fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn config(path: &Path, source: serde_json::Error) -> Self {
        Self::Config {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn malformed(line: &str, reason: &'static str) -> Self {
        Self::MalformedRecord {
            line: line.to_string(),
            reason,
        }
    }
}

/// Turns a missing field into a [`FalseTripError::MalformedRecord`].
pub trait OptionExt<T> {
    fn ok_or_malformed(self, line: &str, reason: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_malformed(self, line: &str, reason: &'static str) -> Result<T> {
        self.ok_or_else(|| FalseTripError::malformed(line, reason))
    }
}
