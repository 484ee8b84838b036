//! Typed error definitions for dirshard.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirShardError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Source path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Split ratio {0} is outside the accepted range 0.0..=1.0")]
    InvalidRatio(f64),

    #[error("Part count must be at least 1, got {0}")]
    InvalidPartCount(usize),

    #[error("Invalid filename pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl DirShardError {
    /// Stable machine-readable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SourceNotFound(_) => "source_not_found",
            Self::NotADirectory(_) => "not_a_directory",
            Self::InvalidRatio(_) => "invalid_ratio",
            Self::InvalidPartCount(_) => "invalid_part_count",
            Self::InvalidPattern { .. } => "invalid_pattern",
        }
    }
}
