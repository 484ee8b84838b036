//! Operation result values.
//!
//! Every operation returns a report describing what actually happened on disk.
//! The core never prints; rendering lives in the presentation layer so callers
//! can consume reports programmatically.

use std::path::PathBuf;

use crate::conflict::ConflictRecord;

/// Why a single placement failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The transfer itself failed; the destination was not materialized.
    Io,
    /// Move fallback copied the file but could not remove the source. The
    /// destination is complete and the source still exists, so no data is
    /// lost, but the move did not finish.
    PartialMove,
}

/// One file that could not be fully placed.
#[derive(Debug, Clone)]
pub struct Failure {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Result of merging several source directories into one destination.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Files successfully copied into the destination.
    pub copied: usize,
    /// Renames performed to avoid filename collisions, in processing order.
    pub conflicts: Vec<ConflictRecord>,
    pub failures: Vec<Failure>,
}

/// Result of a two-way ratio split.
#[derive(Debug, Default)]
pub struct RatioReport {
    /// Completed placements into the first output.
    pub count_a: usize,
    /// Completed placements into the second output.
    pub count_b: usize,
    pub failures: Vec<Failure>,
}

/// Result of an n-way round-robin split.
#[derive(Debug, Default)]
pub struct PartsReport {
    /// Completed placements per part, indexed by part number minus one.
    pub counts: Vec<usize>,
    pub failures: Vec<Failure>,
}
