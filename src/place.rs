//! Copy/move execution.
//!
//! [`place`] materializes one assignment; [`place_batch`] materializes a whole
//! list under a continue/abort policy, running disjoint placements on the
//! rayon pool and honoring cooperative cancellation between files.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::report::{Failure, FailureKind};
use crate::shutdown;
use crate::vfs::Vfs;

/// How an entry reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    /// Metadata-preserving copy; the source is left untouched.
    Copy,
    /// Rename when possible, otherwise copy then delete the source.
    Move,
}

/// Per-file failure policy for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnError {
    /// Record the failure and keep placing the rest (default).
    #[default]
    Continue,
    /// Stop at the first failure and fail the whole operation.
    Abort,
}

impl OnError {
    /// Parse config-file values, case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "continue" | "keep-going" => Some(Self::Continue),
            "abort" | "fail-fast" => Some(Self::Abort),
            _ => None,
        }
    }
}

/// One placement assignment: a source file, its resolved destination, and the
/// bucket it was assigned to (for per-bucket accounting).
#[derive(Debug, Clone)]
pub struct PlaceJob {
    pub source: PathBuf,
    pub dest: PathBuf,
    pub bucket: usize,
}

/// Completed/failed accounting for one batch.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Completed placements per bucket index.
    pub placed: Vec<usize>,
    pub failures: Vec<Failure>,
}

/// Place one file.
///
/// Copy never touches the source; move deletes the source only after the
/// transfer fully succeeded. A failed delete after a successful copy is
/// reported as [`FailureKind::PartialMove`]: the destination is complete and
/// the source still present, so no data is lost.
pub fn place<V: Vfs + ?Sized>(
    fs: &V,
    src: &Path,
    dest: &Path,
    mode: TransferMode,
) -> Result<(), Failure> {
    match mode {
        TransferMode::Copy => {
            fs.copy_file(src, dest)
                .map_err(|e| failure(src, dest, FailureKind::Io, &e))?;
            debug!(src = %src.display(), dest = %dest.display(), "copied file");
            Ok(())
        }
        TransferMode::Move => match fs.rename(src, dest) {
            Ok(()) => {
                debug!(src = %src.display(), dest = %dest.display(), "renamed file atomically");
                Ok(())
            }
            Err(e) => {
                warn!(
                    src = %src.display(),
                    error = %e,
                    hint = rename_hint(&e),
                    "rename failed, using copy then delete"
                );
                fs.copy_file(src, dest)
                    .map_err(|e| failure(src, dest, FailureKind::Io, &e))?;
                match fs.remove_file(src) {
                    Ok(()) => {
                        debug!(src = %src.display(), dest = %dest.display(), "moved file via copy fallback");
                        Ok(())
                    }
                    Err(e) => Err(failure(src, dest, FailureKind::PartialMove, &e)),
                }
            }
        },
    }
}

fn failure(src: &Path, dest: &Path, kind: FailureKind, err: &io::Error) -> Failure {
    Failure {
        source: src.to_path_buf(),
        dest: dest.to_path_buf(),
        kind,
        message: err.to_string(),
    }
}

#[cfg(unix)]
fn rename_hint(e: &io::Error) -> &'static str {
    match e.raw_os_error() {
        Some(code) if code == libc::EXDEV => "cross-filesystem; will copy instead",
        Some(code) if code == libc::EACCES || code == libc::EPERM => {
            "permission denied; check destination perms"
        }
        _ => "falling back to copy",
    }
}

#[cfg(not(unix))]
fn rename_hint(e: &io::Error) -> &'static str {
    match e.kind() {
        io::ErrorKind::PermissionDenied => "permission denied; check destination perms",
        _ => "falling back to copy",
    }
}

/// Place every job in `jobs` into `buckets` accounting slots.
///
/// `Continue` runs jobs on the rayon pool (destinations are disjoint by
/// construction) and collects failures; `Abort` stays sequential so "first
/// failure" is well-defined, and fails the whole batch there. Both stop
/// issuing work once a shutdown is requested; jobs never attempted appear in
/// neither tally.
pub fn place_batch<V: Vfs + ?Sized>(
    fs: &V,
    jobs: &[PlaceJob],
    buckets: usize,
    mode: TransferMode,
    on_error: OnError,
) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome {
        placed: vec![0; buckets],
        failures: Vec::new(),
    };

    match on_error {
        OnError::Abort => {
            for job in jobs {
                if shutdown::is_requested() {
                    warn!(placed = outcome.placed.iter().sum::<usize>(), total = jobs.len(), "shutdown requested; stopping placement");
                    break;
                }
                match place(fs, &job.source, &job.dest, mode) {
                    Ok(()) => outcome.placed[job.bucket] += 1,
                    Err(f) => {
                        let what = match f.kind {
                            FailureKind::Io => "transfer failed",
                            FailureKind::PartialMove => "copied but failed to remove source",
                        };
                        bail!(
                            "{} for '{}' -> '{}': {}",
                            what,
                            f.source.display(),
                            f.dest.display(),
                            f.message
                        );
                    }
                }
            }
        }
        OnError::Continue => {
            let results: Vec<(usize, Option<Failure>)> = jobs
                .par_iter()
                .filter_map(|job| {
                    if shutdown::is_requested() {
                        return None;
                    }
                    Some(match place(fs, &job.source, &job.dest, mode) {
                        Ok(()) => (job.bucket, None),
                        Err(f) => (job.bucket, Some(f)),
                    })
                })
                .collect();
            for (bucket, maybe_failure) in results {
                match maybe_failure {
                    None => outcome.placed[bucket] += 1,
                    Some(f) => outcome.failures.push(f),
                }
            }
        }
    }

    Ok(outcome)
}
