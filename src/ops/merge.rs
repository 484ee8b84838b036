//! Merge several flat source directories into one destination.
//!
//! Filenames are not unique across sources; the conflict resolver picks a free
//! `name_N.ext` for every collision. Resolution and the matching copy run
//! back-to-back on one thread so the probe-then-place step is never
//! interleaved with another placement into the same namespace.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::collect::{Entry, FileFilter, collect};
use crate::conflict::resolve_collision;
use crate::errors::DirShardError;
use crate::place::{OnError, TransferMode, place};
use crate::report::MergeReport;
use crate::shutdown;
use crate::vfs::Vfs;

#[derive(Debug, Clone, Copy, Default)]
pub struct MergeOptions {
    pub on_error: OnError,
}

/// Copy every file of every source into `dest`, renaming on collision.
///
/// Sources are validated up front; entries are gathered in the order the
/// sources are given, each source in its listing order. The destination is
/// created only after all sources have passed validation.
pub fn merge<V: Vfs + ?Sized>(
    fs: &V,
    sources: &[PathBuf],
    dest: &Path,
    opts: &MergeOptions,
) -> Result<MergeReport> {
    for src in sources {
        if !fs.exists(src) {
            return Err(DirShardError::SourceNotFound(src.clone()).into());
        }
        if !fs.is_dir(src) {
            return Err(DirShardError::NotADirectory(src.clone()).into());
        }
    }
    // Literal path comparison; aliased paths are the operator's concern.
    if sources.iter().any(|s| s.as_path() == dest) {
        bail!(
            "destination '{}' is also a source; pick a different directory",
            dest.display()
        );
    }

    let filter = FileFilter::pass_all();
    let mut entries: Vec<Entry> = Vec::new();
    for src in sources {
        entries.extend(collect(fs, src, &filter, None)?);
    }

    fs.create_dir_all(dest)
        .with_context(|| format!("create destination directory '{}'", dest.display()))?;

    let mut report = MergeReport::default();
    for entry in &entries {
        if shutdown::is_requested() {
            warn!(
                copied = report.copied,
                total = entries.len(),
                "shutdown requested; stopping merge"
            );
            break;
        }

        let resolution = resolve_collision(dest, &entry.name, |p| fs.exists(p));
        match place(fs, &entry.source_path(), &resolution.path, TransferMode::Copy) {
            Ok(()) => {
                report.copied += 1;
                // Record the rename only once the copy landed, so a failed
                // copy cannot claim a name.
                if let Some(record) = resolution.renamed {
                    report.conflicts.push(record);
                }
            }
            Err(failure) => match opts.on_error {
                OnError::Continue => report.failures.push(failure),
                OnError::Abort => {
                    bail!(
                        "copy failed for '{}' -> '{}': {}",
                        failure.source.display(),
                        failure.dest.display(),
                        failure.message
                    );
                }
            },
        }
    }

    info!(
        copied = report.copied,
        conflicts = report.conflicts.len(),
        failures = report.failures.len(),
        dest = %dest.display(),
        "merge finished"
    );
    Ok(report)
}
