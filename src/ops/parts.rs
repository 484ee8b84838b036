//! N-way round-robin split into `part_1` .. `part_N`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;
use tracing::info;

use crate::collect::{FileFilter, collect};
use crate::place::{OnError, PlaceJob, TransferMode, place_batch};
use crate::report::PartsReport;
use crate::split::{split_round_robin, validate_parts};
use crate::vfs::Vfs;

#[derive(Debug, Clone)]
pub struct PartsOptions {
    /// Number of parts, at least 1.
    pub parts: usize,
    pub filter: FileFilter,
    pub mode: TransferMode,
    pub on_error: OnError,
}

/// Deal the filtered (optionally shuffled) input round-robin into
/// `output_base/part_1` .. `part_N`.
///
/// `parts` is validated before `output_base` or any part directory is created,
/// so an invalid count leaves the filesystem untouched. Every part directory
/// is created even when its bucket ends up empty.
pub fn split_parts<V: Vfs + ?Sized>(
    fs: &V,
    input: &Path,
    output_base: &Path,
    opts: &PartsOptions,
    shuffle: Option<&mut dyn RngCore>,
) -> Result<PartsReport> {
    validate_parts(opts.parts)?;

    let entries = collect(fs, input, &opts.filter, shuffle)?;
    let total = entries.len();
    let buckets = split_round_robin(entries, opts.parts)?;

    let part_dirs: Vec<PathBuf> = (1..=opts.parts)
        .map(|i| output_base.join(format!("part_{i}")))
        .collect();
    for dir in &part_dirs {
        fs.create_dir_all(dir)
            .with_context(|| format!("create part directory '{}'", dir.display()))?;
    }

    let jobs: Vec<PlaceJob> = buckets
        .iter()
        .enumerate()
        .flat_map(|(i, bucket)| {
            let dir = &part_dirs[i];
            bucket.iter().map(move |e| PlaceJob {
                source: e.source_path(),
                dest: dir.join(&e.name),
                bucket: i,
            })
        })
        .collect();

    let outcome = place_batch(fs, &jobs, opts.parts, opts.mode, opts.on_error)?;
    let report = PartsReport {
        counts: outcome.placed,
        failures: outcome.failures,
    };
    info!(
        total,
        parts = opts.parts,
        placed = report.counts.iter().sum::<usize>(),
        failures = report.failures.len(),
        base = %output_base.display(),
        "parts split finished"
    );
    Ok(report)
}
