//! Two-way ratio split.

use std::path::Path;

use anyhow::{Context, Result, bail};
use rand::RngCore;
use tracing::info;

use crate::collect::{FileFilter, collect};
use crate::place::{OnError, PlaceJob, TransferMode, place_batch};
use crate::report::RatioReport;
use crate::split::{split_by_ratio, validate_ratio};
use crate::vfs::Vfs;

#[derive(Debug, Clone)]
pub struct RatioOptions {
    /// Fraction of files for the first output, in `[0.0, 1.0]`.
    pub ratio: f64,
    pub filter: FileFilter,
    pub mode: TransferMode,
    pub on_error: OnError,
}

/// Shuffle the filtered input and cut it at `floor(len * ratio)`: the first
/// part goes to `out_a`, the remainder to `out_b`.
///
/// The shuffle is unconditional; determinism comes from seeding `rng`, not
/// from disabling it. Parameters are validated before any directory is
/// created.
pub fn split_ratio<V: Vfs + ?Sized>(
    fs: &V,
    input: &Path,
    out_a: &Path,
    out_b: &Path,
    opts: &RatioOptions,
    rng: &mut dyn RngCore,
) -> Result<RatioReport> {
    validate_ratio(opts.ratio)?;
    if out_a == out_b {
        bail!(
            "output directories must be distinct; got '{}' twice",
            out_a.display()
        );
    }
    if input == out_a || input == out_b {
        bail!(
            "input '{}' is also an output; pick different directories",
            input.display()
        );
    }

    let entries = collect(fs, input, &opts.filter, Some(rng))?;
    let total = entries.len();
    let (first, second) = split_by_ratio(entries, opts.ratio)?;

    for dir in [out_a, out_b] {
        fs.create_dir_all(dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
    }

    let jobs: Vec<PlaceJob> = first
        .iter()
        .map(|e| PlaceJob {
            source: e.source_path(),
            dest: out_a.join(&e.name),
            bucket: 0,
        })
        .chain(second.iter().map(|e| PlaceJob {
            source: e.source_path(),
            dest: out_b.join(&e.name),
            bucket: 1,
        }))
        .collect();

    let outcome = place_batch(fs, &jobs, 2, opts.mode, opts.on_error)?;
    let report = RatioReport {
        count_a: outcome.placed[0],
        count_b: outcome.placed[1],
        failures: outcome.failures,
    };
    info!(
        total,
        count_a = report.count_a,
        count_b = report.count_b,
        failures = report.failures.len(),
        "ratio split finished"
    );
    Ok(report)
}
