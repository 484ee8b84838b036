//! User-facing console output.
//!
//! Small wrapper around stdout/stderr printing to provide consistent, colored
//! messages, plus renderers for the operation reports. Colors are enabled only
//! when output is a TTY. Logging (tracing) is separate; these lines are the
//! primary output users may script against.

use std::path::Path;

use owo_colors::OwoColorize;

use crate::report::{Failure, FailureKind, MergeReport, PartsReport, RatioReport};

fn is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

pub fn print_info(msg: &str) {
    if is_tty() {
        println!("{} {}", "info:".cyan().bold(), msg);
    } else {
        println!("info: {}", msg);
    }
}

pub fn print_warn(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

pub fn print_success(msg: &str) {
    if is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}

/// Print a plain user-facing line (no prefix).
pub fn print_user(msg: &str) {
    println!("{}", msg);
}

pub fn print_merge_report(report: &MergeReport, dest: &Path) {
    print_success(&format!(
        "merged {} file(s) into '{}'",
        report.copied,
        dest.display()
    ));
    if report.conflicts.is_empty() {
        print_info("no filename conflicts detected");
    } else {
        print_info(&format!(
            "{} conflict(s) detected and resolved:",
            report.conflicts.len()
        ));
        for c in &report.conflicts {
            print_user(&format!("  - {} -> {}", c.original, c.resolved));
        }
    }
    print_failures(&report.failures);
}

pub fn print_ratio_report(report: &RatioReport, out_a: &Path, out_b: &Path) {
    print_success(&format!(
        "split complete: {} file(s) in '{}', {} file(s) in '{}'",
        report.count_a,
        out_a.display(),
        report.count_b,
        out_b.display()
    ));
    print_failures(&report.failures);
}

pub fn print_parts_report(report: &PartsReport, output_base: &Path) {
    let total: usize = report.counts.iter().sum();
    print_success(&format!(
        "split {} file(s) into {} part(s) in '{}'",
        total,
        report.counts.len(),
        output_base.display()
    ));
    print_failures(&report.failures);
}

fn print_failures(failures: &[Failure]) {
    for f in failures {
        let what = match f.kind {
            FailureKind::Io => "failed",
            FailureKind::PartialMove => "copied but source not removed",
        };
        print_warn(&format!(
            "{}: '{}' -> '{}': {}",
            what,
            f.source.display(),
            f.dest.display(),
            f.message
        ));
    }
}
