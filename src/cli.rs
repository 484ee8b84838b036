//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - CLI flags override config values (which are loaded from XML if present).
//! - --debug is a shorthand for --log-level debug.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::collect::FileFilter;
use crate::config::types::{Config, LogLevel};
use crate::errors::DirShardError;
use crate::place::{OnError, TransferMode};

/// CLI wrapper for the dirshard library.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Merge and shard flat file collections safely"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Append logs to this file in addition to the console.
    #[arg(
        long,
        global = true,
        value_hint = ValueHint::FilePath,
        help = "Append logs to this file in addition to the console"
    )]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Stop at the first file that fails instead of collecting failures.
    #[arg(
        long,
        global = true,
        help = "Stop at the first file that fails instead of collecting failures"
    )]
    pub fail_fast: bool,

    /// Collect per-file failures and keep going, even if the config says abort.
    #[arg(
        long,
        global = true,
        conflicts_with = "fail_fast",
        help = "Collect per-file failures and keep going, even if the config says abort"
    )]
    pub keep_going: bool,

    /// Print where dirshard will look for the config file (or DIRSHARD_CONFIG if set), then exit.
    #[arg(
        long,
        help = "Print the config file location used by dirshard and exit"
    )]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Merge several source directories into one destination, renaming on
    /// filename collisions.
    Merge {
        /// Source directories, processed in the order given.
        #[arg(required = true, value_name = "SOURCE", value_hint = ValueHint::DirPath)]
        sources: Vec<PathBuf>,

        /// Destination directory (created if absent).
        #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
        into: PathBuf,
    },

    /// Split one directory into two buckets by a fractional ratio (always shuffled).
    Ratio {
        /// Input directory holding the collection.
        #[arg(value_name = "INPUT", value_hint = ValueHint::DirPath)]
        input: PathBuf,

        /// First output directory; receives floor(count * ratio) files.
        #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
        out_a: PathBuf,

        /// Second output directory; receives the remainder.
        #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
        out_b: PathBuf,

        /// Fraction of files for the first output, between 0.0 and 1.0.
        #[arg(long)]
        ratio: f64,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        transfer: TransferArgs,

        /// Seed for the shuffle; omit for fresh randomness.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Split one directory into N parts (part_1..part_N), dealt round-robin.
    Parts {
        /// Input directory holding the collection.
        #[arg(value_name = "INPUT", value_hint = ValueHint::DirPath)]
        input: PathBuf,

        /// Base output directory; part_1..part_N are created inside it.
        #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
        out: PathBuf,

        /// Number of parts (at least 1).
        #[arg(long)]
        parts: usize,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        transfer: TransferArgs,

        /// Keep the listing order instead of shuffling.
        #[arg(long)]
        no_shuffle: bool,

        /// Seed for the shuffle; omit for fresh randomness.
        #[arg(long, conflicts_with = "no_shuffle")]
        seed: Option<u64>,
    },
}

/// Filename filters shared by the split subcommands.
#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Only include files with this extension (repeatable; case-insensitive,
    /// with or without the leading dot).
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Only include filenames matching this regex, anchored at the start of
    /// the name.
    #[arg(long, value_name = "REGEX")]
    pub pattern: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<FileFilter, DirShardError> {
        let exts = if self.extensions.is_empty() {
            None
        } else {
            Some(self.extensions.as_slice())
        };
        FileFilter::new(exts, self.pattern.as_deref())
    }
}

/// Transfer mode shared by the split subcommands.
#[derive(clap::Args, Debug, Clone)]
pub struct TransferArgs {
    /// Move files instead of copying them.
    #[arg(long = "move")]
    pub move_files: bool,
}

impl TransferArgs {
    pub fn mode(&self) -> TransferMode {
        if self.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        }
    }
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if self.fail_fast {
            cfg.on_error = OnError::Abort;
        } else if self.keep_going {
            cfg.on_error = OnError::Continue;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
