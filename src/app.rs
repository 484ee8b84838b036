//! Application orchestrator.
//! Loads/merges config, initializes logging, installs signal handlers and
//! dispatches the requested operation over the real filesystem.

use anyhow::{bail, Result};
use dirshard::errors::DirShardError;
use dirshard::output as out;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use dirshard::{default_config_path, load_config_from_xml, shutdown, Config, CONFIG_ENV_VAR};

use dirshard::cli::{Args, Command};
use dirshard::ops::{merge, split_parts, split_ratio, MergeOptions, PartsOptions, RatioOptions};
use dirshard::vfs::OsFs;

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }

    // Build config (may read XML, writing a template on first run).
    // CLI args override config values.
    let mut cfg = load_config_from_xml().unwrap_or_default();
    args.apply_overrides(&mut cfg);

    let Some(command) = args.command.as_ref() else {
        bail!("no command given; run with --help to see merge, ratio and parts");
    };

    // Initialize logging and capture the guard so we can drop it on signal
    let guard_opt: Option<tracing_appender::non_blocking::WorkerGuard> =
        init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
            out::print_error(&format!("Failed to initialize logging: {}", e));
            e
        })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take(); // drop guard here to flush tracing_appender
            }
        })
        .expect("failed to install signal handler");
    }

    if shutdown::is_requested() {
        return Ok(());
    }

    debug!("Starting dirshard: {:?}", args);

    let result = run_command(command, &cfg);
    if let Err(e) = &result {
        log_op_error(e);
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

/// Report where config is read from without touching the filesystem state.
fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV_VAR) {
        out::print_info(&format!("Using {CONFIG_ENV_VAR} (explicit):\n  {cfg_env}\n"));
        out::print_info(&format!(
            "To override, unset {CONFIG_ENV_VAR} or set it to another file."
        ));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default dirshard config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info(
                    "No config file exists there yet. Run any command to create a template.",
                );
            }
        }
        None => {
            out::print_error("Could not determine a default config path.");
        }
    }
}

fn run_command(command: &Command, cfg: &Config) -> Result<()> {
    let fs = OsFs;
    match command {
        Command::Merge { sources, into } => {
            let opts = MergeOptions {
                on_error: cfg.on_error,
            };
            let report = merge(&fs, sources, into, &opts)?;
            info!(
                copied = report.copied,
                conflicts = report.conflicts.len(),
                failures = report.failures.len(),
                "Merge completed"
            );
            out::print_merge_report(&report, into);
            finish(report.failures.len())
        }
        Command::Ratio {
            input,
            out_a,
            out_b,
            ratio,
            filter,
            transfer,
            seed,
        } => {
            let opts = RatioOptions {
                ratio: *ratio,
                filter: filter.to_filter()?,
                mode: transfer.mode(),
                on_error: cfg.on_error,
            };
            let mut rng = rng_from_seed(*seed);
            let report = split_ratio(&fs, input, out_a, out_b, &opts, &mut rng)?;
            info!(
                count_a = report.count_a,
                count_b = report.count_b,
                failures = report.failures.len(),
                "Ratio split completed"
            );
            out::print_ratio_report(&report, out_a, out_b);
            finish(report.failures.len())
        }
        Command::Parts {
            input,
            out,
            parts,
            filter,
            transfer,
            no_shuffle,
            seed,
        } => {
            let opts = PartsOptions {
                parts: *parts,
                filter: filter.to_filter()?,
                mode: transfer.mode(),
                on_error: cfg.on_error,
            };
            let mut rng = rng_from_seed(*seed);
            let shuffle: Option<&mut dyn RngCore> = if *no_shuffle {
                None
            } else {
                Some(&mut rng)
            };
            let report = split_parts(&fs, input, out, &opts, shuffle)?;
            info!(
                parts = report.counts.len(),
                failures = report.failures.len(),
                "Parts split completed"
            );
            out::print_parts_report(&report, out);
            finish(report.failures.len())
        }
    }
}

/// Seeded runs are reproducible; unseeded runs draw from OS entropy.
fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => {
            info!(seed = s, "Using fixed shuffle seed");
            StdRng::seed_from_u64(s)
        }
        None => StdRng::from_entropy(),
    }
}

/// Fail the run when any per-file transfer failed under `OnError::Continue`.
fn finish(failed: usize) -> Result<()> {
    if failed > 0 {
        bail!("{failed} file(s) failed; see the report above");
    }
    Ok(())
}

fn log_op_error(e: &anyhow::Error) {
    if let Some(ds) = e.downcast_ref::<DirShardError>() {
        let code = ds.code();
        match ds {
            DirShardError::SourceNotFound(path) => {
                error!(code, kind = "source_not_found", path = %path.display(), "Operation failed")
            }
            DirShardError::NotADirectory(path) => {
                error!(code, kind = "not_a_directory", path = %path.display(), "Operation failed")
            }
            DirShardError::InvalidRatio(ratio) => {
                error!(code, kind = "invalid_ratio", ratio = *ratio, "Rejected parameters")
            }
            DirShardError::InvalidPartCount(parts) => {
                error!(code, kind = "invalid_part_count", parts = *parts, "Rejected parameters")
            }
            DirShardError::InvalidPattern { pattern, .. } => {
                error!(code, kind = "invalid_pattern", %pattern, "Rejected parameters")
            }
        }
    } else {
        error!(error = ?e, "Operation failed");
    }
}
