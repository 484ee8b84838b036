//! Tracing setup for the binary.
//!
//! Events always go to stdout, compact or JSON. When a log file is configured
//! and passes the symlink checks, a second non-blocking layer appends there as
//! well. The returned guard must stay alive until exit so buffered lines are
//! flushed.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use anyhow::Result;
use chrono::Local;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::format::{Compact, DefaultFields, Format, Json, JsonFields};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

use dirshard::output as out;
use dirshard::{LogLevel, default_log_path, path_has_symlink_ancestor};

/// Local-time stamp, `DD/MM/YY HH:MM:SS`.
struct Stamp;

impl FormatTime for Stamp {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> fmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

fn directive(level: &LogLevel) -> &'static str {
    match level {
        LogLevel::Quiet => "error",
        LogLevel::Normal => "info",
        LogLevel::Info => "debug",
        LogLevel::Debug => "trace",
    }
}

/// Append-only open that refuses to follow a symlinked final component on
/// Unix and keeps the file private (0600).
fn open_append(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.custom_flags(libc::O_NOFOLLOW);
        opts.mode(0o600);
    }
    opts.open(path)
}

/// Wrap `path` in a non-blocking appender, or say on stderr why file logging
/// stays off. Symlinked ancestors are refused rather than resolved.
fn file_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(false) => {}
        Ok(true) => {
            out::print_warn(&format!(
                "refusing file logging: an ancestor of '{}' is a symlink",
                path.display()
            ));
            return None;
        }
        Err(e) => {
            out::print_warn(&format!(
                "cannot check '{}' for symlinked ancestors: {}",
                path.display(),
                e
            ));
            return None;
        }
    }
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match open_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            out::print_warn(&format!("cannot open log file '{}': {}", path.display(), e));
            None
        }
    }
}

fn compact_layer<S>() -> tsfmt::Layer<S, DefaultFields, Format<Compact, Stamp>> {
    tsfmt::layer()
        .with_timer(Stamp)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
}

fn json_layer<S>() -> tsfmt::Layer<S, JsonFields, Format<Json, Stamp>> {
    tsfmt::layer()
        .json()
        .with_timer(Stamp)
        .with_target(true)
        .with_thread_ids(true)
}

/// Install the global subscriber.
///
/// Returns the appender guard when a file layer was added; drop it only at
/// shutdown or the tail of the log is lost. A log file that cannot be used
/// downgrades to stdout-only logging with a warning instead of failing the
/// run.
pub fn init_tracing(
    level: &LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::new(directive(level));
    let file = log_file.and_then(|path| {
        let opened = file_writer(path);
        if opened.is_none() {
            out::print_warn(&format!(
                "file logging to '{}' is disabled for this run; logs continue on stdout",
                path.display()
            ));
            if let Some(def) = default_log_path() {
                out::print_info(&format!("the default log path is {}", def.display()));
            }
        }
        opened
    });

    // The json and compact layers are distinct types, so each combination
    // builds its own stack.
    match (json, file) {
        (true, Some((writer, guard))) => {
            registry()
                .with(filter)
                .with(json_layer())
                .with(json_layer().with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        (true, None) => {
            registry().with(filter).with(json_layer()).init();
            Ok(None)
        }
        (false, Some((writer, guard))) => {
            registry()
                .with(filter)
                .with(compact_layer())
                .with(compact_layer().with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        (false, None) => {
            registry().with(filter).with(compact_layer()).init();
            Ok(None)
        }
    }
}
