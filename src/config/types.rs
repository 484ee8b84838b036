//! Runtime configuration types.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::place::OnError;

/// Console verbosity, settable from the config file or the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Errors only.
    Quiet,
    /// The default: operation summaries.
    #[default]
    Normal,
    /// Per-step detail.
    Info,
    /// Everything, including trace events.
    Debug,
}

impl LogLevel {
    /// Case-insensitive parse. Accepts a few aliases (`error`, `verbose`,
    /// `trace`) alongside the canonical names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Defaults the CLI starts from; every field has a flag that overrides it.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Console verbosity.
    pub log_level: LogLevel,
    /// Log file path; `None` keeps logging on stdout only.
    pub log_file: Option<PathBuf>,
    /// Per-file failure policy for placements.
    pub on_error: OnError,
}
