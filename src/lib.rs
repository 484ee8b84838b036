//! Core library for `dirshard`.
//!
//! Contains the core logic: config loading, flat directory scanning, collision
//! renaming and the merge/split operations. Keep the library small and
//! ergonomic: typed errors, pure partitioning helpers, and operations that
//! take the filesystem as a capability so tests can run against an in-memory
//! fake.

pub mod cli;
pub mod collect;
pub mod config;
pub mod conflict;
pub mod errors;
pub mod ops;
pub mod output;
pub mod place;
pub mod report;
pub mod shutdown;
pub mod split;
pub mod vfs;

pub use config::{
    config_path, create_template_config, default_config_path, default_log_path,
    load_config_from_xml, path_has_symlink_ancestor, Config, LogLevel, CONFIG_ENV_VAR,
};
pub use errors::DirShardError;

pub use collect::{collect, Entry, FileFilter};
pub use conflict::{resolve_collision, ConflictRecord, Resolution};
pub use ops::{merge, split_parts, split_ratio, MergeOptions, PartsOptions, RatioOptions};
pub use place::{place, place_batch, BatchOutcome, OnError, PlaceJob, TransferMode};
pub use report::{Failure, FailureKind, MergeReport, PartsReport, RatioReport};
pub use split::{split_by_ratio, split_round_robin, validate_parts, validate_ratio};
pub use vfs::{MemFs, OsFs, Vfs};
