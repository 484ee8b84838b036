//! Filesystem capability used by the core.
//!
//! Collection and placement talk to the filesystem only through [`Vfs`], so the
//! whole pipeline can run against an in-memory fake in tests. [`OsFs`] is the
//! real implementation; [`MemFs`] the fake with injectable failures.

mod mem;
mod os;

pub use mem::MemFs;
pub use os::OsFs;

use std::ffi::OsString;
use std::io;
use std::path::Path;

/// Minimal filesystem surface needed by collection and placement.
///
/// Implementations must be shareable across placement workers, hence the
/// `Sync` bound.
pub trait Vfs: Sync {
    /// Names of the regular files directly inside `dir`, sorted by name so
    /// seeded shuffles reproduce across backends. Subdirectories and other
    /// non-file entries are skipped.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>>;

    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Copy `src` to `dest`, preserving timestamps (and mode bits on Unix).
    /// Replaces an existing `dest`; the destination becomes visible only once
    /// fully written. Returns the number of bytes copied.
    fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<u64>;

    /// Rename `src` to `dest`, replacing an existing `dest`. May fail across
    /// filesystem boundaries (EXDEV); callers fall back to copy plus remove.
    fn rename(&self, src: &Path, dest: &Path) -> io::Result<()>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;
}
