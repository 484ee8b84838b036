//! In-memory filesystem fake.
//!
//! Listing order is deterministic (lexicographic by full path) and individual
//! operations can be made to fail, so the placement pipeline is testable
//! without touching a real disk. Not a general-purpose VFS: paths are compared
//! literally and there are no symlinks or permissions.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Vfs;

#[derive(Debug, Default)]
struct State {
    dirs: BTreeSet<PathBuf>,
    files: BTreeMap<PathBuf, Vec<u8>>,
    rename_unsupported: bool,
    deny_remove: HashSet<PathBuf>,
    deny_copy_from: HashSet<PathBuf>,
}

/// In-memory [`Vfs`] implementation for tests.
#[derive(Debug, Default)]
pub struct MemFs {
    state: Mutex<State>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create `dir` and fill it with `files` given as (name, contents) pairs.
    pub fn seed_dir(&self, dir: &Path, files: &[(&str, &[u8])]) {
        let mut st = self.state();
        insert_dir_chain(&mut st.dirs, dir);
        for (name, bytes) in files {
            st.files.insert(dir.join(name), bytes.to_vec());
        }
    }

    /// Insert a single file, creating its parent directories.
    pub fn add_file(&self, path: &Path, bytes: &[u8]) {
        let mut st = self.state();
        if let Some(parent) = path.parent() {
            insert_dir_chain(&mut st.dirs, parent);
        }
        st.files.insert(path.to_path_buf(), bytes.to_vec());
    }

    /// Contents of `path`, if it exists.
    pub fn read(&self, path: &Path) -> Option<Vec<u8>> {
        self.state().files.get(path).cloned()
    }

    /// Sorted file names directly inside `dir` (lossy), for assertions.
    pub fn file_names(&self, dir: &Path) -> Vec<String> {
        let st = self.state();
        st.files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect()
    }

    /// Make every `rename` fail as if crossing a filesystem boundary.
    pub fn set_rename_unsupported(&self) {
        self.state().rename_unsupported = true;
    }

    /// Make `remove_file` on `path` fail with `PermissionDenied`.
    pub fn deny_remove(&self, path: &Path) {
        self.state().deny_remove.insert(path.to_path_buf());
    }

    /// Make `copy_file` reading from `src` fail with `PermissionDenied`.
    pub fn deny_copy_from(&self, src: &Path) {
        self.state().deny_copy_from.insert(src.to_path_buf());
    }
}

fn insert_dir_chain(dirs: &mut BTreeSet<PathBuf>, dir: &Path) {
    for ancestor in dir.ancestors() {
        if ancestor.as_os_str().is_empty() {
            continue;
        }
        dirs.insert(ancestor.to_path_buf());
    }
}

impl Vfs for MemFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let st = self.state();
        if !st.dirs.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }
        // BTreeMap iteration is ordered by full path, so names within one
        // directory come out lexicographically sorted.
        Ok(st
            .files
            .keys()
            .filter(|p| p.parent() == Some(dir))
            .filter_map(|p| p.file_name())
            .map(OsString::from)
            .collect())
    }

    fn exists(&self, path: &Path) -> bool {
        let st = self.state();
        st.files.contains_key(path) || st.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state().dirs.contains(path)
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        insert_dir_chain(&mut self.state().dirs, dir);
        Ok(())
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        let mut st = self.state();
        if st.deny_copy_from.contains(src) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("copy denied: {}", src.display()),
            ));
        }
        let bytes = st.files.get(src).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", src.display()),
            )
        })?;
        // Mirror the real backend: the destination directory must exist.
        match dest.parent() {
            Some(parent) if st.dirs.contains(parent) => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such directory: {}", dest.display()),
                ));
            }
        }
        let len = bytes.len() as u64;
        st.files.insert(dest.to_path_buf(), bytes);
        Ok(len)
    }

    fn rename(&self, src: &Path, dest: &Path) -> io::Result<()> {
        let mut st = self.state();
        if st.rename_unsupported {
            return Err(io::Error::other(format!(
                "simulated cross-device rename: {}",
                src.display()
            )));
        }
        // Mirror the real backend: the destination directory must exist, and
        // a failed rename must not consume the source.
        match dest.parent() {
            Some(parent) if st.dirs.contains(parent) => {}
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such directory: {}", dest.display()),
                ));
            }
        }
        let bytes = st.files.remove(src).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", src.display()),
            )
        })?;
        st.files.insert(dest.to_path_buf(), bytes);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut st = self.state();
        if st.deny_remove.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("remove denied: {}", path.display()),
            ));
        }
        st.files.remove(path).map(|_| ()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path.display()),
            )
        })
    }
}
