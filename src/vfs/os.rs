//! Real filesystem implementation.
//!
//! Copies are crash-safe: data is streamed into a unique temp file in the
//! destination directory, fsynced, stamped with the source metadata, and only
//! then renamed over the final path. A reader therefore never observes a
//! half-written destination file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use filetime::FileTime;
#[cfg(not(unix))]
use filetime::{set_file_atime, set_file_mtime};
use filetime::set_file_times;
use tracing::{trace, warn};

use super::Vfs;

/// Filesystem backend backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl Vfs for OsFs {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            // file_type() does not follow symlinks, so links are skipped along
            // with directories and other specials.
            if entry.file_type()?.is_file() {
                names.push(entry.file_name());
            }
        }
        // read_dir order varies by filesystem; sort so seeded runs reproduce.
        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn copy_file(&self, src: &Path, dest: &Path) -> io::Result<u64> {
        let dest_dir = dest.parent().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("destination has no parent: {}", dest.display()),
            )
        })?;

        let src_meta = fs::metadata(src)?;
        let tmp_path = unique_temp_path(dest_dir);

        let bytes = match copy_streaming(src, &tmp_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                // Best-effort cleanup of the temp file on failure.
                let _ = fs::remove_file(&tmp_path);
                return Err(e);
            }
        };

        // Stamp the temp file before it becomes visible under the final name.
        preserve_metadata(&tmp_path, &src_meta);

        if let Err(e) = atomic_replace(&tmp_path, dest) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        Ok(bytes)
    }

    fn rename(&self, src: &Path, dest: &Path) -> io::Result<()> {
        atomic_replace(src, dest)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

fn unique_temp_path(dest_dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    dest_dir.join(format!(".dirshard.{pid}.{nanos}.tmp"))
}

/// Copy `src` -> `dst` using buffered I/O, then fsync the destination.
/// `dst` is created with `create_new(true)` so an existing file is never
/// clobbered; callers pick a unique temp name.
fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    const BUF_SIZE: usize = 1024 * 1024; // 1 MiB buffers

    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    Ok(bytes)
}

/// Rename with replace semantics plus a best-effort directory fsync on Unix.
/// Windows rename does not overwrite, so an existing destination is removed
/// first.
fn atomic_replace(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    if dst.exists() {
        if let Err(e) = fs::remove_file(dst) {
            if e.kind() != io::ErrorKind::NotFound {
                return Err(e);
            }
        }
    }

    fs::rename(src, dst)?;

    #[cfg(unix)]
    if let Some(parent) = dst.parent() {
        // Ignore fsync errors to avoid turning a successful rename into a failure.
        let _ = fsync_dir(parent);
    }

    Ok(())
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

/// Copy timestamps (and mode bits on Unix) from `src_meta` onto `dest`.
/// Best-effort: failures are logged and ignored.
fn preserve_metadata(dest: &Path, src_meta: &fs::Metadata) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        let mt = FileTime::from_unix_time(src_meta.mtime(), src_meta.mtime_nsec() as u32);
        let at = FileTime::from_unix_time(src_meta.atime(), src_meta.atime_nsec() as u32);
        if let Err(e) = set_file_times(dest, at, mt) {
            warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
        } else {
            trace!(path = %dest.display(), "set atime/mtime on destination");
        }
    }
    #[cfg(not(unix))]
    {
        let at = src_meta.accessed().ok().map(FileTime::from_system_time);
        let mt = src_meta.modified().ok().map(FileTime::from_system_time);
        match (at, mt) {
            (Some(a), Some(m)) => {
                if let Err(e) = set_file_times(dest, a, m) {
                    warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
                }
            }
            (Some(a), None) => {
                if let Err(e) = set_file_atime(dest, a) {
                    warn!(path = %dest.display(), error = %e, "failed to set atime on destination");
                }
            }
            (None, Some(m)) => {
                if let Err(e) = set_file_mtime(dest, m) {
                    warn!(path = %dest.display(), error = %e, "failed to set mtime on destination");
                }
            }
            (None, None) => {}
        }
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let src_mode = src_meta.permissions().mode() & 0o777;
        let perms = fs::Permissions::from_mode(src_mode);
        if let Err(e) = fs::set_permissions(dest, perms) {
            warn!(path = %dest.display(), mode = format!("{src_mode:o}"), error = %e, "failed to set permissions on destination");
        } else {
            trace!(path = %dest.display(), mode = format!("{src_mode:o}"), "set permissions on destination");
        }
    }

    // Windows: mirror the readonly attribute, the closest analog to mode bits.
    #[cfg(windows)]
    {
        let ro = src_meta.permissions().readonly();
        match fs::metadata(dest) {
            Ok(meta) => {
                let mut perms = meta.permissions();
                perms.set_readonly(ro);
                if let Err(e) = fs::set_permissions(dest, perms) {
                    warn!(path = %dest.display(), readonly = ro, error = %e, "failed to set readonly attribute on destination");
                }
            }
            Err(e) => {
                warn!(path = %dest.display(), error = %e, "failed to stat destination for readonly preservation");
            }
        }
    }
}
