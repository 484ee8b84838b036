//! Where config and logs live by default.
//!
//! Locations follow platform conventions via the `dirs` crate, with a
//! `$HOME`-relative fallback for environments where those lookups fail. The
//! symlink walk guards every path this crate creates files under.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "dirshard";

fn home_joined(rel: &str) -> Option<PathBuf> {
    std::env::var_os("HOME").map(|h| PathBuf::from(h).join(rel))
}

/// Platform config file location, `<config dir>/dirshard/config.xml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| home_joined(".config"))
        .map(|base| base.join(APP_DIR).join("config.xml"))
}

/// Platform log file location, `<data dir>/dirshard/dirshard.log`.
///
/// Best-effort creates the containing directory; anything still wrong is
/// reported by the open that follows.
pub fn default_log_path() -> Option<PathBuf> {
    let dir = dirs::data_dir()
        .or_else(|| home_joined(".local/share"))?
        .join(APP_DIR);
    let _ = fs::create_dir_all(&dir);
    Some(dir.join("dirshard.log"))
}

/// Whether any existing ancestor of `path` is a symlink.
///
/// The final component is not checked here; opens that care pass O_NOFOLLOW
/// for that.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    for ancestor in path.ancestors().skip(1) {
        if !ancestor.exists() {
            continue;
        }
        if fs::symlink_metadata(ancestor)?.file_type().is_symlink() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn detects_symlinked_ancestors() {
        use std::os::unix::fs::symlink;
        let td = tempfile::tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        symlink(&real, &link).unwrap();

        assert!(path_has_symlink_ancestor(&link.join("file.log")).unwrap());
        assert!(!path_has_symlink_ancestor(&real.join("file.log")).unwrap());
    }
}
