//! Collision-safe destination naming for merges.
//!
//! Policy: when `dir/name` is taken, probe `stem_1.ext`, `stem_2.ext`, ... and
//! take the first free path. The probe restarts at 1 for every file, so a name
//! colliding across k sources ends up as `name`, `name_1`, ..., `name_{k-1}` in
//! processing order.
//!
//! The counter goes between the stem and the final extension: `a.tar.gz`
//! becomes `a.tar_1.gz`, and an extensionless `.env` becomes `.env_1`.
//!
//! Callers must treat resolution plus the matching placement as one step: no
//! other writer may materialize entries in the destination between the
//! existence probe and the placement (the merge loop stays sequential for
//! exactly this reason).

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// A rename performed to avoid overwriting an existing destination file.
///
/// Names are rendered lossily for reporting; the authoritative path is the
/// placement destination itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord {
    pub original: String,
    pub resolved: String,
}

/// Outcome of resolving one candidate destination name.
#[derive(Debug)]
pub struct Resolution {
    /// Destination path guaranteed free at resolution time.
    pub path: PathBuf,
    /// Present iff the original name was taken and a suffixed name was chosen.
    pub renamed: Option<ConflictRecord>,
}

/// Find a free path for `name` inside `dest_dir`.
///
/// `exists` is the existence probe. The destination holds finitely many
/// entries at call time, so the probe terminates within entry-count + 1
/// attempts.
pub fn resolve_collision<F>(dest_dir: &Path, name: &OsStr, exists: F) -> Resolution
where
    F: Fn(&Path) -> bool,
{
    let candidate = dest_dir.join(name);
    if !exists(&candidate) {
        return Resolution {
            path: candidate,
            renamed: None,
        };
    }

    // Split stem and extension once, preserving non-UTF8 names. Dotfiles like
    // ".env" have a stem of ".env" and no extension.
    let base = Path::new(name);
    let stem: OsString = base
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_else(|| name.to_os_string());
    let ext: Option<OsString> = base.extension().map(OsStr::to_os_string);

    let mut n: u64 = 1;
    loop {
        let suffixed = numbered_name(&stem, ext.as_deref(), n);
        let probe = dest_dir.join(&suffixed);
        if !exists(&probe) {
            return Resolution {
                path: probe,
                renamed: Some(ConflictRecord {
                    original: name.to_string_lossy().into_owned(),
                    resolved: suffixed.to_string_lossy().into_owned(),
                }),
            };
        }
        n = n.saturating_add(1);
    }
}

/// Build `<stem>_<n>[.<ext>]` as an `OsString`.
fn numbered_name(stem: &OsStr, ext: Option<&OsStr>, n: u64) -> OsString {
    let mut name = OsString::new();
    name.push(stem);
    name.push(format!("_{n}"));
    if let Some(e) = ext {
        name.push(".");
        name.push(e);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn taken(paths: &[&str]) -> HashSet<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn resolve(name: &str, existing: &[&str]) -> Resolution {
        let set = taken(existing);
        resolve_collision(Path::new("/d"), OsStr::new(name), |p| set.contains(p))
    }

    #[test]
    fn free_name_passes_through_unchanged() {
        let r = resolve("x.png", &[]);
        assert_eq!(r.path, PathBuf::from("/d/x.png"));
        assert!(r.renamed.is_none());
    }

    #[test]
    fn taken_name_gets_first_numeric_suffix() {
        let r = resolve("x.png", &["/d/x.png"]);
        assert_eq!(r.path, PathBuf::from("/d/x_1.png"));
        let record = r.renamed.unwrap();
        assert_eq!(record.original, "x.png");
        assert_eq!(record.resolved, "x_1.png");
    }

    #[test]
    fn probe_skips_taken_suffixes() {
        let r = resolve("x.png", &["/d/x.png", "/d/x_1.png", "/d/x_2.png"]);
        assert_eq!(r.path, PathBuf::from("/d/x_3.png"));
    }

    #[test]
    fn suffix_goes_before_the_final_extension_only() {
        let r = resolve("a.tar.gz", &["/d/a.tar.gz"]);
        assert_eq!(r.path, PathBuf::from("/d/a.tar_1.gz"));
    }

    #[test]
    fn dotfile_without_extension_gets_plain_suffix() {
        let r = resolve(".env", &["/d/.env"]);
        assert_eq!(r.path, PathBuf::from("/d/.env_1"));
    }

    #[test]
    fn extensionless_name_gets_plain_suffix() {
        let r = resolve("README", &["/d/README"]);
        assert_eq!(r.path, PathBuf::from("/d/README_1"));
    }
}
