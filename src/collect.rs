//! Listing, filtering and shuffling of flat file collections.
//!
//! [`collect`] feeds every operation: it lists the regular files of one
//! directory through the [`Vfs`] capability, applies the filename filters, and
//! optionally shuffles with a caller-supplied RNG so permutations are
//! reproducible under a fixed seed.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::RngCore;
use rand::seq::SliceRandom;
use regex::Regex;
use tracing::debug;

use crate::errors::DirShardError;
use crate::vfs::Vfs;

/// One file in a collection being processed.
///
/// Identity is the (source directory, filename) pair; names are not assumed
/// unique across sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub source_dir: PathBuf,
    pub name: OsString,
}

impl Entry {
    pub fn source_path(&self) -> PathBuf {
        self.source_dir.join(&self.name)
    }
}

/// Filename predicates applied while collecting.
///
/// Extensions match case-insensitively against the final extension; patterns
/// must match at the start of the name, not necessarily the whole of it. A
/// pattern never matches a name that is not valid UTF-8; extension matching
/// only needs the extension itself to decode.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    extensions: Option<Vec<String>>,
    pattern: Option<Regex>,
}

impl FileFilter {
    /// Build a filter, validating eagerly.
    ///
    /// Extensions are normalized to lower-case dot-prefixed form ("PNG" and
    /// ".png" both mean ".png"); a malformed pattern fails with
    /// `InvalidPattern` before any I/O happens.
    pub fn new(
        extensions: Option<&[String]>,
        pattern: Option<&str>,
    ) -> Result<Self, DirShardError> {
        let extensions = extensions.map(|exts| {
            exts.iter()
                .map(|e| {
                    let e = e.trim().to_ascii_lowercase();
                    if e.starts_with('.') { e } else { format!(".{e}") }
                })
                .collect()
        });

        let pattern = match pattern {
            // Wrap in a non-capturing group and anchor, so the pattern must
            // match from position 0.
            Some(pat) => Some(Regex::new(&format!("^(?:{pat})")).map_err(|source| {
                DirShardError::InvalidPattern {
                    pattern: pat.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        Ok(Self {
            extensions,
            pattern,
        })
    }

    /// A filter that lets every name through.
    pub fn pass_all() -> Self {
        Self::default()
    }

    pub fn matches(&self, name: &OsStr) -> bool {
        if let Some(exts) = &self.extensions {
            let ok = Path::new(name)
                .extension()
                .and_then(OsStr::to_str)
                .is_some_and(|e| exts.contains(&format!(".{}", e.to_ascii_lowercase())));
            if !ok {
                return false;
            }
        }
        if let Some(re) = &self.pattern {
            let Some(name) = name.to_str() else {
                return false;
            };
            if !re.is_match(name) {
                return false;
            }
        }
        true
    }
}

/// List `dir` through `fs`, filter, and optionally shuffle.
///
/// Fails with `SourceNotFound`/`NotADirectory` before listing when `dir` is
/// missing or not a directory. With `shuffle = None` entries keep the listing
/// order, which [`Vfs::list_dir`] defines as sorted by name.
pub fn collect<V: Vfs + ?Sized>(
    fs: &V,
    dir: &Path,
    filter: &FileFilter,
    shuffle: Option<&mut dyn RngCore>,
) -> Result<Vec<Entry>> {
    if !fs.exists(dir) {
        return Err(DirShardError::SourceNotFound(dir.to_path_buf()).into());
    }
    if !fs.is_dir(dir) {
        return Err(DirShardError::NotADirectory(dir.to_path_buf()).into());
    }

    let mut names = fs
        .list_dir(dir)
        .with_context(|| format!("list source directory '{}'", dir.display()))?;
    let listed = names.len();
    names.retain(|n| filter.matches(n));

    if let Some(rng) = shuffle {
        names.shuffle(rng);
    }

    debug!(dir = %dir.display(), listed, kept = names.len(), "collected file set");

    Ok(names
        .into_iter()
        .map(|name| Entry {
            source_dir: dir.to_path_buf(),
            name,
        })
        .collect())
}
