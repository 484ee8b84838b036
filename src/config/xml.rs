//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a secure template if missing (unless DIRSHARD_CONFIG is set).
//!
//! Notes:
//! - This module only reads/writes the config file; flag precedence lives in
//!   the CLI layer.
//! - A file that fails to parse (including unknown fields) is logged and
//!   ignored, so a bad config never blocks an operation.

use anyhow::{Context, Result, anyhow};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::place::OnError;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "DIRSHARD_CONFIG";

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    on_error: Option<String>,
}

/// Path the loader will read from: `DIRSHARD_CONFIG` if set, else the
/// platform default.
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_ENV_VAR) {
        Some(p) => Some(PathBuf::from(p)),
        None => default_config_path(),
    }
}

/// Read config from XML, using `config_path()`.
///
/// Returns None when the file does not exist or does not parse; a template is
/// created on first run at the default location only (never at an env
/// override).
pub fn load_config_from_xml() -> Option<Config> {
    let env_set = env::var_os(CONFIG_ENV_VAR).is_some();
    let cfg_path = config_path()?;

    if !cfg_path.exists() {
        if !env_set {
            let _ = create_template_config(&cfg_path);
        }
        return None;
    }

    match load_config_from_xml_path(&cfg_path) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!(path = %cfg_path.display(), error = %e, "ignoring unreadable config file");
            None
        }
    }
}

/// Load a Config from a specific XML file path (quick_xml).
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig =
        from_xml_str(&contents).with_context(|| format!("parse config xml '{}'", path.display()))?;
    Ok(xml_to_config(parsed))
}

fn xml_to_config(parsed: XmlConfig) -> Config {
    let mut cfg = Config::default();

    if let Some(s) = parsed.log_level.as_deref() {
        match LogLevel::parse(s.trim()) {
            Some(level) => cfg.log_level = level,
            None => warn!(value = s.trim(), "unrecognized log_level in config; using default"),
        }
    }
    if let Some(s) = parsed.log_file.as_deref() {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            cfg.log_file = Some(PathBuf::from(trimmed));
        }
    }
    if let Some(s) = parsed.on_error.as_deref() {
        match OnError::parse(s.trim()) {
            Some(policy) => cfg.on_error = policy,
            None => warn!(value = s.trim(), "unrecognized on_error in config; using default"),
        }
    }

    cfg
}

/// Create default template config file and parent directory (best-effort permissions).
/// Uses secure creation to avoid following attacker-controlled symlinks on Unix.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path_has_symlink_ancestor(path)? {
        return Err(anyhow!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        ));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let content = "<!--\n  dirshard configuration (XML)\n\n  Fields:\n    log_level -> quiet | normal | info | debug\n    log_file  -> path to log file (optional; console output still used)\n    on_error  -> continue | abort (per-file failure policy)\n\n  Notes:\n    - CLI flags override XML values.\n-->\n<config>\n  <log_level>normal</log_level>\n  <on_error>continue</on_error>\n</config>\n";

    write_new_file_0600(path, content.as_bytes())
        .with_context(|| format!("write template config '{}'", path.display()))?;

    info!("Created template config at {}", path.display());
    Ok(())
}

/// Create `path` exclusively and write `bytes`. On Unix the file is opened
/// with O_NOFOLLOW and mode 0600.
fn write_new_file_0600(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.custom_flags(libc::O_NOFOLLOW);
        opts.mode(0o600);
    }
    let mut f = opts.open(path)?;
    f.write_all(bytes)?;
    f.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_all_known_fields() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        fs::write(
            &path,
            "<config>\n  <log_level> debug </log_level>\n  <log_file>/tmp/ds.log</log_file>\n  <on_error>abort</on_error>\n</config>\n",
        )
        .unwrap();

        let cfg = load_config_from_xml_path(&path).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert_eq!(cfg.log_file, Some(PathBuf::from("/tmp/ds.log")));
        assert_eq!(cfg.on_error, OnError::Abort);
    }

    #[test]
    fn empty_and_unknown_values_fall_back_to_defaults() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        fs::write(
            &path,
            "<config>\n  <log_level>shouty</log_level>\n  <log_file>   </log_file>\n</config>\n",
        )
        .unwrap();

        let cfg = load_config_from_xml_path(&path).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Normal);
        assert!(cfg.log_file.is_none());
        assert_eq!(cfg.on_error, OnError::Continue);
    }

    #[test]
    fn unknown_fields_fail_the_parse() {
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        fs::write(&path, "<config><surprise>1</surprise></config>").unwrap();

        let err = load_config_from_xml_path(&path).unwrap_err();
        assert!(err.to_string().contains("parse config xml"));
    }

    #[test]
    fn template_is_created_once_and_parses() {
        let td = tempdir().unwrap();
        let path = td.path().join("nested").join("config.xml");

        create_template_config(&path).unwrap();
        assert!(path.exists());
        let cfg = load_config_from_xml_path(&path).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Normal);

        // Second creation refuses to clobber.
        assert!(create_template_config(&path).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn template_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let td = tempdir().unwrap();
        let path = td.path().join("config.xml");
        create_template_config(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
