//! Config module.
//! Provides configuration types, default paths, and XML loading. CLI flags
//! override anything read from the file.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{CONFIG_ENV_VAR, config_path, create_template_config, load_config_from_xml};
