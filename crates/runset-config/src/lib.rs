//! Configuration for run set installation.
//!
//! Provides TOML-based configuration with:
//! - The install destination (`embulk_home`, `m2_repo_relative`)
//! - Repositories to resolve artifacts from
//! - `embulk.properties` entries and the artifacts to install
//! - Config file layering (user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    CONFIG_DIR_ENV, ConfigSource, EMBULK_HOME_ENV, LoadedConfig, apply_env_overrides, load_config,
    load_config_file, load_config_with_options, load_explicit, user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
