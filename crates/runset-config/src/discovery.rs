//! Config file discovery and layered merging.
//!
//! Resolution order (later overrides earlier):
//! 1. `~/.config/runset/config.toml` (user config)
//! 2. `./runset.toml` (project-local)
//! 3. Environment (`RUNSET_EMBULK_HOME`)
//! 4. CLI arguments (handled externally)

use std::path::{Path, PathBuf};

use crate::{ConfigError, Result, RunsetConfig};

/// Default config filename for project-local config.
const PROJECT_CONFIG_FILE: &str = "runset.toml";

/// Default config filename within the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// Application name for platform directory resolution.
const APP_NAME: &str = "runset";

/// Environment variable to override the user config directory.
pub const CONFIG_DIR_ENV: &str = "RUNSET_CONFIG_DIR";

/// Environment variable overriding `embulk_home`.
pub const EMBULK_HOME_ENV: &str = "RUNSET_EMBULK_HOME";

/// Tracks where each config layer was loaded from.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    /// Path to the config file.
    pub path: PathBuf,
    /// Whether the file was found and loaded.
    pub loaded: bool,
}

/// Result of config discovery and loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The merged configuration.
    pub config: RunsetConfig,
    /// Sources that were checked, in order of precedence (lowest first).
    pub sources: Vec<ConfigSource>,
    /// Warnings generated during loading (e.g., malformed layers).
    pub warnings: Vec<String>,
}

impl LoadedConfig {
    /// Get paths of sources that were actually loaded.
    pub fn loaded_from(&self) -> Vec<&Path> {
        self.sources
            .iter()
            .filter(|s| s.loaded)
            .map(|s| s.path.as_path())
            .collect()
    }
}

/// Load configuration by discovering and merging all config layers.
pub fn load_config(project_dir: Option<&Path>) -> Result<LoadedConfig> {
    load_config_with_options(project_dir, None)
}

/// Load configuration with explicit control over the user config directory.
///
/// `config_dir` overrides both `RUNSET_CONFIG_DIR` and the platform default.
pub fn load_config_with_options(
    project_dir: Option<&Path>,
    config_dir: Option<&Path>,
) -> Result<LoadedConfig> {
    let mut config = RunsetConfig::new();
    let mut sources = Vec::new();
    let mut warnings = Vec::new();

    let user_config_path = match config_dir {
        Some(dir) => Some(dir.join(USER_CONFIG_FILE)),
        None => user_config_path(),
    };
    if let Some(path) = user_config_path {
        sources.push(load_layer(&mut config, &path, &mut warnings));
    }

    let project_path = project_dir
        .map(|d| d.join(PROJECT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(PROJECT_CONFIG_FILE));
    sources.push(load_layer(&mut config, &project_path, &mut warnings));

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(LoadedConfig {
        config,
        sources,
        warnings,
    })
}

/// Load exactly one file, named by the user. Unlike discovered layers, a
/// missing or malformed file is an error.
pub fn load_explicit(path: &Path) -> Result<LoadedConfig> {
    let mut config = load_config_file(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(LoadedConfig {
        config,
        sources: vec![ConfigSource {
            path: path.to_path_buf(),
            loaded: true,
        }],
        warnings: Vec::new(),
    })
}

/// Load config from a specific file path (no discovery).
pub fn load_config_file(path: &Path) -> Result<RunsetConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;
    RunsetConfig::from_toml(&contents)
}

/// Apply environment overrides through `lookup`. Empty values are ignored.
pub fn apply_env_overrides(config: &mut RunsetConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(home) = lookup(EMBULK_HOME_ENV)
        && !home.is_empty()
    {
        config.embulk_home = Some(PathBuf::from(home));
    }
}

/// Get the user config file path.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|d| d.join(USER_CONFIG_FILE))
}

/// Get the user config directory for runset.
///
/// Checks `RUNSET_CONFIG_DIR` first, then falls back to the platform default.
pub fn user_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::config_dir().map(|d| d.join(APP_NAME))
}

/// Try to load a config file and merge it into the existing config.
fn load_layer(config: &mut RunsetConfig, path: &Path, warnings: &mut Vec<String>) -> ConfigSource {
    let mut source = ConfigSource {
        path: path.to_path_buf(),
        loaded: false,
    };
    if !path.is_file() {
        return source;
    }

    match load_config_file(path) {
        Ok(layer) => {
            config.merge(layer);
            source.loaded = true;
        }
        Err(e) => warnings.push(format!("Failed to load {}: {}", path.display(), e)),
    }
    source
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_user_config_path_shape() {
        if let Some(p) = user_config_path() {
            assert!(p.ends_with("config.toml"));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let err = load_config_file(Path::new("/nonexistent/runset.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runset.toml");
        fs::write(&path, "this is not valid toml {{{{").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_no_files() {
        let dir = TempDir::new().unwrap();
        let empty_config_dir = TempDir::new().unwrap();
        let loaded =
            load_config_with_options(Some(dir.path()), Some(empty_config_dir.path())).unwrap();
        assert!(loaded.config.artifacts.is_empty());
        assert!(loaded.loaded_from().is_empty());
        assert_eq!(loaded.sources.len(), 2);
    }

    #[test]
    fn test_load_config_layered_merge() {
        let user_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();

        fs::write(
            user_dir.path().join("config.toml"),
            r#"
m2_repo_relative = "lib/m2/repository"

[repositories]
local = ["/srv/m2"]

[properties]
key = "user"
"#,
        )
        .unwrap();
        fs::write(
            project_dir.path().join("runset.toml"),
            r#"
m2_repo_relative = "repo"

[properties]
key = "project"

[[artifacts]]
notation = "g:m:1"
"#,
        )
        .unwrap();

        let loaded =
            load_config_with_options(Some(project_dir.path()), Some(user_dir.path())).unwrap();
        let config = &loaded.config;

        assert_eq!(config.m2_repo_relative.as_deref(), Some("repo"));
        assert_eq!(config.repositories.local, [PathBuf::from("/srv/m2")]);
        assert_eq!(config.properties["key"], "project");
        assert_eq!(config.artifacts.len(), 1);
        assert_eq!(loaded.loaded_from().len(), 2);
    }

    #[test]
    fn test_malformed_layer_warns_but_continues() {
        let dir = TempDir::new().unwrap();
        let empty_config_dir = TempDir::new().unwrap();
        fs::write(dir.path().join("runset.toml"), "not valid toml {{{{").unwrap();

        let loaded =
            load_config_with_options(Some(dir.path()), Some(empty_config_dir.path())).unwrap();
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].contains("Failed to load"));
        assert!(loaded.loaded_from().is_empty());
    }

    #[test]
    fn test_into_layer_warns() {
        let dir = TempDir::new().unwrap();
        let empty_config_dir = TempDir::new().unwrap();
        fs::write(dir.path().join("runset.toml"), r#"into = "/opt""#).unwrap();

        let loaded =
            load_config_with_options(Some(dir.path()), Some(empty_config_dir.path())).unwrap();
        assert!(loaded.warnings[0].contains("embulk_home"));
    }

    #[test]
    fn test_explicit_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(load_explicit(&path).is_err());

        fs::write(&path, "not valid toml {{{{").unwrap();
        assert!(matches!(
            load_explicit(&path).unwrap_err(),
            ConfigError::Parse(_)
        ));

        fs::write(&path, r#"m2_repo_relative = "repo""#).unwrap();
        let loaded = load_explicit(&path).unwrap();
        assert_eq!(loaded.config.m2_repo_relative.as_deref(), Some("repo"));
        assert_eq!(loaded.loaded_from(), [path.as_path()]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RunsetConfig::new();
        config.embulk_home = Some(PathBuf::from("/from/file"));

        apply_env_overrides(&mut config, |_| Some(String::new()));
        assert_eq!(config.embulk_home, Some(PathBuf::from("/from/file")));

        apply_env_overrides(&mut config, |key| {
            (key == EMBULK_HOME_ENV).then(|| "/from/env".to_string())
        });
        assert_eq!(config.embulk_home, Some(PathBuf::from("/from/env")));
    }
}
