//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! embulk_home = "/opt/embulk"
//! m2_repo_relative = "lib/m2/repository"
//!
//! [repositories]           # where artifacts are looked up
//! [properties]             # embulk.properties entries
//! [[artifacts]]            # artifacts to install
//! ```

use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{ConfigError, Result};

/// Default timeout of a single download, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// Every field is optional so that partial layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunsetConfig {
    /// Absolute directory the run set is installed into.
    pub embulk_home: Option<PathBuf>,

    /// Repository location relative to the embulk home.
    pub m2_repo_relative: Option<String>,

    /// Where the staged `embulk.properties` is written before the copy.
    pub temporary_dir: Option<PathBuf>,

    pub repositories: RepositoriesConfig,

    /// Entries of `embulk.properties`, in declaration order.
    pub properties: IndexMap<String, String>,

    pub artifacts: Vec<ArtifactConfig>,
}

impl RunsetConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(toml_str)?;
        if table.contains_key("into") {
            return Err(ConfigError::IntoNotPermitted);
        }
        Ok(toml::Value::Table(table).try_into()?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Scalars are replaced, properties merge key-wise, lists append.
    pub fn merge(&mut self, other: RunsetConfig) {
        if other.embulk_home.is_some() {
            self.embulk_home = other.embulk_home;
        }
        if other.m2_repo_relative.is_some() {
            self.m2_repo_relative = other.m2_repo_relative;
        }
        if other.temporary_dir.is_some() {
            self.temporary_dir = other.temporary_dir;
        }

        self.repositories.merge(other.repositories);

        for (key, value) in other.properties {
            self.properties.insert(key, value);
        }

        self.artifacts.extend(other.artifacts);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repositories
// ─────────────────────────────────────────────────────────────────────────────

/// Repository configuration (`[repositories]`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RepositoriesConfig {
    /// Search `~/.m2/repository` first. Defaults to false.
    pub maven_local: Option<bool>,

    /// Search Maven Central last. Defaults to true.
    pub maven_central: Option<bool>,

    /// Local Maven-layout directories, searched in order.
    pub local: Vec<PathBuf>,

    /// Remote repository base URLs, searched in order.
    pub remote: Vec<String>,

    /// Download cache for remote repositories.
    pub cache_dir: Option<PathBuf>,

    pub timeout_secs: Option<u64>,
}

impl RepositoriesConfig {
    pub fn maven_local(&self) -> bool {
        self.maven_local.unwrap_or(false)
    }

    pub fn maven_central(&self) -> bool {
        self.maven_central.unwrap_or(true)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    fn merge(&mut self, other: RepositoriesConfig) {
        if other.maven_local.is_some() {
            self.maven_local = other.maven_local;
        }
        if other.maven_central.is_some() {
            self.maven_central = other.maven_central;
        }
        self.local.extend(other.local);
        self.remote.extend(other.remote);
        if other.cache_dir.is_some() {
            self.cache_dir = other.cache_dir;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Artifacts
// ─────────────────────────────────────────────────────────────────────────────

/// One `[[artifacts]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtifactConfig {
    /// A string coordinate or a table of coordinate parts.
    pub notation: toml::Value,

    /// When set, the installed file's URI is recorded under this key.
    #[serde(default)]
    pub property: Option<String>,
}

impl ArtifactConfig {
    pub fn new(notation: impl Into<toml::Value>) -> Self {
        Self {
            notation: notation.into(),
            property: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
embulk_home = "/opt/embulk"
m2_repo_relative = "lib/m2/repository"
temporary_dir = "/tmp/runset"

[repositories]
maven_local = true
local = ["/srv/m2"]
remote = ["https://example.com/maven2/"]
timeout_secs = 5

[properties]
key = "value"
"embulk.jruby" = "file:///jruby.jar"

[[artifacts]]
notation = "org.jruby:jruby-complete:9.1.15.0"
property = "jruby"

[[artifacts]]
notation = { group = "org.embulk", name = "embulk-core", version = "0.11.0" }
"#;

    #[test]
    fn test_parse_full() {
        let config = RunsetConfig::from_toml(FULL).unwrap();
        assert_eq!(config.embulk_home, Some(PathBuf::from("/opt/embulk")));
        assert_eq!(config.m2_repo_relative.as_deref(), Some("lib/m2/repository"));
        assert!(config.repositories.maven_local());
        assert!(config.repositories.maven_central());
        assert_eq!(config.repositories.timeout(), Duration::from_secs(5));
        assert_eq!(
            config.properties.keys().collect::<Vec<_>>(),
            ["key", "embulk.jruby"]
        );
        assert_eq!(config.artifacts.len(), 2);
        assert_eq!(config.artifacts[0].property.as_deref(), Some("jruby"));
        assert!(config.artifacts[1].notation.is_table());
        assert_eq!(config.artifacts[1].property, None);
    }

    #[test]
    fn test_parse_empty() {
        let config = RunsetConfig::from_toml("").unwrap();
        assert_eq!(config, RunsetConfig::new());
        assert!(!config.repositories.maven_local());
        assert!(config.repositories.maven_central());
        assert_eq!(
            config.repositories.timeout(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_into_is_rejected() {
        let err = RunsetConfig::from_toml(r#"into = "/opt/embulk""#).unwrap_err();
        assert!(matches!(err, ConfigError::IntoNotPermitted));
        assert!(err.to_string().contains(r#"Use "embulk_home" instead"#));
    }

    #[test]
    fn test_merge() {
        let mut base = RunsetConfig::from_toml(FULL).unwrap();
        let overlay = RunsetConfig::from_toml(
            r#"
embulk_home = "/srv/embulk"

[repositories]
maven_central = false
local = ["/mnt/m2"]

[properties]
key = "override"
other = "x"

[[artifacts]]
notation = "g:m:1"
"#,
        )
        .unwrap();

        base.merge(overlay);

        assert_eq!(base.embulk_home, Some(PathBuf::from("/srv/embulk")));
        assert_eq!(base.m2_repo_relative.as_deref(), Some("lib/m2/repository"));
        assert!(base.repositories.maven_local());
        assert!(!base.repositories.maven_central());
        assert_eq!(
            base.repositories.local,
            [PathBuf::from("/srv/m2"), PathBuf::from("/mnt/m2")]
        );
        assert_eq!(base.properties["key"], "override");
        assert_eq!(base.properties.len(), 3);
        assert_eq!(base.artifacts.len(), 3);
    }
}
