//! Dependency notation parsing.
//!
//! A notation is either a string coordinate such as
//! `org.jruby:jruby-complete:9.1.15.0`, or a table:
//!
//! ```toml
//! notation = { group = "org.jruby", name = "jruby-complete", version = "9.1.15.0" }
//! ```
//!
//! String coordinates are not interpreted here. They are forwarded as-is so
//! the resolver applies its own coordinate grammar. Tables are validated
//! against the accepted key set and canonicalised into an ordered map.

use indexmap::IndexMap;
use thiserror::Error;

/// Keys accepted in a table notation.
pub const ACCEPTABLE_MAP_KEYS: [&str; 6] =
    ["group", "name", "version", "configuration", "ext", "classifier"];

/// Errors produced when a notation is malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    /// A table notation used a key outside [`ACCEPTABLE_MAP_KEYS`].
    #[error(
        "Supplied Map module notation is invalid. Its key must be one of: [{}]",
        ACCEPTABLE_MAP_KEYS.join(", ")
    )]
    InvalidKey { key: String },

    /// A table notation carried a value that is not a string.
    #[error("Supplied Map module notation is invalid. Its value must be a String.")]
    InvalidValue { key: String, found: &'static str },

    /// The notation is neither a string nor a table.
    #[error("Supplied module notation is invalid. (found {found})")]
    Unsupported { found: &'static str },
}

/// A dependency notation as supplied by a caller or a config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Notation(toml::Value);

/// A validated request handed to the resolver.
///
/// Each declaration builds its own request; nothing in it is shared with
/// other declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRequest {
    /// A string coordinate, forwarded unparsed.
    Coordinates(String),
    /// A table notation, in the order the keys were supplied.
    Map(IndexMap<String, String>),
}

impl DependencyRequest {
    /// A short human-readable form for logs and error messages.
    pub fn display(&self) -> String {
        match self {
            DependencyRequest::Coordinates(s) => s.clone(),
            DependencyRequest::Map(map) => {
                let parts: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                format!("[{}]", parts.join(", "))
            }
        }
    }
}

impl std::fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

impl Notation {
    /// Wrap an arbitrary TOML value.
    pub fn new(value: toml::Value) -> Self {
        Self(value)
    }

    /// Validate the notation and turn it into a resolver request.
    pub fn parse(&self) -> Result<DependencyRequest, NotationError> {
        match &self.0 {
            toml::Value::String(s) => {
                tracing::debug!(notation = %s, "supplied artifact");
                Ok(DependencyRequest::Coordinates(s.clone()))
            }
            toml::Value::Table(table) => {
                let map = validate_map(table)?;
                let request = DependencyRequest::Map(map);
                tracing::debug!(notation = %request, "supplied artifact");
                Ok(request)
            }
            other => Err(NotationError::Unsupported {
                found: other.type_str(),
            }),
        }
    }
}

fn validate_map(table: &toml::Table) -> Result<IndexMap<String, String>, NotationError> {
    let mut map = IndexMap::with_capacity(table.len());
    for (key, value) in table {
        if !ACCEPTABLE_MAP_KEYS.contains(&key.as_str()) {
            return Err(NotationError::InvalidKey { key: key.clone() });
        }
        let Some(value) = value.as_str() else {
            return Err(NotationError::InvalidValue {
                key: key.clone(),
                found: value.type_str(),
            });
        };
        map.insert(key.clone(), value.to_string());
    }
    Ok(map)
}

impl From<toml::Value> for Notation {
    fn from(value: toml::Value) -> Self {
        Self(value)
    }
}

impl From<&str> for Notation {
    fn from(s: &str) -> Self {
        Self(toml::Value::String(s.to_string()))
    }
}

impl From<String> for Notation {
    fn from(s: String) -> Self {
        Self(toml::Value::String(s))
    }
}

impl From<toml::Table> for Notation {
    fn from(table: toml::Table) -> Self {
        Self(toml::Value::Table(table))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Notation {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let table: toml::Table = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), toml::Value::String(v.to_string())))
            .collect();
        Self(toml::Value::Table(table))
    }
}
