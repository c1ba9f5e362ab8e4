//! Maven coordinates and the Gradle-style notation grammar.
//!
//! String notations follow `group:name[:version[:classifier]][@ext]`, the
//! grammar build scripts already use for dependencies.

use std::fmt;

use indexmap::IndexMap;
use runset_core::{DependencyRequest, ModuleIdentity, ResolveError};

/// Extension used when a notation does not name one.
pub const DEFAULT_EXTENSION: &str = "jar";

/// Fully parsed coordinates of a Maven artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Coordinate {
    pub group: Option<String>,
    pub name: String,
    pub version: Option<String>,
    pub classifier: Option<String>,
    pub extension: Option<String>,
    /// Target configuration of a map notation. Carried, but not used for lookup.
    pub configuration: Option<String>,
}

impl Coordinate {
    /// Parse a string notation.
    pub fn parse(notation: &str) -> Result<Self, ResolveError> {
        let (main, extension) = match notation.rfind('@') {
            Some(idx) => (&notation[..idx], non_empty(&notation[idx + 1..])),
            None => (notation, None),
        };

        let mut parts: Vec<&str> = main.split(':').collect();
        while parts.last().is_some_and(|p| p.is_empty()) {
            parts.pop();
        }
        if parts.len() < 2 || parts.len() > 4 {
            return Err(invalid_string_notation(notation));
        }

        let name = non_empty(parts[1]).ok_or_else(|| invalid_string_notation(notation))?;
        Ok(Self {
            group: non_empty(parts[0]),
            name,
            version: parts.get(2).and_then(|v| non_empty(v)),
            classifier: parts.get(3).and_then(|c| non_empty(c)),
            extension,
            configuration: None,
        })
    }

    /// Build coordinates from a validated map notation.
    pub fn from_map(map: &IndexMap<String, String>) -> Result<Self, ResolveError> {
        let get = |key: &str| map.get(key).and_then(|v| non_empty(v));
        let name = get("name").ok_or_else(|| {
            ResolveError::InvalidCoordinates(format!(
                "Supplied Map module notation {map:?} is invalid. It must have a 'name'."
            ))
        })?;
        Ok(Self {
            group: get("group"),
            name,
            version: get("version"),
            classifier: get("classifier"),
            extension: get("ext"),
            configuration: get("configuration"),
        })
    }

    /// Turn a resolver request into coordinates.
    pub fn from_request(request: &DependencyRequest) -> Result<Self, ResolveError> {
        match request {
            DependencyRequest::Coordinates(s) => Self::parse(s),
            DependencyRequest::Map(map) => Self::from_map(map),
        }
    }

    /// The module identity, which requires both group and version.
    pub fn module(&self) -> Result<ModuleIdentity, ResolveError> {
        let group = self.group.as_deref().ok_or_else(|| {
            ResolveError::InvalidCoordinates(format!(
                "'{self}' has no group; a Maven repository needs one"
            ))
        })?;
        let version = self.version.as_deref().ok_or_else(|| {
            ResolveError::InvalidCoordinates(format!(
                "'{self}' has no version; dynamic versions are not resolved"
            ))
        })?;
        Ok(ModuleIdentity::new(group, &self.name, version))
    }

    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or(DEFAULT_EXTENSION)
    }

    /// File name of the main artifact: `name-version[-classifier].ext`.
    pub fn artifact_file_name(&self) -> String {
        let mut file = format!("{}-{}", self.name, self.version.as_deref().unwrap_or(""));
        if let Some(classifier) = &self.classifier {
            file.push('-');
            file.push_str(classifier);
        }
        file.push('.');
        file.push_str(self.extension());
        file
    }

    /// File name of the POM: `name-version.pom`.
    pub fn descriptor_file_name(&self) -> String {
        descriptor_file_name(&self.name, self.version.as_deref().unwrap_or(""))
    }
}

pub(crate) fn descriptor_file_name(name: &str, version: &str) -> String {
    format!("{name}-{version}.pom")
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group.as_deref().unwrap_or(""), self.name)?;
        if let Some(version) = &self.version {
            write!(f, ":{version}")?;
        }
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        if let Some(extension) = &self.extension {
            write!(f, "@{extension}")?;
        }
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn invalid_string_notation(notation: &str) -> ResolveError {
    ResolveError::InvalidCoordinates(format!(
        "Supplied String module notation '{notation}' is invalid. Example notations: \
         'org.gradle:gradle-core:2.2', 'org.mockito:mockito-core:1.9.5:javadoc'."
    ))
}
