//! Resolved component identities and artifacts.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// An externally fetched module, addressed by Maven coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ModuleIdentity {
    pub group: String,
    pub module: String,
    pub version: String,
}

impl ModuleIdentity {
    pub fn new(
        group: impl Into<String>,
        module: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            module: module.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.module, self.version)
    }
}

/// The identity of a resolved component.
///
/// Only [`ComponentIdentity::Module`] can be placed into a Maven-layout
/// repository. Project components are build units of the same workspace and
/// are never installable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentIdentity {
    /// A module fetched from a remote or local repository.
    Module(ModuleIdentity),
    /// A build unit of the same workspace.
    Project { path: String },
    /// Any other component kind reported by a resolver.
    Other { kind: String, display_name: String },
}

impl ComponentIdentity {
    /// Name used in logs and error messages.
    pub fn display_name(&self) -> String {
        match self {
            ComponentIdentity::Module(module) => module.to_string(),
            ComponentIdentity::Project { path } => format!("project {path}"),
            ComponentIdentity::Other { display_name, .. } => display_name.clone(),
        }
    }

    /// The concrete kind of this identity.
    pub fn kind(&self) -> &str {
        match self {
            ComponentIdentity::Module(_) => "module",
            ComponentIdentity::Project { .. } => "project",
            ComponentIdentity::Other { kind, .. } => kind,
        }
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

impl From<ModuleIdentity> for ComponentIdentity {
    fn from(module: ModuleIdentity) -> Self {
        ComponentIdentity::Module(module)
    }
}

/// Which file of a component an artifact is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The main file, usually a JAR.
    Main,
    /// The Maven descriptor (POM).
    Descriptor,
}

impl ArtifactKind {
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Main => "jar",
            ArtifactKind::Descriptor => "pom",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A file produced by the resolver for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArtifact {
    pub id: ComponentIdentity,
    pub kind: ArtifactKind,
    /// Location of the resolved file in the resolver's cache or repository.
    pub file: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(id: impl Into<ComponentIdentity>, kind: ArtifactKind, file: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            kind,
            file: file.into(),
        }
    }

    /// A main artifact for a module.
    pub fn main(id: impl Into<ComponentIdentity>, file: impl Into<PathBuf>) -> Self {
        Self::new(id, ArtifactKind::Main, file)
    }

    /// A descriptor artifact for a module.
    pub fn descriptor(id: impl Into<ComponentIdentity>, file: impl Into<PathBuf>) -> Self {
        Self::new(id, ArtifactKind::Descriptor, file)
    }
}
