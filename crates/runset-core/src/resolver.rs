//! The resolver capability.
//!
//! Graph resolution and fetching are not done here. A resolver turns one
//! [`DependencyRequest`] into resolved files, and looks up the POM
//! descriptors of a set of modules. [`StaticResolver`] is an in-memory
//! implementation for tests and offline use.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

use crate::identity::{ArtifactKind, ComponentIdentity, ModuleIdentity, ResolvedArtifact};
use crate::notation::DependencyRequest;

/// Errors reported by a resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The request could not be interpreted as coordinates.
    #[error("{0}")]
    InvalidCoordinates(String),

    /// No repository had the requested file.
    #[error("could not find {what}. Searched in:\n{}", searched.join("\n"))]
    NotFound { what: String, searched: Vec<String> },

    /// A remote repository answered with an error.
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// IO error while reading or caching a file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other resolver-specific failure.
    #[error("{0}")]
    Other(String),
}

/// Resolves dependency requests into files.
///
/// Implementations must treat every call as a detached unit: resolving one
/// request must neither depend on nor change the outcome of any other.
pub trait ArtifactResolver {
    /// Resolve a single request into its main artifacts and their identities.
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError>;

    /// Look up the descriptor (POM) artifacts of exactly these modules.
    ///
    /// Modules without a descriptor are simply absent from the result.
    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError>;
}

impl<T: ArtifactResolver + ?Sized> ArtifactResolver for &T {
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve(request)
    }

    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve_descriptors(modules)
    }
}

impl<T: ArtifactResolver + ?Sized> ArtifactResolver for Box<T> {
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve(request)
    }

    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve_descriptors(modules)
    }
}

impl<T: ArtifactResolver + ?Sized> ArtifactResolver for Arc<T> {
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve(request)
    }

    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        (**self).resolve_descriptors(modules)
    }
}

/// An in-memory resolver with pre-registered results.
///
/// String requests are looked up verbatim. Map requests are looked up as
/// `group:name:version`, with missing parts left empty.
#[derive(Debug, Default)]
pub struct StaticResolver {
    components: HashMap<String, Vec<ResolvedArtifact>>,
    descriptors: HashMap<ModuleIdentity, Vec<ResolvedArtifact>>,
    request_log: Mutex<Vec<DependencyRequest>>,
    descriptor_log: Mutex<Vec<Vec<ModuleIdentity>>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the artifacts returned for a notation key.
    pub fn with_component(
        mut self,
        notation: impl Into<String>,
        artifacts: Vec<ResolvedArtifact>,
    ) -> Self {
        self.components.insert(notation.into(), artifacts);
        self
    }

    /// Register a module's main file and descriptor in one go.
    pub fn with_module(
        self,
        notation: impl Into<String>,
        id: ModuleIdentity,
        main: impl Into<std::path::PathBuf>,
        pom: impl Into<std::path::PathBuf>,
    ) -> Self {
        self.with_component(notation, vec![ResolvedArtifact::main(id.clone(), main)])
            .with_descriptor(ResolvedArtifact::descriptor(id, pom))
    }

    /// Register a descriptor artifact for its module.
    pub fn with_descriptor(mut self, artifact: ResolvedArtifact) -> Self {
        if let ComponentIdentity::Module(id) = &artifact.id {
            self.descriptors.entry(id.clone()).or_default().push(artifact);
        }
        self
    }

    /// Requests seen by [`ArtifactResolver::resolve`], in order.
    pub fn requests(&self) -> Vec<DependencyRequest> {
        self.request_log.lock().clone()
    }

    /// Module sets seen by [`ArtifactResolver::resolve_descriptors`], in order.
    pub fn descriptor_queries(&self) -> Vec<Vec<ModuleIdentity>> {
        self.descriptor_log.lock().clone()
    }

    fn key(request: &DependencyRequest) -> String {
        match request {
            DependencyRequest::Coordinates(s) => s.clone(),
            DependencyRequest::Map(map) => {
                let part = |k: &str| map.get(k).map(String::as_str).unwrap_or("");
                format!("{}:{}:{}", part("group"), part("name"), part("version"))
            }
        }
    }
}

impl ArtifactResolver for StaticResolver {
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        self.request_log.lock().push(request.clone());
        let key = Self::key(request);
        self.components
            .get(&key)
            .map(|artifacts| {
                artifacts
                    .iter()
                    .filter(|a| a.kind == ArtifactKind::Main)
                    .cloned()
                    .collect()
            })
            .ok_or_else(|| ResolveError::NotFound {
                what: key,
                searched: vec!["static resolver".to_string()],
            })
    }

    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        self.descriptor_log.lock().push(modules.to_vec());
        Ok(modules
            .iter()
            .filter_map(|id| self.descriptors.get(id))
            .flatten()
            .cloned()
            .collect())
    }
}
