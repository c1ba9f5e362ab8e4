//! Non-transitive resolver over local and remote Maven repositories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use runset_core::{
    ArtifactResolver, DependencyRequest, ModuleIdentity, ResolveError, ResolvedArtifact,
    module_path,
};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use url::Url;

use crate::coordinate::{Coordinate, descriptor_file_name};
use crate::repository::Repository;

/// Default timeout of a single download.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default download cache: `<cache dir>/runset/artifacts`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("runset")
        .join("artifacts")
}

/// Resolves coordinates against an ordered list of Maven repositories.
///
/// Only the requested module is resolved; its dependencies are not. Local
/// repositories hand out their files in place. Remote files are downloaded
/// into a Maven-layout cache and served from there afterwards.
#[derive(Debug, Clone)]
pub struct MavenResolver {
    repositories: Vec<Repository>,
    cache_dir: PathBuf,
    timeout: Duration,
    client: Client,
}

impl MavenResolver {
    /// A resolver with no repositories and the default cache.
    pub fn new() -> Result<Self, ResolveError> {
        let client = Client::builder()
            .user_agent(concat!("runset/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ResolveError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            repositories: Vec::new(),
            cache_dir: default_cache_dir(),
            timeout: DEFAULT_TIMEOUT,
            client,
        })
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repositories.push(repository);
        self
    }

    pub fn with_repositories(mut self, repositories: impl IntoIterator<Item = Repository>) -> Self {
        self.repositories.extend(repositories);
        self
    }

    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Find `file_name` of `module`, searching repositories in order.
    ///
    /// Every location looked at is appended to `searched`.
    fn locate(
        &self,
        module: &ModuleIdentity,
        file_name: &str,
        searched: &mut Vec<String>,
    ) -> Result<Option<PathBuf>, ResolveError> {
        for repository in &self.repositories {
            match repository {
                Repository::Local { root } => {
                    let path = Repository::local_path(root, module, file_name);
                    searched.push(path.display().to_string());
                    if path.is_file() {
                        debug!(path = %path.display(), "Found in local repository");
                        return Ok(Some(path));
                    }
                }
                Repository::Remote { url } => {
                    let cached = self.cache_dir.join(module_path(module)).join(file_name);
                    if cached.is_file() {
                        debug!(path = %cached.display(), "Found in download cache");
                        return Ok(Some(cached));
                    }
                    let url = Repository::remote_url(url, module, file_name)?;
                    searched.push(url.to_string());
                    if self.download(&url, &cached)? {
                        return Ok(Some(cached));
                    }
                }
            }
        }
        Ok(None)
    }

    /// Download `url` into `dest`. Returns `false` when the server has no
    /// such file.
    fn download(&self, url: &Url, dest: &Path) -> Result<bool, ResolveError> {
        let fetch_error = |reason: String| ResolveError::Fetch {
            url: url.to_string(),
            reason,
        };

        info!(%url, "Downloading");
        let mut response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%url, "Not found");
            return Ok(false);
        }
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {status}")));
        }

        let parent = dest.parent().unwrap_or(&self.cache_dir);
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        let bytes = response
            .copy_to(&mut tmp)
            .map_err(|e| fetch_error(e.to_string()))?;
        tmp.persist(dest).map_err(|e| e.error)?;

        debug!(%url, bytes, path = %dest.display(), "Downloaded");
        Ok(true)
    }
}

impl ArtifactResolver for MavenResolver {
    fn resolve(&self, request: &DependencyRequest) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        let coordinate = Coordinate::from_request(request)?;
        if let Some(configuration) = &coordinate.configuration {
            debug!(
                %coordinate,
                configuration = %configuration,
                "Target configuration is not used for lookup"
            );
        }
        let module = coordinate.module()?;

        let mut searched = Vec::new();
        let file = self
            .locate(&module, &coordinate.artifact_file_name(), &mut searched)?
            .ok_or_else(|| ResolveError::NotFound {
                what: coordinate.to_string(),
                searched,
            })?;

        Ok(vec![ResolvedArtifact::main(module, file)])
    }

    fn resolve_descriptors(
        &self,
        modules: &[ModuleIdentity],
    ) -> Result<Vec<ResolvedArtifact>, ResolveError> {
        let mut descriptors = Vec::with_capacity(modules.len());
        for module in modules {
            let file_name = descriptor_file_name(&module.module, &module.version);
            match self.locate(module, &file_name, &mut Vec::new())? {
                Some(file) => descriptors.push(ResolvedArtifact::descriptor(module.clone(), file)),
                None => debug!(%module, "No POM in any repository"),
            }
        }
        Ok(descriptors)
    }
}
