//! Maven repositories searched by the resolver.

use std::fmt;
use std::path::{Path, PathBuf};

use runset_core::{ModuleIdentity, ResolveError, module_path};
use url::Url;

/// Base URL of Maven Central.
pub const MAVEN_CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";

/// A Maven-layout repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repository {
    /// A repository on the local filesystem. Files are used in place.
    Local { root: PathBuf },
    /// A repository served over HTTP(S). Files are downloaded into a cache.
    Remote { url: Url },
}

impl Repository {
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Repository::Local { root: root.into() }
    }

    /// A remote repository. A trailing slash is added so that relative
    /// artifact paths resolve under the base rather than replacing its
    /// last segment.
    pub fn remote(url: &str) -> Result<Self, ResolveError> {
        let mut url = Url::parse(url).map_err(|e| {
            ResolveError::Other(format!("invalid repository URL '{url}': {e}"))
        })?;
        if url.cannot_be_a_base() {
            return Err(ResolveError::Other(format!(
                "repository URL '{url}' cannot be used as a base"
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Repository::Remote { url })
    }

    /// `~/.m2/repository`, if a home directory is known.
    pub fn maven_local() -> Option<Self> {
        dirs::home_dir().map(|home| Self::local(home.join(".m2").join("repository")))
    }

    pub fn maven_central() -> Result<Self, ResolveError> {
        Self::remote(MAVEN_CENTRAL_URL)
    }

    /// Where `file_name` of `module` lives in a local repository.
    pub fn local_path(root: &Path, module: &ModuleIdentity, file_name: &str) -> PathBuf {
        root.join(module_path(module)).join(file_name)
    }

    /// URL of `file_name` of `module` under a remote base.
    pub fn remote_url(
        base: &Url,
        module: &ModuleIdentity,
        file_name: &str,
    ) -> Result<Url, ResolveError> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                ResolveError::Other(format!("repository URL '{base}' cannot be used as a base"))
            })?;
            segments.pop_if_empty();
            segments.extend(group_segments(&module.group));
            segments.push(&module.module);
            segments.push(&module.version);
            segments.push(file_name);
        }
        Ok(url)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repository::Local { root } => write!(f, "{}", root.display()),
            Repository::Remote { url } => write!(f, "{url}"),
        }
    }
}

fn group_segments(group: &str) -> impl Iterator<Item = &str> {
    group.split('.').filter(|s| !s.is_empty())
}
