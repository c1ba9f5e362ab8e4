//! Maven repository resolver for run set installation.
//!
//! [`MavenResolver`] implements [`runset_core::ArtifactResolver`] by looking
//! up exactly the requested module in an ordered list of repositories:
//!
//! ```no_run
//! use runset_core::{FsCopyExecutor, InstallRunSet};
//! use runset_maven::{MavenResolver, Repository};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = MavenResolver::new()?.with_repository(Repository::maven_central()?);
//! let mut install = InstallRunSet::new(resolver);
//! install.embulk_home("/opt/embulk")?;
//! install.artifact("org.jruby:jruby-complete:9.1.15.0")?;
//! install.install(&FsCopyExecutor)?;
//! # Ok(())
//! # }
//! ```

pub mod coordinate;
pub mod repository;
pub mod resolver;

pub use coordinate::{Coordinate, DEFAULT_EXTENSION};
pub use repository::{MAVEN_CENTRAL_URL, Repository};
pub use resolver::{DEFAULT_TIMEOUT, MavenResolver, default_cache_dir};
