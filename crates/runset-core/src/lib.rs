//! Run set installation for Embulk.
//!
//! A run set is a directory laid out as a self-contained Embulk environment:
//! Maven artifacts in a Maven-layout repository, plus an `embulk.properties`
//! file telling Embulk where things are.
//!
//! # Layout
//!
//! ```text
//! <embulk home>/
//!   embulk.properties                          # only if a property was set
//!   lib/m2/repository/                         # m2_repo_relative
//!     org/jruby/jruby-complete/9.1.15.0/
//!       jruby-complete-9.1.15.0.jar
//!       jruby-complete-9.1.15.0.pom
//! ```
//!
//! # Example
//!
//! ```no_run
//! use runset_core::{FsCopyExecutor, InstallRunSet, StaticResolver};
//!
//! # fn main() -> runset_core::Result<()> {
//! let mut install = InstallRunSet::new(StaticResolver::new());
//! install.embulk_home("/opt/embulk")?;
//! install.m2_repo_relative("lib/m2/repository")?;
//! install.embulk_system_property("key", "value")?;
//! install.artifact("org.jruby:jruby-complete:9.1.15.0")?;
//! install.install(&FsCopyExecutor)?;
//! # Ok(())
//! # }
//! ```

pub mod copy;
pub mod error;
pub mod identity;
pub mod install;
pub mod layout;
pub mod notation;
pub mod properties;
pub mod resolver;

pub use copy::{CopyExecutor, CopyInstruction, CopyPlan, CopyReport, DuplicatePolicy, FsCopyExecutor};
pub use error::{InstallError, Result};
pub use identity::{ArtifactKind, ComponentIdentity, ModuleIdentity, ResolvedArtifact};
pub use install::{Declaration, InstallReport, InstallRunSet, M2_REPO_PROPERTY};
pub use layout::{DEFAULT_M2_REPO_RELATIVE, default_m2_repo_relative, module_path};
pub use notation::{ACCEPTABLE_MAP_KEYS, DependencyRequest, Notation, NotationError};
pub use properties::{EMBULK_PROPERTIES_FILE, PropertiesSink};
pub use resolver::{ArtifactResolver, ResolveError, StaticResolver};
