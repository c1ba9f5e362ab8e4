//! The run set installer.
//!
//! `InstallRunSet` collects artifact declarations and properties, computes
//! where every resolved file goes inside the embulk home, and finally hands
//! the staged copy plan to a [`CopyExecutor`].

use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use parking_lot::Mutex;
use serde::Serialize;
use url::Url;

use crate::copy::{CopyExecutor, CopyInstruction, CopyPlan, CopyReport, DuplicatePolicy};
use crate::error::{InstallError, Result};
use crate::identity::{ArtifactKind, ComponentIdentity, ModuleIdentity, ResolvedArtifact};
use crate::layout::{default_m2_repo_relative, module_path};
use crate::notation::Notation;
use crate::properties::PropertiesSink;
use crate::resolver::ArtifactResolver;

/// Property key recording the m2 repository location.
pub const M2_REPO_PROPERTY: &str = "m2_repo";

/// Result of a completed installation.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub embulk_home: PathBuf,
    /// Written `embulk.properties` source, if any property was set.
    pub properties_source: Option<PathBuf>,
    pub copy: CopyReport,
}

/// Files staged by one declaration, committed together.
#[derive(Debug, Clone, Default)]
pub struct Declaration {
    pub instructions: Vec<CopyInstruction>,
    pub modules: Vec<ModuleIdentity>,
}

/// Installs artifacts and `embulk.properties` into an embulk home.
pub struct InstallRunSet<R> {
    resolver: R,
    embulk_home: Option<PathBuf>,
    m2_repo_relative: PathBuf,
    plan: Mutex<CopyPlan>,
    properties: PropertiesSink,
}

impl<R: ArtifactResolver> InstallRunSet<R> {
    /// Create an installer that keeps its temporary files under the system
    /// temporary directory.
    pub fn new(resolver: R) -> Self {
        Self::with_temporary_dir(resolver, std::env::temp_dir().join("runset"))
    }

    /// Create an installer with an explicit directory for temporary files.
    pub fn with_temporary_dir(resolver: R, temporary_dir: impl Into<PathBuf>) -> Self {
        Self {
            resolver,
            embulk_home: None,
            m2_repo_relative: default_m2_repo_relative(),
            plan: Mutex::new(CopyPlan::new()),
            properties: PropertiesSink::new(temporary_dir),
        }
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn embulk_home_dir(&self) -> Option<&Path> {
        self.embulk_home.as_deref()
    }

    pub fn m2_repo_relative_dir(&self) -> &Path {
        &self.m2_repo_relative
    }

    pub fn properties(&self) -> &PropertiesSink {
        &self.properties
    }

    /// Snapshot of the staged copy instructions.
    pub fn plan(&self) -> Vec<CopyInstruction> {
        self.plan.lock().to_vec()
    }

    /// Add a Maven artifact, and its POM, to be installed.
    pub fn artifact(&self, notation: impl Into<Notation>) -> Result<Declaration> {
        let declaration = self.declare(notation.into())?;
        self.commit(&declaration);
        Ok(declaration)
    }

    /// Resolve and stage one notation without touching the plan.
    fn declare(&self, notation: Notation) -> Result<Declaration> {
        let request = notation.parse()?;

        let resolved = self.resolver.resolve(&request)?;

        let mut declaration = Declaration::default();
        let mut modules: IndexSet<ModuleIdentity> = IndexSet::new();
        for artifact in resolved.iter().filter(|a| a.kind == ArtifactKind::Main) {
            let (module, instruction) = self.stage(artifact)?;
            modules.insert(module.clone());
            declaration.instructions.push(instruction);
        }
        declaration.modules = modules.into_iter().collect();

        if !declaration.modules.is_empty() {
            let poms = self.resolver.resolve_descriptors(&declaration.modules)?;
            for artifact in poms.iter().filter(|a| a.kind == ArtifactKind::Descriptor) {
                let (_, instruction) = self.stage(artifact)?;
                declaration.instructions.push(instruction);
            }
        }

        tracing::debug!(
            notation = %request,
            modules = declaration.modules.len(),
            files = declaration.instructions.len(),
            "declared artifact"
        );
        Ok(declaration)
    }

    fn commit(&self, declaration: &Declaration) {
        let mut plan = self.plan.lock();
        for instruction in &declaration.instructions {
            plan.insert(instruction.clone());
        }
    }

    /// Add an artifact and record the `file:` URI of its installed main file
    /// as property `key`.
    ///
    /// The embulk home must already be set.
    pub fn artifact_as_property(
        &self,
        notation: impl Into<Notation>,
        key: impl Into<String>,
    ) -> Result<Declaration> {
        let home = self
            .embulk_home
            .clone()
            .ok_or(InstallError::MissingEmbulkHome)?;
        let declaration = self.declare(notation.into())?;

        // The property goes in first so a failure leaves the plan untouched.
        if let Some(main) = declaration.instructions.first() {
            let installed = home.join(&main.destination);
            let uri = Url::from_file_path(&installed)
                .map_err(|_| InstallError::FileUri { path: installed })?;
            self.embulk_system_property(key, uri.to_string())?;
        }
        self.commit(&declaration);
        Ok(declaration)
    }

    fn stage(&self, artifact: &ResolvedArtifact) -> Result<(ModuleIdentity, CopyInstruction)> {
        match &artifact.id {
            ComponentIdentity::Module(id) => {
                let dir = self.m2_repo_relative.join(module_path(id));
                let file_name =
                    artifact
                        .file
                        .file_name()
                        .ok_or_else(|| InstallError::MissingFileName {
                            path: artifact.file.clone(),
                        })?;
                tracing::info!("Setting to copy {}:{} into {}", id, artifact.kind, dir.display());
                tracing::debug!(file = %artifact.file.display(), "cached file");
                let instruction =
                    CopyInstruction::new(&artifact.file, dir.join(file_name), DuplicatePolicy::Exclude);
                Ok((id.clone(), instruction))
            }
            ComponentIdentity::Project { .. } => Err(InstallError::ProjectComponent {
                display_name: artifact.id.display_name(),
            }),
            ComponentIdentity::Other { kind, .. } => Err(InstallError::UnsupportedComponent {
                display_name: artifact.id.display_name(),
                kind: kind.clone(),
            }),
        }
    }

    /// Set the directory the run set is installed into.
    ///
    /// It must be absolute. It may not exist yet; it is created when
    /// installing.
    pub fn embulk_home(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.is_absolute() {
            return Err(InstallError::InvalidEmbulkHome {
                path: dir.to_path_buf(),
                reason: "is not absolute. Get an absolute path first.".to_string(),
            });
        }

        if dir.exists() {
            if !dir.is_dir() {
                return Err(InstallError::InvalidEmbulkHome {
                    path: dir.to_path_buf(),
                    reason: "already exists, but is not a directory.".to_string(),
                });
            }
            tracing::info!("Supplied embulkHome \"{}\" already exists.", dir.display());
        } else {
            tracing::info!(
                "Supplied embulkHome \"{}\" does not exist, then will be created.",
                dir.display()
            );
        }

        self.embulk_home = Some(dir.to_path_buf());
        Ok(())
    }

    /// Set where the Maven repository lives, relative to the embulk home.
    ///
    /// Also records it as the `m2_repo` property.
    pub fn m2_repo_relative(&mut self, dir: &str) -> Result<()> {
        if dir.contains('\0') {
            return Err(InstallError::InvalidM2RepoRelative {
                path: dir.to_string(),
                reason: "is invalid.".to_string(),
            });
        }

        let path: PathBuf = Path::new(dir).components().collect();
        if path.is_absolute() || path.has_root() {
            return Err(InstallError::InvalidM2RepoRelative {
                path: dir.to_string(),
                reason: "is absolute. Supply a relative path from embulkHome.".to_string(),
            });
        }

        let value = path.display().to_string();
        self.m2_repo_relative = path;
        self.embulk_system_property(M2_REPO_PROPERTY, value)
    }

    /// Set a property written into `embulk.properties`.
    pub fn embulk_system_property(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        if let Some(instruction) = self.properties.set(key, value)? {
            self.plan.lock().insert(instruction);
        }
        Ok(())
    }

    /// The generic copy destination is not available; use
    /// [`InstallRunSet::embulk_home`].
    ///
    /// Takes `self` by value so that `install.into(dir)` resolves here
    /// rather than to [`Into::into`]. The installer is consumed because the
    /// run cannot continue.
    pub fn into(self, _dest: impl AsRef<Path>) -> Result<Self> {
        Err(InstallError::IntoNotPermitted)
    }

    /// Write `embulk.properties` if needed and copy everything into the
    /// embulk home.
    pub fn install<E: CopyExecutor>(self, executor: &E) -> Result<InstallReport> {
        let home = self.embulk_home.clone().ok_or(InstallError::MissingEmbulkHome)?;

        let properties_source = self.properties.write()?;
        let instructions = self.plan.lock().to_vec();

        tracing::info!(
            embulk_home = %home.display(),
            files = instructions.len(),
            "installing run set"
        );
        let copy = executor.execute(&home, &instructions)?;

        Ok(InstallReport {
            embulk_home: home,
            properties_source,
            copy,
        })
    }
}

impl<R> std::fmt::Debug for InstallRunSet<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallRunSet")
            .field("embulk_home", &self.embulk_home)
            .field("m2_repo_relative", &self.m2_repo_relative)
            .field("staged", &self.plan.lock().len())
            .field("properties", &self.properties)
            .finish()
    }
}
