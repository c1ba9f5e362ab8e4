//! Copy instructions, the copy plan, and the filesystem copy executor.
//!
//! The orchestrator only decides *what* goes *where*. Moving bytes is left to
//! a [`CopyExecutor`]; [`FsCopyExecutor`] is the plain filesystem one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{InstallError, Result};

/// What to do when a destination is written more than once in one execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Later copies overwrite earlier ones.
    #[default]
    Include,
    /// Later copies are silently skipped.
    Exclude,
    /// A second copy is an error.
    Fail,
}

/// A single file to place into the run set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyInstruction {
    /// The file to copy.
    pub source: PathBuf,
    /// Destination file, relative to the embulk home.
    pub destination: PathBuf,
    pub duplicates: DuplicatePolicy,
}

impl CopyInstruction {
    pub fn new(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        duplicates: DuplicatePolicy,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            duplicates,
        }
    }
}

/// Staged copy instructions keyed by destination.
///
/// The first instruction queued for a destination wins; later ones for the
/// same destination are dropped.
#[derive(Debug, Clone, Default)]
pub struct CopyPlan {
    instructions: IndexMap<PathBuf, CopyInstruction>,
}

impl CopyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an instruction. Returns `false` if its destination was already queued.
    pub fn insert(&mut self, instruction: CopyInstruction) -> bool {
        if self.instructions.contains_key(&instruction.destination) {
            tracing::debug!(
                destination = %instruction.destination.display(),
                source = %instruction.source.display(),
                "destination already staged, excluding duplicate"
            );
            return false;
        }
        self.instructions
            .insert(instruction.destination.clone(), instruction);
        true
    }

    pub fn contains(&self, destination: &Path) -> bool {
        self.instructions.contains_key(destination)
    }

    pub fn get(&self, destination: &Path) -> Option<&CopyInstruction> {
        self.instructions.get(destination)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Instructions in the order they were first queued.
    pub fn iter(&self) -> impl Iterator<Item = &CopyInstruction> {
        self.instructions.values()
    }

    pub fn to_vec(&self) -> Vec<CopyInstruction> {
        self.iter().cloned().collect()
    }
}

/// Outcome of executing a set of copy instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    /// Absolute destinations that were written.
    pub copied: Vec<PathBuf>,
    /// Absolute destinations skipped under [`DuplicatePolicy::Exclude`].
    pub skipped: Vec<PathBuf>,
}

/// Performs the actual copy of staged instructions.
pub trait CopyExecutor {
    /// Copy every instruction into `root`, creating directories as needed.
    fn execute(&self, root: &Path, instructions: &[CopyInstruction]) -> Result<CopyReport>;
}

impl<T: CopyExecutor + ?Sized> CopyExecutor for &T {
    fn execute(&self, root: &Path, instructions: &[CopyInstruction]) -> Result<CopyReport> {
        (**self).execute(root, instructions)
    }
}

/// Copies files on the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopyExecutor;

impl FsCopyExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl CopyExecutor for FsCopyExecutor {
    fn execute(&self, root: &Path, instructions: &[CopyInstruction]) -> Result<CopyReport> {
        std::fs::create_dir_all(root).map_err(|e| InstallError::Copy {
            from: PathBuf::new(),
            to: root.to_path_buf(),
            source: e,
        })?;

        let mut written: HashSet<PathBuf> = HashSet::new();
        let mut report = CopyReport::default();

        for instruction in instructions {
            let target = root.join(&instruction.destination);

            if written.contains(&target) {
                match instruction.duplicates {
                    DuplicatePolicy::Include => {}
                    DuplicatePolicy::Exclude => {
                        tracing::debug!(target = %target.display(), "skipping duplicate copy");
                        report.skipped.push(target);
                        continue;
                    }
                    DuplicatePolicy::Fail => {
                        return Err(InstallError::Duplicate { path: target });
                    }
                }
            }

            let copy_err = |e| InstallError::Copy {
                from: instruction.source.clone(),
                to: target.clone(),
                source: e,
            };
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent).map_err(copy_err)?;
            }
            std::fs::copy(&instruction.source, &target).map_err(copy_err)?;

            tracing::debug!(
                source = %instruction.source.display(),
                target = %target.display(),
                "copied"
            );
            written.insert(target.clone());
            report.copied.push(target);
        }

        tracing::info!(
            root = %root.display(),
            copied = report.copied.len(),
            skipped = report.skipped.len(),
            "run set files copied"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn instruction(source: &Path, destination: &str, duplicates: DuplicatePolicy) -> CopyInstruction {
        CopyInstruction::new(source, destination, duplicates)
    }

    #[test]
    fn test_plan_first_writer_wins() {
        let mut plan = CopyPlan::new();
        assert!(plan.insert(instruction(
            Path::new("/cache/a/m-1.jar"),
            "lib/m-1.jar",
            DuplicatePolicy::Exclude
        )));
        assert!(!plan.insert(instruction(
            Path::new("/cache/b/m-1.jar"),
            "lib/m-1.jar",
            DuplicatePolicy::Exclude
        )));

        assert_eq!(plan.len(), 1);
        assert_eq!(
            plan.get(Path::new("lib/m-1.jar")).unwrap().source,
            Path::new("/cache/a/m-1.jar")
        );
    }

    #[test]
    fn test_plan_keeps_insertion_order() {
        let mut plan = CopyPlan::new();
        for name in ["c", "a", "b"] {
            plan.insert(instruction(Path::new("/src"), name, DuplicatePolicy::Include));
        }
        let order: Vec<_> = plan.iter().map(|i| i.destination.clone()).collect();
        assert_eq!(order, vec![PathBuf::from("c"), PathBuf::from("a"), PathBuf::from("b")]);
    }

    #[test]
    fn test_fs_executor_copies_into_nested_dirs() {
        let src_dir = TempDir::new().unwrap();
        let root = TempDir::new().unwrap();
        let source = src_dir.path().join("m-1.jar");
        fs::write(&source, b"jar").unwrap();

        let report = FsCopyExecutor::new()
            .execute(
                &root.path().join("home"),
                &[instruction(&source, "lib/m2/g/m/1/m-1.jar", DuplicatePolicy::Exclude)],
            )
            .unwrap();

        let target = root.path().join("home/lib/m2/g/m/1/m-1.jar");
        assert_eq!(report.copied, vec![target.clone()]);
        assert_eq!(fs::read(target).unwrap(), b"jar");
    }

    #[test]
    fn test_fs_executor_duplicate_policies() {
        let src_dir = TempDir::new().unwrap();
        let first = src_dir.path().join("first");
        let second = src_dir.path().join("second");
        fs::write(&first, b"first").unwrap();
        fs::write(&second, b"second").unwrap();

        let root = TempDir::new().unwrap();
        let report = FsCopyExecutor
            .execute(
                root.path(),
                &[
                    instruction(&first, "x", DuplicatePolicy::Exclude),
                    instruction(&second, "x", DuplicatePolicy::Exclude),
                ],
            )
            .unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(fs::read(root.path().join("x")).unwrap(), b"first");

        let root = TempDir::new().unwrap();
        FsCopyExecutor
            .execute(
                root.path(),
                &[
                    instruction(&first, "x", DuplicatePolicy::Include),
                    instruction(&second, "x", DuplicatePolicy::Include),
                ],
            )
            .unwrap();
        assert_eq!(fs::read(root.path().join("x")).unwrap(), b"second");

        let root = TempDir::new().unwrap();
        let err = FsCopyExecutor
            .execute(
                root.path(),
                &[
                    instruction(&first, "x", DuplicatePolicy::Fail),
                    instruction(&second, "x", DuplicatePolicy::Fail),
                ],
            )
            .unwrap_err();
        assert!(matches!(err, InstallError::Duplicate { .. }));
    }

    #[test]
    fn test_fs_executor_missing_source() {
        let root = TempDir::new().unwrap();
        let err = FsCopyExecutor
            .execute(
                root.path(),
                &[instruction(
                    &root.path().join("does-not-exist"),
                    "x",
                    DuplicatePolicy::Include,
                )],
            )
            .unwrap_err();
        assert!(matches!(err, InstallError::Copy { .. }));
    }
}
