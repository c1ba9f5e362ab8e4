//! Error types for run set installation.

use std::path::PathBuf;

use thiserror::Error;

use crate::notation::NotationError;
use crate::resolver::ResolveError;

/// Result type for install operations.
pub type Result<T> = std::result::Result<T, InstallError>;

/// Errors that can occur while declaring or installing a run set.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The dependency notation could not be parsed.
    #[error(transparent)]
    Notation(#[from] NotationError),

    /// The external resolver failed.
    #[error("failed to resolve artifacts: {0}")]
    Resolve(#[from] ResolveError),

    /// The embulk home is not absolute, or exists as something other than a directory.
    #[error("Supplied embulkHome \"{}\" {reason}", path.display())]
    InvalidEmbulkHome { path: PathBuf, reason: String },

    /// The embulk home was never set before it was needed.
    #[error("embulkHome is not set. Set it by \"embulkHome\" before installing.")]
    MissingEmbulkHome,

    /// The m2 repository path is invalid or absolute.
    #[error("Supplied m2RepoRelative \"{path}\" {reason}")]
    InvalidM2RepoRelative { path: String, reason: String },

    /// The generic copy destination API was used.
    #[error("\"into\" is not permitted in InstallEmbulkRunSet. Use \"embulkHome\" instead.")]
    IntoNotPermitted,

    /// A resolved component belongs to a same-workspace project.
    #[error("Cannot install artifacts for a project component ({display_name})")]
    ProjectComponent { display_name: String },

    /// A resolved component is neither a module nor a project.
    #[error(
        "Cannot resolve the artifacts for component {display_name} with unsupported type {kind}."
    )]
    UnsupportedComponent { display_name: String, kind: String },

    /// A resolved artifact path has no file name to place under the repository.
    #[error("resolved artifact '{}' has no file name", path.display())]
    MissingFileName { path: PathBuf },

    /// A file path could not be converted into a `file:` URI.
    #[error("cannot build a file URI for '{}'", path.display())]
    FileUri { path: PathBuf },

    /// Failed to create or write the generated properties file.
    #[error("failed to write properties file '{}': {source}", path.display())]
    Properties {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to copy a staged file into the run set.
    #[error("failed to copy '{}' into '{}': {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// A destination was written twice under the `Fail` duplicate policy.
    #[error("duplicate destination '{}' is not allowed", path.display())]
    Duplicate { path: PathBuf },
}
