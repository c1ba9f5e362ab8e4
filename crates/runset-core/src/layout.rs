//! Maven-layout repository paths.

use std::path::PathBuf;

use crate::identity::ModuleIdentity;

/// Default location of the local Maven repository inside the embulk home.
pub const DEFAULT_M2_REPO_RELATIVE: &str = "lib/m2/repository";

/// The default m2 repository path, built with platform separators.
pub fn default_m2_repo_relative() -> PathBuf {
    PathBuf::from("lib").join("m2").join("repository")
}

/// Relative directory of a module inside a Maven-layout repository.
///
/// `org.jruby` / `jruby-complete` / `9.1.15.0` maps to
/// `org/jruby/jruby-complete/9.1.15.0`. Main files and descriptors of the
/// same module share this directory.
pub fn module_path(id: &ModuleIdentity) -> PathBuf {
    let segments = split_group(&id.group);
    let Some((first, rest)) = segments.split_first() else {
        return PathBuf::new();
    };

    let mut path = PathBuf::from(first);
    for segment in rest {
        path.push(segment);
    }
    path.push(&id.module);
    path.push(&id.version);

    debug_assert!(!path.is_absolute());
    path
}

// Trailing empty segments are dropped, so "" and "..." have no segments.
fn split_group(group: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = group.split('.').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_module_path_jruby() {
        let id = ModuleIdentity::new("org.jruby", "jruby-complete", "9.1.15.0");
        assert_eq!(
            module_path(&id),
            Path::new("org").join("jruby").join("jruby-complete").join("9.1.15.0")
        );
    }

    #[test]
    fn test_module_path_single_segment_group() {
        let id = ModuleIdentity::new("junit", "junit", "4.13.2");
        assert_eq!(
            module_path(&id),
            Path::new("junit").join("junit").join("4.13.2")
        );
    }

    #[test]
    fn test_module_path_deep_group() {
        let id = ModuleIdentity::new("a.b.c", "m", "v");
        assert_eq!(module_path(&id), Path::new("a/b/c/m/v"));
    }

    #[test]
    fn test_module_path_is_relative() {
        let id = ModuleIdentity::new("org.embulk", "embulk-core", "0.11.0");
        assert!(module_path(&id).is_relative());
    }

    #[test]
    fn test_module_path_empty_group() {
        let id = ModuleIdentity::new("", "m", "v");
        assert_eq!(module_path(&id), PathBuf::new());

        let id = ModuleIdentity::new("..", "m", "v");
        assert_eq!(module_path(&id), PathBuf::new());
    }

    #[test]
    fn test_module_path_is_deterministic() {
        let id = ModuleIdentity::new("org.jruby", "jruby-complete", "9.1.15.0");
        assert_eq!(module_path(&id), module_path(&id.clone()));
    }

    #[test]
    fn test_default_m2_repo_relative() {
        assert_eq!(default_m2_repo_relative(), Path::new(DEFAULT_M2_REPO_RELATIVE));
    }
}
