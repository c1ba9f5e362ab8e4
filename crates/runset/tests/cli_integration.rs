//! CLI integration tests for the runset command-line interface.
//!
//! Installs run without network access: every test configures a local
//! Maven-layout repository and disables Maven Central.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the runset binary, isolated from the real user config.
fn runset(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("runset").unwrap();
    cmd.env("RUNSET_CONFIG_DIR", config_dir)
        .env_remove("RUNSET_EMBULK_HOME")
        .env_remove("RUNSET_LOG_DIR")
        .env_remove("RUST_LOG");
    cmd
}

/// A project directory with a local repository and a `runset.toml`.
struct Project {
    dir: TempDir,
}

impl Project {
    fn new(extra: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let module_dir = dir.path().join("repo/org/jruby/jruby-complete/9.1.15.0");
        fs::create_dir_all(&module_dir).unwrap();
        fs::write(module_dir.join("jruby-complete-9.1.15.0.jar"), b"jruby").unwrap();
        fs::write(module_dir.join("jruby-complete-9.1.15.0.pom"), b"<project/>").unwrap();
        fs::create_dir_all(dir.path().join("user-config")).unwrap();

        let repo = dir.path().join("repo");
        let config = format!(
            r#"
temporary_dir = {tmp:?}
{extra}
[repositories]
maven_central = false
local = [{repo:?}]
"#,
            tmp = dir.path().join("tmp").display().to_string(),
            repo = repo.display().to_string(),
        );
        fs::write(dir.path().join("runset.toml"), config).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn home(&self) -> PathBuf {
        self.path().join("embulk-home")
    }

    fn cmd(&self) -> Command {
        let mut cmd = runset(&self.path().join("user-config"));
        cmd.current_dir(self.path());
        cmd
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    runset(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn test_version_displays() {
    let dir = TempDir::new().unwrap();
    runset(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("runset"));
}

#[test]
fn test_install_help() {
    let dir = TempDir::new().unwrap();
    runset(dir.path())
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--embulk-home"))
        .stdout(predicate::str::contains("--dry-run"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Path Command Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_path_prints_module_directory() {
    let dir = TempDir::new().unwrap();
    let expected = Path::new("org")
        .join("jruby")
        .join("jruby-complete")
        .join("9.1.15.0");
    runset(dir.path())
        .args(["path", "org.jruby:jruby-complete:9.1.15.0"])
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_path_json_with_file() {
    let dir = TempDir::new().unwrap();
    runset(dir.path())
        .args(["--json", "path", "--file", "g.h:m:1:sources@zip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"notation\": \"g.h:m:1:sources@zip\""))
        .stdout(predicate::str::contains("m-1-sources.zip"));
}

#[test]
fn test_path_rejects_bad_notation() {
    let dir = TempDir::new().unwrap();
    runset(dir.path())
        .args(["path", "not-a-coordinate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Example notations"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Install Command Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_install_without_properties() {
    let project = Project::new(
        r#"
[[artifacts]]
notation = "org.jruby:jruby-complete:9.1.15.0"
"#,
    );

    project
        .cmd()
        .arg("install")
        .arg("--embulk-home")
        .arg(project.home())
        .assert()
        .success()
        .stdout(predicate::str::contains("Installed"));

    let module_dir = project
        .home()
        .join("lib/m2/repository/org/jruby/jruby-complete/9.1.15.0");
    assert!(module_dir.join("jruby-complete-9.1.15.0.jar").is_file());
    assert!(module_dir.join("jruby-complete-9.1.15.0.pom").is_file());
    assert!(!project.home().join("embulk.properties").exists());
}

#[test]
fn test_install_with_properties_and_artifact_property() {
    let project = Project::new(
        r#"
m2_repo_relative = "lib/m2/repository"

[properties]
key = "value"

[[artifacts]]
notation = { group = "org.jruby", name = "jruby-complete", version = "9.1.15.0" }
property = "jruby"
"#,
    );

    project
        .cmd()
        .args(["--json", "install", "--embulk-home"])
        .arg(project.home())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"copied\""));

    let properties = fs::read_to_string(project.home().join("embulk.properties")).unwrap();
    assert!(properties.starts_with("#Generated by the \"org.embulk.embulk-runset\" installer."));
    assert!(properties.contains("key=value"));
    assert!(properties.contains("m2_repo=lib"));
    assert!(properties.contains("jruby=file\\:/"));
}

#[test]
fn test_install_cli_overrides() {
    let project = Project::new("");

    project
        .cmd()
        .args(["install", "-D", "key=from-cli", "--m2-repo-relative", "repo"])
        .args(["--artifact", "org.jruby:jruby-complete:9.1.15.0"])
        .arg("--embulk-home")
        .arg(project.home())
        .assert()
        .success();

    assert!(project
        .home()
        .join("repo/org/jruby/jruby-complete/9.1.15.0/jruby-complete-9.1.15.0.jar")
        .is_file());
    let properties = fs::read_to_string(project.home().join("embulk.properties")).unwrap();
    assert!(properties.contains("key=from-cli"));
    assert!(properties.contains("m2_repo=repo"));
}

#[test]
fn test_install_dry_run_copies_nothing() {
    let project = Project::new(
        r#"
[[artifacts]]
notation = "org.jruby:jruby-complete:9.1.15.0"
"#,
    );

    project
        .cmd()
        .args(["install", "--dry-run", "--embulk-home"])
        .arg(project.home())
        .assert()
        .success()
        .stdout(predicate::str::contains("jruby-complete-9.1.15.0.jar"))
        .stdout(predicate::str::contains("jruby-complete-9.1.15.0.pom"));

    assert!(!project.home().exists());
}

#[test]
fn test_install_requires_embulk_home() {
    let project = Project::new("");

    project
        .cmd()
        .arg("install")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no embulk home configured"));
}

#[test]
fn test_install_unknown_artifact_fails() {
    let project = Project::new("");

    project
        .cmd()
        .args(["install", "--artifact", "org.example:missing:1.0", "--embulk-home"])
        .arg(project.home())
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find org.example:missing:1.0"));

    assert!(!project.home().exists());
}

#[test]
fn test_install_rejects_into() {
    let project = Project::new("");
    let config = project.path().join("custom.toml");
    fs::write(&config, r#"into = "/opt/embulk""#).unwrap();

    project
        .cmd()
        .arg("install")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#"Use "embulk_home" instead"#));
}

#[test]
fn test_install_rejects_absolute_m2_repo() {
    let project = Project::new("");

    project
        .cmd()
        .args(["install", "--m2-repo-relative", "/abs", "--embulk-home"])
        .arg(project.home())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is absolute"));
}
