//! Install command - resolves artifacts and installs a run set.

use std::path::PathBuf;

use anyhow::{Context as _, Result, anyhow};
use clap::Args;
use console::{Style, style};
use serde::Serialize;
use tracing::warn;

use runset_config::{ArtifactConfig, LoadedConfig, RepositoriesConfig, RunsetConfig};
use runset_core::{CopyInstruction, FsCopyExecutor, InstallRunSet, Notation};
use runset_maven::{MavenResolver, Repository};

use super::Context;

/// Arguments for the install command.
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Config file to use instead of the discovered ones
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding runset.toml (default: current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Directory to install into
    #[arg(long)]
    pub embulk_home: Option<PathBuf>,

    /// Repository location relative to the embulk home
    #[arg(long)]
    pub m2_repo_relative: Option<String>,

    /// Set an embulk.properties entry
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<(String, String)>,

    /// Maven coordinate of an artifact to install
    #[arg(long = "artifact", value_name = "NOTATION")]
    pub artifacts: Vec<String>,

    /// Show what would be installed without copying anything
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct PlanOutput {
    embulk_home: PathBuf,
    plan: Vec<CopyInstruction>,
    properties: Vec<(String, String)>,
}

/// Run the install command.
pub fn run(args: InstallArgs, ctx: &Context) -> Result<()> {
    let loaded = match &args.config {
        Some(path) => runset_config::load_explicit(path)?,
        None => runset_config::load_config(args.project_dir.as_deref())?,
    };
    let config = apply_args(loaded, &args)?;

    let resolver = build_resolver(&config.repositories)?;
    let mut install = match &config.temporary_dir {
        Some(dir) => InstallRunSet::with_temporary_dir(resolver, dir),
        None => InstallRunSet::new(resolver),
    };

    let home = config.embulk_home.as_ref().ok_or_else(|| {
        anyhow!("no embulk home configured; pass --embulk-home or set embulk_home in runset.toml")
    })?;
    install.embulk_home(home)?;
    if let Some(dir) = &config.m2_repo_relative {
        install.m2_repo_relative(dir)?;
    }
    for (key, value) in &config.properties {
        install.embulk_system_property(key, value)?;
    }
    for artifact in &config.artifacts {
        let notation = Notation::new(artifact.notation.clone());
        match &artifact.property {
            Some(key) => install.artifact_as_property(notation, key)?,
            None => install.artifact(notation)?,
        };
    }

    if args.dry_run {
        print_plan(&install, ctx)
    } else {
        let report = install.install(&FsCopyExecutor)?;
        if ctx.json_output {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let dim = Style::new().dim();
            if ctx.verbose {
                for path in &report.copy.copied {
                    println!("  {} {}", dim.apply_to("copied"), path.display());
                }
                for path in &report.copy.skipped {
                    println!("  {} {}", dim.apply_to("skipped"), path.display());
                }
            }
            println!(
                "{} {} file(s) into {}",
                style("Installed").green().bold(),
                report.copy.copied.len(),
                report.embulk_home.display()
            );
        }
        Ok(())
    }
}

/// Layer command-line arguments over the loaded configuration.
fn apply_args(loaded: LoadedConfig, args: &InstallArgs) -> Result<RunsetConfig> {
    for warning in &loaded.warnings {
        warn!("{warning}");
    }
    let mut config = loaded.config;

    if let Some(home) = &args.embulk_home {
        let home = std::path::absolute(home)
            .with_context(|| format!("cannot resolve embulk home {}", home.display()))?;
        config.embulk_home = Some(home);
    }
    if let Some(dir) = &args.m2_repo_relative {
        config.m2_repo_relative = Some(dir.clone());
    }
    for (key, value) in &args.properties {
        config.properties.insert(key.clone(), value.clone());
    }
    config
        .artifacts
        .extend(args.artifacts.iter().map(|a| ArtifactConfig::new(a.as_str())));
    Ok(config)
}

/// Repositories in search order: `~/.m2`, local, remote, Maven Central.
fn build_resolver(repositories: &RepositoriesConfig) -> Result<MavenResolver> {
    let mut resolver = MavenResolver::new()?.with_timeout(repositories.timeout());
    if let Some(dir) = &repositories.cache_dir {
        resolver = resolver.with_cache_dir(dir);
    }

    if repositories.maven_local() {
        match Repository::maven_local() {
            Some(repository) => resolver = resolver.with_repository(repository),
            None => warn!("maven_local is enabled but no home directory is known"),
        }
    }
    resolver = resolver.with_repositories(repositories.local.iter().map(Repository::local));
    for url in &repositories.remote {
        resolver = resolver.with_repository(Repository::remote(url)?);
    }
    if repositories.maven_central() {
        resolver = resolver.with_repository(Repository::maven_central()?);
    }
    Ok(resolver)
}

fn print_plan(install: &InstallRunSet<MavenResolver>, ctx: &Context) -> Result<()> {
    let embulk_home = install
        .embulk_home_dir()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let output = PlanOutput {
        embulk_home,
        plan: install.plan(),
        properties: install.properties().entries(),
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    println!();
    println!("{}", style("Run set plan").bold());
    println!("{}", dim.apply_to("─".repeat(40)));
    println!("  {} {}", dim.apply_to("Embulk home:"), output.embulk_home.display());
    println!();
    for instruction in &output.plan {
        if instruction.destination.ends_with(runset_core::EMBULK_PROPERTIES_FILE) {
            println!("  {}", instruction.destination.display());
        } else {
            println!(
                "  {} {} {}",
                instruction.destination.display(),
                dim.apply_to("<-"),
                instruction.source.display()
            );
        }
    }
    if !output.properties.is_empty() {
        println!();
        println!("  {}", dim.apply_to("embulk.properties:"));
        for (key, value) in &output.properties {
            println!("    {key}={value}");
        }
    }
    println!();
    Ok(())
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{s}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
