//! Path command - shows where a module lives in a Maven-layout repository.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use runset_core::module_path;
use runset_maven::Coordinate;

use super::Context;

/// Arguments for the path command.
#[derive(Args, Debug)]
pub struct PathArgs {
    /// Maven coordinate (group:name:version[:classifier][@ext])
    pub notation: String,

    /// Include the artifact file name
    #[arg(short, long)]
    pub file: bool,
}

#[derive(Debug, Serialize)]
struct PathOutput {
    notation: String,
    path: String,
}

/// Run the path command.
pub fn run(args: PathArgs, ctx: &Context) -> Result<()> {
    let coordinate = Coordinate::parse(&args.notation)?;
    let mut path = module_path(&coordinate.module()?);
    if args.file {
        path.push(coordinate.artifact_file_name());
    }

    if ctx.json_output {
        let output = PathOutput {
            notation: args.notation,
            path: path.display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
