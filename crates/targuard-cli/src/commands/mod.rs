//! Subcommand implementations.

pub mod completion;
pub mod extract;
pub mod fetch;
pub mod list;
pub mod run;
pub mod verify;

use anyhow::Context;
use anyhow::Result;
use std::env;
use std::path::PathBuf;

/// The given output directory, or the current directory.
fn output_dir_or_cwd(output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    match output_dir {
        Some(dir) => Ok(dir.clone()),
        None => env::current_dir().context("failed to get current directory"),
    }
}
