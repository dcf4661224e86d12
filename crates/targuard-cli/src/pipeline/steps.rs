//! Step execution.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use targuard_core::DestDir;
use targuard_core::ExtractConfig;
use targuard_core::extract_bytes;
use tracing::debug;
use tracing::info;

use super::Step;
use super::pattern;
use super::resolve;
use super::resolve_dir_for_write;
use super::resolve_for_write;
use crate::error::add_archive_context;
use crate::fetch::FetchConfig;
use crate::fetch::fetch_archive;

/// Everything a step needs besides its own fields.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub root: DestDir,
    pub fetch: FetchConfig,
    pub extract: ExtractConfig,
}

impl StepContext {
    pub fn new(root: DestDir) -> Self {
        Self {
            root,
            fetch: FetchConfig::default(),
            extract: ExtractConfig::default(),
        }
    }
}

/// Executes one step against the manifest root.
///
/// # Errors
///
/// Returns an error if the step fails; the caller stops the scenario.
pub fn execute(step: &Step, ctx: &StepContext) -> Result<()> {
    match step {
        Step::Clean { paths, patterns } => clean(ctx, paths, patterns),
        Step::Fetch { url, into } => fetch(ctx, url, into),
        Step::MoveContents { from, to } => move_contents(ctx, from, to),
        Step::Run { program, args, cwd } => run(ctx, program, args, cwd.as_deref()),
        Step::Expect { paths } => expect(ctx, paths),
    }
}

fn clean(ctx: &StepContext, paths: &[PathBuf], patterns: &[String]) -> Result<()> {
    let mut targets = Vec::new();
    for path in paths {
        let target = resolve_for_write(&ctx.root, path)?;
        if target == ctx.root.as_path() {
            bail!("refusing to remove the pipeline root");
        }
        targets.push(target);
    }
    for pat in patterns {
        targets.extend(pattern::expand(&ctx.root, pat)?);
    }

    let mut removed = 0;
    for target in &targets {
        if remove_path(target)? {
            removed += 1;
        }
    }

    info!("Cleaned {removed} of {} paths", targets.len());
    Ok(())
}

/// Removes a file, symlink, or directory tree. Returns `false` if nothing
/// was there. Symlinks are unlinked, never followed.
fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e).with_context(|| format!("failed to stat {}", path.display())),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.with_context(|| format!("failed to remove {}", path.display()))?;

    debug!("Removed {}", path.display());
    Ok(true)
}

fn fetch(ctx: &StepContext, url: &str, into: &Path) -> Result<()> {
    let dest = resolve_dir_for_write(&ctx.root, into)?;
    let body = fetch_archive(url, &ctx.fetch)?;
    let report = add_archive_context(extract_bytes(body, &dest, &ctx.extract), url)?;

    info!(
        "Extracted {} files from {url} into {}",
        report.files_extracted,
        dest.display()
    );
    Ok(())
}

fn move_contents(ctx: &StepContext, from: &Path, to: &Path) -> Result<()> {
    let source = resolve_dir_for_write(&ctx.root, from)?;
    let target = resolve_dir_for_write(&ctx.root, to)?;

    let entries = fs::read_dir(&source)
        .with_context(|| format!("failed to read directory {}", source.display()))?;
    fs::create_dir_all(&target)
        .with_context(|| format!("failed to create directory {}", target.display()))?;

    let mut moved = 0;
    for entry in entries {
        let entry = entry?;
        let destination = target.join(entry.file_name());
        if fs::symlink_metadata(&destination).is_ok() {
            bail!("{} already exists", destination.display());
        }
        fs::rename(entry.path(), &destination).with_context(|| {
            format!(
                "failed to move {} to {}",
                entry.path().display(),
                destination.display()
            )
        })?;
        moved += 1;
    }

    info!(
        "Moved {moved} entries from {} to {}",
        source.display(),
        target.display()
    );
    Ok(())
}

fn run(ctx: &StepContext, program: &str, args: &[String], cwd: Option<&Path>) -> Result<()> {
    let dir = resolve(&ctx.root, cwd.unwrap_or_else(|| Path::new("")))?;
    let command_line = std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");

    info!("Running `{command_line}` in {}", dir.display());
    // Child stdout goes to stderr so our own stdout stays parseable.
    let status = Command::new(program)
        .args(args)
        .current_dir(&dir)
        .stdin(Stdio::null())
        .stdout(io::stderr())
        .status()
        .with_context(|| format!("failed to start `{command_line}`"))?;

    if !status.success() {
        bail!("`{command_line}` exited with {status}");
    }
    Ok(())
}

fn expect(ctx: &StepContext, paths: &[PathBuf]) -> Result<()> {
    let mut missing = Vec::new();
    for path in paths {
        let full = resolve(&ctx.root, path)?;
        if !full.try_exists().unwrap_or(false) {
            missing.push(path.display().to_string());
        }
    }

    if !missing.is_empty() {
        bail!("missing expected paths: {}", missing.join(", "));
    }
    debug!("All {} expected paths present", paths.len());
    Ok(())
}
