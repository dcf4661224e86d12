//! Scenario pipelines: clean, fetch, move, run and check a tutorial tree.
//!
//! A manifest names a root directory and scenarios made of steps. Every path
//! a step touches is resolved inside the root with the same containment rule
//! the extractor applies to archive members.

pub mod manifest;
pub mod pattern;
pub mod steps;

pub use manifest::Manifest;
pub use manifest::Scenario;
pub use manifest::Step;
pub use steps::StepContext;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use targuard_core::DestDir;
use targuard_core::SafePath;
use targuard_core::security::symlink::verify_parent_not_symlink;
use tracing::info;
use tracing::warn;

/// Resolves `relative` inside `root` lexically.
///
/// # Errors
///
/// Returns an error if the path is absolute or climbs out of `root`.
pub fn resolve(root: &DestDir, relative: &Path) -> Result<PathBuf> {
    let safe = SafePath::validate(relative, root)
        .with_context(|| format!("path '{}' is outside the pipeline root", relative.display()))?;
    Ok(root.join(&safe))
}

/// Like [`resolve`], and also fails if an existing ancestor of the path
/// inside `root` is a symlink. Used before removing or moving anything.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_for_write(root: &DestDir, relative: &Path) -> Result<PathBuf> {
    let safe = SafePath::validate(relative, root)
        .with_context(|| format!("path '{}' is outside the pipeline root", relative.display()))?;
    verify_parent_not_symlink(&safe, root)
        .with_context(|| format!("path '{}' goes through a symlink", relative.display()))?;
    Ok(root.join(&safe))
}

/// Like [`resolve_for_write`] for a directory whose entries are read,
/// removed or moved: the path itself may not be a symlink either.
///
/// # Errors
///
/// See [`resolve_for_write`].
pub fn resolve_dir_for_write(root: &DestDir, relative: &Path) -> Result<PathBuf> {
    let dir = resolve_for_write(root, relative)?;
    if fs::symlink_metadata(&dir).is_ok_and(|metadata| metadata.file_type().is_symlink()) {
        bail!("directory '{}' is a symlink", relative.display());
    }
    Ok(dir)
}

/// Final state of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed {
        /// 1-based index of the failing step.
        step: usize,
        kind: &'static str,
        error: String,
    },
    Skipped {
        reason: String,
    },
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: ScenarioStatus,
    pub steps_completed: usize,
    pub duration_ms: u128,
}

impl ScenarioOutcome {
    pub const fn is_failure(&self) -> bool {
        matches!(self.status, ScenarioStatus::Failed { .. })
    }
}

/// Runs `scenario` step by step, stopping at the first failing step.
pub fn run_scenario(scenario: &Scenario, ctx: &StepContext) -> ScenarioOutcome {
    let start = Instant::now();
    info!("Running scenario {}", scenario.name);

    let mut completed = 0;
    let mut status = ScenarioStatus::Passed;

    for (index, step) in scenario.steps.iter().enumerate() {
        if let Err(e) = steps::execute(step, ctx) {
            warn!(
                "Scenario {} failed at step {} ({}): {e:#}",
                scenario.name,
                index + 1,
                step.kind()
            );
            status = ScenarioStatus::Failed {
                step: index + 1,
                kind: step.kind(),
                error: format!("{e:#}"),
            };
            break;
        }
        completed += 1;
    }

    ScenarioOutcome {
        name: scenario.name.clone(),
        status,
        steps_completed: completed,
        duration_ms: start.elapsed().as_millis(),
    }
}

/// Runs the selected scenarios in manifest order. A failing scenario does
/// not stop the ones after it.
pub fn run_scenarios(
    scenarios: &[&Scenario],
    ctx: &StepContext,
    skip_network: bool,
) -> Vec<ScenarioOutcome> {
    scenarios
        .iter()
        .map(|scenario| {
            if skip_network && scenario.needs_network() {
                info!("Skipping scenario {} (needs network)", scenario.name);
                ScenarioOutcome {
                    name: scenario.name.clone(),
                    status: ScenarioStatus::Skipped {
                        reason: "needs network".to_string(),
                    },
                    steps_completed: 0,
                    duration_ms: 0,
                }
            } else {
                run_scenario(scenario, ctx)
            }
        })
        .collect()
}
