//! Run command implementation.

use crate::cli::RunArgs;
use crate::output::OutputFormatter;
use crate::pipeline;
use crate::pipeline::Manifest;
use crate::pipeline::StepContext;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use targuard_core::DestDir;

pub fn execute(args: &RunArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let manifest = Manifest::load(&args.manifest)?;
    let selected = manifest.select(&args.scenarios)?;

    let root = DestDir::new(&manifest.root)
        .with_context(|| format!("invalid pipeline root {}", manifest.root.display()))?;
    if !root.exists() {
        bail!("pipeline root {} does not exist", root.as_path().display());
    }

    let ctx = StepContext::new(root);
    let outcomes = pipeline::run_scenarios(&selected, &ctx, args.skip_network);

    formatter.format_scenario_results(&outcomes)?;

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    if failed > 0 {
        bail!("{failed} of {} scenarios failed", outcomes.len());
    }
    Ok(())
}
