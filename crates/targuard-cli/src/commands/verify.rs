//! Verify command implementation

use super::output_dir_or_cwd;
use crate::cli::VerifyArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use anyhow::bail;
use targuard_core::ExtractConfig;
use targuard_core::verify_archive;

pub fn execute(args: &VerifyArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output_dir = output_dir_or_cwd(args.output_dir.as_ref())?;

    let report = add_archive_context(
        verify_archive(&args.archive, &output_dir, &ExtractConfig::default()),
        args.archive.display(),
    )?;

    formatter.format_verification_report(&report)?;

    if !report.is_safe() {
        bail!("Archive '{}' is not safe to extract", args.archive.display());
    }
    Ok(())
}
