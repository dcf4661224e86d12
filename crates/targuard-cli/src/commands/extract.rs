//! Extract command implementation.

use super::output_dir_or_cwd;
use crate::cli::ExtractArgs;
use crate::cli::ExtractOptions;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use targuard_core::AllowedMembers;
use targuard_core::ExtractConfig;
use targuard_core::NoopProgress;
use targuard_core::extract_archive_with_progress;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter, show_progress: bool) -> Result<()> {
    let output_dir = output_dir_or_cwd(args.output_dir.as_ref())?;
    let config = extract_config(&args.options);

    let report = if show_progress {
        let mut progress = CliProgress::new("Extracting");
        add_archive_context(
            extract_archive_with_progress(&args.archive, &output_dir, &config, &mut progress),
            args.archive.display(),
        )?
    } else {
        let mut noop = NoopProgress;
        add_archive_context(
            extract_archive_with_progress(&args.archive, &output_dir, &config, &mut noop),
            args.archive.display(),
        )?
    };

    formatter.format_extraction_result(&args.archive.display().to_string(), &report)?;

    Ok(())
}

pub(super) fn extract_config(options: &ExtractOptions) -> ExtractConfig {
    ExtractConfig {
        allowed: AllowedMembers {
            symlinks: !options.no_symlinks,
            hardlinks: !options.no_hardlinks,
        },
        preserve_permissions: !options.no_preserve_permissions,
        overwrite: !options.no_overwrite,
    }
}
