//! Fetch command implementation.

use super::extract::extract_config;
use super::output_dir_or_cwd;
use crate::cli::FetchArgs;
use crate::error::add_archive_context;
use crate::fetch::FetchConfig;
use crate::fetch::fetch_archive;
use crate::output::OutputFormatter;
use anyhow::Result;
use std::time::Duration;
use targuard_core::extract_bytes;

pub fn execute(args: &FetchArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output_dir = output_dir_or_cwd(args.output_dir.as_ref())?;
    let config = FetchConfig {
        timeout: Duration::from_secs(args.timeout),
        ..FetchConfig::default()
    };

    let body = fetch_archive(&args.url, &config)?;
    let report = add_archive_context(
        extract_bytes(body, &output_dir, &extract_config(&args.options)),
        &args.url,
    )?;

    formatter.format_extraction_result(&args.url, &report)?;

    Ok(())
}
