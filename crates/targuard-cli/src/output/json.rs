//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::pipeline::ScenarioOutcome;
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::PathBuf;
use targuard_core::ArchiveManifest;
use targuard_core::ExtractionReport;
use targuard_core::Member;
use targuard_core::MemberKind;
use targuard_core::VerificationReport;

pub struct JsonFormatter;

#[derive(Serialize)]
struct MemberOutput {
    path: PathBuf,
    kind: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<PathBuf>,
}

impl From<&Member> for MemberOutput {
    fn from(member: &Member) -> Self {
        let link_target = match &member.kind {
            MemberKind::Symlink { target } | MemberKind::Hardlink { target } => {
                Some(target.clone())
            }
            _ => None,
        };
        Self {
            path: member.path.clone(),
            kind: member.kind.label(),
            size: member.size,
            mode: member.mode,
            link_target,
        }
    }
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn manifest(manifest: &ArchiveManifest) -> Result<()> {
        #[derive(Serialize)]
        struct ManifestOutput {
            compression: String,
            total_entries: usize,
            total_size: u64,
            entries: Vec<MemberOutput>,
        }

        let data = ManifestOutput {
            compression: manifest.compression.to_string(),
            total_entries: manifest.total_entries,
            total_size: manifest.total_size,
            entries: manifest.entries.iter().map(MemberOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, source: &str, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput<'a> {
            source: &'a str,
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            hardlinks_created: usize,
            members_skipped: usize,
            bytes_written: u64,
            duration_ms: u128,
            warnings: &'a [String],
        }

        let data = ExtractionOutput {
            source,
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            hardlinks_created: report.hardlinks_created,
            members_skipped: report.members_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        Self::manifest(manifest)
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, _human_readable: bool) -> Result<()> {
        Self::manifest(manifest)
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        #[derive(Serialize)]
        struct VerificationOutput<'a> {
            safe: bool,
            #[serde(skip_serializing_if = "Option::is_none")]
            issue: Option<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            offending_path: Option<&'a PathBuf>,
            files: usize,
            directories: usize,
            symlinks: usize,
            hardlinks: usize,
            skipped: usize,
            total_bytes: u64,
        }

        let summary = &report.summary;
        let data = VerificationOutput {
            safe: report.is_safe(),
            issue: report.issue.as_deref(),
            offending_path: report.offending_path.as_ref(),
            files: summary.files,
            directories: summary.directories,
            symlinks: summary.symlinks,
            hardlinks: summary.hardlinks,
            skipped: summary.skipped,
            total_bytes: summary.total_bytes,
        };

        if report.is_safe() {
            Self::output(&JsonOutput::success("verify", data))
        } else {
            Self::output(&JsonOutput::failure("verify", data))
        }
    }

    fn format_scenario_results(&self, outcomes: &[ScenarioOutcome]) -> Result<()> {
        if outcomes.iter().any(ScenarioOutcome::is_failure) {
            Self::output(&JsonOutput::failure("run", outcomes))
        } else {
            Self::output(&JsonOutput::success("run", outcomes))
        }
    }
}
