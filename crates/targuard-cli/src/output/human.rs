//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::pipeline::ScenarioOutcome;
use crate::pipeline::ScenarioStatus;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use targuard_core::ArchiveManifest;
use targuard_core::ExtractionReport;
use targuard_core::Member;
use targuard_core::MemberKind;
use targuard_core::VerificationReport;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn type_char(kind: &MemberKind) -> char {
        match kind {
            MemberKind::File => '-',
            MemberKind::Directory => 'd',
            MemberKind::Symlink { .. } => 'l',
            MemberKind::Hardlink { .. } => 'h',
            MemberKind::Other(_) => '?',
        }
    }

    fn long_line(member: &Member, human_readable: bool) -> String {
        let size_str = if human_readable {
            humanize_bytes(member.size)
        } else {
            member.size.to_string()
        };

        let mode_str = member
            .mode
            .map_or_else(|| "-".to_string(), |m| format!("{m:o}"));

        let link = match &member.kind {
            MemberKind::Symlink { target } => format!(" -> {}", target.display()),
            MemberKind::Hardlink { target } => format!(" link to {}", target.display()),
            _ => String::new(),
        };

        format!(
            "{}{:<6} {:>10}  {}{link}",
            Self::type_char(&member.kind),
            mode_str,
            size_str,
            member.path.display()
        )
    }

    fn line(&self, text: &str) {
        let _ = self.term.write_line(text);
    }

    fn warning(&self, message: &str) {
        if self.use_colors {
            self.line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            self.line(&format!("WARNING: {message}"));
        }
    }

    fn check_mark(&self) -> String {
        if self.use_colors {
            format!("{} ", style("✓").green().bold())
        } else {
            String::new()
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, source: &str, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line(&format!("{}Extraction complete: {source}", self.check_mark()));
        self.line(&format!(
            "  Files extracted: {}",
            Self::format_number(report.files_extracted)
        ));
        self.line(&format!("  Directories: {}", report.directories_created));
        self.line(&format!(
            "  Total size: {}",
            humanize_bytes(report.bytes_written)
        ));

        if self.verbose {
            self.line(&format!("  Symlinks: {}", report.symlinks_created));
            self.line(&format!("  Hardlinks: {}", report.hardlinks_created));
            self.line(&format!("  Skipped: {}", report.members_skipped));
            self.line(&format!("  Duration: {:?}", report.duration));
        }

        for warning in &report.warnings {
            self.warning(warning);
        }

        Ok(())
    }

    fn format_manifest_short(&self, manifest: &ArchiveManifest) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            self.line(&format!("{}", entry.path.display()));
        }

        Ok(())
    }

    fn format_manifest_long(&self, manifest: &ArchiveManifest, human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in &manifest.entries {
            self.line(&Self::long_line(entry, human_readable));
        }

        self.line("");
        self.line(&format!(
            "Total: {} members, {} ({})",
            Self::format_number(manifest.total_entries),
            humanize_bytes(manifest.total_size),
            manifest.compression
        ));

        Ok(())
    }

    fn format_verification_report(&self, report: &VerificationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        let status = match (report.is_safe(), self.use_colors) {
            (true, true) => style("SAFE").green().bold().to_string(),
            (false, true) => style("UNSAFE").red().bold().to_string(),
            (true, false) => "SAFE".to_string(),
            (false, false) => "UNSAFE".to_string(),
        };
        self.line(&format!("Archive verification: {status}"));

        if let Some(issue) = &report.issue {
            self.line(&format!("  Issue: {issue}"));
        }
        if let Some(path) = &report.offending_path {
            self.line(&format!("  Member: {}", path.display()));
        }

        if report.is_safe() {
            let summary = &report.summary;
            self.line(&format!("  Files: {}", Self::format_number(summary.files)));
            self.line(&format!("  Directories: {}", summary.directories));
            self.line(&format!("  Symlinks: {}", summary.symlinks));
            self.line(&format!("  Hardlinks: {}", summary.hardlinks));
            if summary.skipped > 0 {
                self.line(&format!("  Skipped: {}", summary.skipped));
            }
            self.line(&format!("  Total size: {}", humanize_bytes(summary.total_bytes)));
        }

        Ok(())
    }

    fn format_scenario_results(&self, outcomes: &[ScenarioOutcome]) -> Result<()> {
        // Failures are shown even in quiet mode.
        for outcome in outcomes {
            let (label, detail) = match &outcome.status {
                ScenarioStatus::Passed => ("PASS", String::new()),
                ScenarioStatus::Skipped { reason } => ("SKIP", format!(" ({reason})")),
                ScenarioStatus::Failed { step, kind, error } => {
                    ("FAIL", format!(": step {step} ({kind}): {error}"))
                }
            };
            if self.quiet && label != "FAIL" {
                continue;
            }

            let label = if self.use_colors {
                match label {
                    "PASS" => style(label).green().bold().to_string(),
                    "SKIP" => style(label).yellow().to_string(),
                    _ => style(label).red().bold().to_string(),
                }
            } else {
                label.to_string()
            };

            self.line(&format!("{label} {}{detail}", outcome.name));
            if self.verbose {
                self.line(&format!(
                    "     {} steps, {} ms",
                    outcome.steps_completed, outcome.duration_ms
                ));
            }
        }

        if !self.quiet {
            let failed = outcomes.iter().filter(|o| o.is_failure()).count();
            self.line("");
            self.line(&format!(
                "{} scenarios, {} failed",
                outcomes.len(),
                failed
            ));
        }

        Ok(())
    }
}
