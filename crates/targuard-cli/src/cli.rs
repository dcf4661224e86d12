//! CLI argument parsing using clap.

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "targuard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract archive contents
    Extract(ExtractArgs),
    /// List archive contents without extraction
    List(ListArgs),
    /// Check that an archive can be extracted safely
    Verify(VerifyArgs),
    /// Download an archive and extract it
    Fetch(FetchArgs),
    /// Run pipeline scenarios from a manifest
    Run(RunArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    #[command(flatten)]
    pub options: ExtractOptions,
}

/// Extraction policy flags shared by `extract` and `fetch`.
#[derive(clap::Args, Debug, Default)]
pub struct ExtractOptions {
    /// Reject archives containing symlinks
    #[arg(long)]
    pub no_symlinks: bool,

    /// Reject archives containing hardlinks
    #[arg(long)]
    pub no_hardlinks: bool,

    /// Ignore permission bits stored in the archive
    #[arg(long)]
    pub no_preserve_permissions: bool,

    /// Fail instead of replacing existing files
    #[arg(long)]
    pub no_overwrite: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Show detailed member information
    #[arg(short, long)]
    pub long: bool,

    /// Show sizes in human-readable format
    #[arg(short = 'H', long)]
    pub human_readable: bool,
}

#[derive(clap::Args)]
pub struct VerifyArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// Directory the archive would be extracted into (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// URL of a tar or tar.gz archive
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output directory (default: current directory)
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    #[command(flatten)]
    pub options: ExtractOptions,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to the pipeline manifest (TOML)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Run only the named scenario (can be repeated)
    #[arg(long = "scenario", short = 's', value_name = "NAME")]
    pub scenarios: Vec<String>,

    /// Skip scenarios that download archives
    #[arg(long)]
    pub skip_network: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_name = "SHELL", value_enum)]
    pub shell: Shell,
}
