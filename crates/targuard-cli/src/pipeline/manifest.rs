//! Pipeline manifest format.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use targuard_core::security::normalize;

/// A parsed manifest: a root directory and the scenarios run against it.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Root directory. Relative roots are resolved against the manifest's
    /// own directory by [`Manifest::load`].
    pub root: PathBuf,

    /// Scenarios in file order.
    #[serde(rename = "scenario", default)]
    pub scenarios: Vec<Scenario>,
}

/// A named, ordered list of steps.
#[derive(Debug, Deserialize)]
pub struct Scenario {
    pub name: String,

    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

/// One pipeline step. Every path is relative to the manifest root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Step {
    /// Remove paths and wildcard matches if present.
    Clean {
        #[serde(default)]
        paths: Vec<PathBuf>,
        #[serde(default)]
        patterns: Vec<String>,
    },
    /// Download an archive and extract it into `into`.
    Fetch { url: String, into: PathBuf },
    /// Move every child of `from` into `to`.
    MoveContents { from: PathBuf, to: PathBuf },
    /// Run a program; a non-zero exit fails the step.
    Run {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        cwd: Option<PathBuf>,
    },
    /// Every listed path must exist.
    Expect { paths: Vec<PathBuf> },
}

impl Step {
    /// Manifest `kind` of this step.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Clean { .. } => "clean",
            Self::Fetch { .. } => "fetch",
            Self::MoveContents { .. } => "move-contents",
            Self::Run { .. } => "run",
            Self::Expect { .. } => "expect",
        }
    }

    /// Returns `true` if the step needs network access.
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

impl Scenario {
    /// Returns `true` if any step needs network access.
    pub fn needs_network(&self) -> bool {
        self.steps.iter().any(Step::is_network)
    }
}

impl Manifest {
    /// Parses a manifest from TOML text without resolving the root.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed TOML, unknown step kinds, or duplicate
    /// scenario names.
    pub fn parse(text: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(text).context("invalid pipeline manifest")?;

        let mut seen = HashSet::new();
        for scenario in &manifest.scenarios {
            if !seen.insert(scenario.name.as_str()) {
                bail!("duplicate scenario name '{}'", scenario.name);
            }
        }

        Ok(manifest)
    }

    /// Reads and parses the manifest at `path`, resolving `root` against the
    /// manifest's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let mut manifest = Self::parse(&text)
            .with_context(|| format!("failed to load manifest {}", path.display()))?;

        let base = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let root = std::path::absolute(base.join(&manifest.root))
            .with_context(|| format!("failed to resolve root {}", manifest.root.display()))?;
        manifest.root = normalize(&root);

        Ok(manifest)
    }

    /// Scenarios to run: all of them when `names` is empty, otherwise the
    /// named ones in manifest order.
    ///
    /// # Errors
    ///
    /// Returns an error if a requested name does not exist.
    pub fn select(&self, names: &[String]) -> Result<Vec<&Scenario>> {
        if let Some(missing) = names
            .iter()
            .find(|name| !self.scenarios.iter().any(|s| &s.name == *name))
        {
            bail!("no scenario named '{missing}'");
        }

        Ok(self
            .scenarios
            .iter()
            .filter(|s| names.is_empty() || names.contains(&s.name))
            .collect())
    }
}
