//! `crossgem.toml` parsing and project configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use crossgem_inspect::{ObjdumpInspector, Verifier};
use crossgem_targets::DEFAULT_ARTIFACT_TEMPLATE;
use serde::{Deserialize, Serialize};

/// Name of the configuration file searched for from the working directory up.
pub const CONFIG_FILE: &str = "crossgem.toml";

/// Catalog file used when neither the command line nor the config names one.
pub const DEFAULT_CATALOG: &str = ".cross_rubies";

/// The top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossgemConfig {
    /// Catalog location.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Staged artifact layout.
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// Inspection tool settings.
    #[serde(default)]
    pub inspect: InspectConfig,
}

/// Catalog section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogConfig {
    /// Path to the `version:host` catalog, relative to the project directory.
    #[serde(default)]
    pub path: Option<String>,
}

/// Artifacts section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArtifactsConfig {
    /// Directory the artifact template is resolved against.
    #[serde(default)]
    pub root: Option<String>,
    /// Path template with `{platform}`, `{minor}` and `{version}` placeholders.
    #[serde(default)]
    pub template: Option<String>,
}

/// Inspect section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InspectConfig {
    /// Base tool name; the platform's toolchain prefix is prepended.
    #[serde(default)]
    pub tool: Option<String>,
    /// Directory containing the cross tools.
    #[serde(default)]
    pub tool_dir: Option<String>,
    /// Per-invocation timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl CrossgemConfig {
    /// Search upward from `start_dir` for a `crossgem.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let config: CrossgemConfig = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                tracing::debug!(path = %candidate.display(), "loaded configuration");
                return Ok(Some((config, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing crossgem.toml")
    }

    /// Catalog path, with a command-line override taking precedence.
    pub fn catalog_path(&self, project_dir: &Path, cli: Option<&Path>) -> PathBuf {
        match cli {
            Some(path) => path.to_path_buf(),
            None => project_dir.join(self.catalog.path.as_deref().unwrap_or(DEFAULT_CATALOG)),
        }
    }

    /// Artifact root, with a command-line override taking precedence.
    pub fn artifact_root(&self, project_dir: &Path, cli: Option<&Path>) -> PathBuf {
        match cli {
            Some(path) => path.to_path_buf(),
            None => match self.artifacts.root.as_deref() {
                Some(root) => project_dir.join(root),
                None => project_dir.to_path_buf(),
            },
        }
    }

    pub fn artifact_template(&self) -> &str {
        self.artifacts
            .template
            .as_deref()
            .unwrap_or(DEFAULT_ARTIFACT_TEMPLATE)
    }

    pub fn tool_name(&self) -> &str {
        self.inspect.tool.as_deref().unwrap_or("objdump")
    }

    pub fn timeout(&self, cli_secs: Option<u64>) -> Duration {
        cli_secs
            .or(self.inspect.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(ObjdumpInspector::DEFAULT_TIMEOUT)
    }

    /// Build an `objdump`-backed verifier from the configuration.
    pub fn verifier(
        &self,
        project_dir: &Path,
        cli_tool_dir: Option<&Path>,
        cli_timeout_secs: Option<u64>,
    ) -> Verifier<ObjdumpInspector> {
        let inspector = ObjdumpInspector::new(self.timeout(cli_timeout_secs));
        let verifier = Verifier::new(inspector).with_tool_name(self.tool_name());
        let tool_dir = match cli_tool_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => self.inspect.tool_dir.as_deref().map(|d| project_dir.join(d)),
        };
        match tool_dir {
            Some(dir) => verifier.with_tool_dir(dir),
            None => verifier,
        }
    }
}
