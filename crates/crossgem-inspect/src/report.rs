//! Batch verification report.

use std::fmt;
use std::path::PathBuf;

use crossgem_targets::{PlatformDescriptor, PlatformTag};
use serde::Serialize;

use crate::error::VerifyError;
use crate::verifier::VerifiedArtifact;

/// Outcome of verifying one artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome {
    Passed {
        #[serde(flatten)]
        verified: VerifiedArtifact,
    },
    Failed {
        /// Mismatch category, e.g. `library-mismatch`.
        category: String,
        message: String,
    },
}

/// One line of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactOutcome {
    pub artifact: PathBuf,
    pub platform: PlatformTag,
    pub version: String,
    pub outcome: Outcome,
}

impl ArtifactOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed { .. })
    }
}

/// Results of verifying a set of artifacts.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub artifacts: Vec<ArtifactOutcome>,
}

impl BatchReport {
    pub fn record(
        &mut self,
        descriptor: &PlatformDescriptor,
        artifact: PathBuf,
        result: Result<VerifiedArtifact, VerifyError>,
    ) {
        let outcome = match result {
            Ok(verified) => Outcome::Passed { verified },
            Err(e) => Outcome::Failed {
                category: e.category().to_string(),
                message: e.to_string(),
            },
        };
        self.artifacts.push(ArtifactOutcome {
            artifact,
            platform: descriptor.platform(),
            version: descriptor.semantic_version().to_string(),
            outcome,
        });
    }

    pub fn total(&self) -> usize {
        self.artifacts.len()
    }

    pub fn passed(&self) -> usize {
        self.artifacts.iter().filter(|a| a.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Artifact Verification ===")?;
        for entry in &self.artifacts {
            match &entry.outcome {
                Outcome::Passed { .. } => writeln!(
                    f,
                    "  PASS  {:<14} {:<8} {}",
                    entry.platform,
                    entry.version,
                    entry.artifact.display()
                )?,
                Outcome::Failed { message, .. } => {
                    writeln!(
                        f,
                        "  FAIL  {:<14} {:<8} {}",
                        entry.platform,
                        entry.version,
                        entry.artifact.display()
                    )?;
                    writeln!(f, "        {message}")?;
                }
            }
        }
        writeln!(f)?;
        write!(
            f,
            "Total: {}  Passed: {}  Failed: {}",
            self.total(),
            self.passed(),
            self.failed()
        )
    }
}
