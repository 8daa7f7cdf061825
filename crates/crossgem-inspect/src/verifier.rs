//! Comparing an artifact's dump against its platform's expectations.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crossgem_targets::{ExpectationSet, OsFamily, PlatformDescriptor, PlatformTag};
use serde::Serialize;

use crate::dump::{ArtifactDump, DumpParser};
use crate::error::VerifyError;
use crate::inspector::Inspector;
use crate::report::BatchReport;

/// Confirmation record for an artifact that matched every expectation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedArtifact {
    pub artifact: PathBuf,
    pub platform: PlatformTag,
    pub libraries: BTreeSet<String>,
    /// Linux only; empty on Windows.
    pub symbol_versions: BTreeMap<String, String>,
}

/// Checks compiled artifacts against platform expectation tables.
#[derive(Debug, Clone)]
pub struct Verifier<I> {
    inspector: I,
    parser: DumpParser,
    tool_name: String,
    tool_dir: Option<PathBuf>,
}

impl<I: Inspector> Verifier<I> {
    pub fn new(inspector: I) -> Self {
        Self {
            inspector,
            parser: DumpParser::default(),
            tool_name: "objdump".to_string(),
            tool_dir: None,
        }
    }

    /// Base tool name, prefixed per platform (default `objdump`).
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    /// Directory holding the cross toolchain; the tool is looked up on
    /// `PATH` when unset.
    pub fn with_tool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    pub fn with_parser(mut self, parser: DumpParser) -> Self {
        self.parser = parser;
        self
    }

    /// Fully-qualified inspection tool for a platform.
    pub fn tool_path(&self, descriptor: &PlatformDescriptor) -> String {
        let tool = descriptor.tool(&self.tool_name);
        match &self.tool_dir {
            Some(dir) => dir.join(tool).display().to_string(),
            None => tool,
        }
    }

    /// Inspect `artifact` and check it against `descriptor`.
    ///
    /// Expectations are resolved before the tool runs, so descriptor errors
    /// never cost a subprocess.
    pub fn verify(
        &self,
        descriptor: &PlatformDescriptor,
        artifact: &Path,
    ) -> Result<VerifiedArtifact, VerifyError> {
        let expected = descriptor.expectations()?;
        let tool = self.tool_path(descriptor);
        let text = self.inspector.dump(&tool, artifact)?;
        let dump = self.parser.parse(&text, descriptor.family());
        tracing::debug!(
            artifact = %artifact.display(),
            format = ?dump.declared_format,
            libraries = ?dump.required_libraries,
            "parsed artifact dump"
        );
        let verified = check(&expected, artifact, &dump)?;
        tracing::info!("{}: looks good", artifact.display());
        Ok(verified)
    }

    /// Verify every `(descriptor, artifact)` pair. A failure is recorded and
    /// the batch moves on to the next artifact.
    pub fn verify_all<'a>(
        &self,
        jobs: impl IntoIterator<Item = (&'a PlatformDescriptor, PathBuf)>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for (descriptor, artifact) in jobs {
            let result = self.verify(descriptor, &artifact);
            if let Err(e) = &result {
                tracing::warn!("{}: {e}", artifact.display());
            }
            report.record(descriptor, artifact, result);
        }
        report
    }
}

/// Compare a parsed dump against an expectation set. Stops at the first
/// mismatch.
pub fn check(
    expected: &ExpectationSet,
    artifact: &Path,
    dump: &ArtifactDump,
) -> Result<VerifiedArtifact, VerifyError> {
    let libraries = dump.library_set();
    let mut symbol_versions = BTreeMap::new();

    match expected.platform.family() {
        OsFamily::Windows => {
            if let Some(format) = expected.expected_format {
                if dump.declared_format.as_deref() != Some(format) {
                    return Err(VerifyError::FormatMismatch {
                        artifact: artifact.to_path_buf(),
                        expected: format.to_string(),
                        actual: dump.declared_format.clone(),
                    });
                }
            }
            if !dump.exports(expected.entry_point) {
                return Err(VerifyError::MissingEntryPoint {
                    artifact: artifact.to_path_buf(),
                    entry_point: expected.entry_point.to_string(),
                });
            }
            check_libraries(expected, artifact, &libraries)?;
        }
        OsFamily::Linux => {
            check_libraries(expected, artifact, &libraries)?;
            let wanted = expected.expected_min_versions.clone().unwrap_or_default();
            let actual = dump.max_symbol_versions();
            if actual != wanted {
                return Err(VerifyError::SymbolVersionMismatch {
                    artifact: artifact.to_path_buf(),
                    expected: wanted,
                    actual,
                });
            }
            symbol_versions = actual;
        }
    }

    Ok(VerifiedArtifact {
        artifact: artifact.to_path_buf(),
        platform: expected.platform,
        libraries,
        symbol_versions,
    })
}

fn check_libraries(
    expected: &ExpectationSet,
    artifact: &Path,
    actual: &BTreeSet<String>,
) -> Result<(), VerifyError> {
    if *actual != expected.expected_libraries {
        return Err(VerifyError::LibraryMismatch {
            artifact: artifact.to_path_buf(),
            expected: expected.expected_libraries.clone(),
            actual: actual.clone(),
        });
    }
    Ok(())
}
