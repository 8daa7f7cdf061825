//! `crossgem check` — verify the staged artifact of every catalog entry.

use std::path::Path;

use anyhow::{bail, Context, Result};
use crossgem_inspect::{BatchReport, Inspector, Verifier};
use crossgem_targets::{CrossCompileCatalog, OsFamily};

/// Output format of the batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Human,
    Json,
}

impl ReportFormat {
    pub fn parse(name: Option<&str>) -> Result<Self> {
        match name {
            None | Some("human") => Ok(ReportFormat::Human),
            Some("json") => Ok(ReportFormat::Json),
            Some(other) => bail!("unknown report format '{other}' (expected human or json)"),
        }
    }
}

/// Verify every catalog entry (optionally restricted to one OS family).
///
/// All artifacts are checked even after a failure; the command fails if any
/// artifact did.
pub fn run<I: Inspector>(
    verifier: &Verifier<I>,
    catalog: &CrossCompileCatalog,
    root: &Path,
    template: &str,
    family: Option<OsFamily>,
    format: ReportFormat,
) -> Result<BatchReport> {
    let mut jobs = Vec::new();
    for descriptor in catalog {
        if family.is_some_and(|f| descriptor.family() != f) {
            continue;
        }
        let artifact = descriptor
            .artifact_path(root, template)
            .with_context(|| format!("locating artifact for {descriptor}"))?;
        jobs.push((descriptor, artifact));
    }
    if jobs.is_empty() {
        bail!("no catalog entries to verify");
    }

    let report = verifier.verify_all(jobs);
    match format {
        ReportFormat::Human => println!("{report}"),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if !report.all_passed() {
        bail!(
            "{} of {} artifacts failed verification",
            report.failed(),
            report.total()
        );
    }
    Ok(report)
}
