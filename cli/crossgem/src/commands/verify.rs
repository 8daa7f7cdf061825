//! `crossgem verify` — check one artifact against one platform.

use std::path::Path;

use anyhow::{Context, Result};
use crossgem_inspect::{Inspector, VerifiedArtifact, Verifier};
use crossgem_targets::PlatformDescriptor;

/// Verify `artifact` against the platform named by `ruby_version` and `host`.
/// The verifier logs the confirmation.
pub fn run<I: Inspector>(
    verifier: &Verifier<I>,
    ruby_version: &str,
    host: &str,
    artifact: &Path,
) -> Result<VerifiedArtifact> {
    let descriptor = PlatformDescriptor::parse(ruby_version, host)
        .with_context(|| format!("resolving platform {ruby_version}:{host}"))?;
    Ok(verifier.verify(&descriptor, artifact)?)
}
