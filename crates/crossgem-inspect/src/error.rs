//! Verification errors.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crossgem_targets::TargetError;
use thiserror::Error;

/// Errors that can occur while inspecting and verifying an artifact.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("tool invocation failed: {tool}: {message}")]
    ToolInvocation { tool: String, message: String },

    #[error(
        "format mismatch: unexpected file format {} for {} (expected {expected})",
        .actual.as_deref().unwrap_or("<none>"),
        .artifact.display()
    )]
    FormatMismatch {
        artifact: PathBuf,
        expected: String,
        actual: Option<String>,
    },

    #[error("missing entry point: export {entry_point} not in {}", .artifact.display())]
    MissingEntryPoint {
        artifact: PathBuf,
        entry_point: String,
    },

    #[error(
        "library mismatch: unexpected imports {} in {} (expected {})",
        fmt_set(.actual),
        .artifact.display(),
        fmt_set(.expected)
    )]
    LibraryMismatch {
        artifact: PathBuf,
        expected: BTreeSet<String>,
        actual: BTreeSet<String>,
    },

    #[error(
        "symbol version mismatch: unexpected version requirements {} in {} (expected {})",
        fmt_map(.actual),
        .artifact.display(),
        fmt_map(.expected)
    )]
    SymbolVersionMismatch {
        artifact: PathBuf,
        expected: BTreeMap<String, String>,
        actual: BTreeMap<String, String>,
    },

    #[error("platform error: {0}")]
    Target(#[from] TargetError),
}

impl VerifyError {
    /// Short category label used in reports.
    pub fn category(&self) -> &'static str {
        match self {
            VerifyError::ToolInvocation { .. } => "tool-invocation",
            VerifyError::FormatMismatch { .. } => "format-mismatch",
            VerifyError::MissingEntryPoint { .. } => "missing-entry-point",
            VerifyError::LibraryMismatch { .. } => "library-mismatch",
            VerifyError::SymbolVersionMismatch { .. } => "symbol-version-mismatch",
            VerifyError::Target(_) => "platform",
        }
    }
}

fn fmt_set(set: &BTreeSet<String>) -> String {
    let items: Vec<&str> = set.iter().map(String::as_str).collect();
    format!("[{}]", items.join(", "))
}

fn fmt_map(map: &BTreeMap<String, String>) -> String {
    let items: Vec<String> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{{{}}}", items.join(", "))
}
