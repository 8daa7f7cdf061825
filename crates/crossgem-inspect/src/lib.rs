//! Artifact inspection and verification for crossgem.
//!
//! Runs a platform's `objdump -p` against a compiled extension, extracts the
//! declared format, exports, imported libraries and symbol-version
//! references, and checks them against the platform's expectation table.

pub mod dump;
pub mod error;
pub mod inspector;
pub mod report;
pub mod verifier;

#[cfg(test)]
mod fixtures;

pub use dump::{ArtifactDump, DumpParser};
pub use error::VerifyError;
pub use inspector::{run_captured, CapturedOutput, Inspector, ObjdumpInspector};
pub use report::{ArtifactOutcome, BatchReport, Outcome};
pub use verifier::{check, VerifiedArtifact, Verifier};
