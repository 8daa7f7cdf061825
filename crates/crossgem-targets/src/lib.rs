//! Cross-compilation platform descriptors for crossgem.
//!
//! A descriptor is built from a `version:host` pair and answers every
//! platform-dependent question the artifact verifier needs:
//! - **Platform tag:** one of the four supported Windows/Linux targets
//! - **Toolchain:** the binutils prefix used to inspect artifacts
//! - **Expectations:** container format, dynamic libraries, symbol-version floors

pub mod catalog;
pub mod descriptor;
pub mod error;
pub mod platform;
pub mod version;

pub use catalog::{load_catalog, parse_catalog, CrossCompileCatalog};
pub use descriptor::{ExpectationSet, PlatformDescriptor, DEFAULT_ARTIFACT_TEMPLATE, ENTRY_POINT};
pub use error::{Result, TargetError};
pub use platform::{OsFamily, PlatformTag};
pub use version::DottedVersion;
