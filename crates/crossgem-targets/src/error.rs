//! Error types for platform descriptor operations.

use std::path::PathBuf;

/// Errors that can occur while resolving a cross-compilation platform.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The version string has no usable prefix before the first `-`.
    #[error("unparsable version: '{version}'")]
    UnparsableVersion {
        /// The raw version string.
        version: String,
    },

    /// The version has no `MAJOR.MINOR.` prefix, so no API suffix exists.
    #[error("unsupported version: {version}")]
    UnsupportedVersion {
        /// The semantic version that was rejected.
        version: String,
    },

    /// The host triple matches none of the supported platforms.
    #[error("unsupported host: {host}")]
    UnsupportedHost {
        /// The raw host string.
        host: String,
    },

    /// I/O error reading a catalog file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file not found.
    #[error("catalog file not found: {}", path.display())]
    NotFound {
        /// The path that was not found.
        path: PathBuf,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, TargetError>;
