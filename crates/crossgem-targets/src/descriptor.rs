//! Platform descriptors and their expectation tables.
//!
//! A [`PlatformDescriptor`] is parsed from a raw `version` / `host` pair.
//! Every derived field is computed once at construction; the descriptor is
//! immutable afterwards.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Result, TargetError};
use crate::platform::{OsFamily, PlatformTag};
use crate::version::DottedVersion;

/// Exported initialization symbol every conforming artifact must expose.
pub const ENTRY_POINT: &str = "Init_nokogiri";

/// Default location of a staged artifact, relative to the project root.
pub const DEFAULT_ARTIFACT_TEMPLATE: &str = "tmp/{platform}/stage/lib/nokogiri/{minor}/nokogiri.so";

/// Minimum glibc symbol version Linux artifacts are built against.
const GLIBC_FLOOR: &str = "2.17";

/// A resolved cross-compilation target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformDescriptor {
    raw_version: String,
    raw_host: String,
    semantic_version: String,
    minor_version: Option<String>,
    api_version_suffix: Option<String>,
    platform: PlatformTag,
}

impl PlatformDescriptor {
    /// Parse a descriptor from a raw version and host triple.
    ///
    /// Fails with `UnparsableVersion` when the version has no prefix before
    /// its first `-`, and with `UnsupportedHost` when the host matches no
    /// supported platform.
    pub fn parse(raw_version: &str, raw_host: &str) -> Result<Self> {
        let raw_version = raw_version.trim();
        let raw_host = raw_host.trim();

        let semantic_version = raw_version
            .split('-')
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TargetError::UnparsableVersion {
                version: raw_version.to_string(),
            })?
            .to_string();

        let minor_version = minor_prefix(&semantic_version).map(str::to_string);
        let api_version_suffix = minor_version
            .as_ref()
            .map(|minor| format!("{}0", minor.replace('.', "")));
        let platform = PlatformTag::from_host(raw_host)?;

        Ok(Self {
            raw_version: raw_version.to_string(),
            raw_host: raw_host.to_string(),
            semantic_version,
            minor_version,
            api_version_suffix,
            platform,
        })
    }

    pub fn raw_version(&self) -> &str {
        &self.raw_version
    }

    pub fn raw_host(&self) -> &str {
        &self.raw_host
    }

    /// Version before the first `-` (e.g. `3.1.2` for `3.1.2-preview1`).
    pub fn semantic_version(&self) -> &str {
        &self.semantic_version
    }

    /// `MAJOR.MINOR` prefix, present only when a third component follows.
    pub fn minor_version(&self) -> Option<&str> {
        self.minor_version.as_deref()
    }

    /// Ruby API suffix used in runtime DLL names (`3.1` → `310`).
    pub fn api_version_suffix(&self) -> Result<&str> {
        self.api_version_suffix
            .as_deref()
            .ok_or_else(|| TargetError::UnsupportedVersion {
                version: self.semantic_version.clone(),
            })
    }

    pub fn platform(&self) -> PlatformTag {
        self.platform
    }

    pub fn family(&self) -> OsFamily {
        self.platform.family()
    }

    pub fn is_windows(&self) -> bool {
        self.platform.is_windows()
    }

    pub fn toolchain_prefix(&self) -> &'static str {
        self.platform.toolchain_prefix()
    }

    /// Fully-qualified cross tool name, e.g. `x86_64-linux-gnu-objdump`.
    pub fn tool(&self, name: &str) -> String {
        format!("{}{name}", self.toolchain_prefix())
    }

    /// Expected binary container format (Windows only).
    pub fn expected_format(&self) -> Option<&'static str> {
        self.platform.container_format()
    }

    /// The exact set of dynamic libraries a conforming artifact may import.
    pub fn expected_dynamic_libraries(&self) -> Result<BTreeSet<String>> {
        let version = DottedVersion::parse(&self.semantic_version);
        let mut libs = BTreeSet::new();
        match self.platform.family() {
            OsFamily::Windows => {
                libs.extend(["kernel32.dll", "msvcrt.dll", "ws2_32.dll"].map(String::from));
                if version >= DottedVersion::parse("2.0.0") {
                    libs.insert("user32.dll".to_string());
                }
                let suffix = self.api_version_suffix()?;
                libs.extend(self.platform.runtime_dll(suffix));
            }
            OsFamily::Linux => {
                libs.insert("libm.so.6".to_string());
                if version < DottedVersion::parse("2.6.0") {
                    libs.insert("libpthread.so.0".to_string());
                }
                libs.insert("libc.so.6".to_string());
            }
        }
        Ok(libs)
    }

    /// Highest allowed symbol version per library family (Linux only).
    pub fn expected_min_symbol_versions(&self) -> Option<BTreeMap<String, String>> {
        match self.platform.family() {
            OsFamily::Windows => None,
            OsFamily::Linux => Some(BTreeMap::from([(
                "GLIBC".to_string(),
                GLIBC_FLOOR.to_string(),
            )])),
        }
    }

    /// Bundle every expectation for this platform.
    pub fn expectations(&self) -> Result<ExpectationSet> {
        Ok(ExpectationSet {
            platform: self.platform,
            expected_format: self.expected_format(),
            entry_point: ENTRY_POINT,
            expected_libraries: self.expected_dynamic_libraries()?,
            expected_min_versions: self.expected_min_symbol_versions(),
        })
    }

    /// Default staged artifact path under `root`.
    pub fn stage_artifact_path(&self, root: &Path) -> Result<PathBuf> {
        self.artifact_path(root, DEFAULT_ARTIFACT_TEMPLATE)
    }

    /// Render an artifact path template under `root`.
    ///
    /// Supported placeholders: `{platform}`, `{minor}`, `{version}`.
    pub fn artifact_path(&self, root: &Path, template: &str) -> Result<PathBuf> {
        let mut rendered = template
            .replace("{platform}", self.platform.as_str())
            .replace("{version}", &self.semantic_version);
        if rendered.contains("{minor}") {
            let minor = self
                .minor_version()
                .ok_or_else(|| TargetError::UnsupportedVersion {
                    version: self.semantic_version.clone(),
                })?;
            rendered = rendered.replace("{minor}", minor);
        }
        Ok(root.join(rendered))
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.raw_version, self.raw_host, self.platform)
    }
}

/// Everything a verified artifact must match on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpectationSet {
    pub platform: PlatformTag,
    /// Container format, checked on Windows only.
    pub expected_format: Option<&'static str>,
    pub entry_point: &'static str,
    pub expected_libraries: BTreeSet<String>,
    /// Exact per-family symbol-version maxima, checked on Linux only.
    pub expected_min_versions: Option<BTreeMap<String, String>>,
}

/// `D.D` followed by a `.`; multi-digit components are not recognized.
static MINOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\.\d)\.").expect("valid regex"));

fn minor_prefix(version: &str) -> Option<&str> {
    MINOR_PREFIX
        .captures(version)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(version: &str, host: &str) -> PlatformDescriptor {
        PlatformDescriptor::parse(version, host).unwrap()
    }

    #[test]
    fn parses_versions() {
        let d = desc("3.1.2-preview1", "x86_64-linux");
        assert_eq!(d.semantic_version(), "3.1.2");
        assert_eq!(d.minor_version(), Some("3.1"));
        assert_eq!(d.api_version_suffix().unwrap(), "310");
    }

    #[test]
    fn missing_minor_is_unsupported() {
        let d = desc("3.1", "x86_64-linux");
        assert_eq!(d.minor_version(), None);
        assert!(matches!(
            d.api_version_suffix(),
            Err(TargetError::UnsupportedVersion { .. })
        ));
        let d = desc("3.10.0", "x86_64-linux");
        assert_eq!(d.minor_version(), None);
    }

    #[test]
    fn minor_prefix_needs_single_digits_and_a_dot() {
        assert_eq!(minor_prefix("2.7.6"), Some("2.7"));
        assert_eq!(minor_prefix("3.0.0.1"), Some("3.0"));
        assert_eq!(minor_prefix("3.1"), None);
        assert_eq!(minor_prefix("13.1.0"), None);
        assert_eq!(minor_prefix("x3.1.0"), None);
    }

    #[test]
    fn empty_version_is_unparsable() {
        for version in ["", "-rc1"] {
            let err = PlatformDescriptor::parse(version, "x86_64-linux").unwrap_err();
            assert!(matches!(err, TargetError::UnparsableVersion { .. }));
        }
    }

    #[test]
    fn platform_independent_of_version() {
        let a = desc("2.5.0", "x86_64-w64-mingw32");
        let b = desc("3.2.0", "x86_64-w64-mingw32");
        assert_eq!(a.platform(), b.platform());
        assert_eq!(a.platform(), a.platform());
        assert_eq!(a.platform(), PlatformTag::X64Mingw32);
    }

    #[test]
    fn unsupported_host_fails() {
        let err = PlatformDescriptor::parse("3.1.2", "arm64-darwin").unwrap_err();
        assert!(matches!(err, TargetError::UnsupportedHost { .. }));
    }

    #[test]
    fn tool_names() {
        assert_eq!(desc("3.1.2", "x86_64-linux").tool("objdump"), "x86_64-linux-gnu-objdump");
        assert_eq!(desc("3.1.2", "i686-w64-mingw32").tool("objdump"), "i686-w64-mingw32-objdump");
    }

    #[test]
    fn linux_libpthread_gate() {
        let old = desc("2.5.0", "x86_64-linux").expected_dynamic_libraries().unwrap();
        assert!(old.contains("libpthread.so.0"));
        let new = desc("2.6.0", "x86_64-linux").expected_dynamic_libraries().unwrap();
        assert!(!new.contains("libpthread.so.0"));
        assert_eq!(
            new,
            BTreeSet::from(["libm.so.6".to_string(), "libc.so.6".to_string()])
        );
        // 2.10 is newer than 2.6 numerically.
        let newer = desc("2.10.0", "i686-linux-gnu").expected_dynamic_libraries().unwrap();
        assert!(!newer.contains("libpthread.so.0"));
    }

    #[test]
    fn windows_user32_gate() {
        let old = desc("1.9.3", "i686-w64-mingw32").expected_dynamic_libraries().unwrap();
        assert!(!old.contains("user32.dll"));
        assert!(old.contains("msvcrt-ruby190.dll"));
        let new = desc("2.0.0", "x86_64-w64-mingw32").expected_dynamic_libraries().unwrap();
        assert!(new.contains("user32.dll"));
        assert!(new.contains("x64-msvcrt-ruby200.dll"));
        assert_eq!(new.len(), 5);
    }

    #[test]
    fn windows_without_minor_cannot_derive_libraries() {
        let d = desc("3", "x86_64-w64-mingw32");
        assert!(matches!(
            d.expected_dynamic_libraries(),
            Err(TargetError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn symbol_floors() {
        let linux = desc("3.1.2", "x86_64-linux");
        let floors = linux.expected_min_symbol_versions().unwrap();
        assert_eq!(floors.get("GLIBC").map(String::as_str), Some("2.17"));
        assert!(desc("3.1.2", "x86_64-w64-mingw32")
            .expected_min_symbol_versions()
            .is_none());
    }

    #[test]
    fn expectation_set() {
        let set = desc("3.1.2", "x86_64-w64-mingw32").expectations().unwrap();
        assert_eq!(set.expected_format, Some("pei-x86-64"));
        assert_eq!(set.entry_point, "Init_nokogiri");
        assert!(set.expected_min_versions.is_none());
    }

    #[test]
    fn artifact_paths() {
        let d = desc("3.1.2", "x86_64-linux");
        let path = d.stage_artifact_path(Path::new("/work")).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/work/tmp/x86_64-linux/stage/lib/nokogiri/3.1/nokogiri.so")
        );
        let custom = d
            .artifact_path(Path::new("out"), "{platform}/{version}/ext.so")
            .unwrap();
        assert_eq!(custom, PathBuf::from("out/x86_64-linux/3.1.2/ext.so"));
        assert!(desc("3", "x86_64-linux")
            .stage_artifact_path(Path::new("."))
            .is_err());
    }
}
