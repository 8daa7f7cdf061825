//! Supported cross-compilation platforms.
//!
//! Every platform-keyed fact is an exhaustive match over [`PlatformTag`], so a
//! new platform cannot silently fall through to an empty expectation table.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TargetError};

/// Host triple patterns in matching priority order.
static HOST_PATTERNS: LazyLock<[(PlatformTag, Regex); 4]> = LazyLock::new(|| {
    let pattern = |re: &str| Regex::new(re).expect("valid regex");
    [
        (PlatformTag::X64Mingw32, pattern(r"^x86_64.*mingw32")),
        (PlatformTag::X86Mingw32, pattern(r"^i[3-6]86.*mingw32")),
        (PlatformTag::X86_64Linux, pattern(r"^x86_64.*linux")),
        (PlatformTag::X86Linux, pattern(r"^i[3-6]86.*linux")),
    ]
});

/// Operating system family of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Linux,
}

impl OsFamily {
    /// Parse a family name (`windows` or `linux`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "windows" | "mingw" => Some(OsFamily::Windows),
            "linux" => Some(OsFamily::Linux),
            _ => None,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Windows => f.write_str("windows"),
            OsFamily::Linux => f.write_str("linux"),
        }
    }
}

/// One of the four supported target platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlatformTag {
    #[serde(rename = "x64-mingw32")]
    X64Mingw32,
    #[serde(rename = "x86-mingw32")]
    X86Mingw32,
    #[serde(rename = "x86_64-linux")]
    X86_64Linux,
    #[serde(rename = "x86-linux")]
    X86Linux,
}

impl PlatformTag {
    /// All platforms, in host-matching priority order.
    pub const ALL: [PlatformTag; 4] = [
        PlatformTag::X64Mingw32,
        PlatformTag::X86Mingw32,
        PlatformTag::X86_64Linux,
        PlatformTag::X86Linux,
    ];

    /// Resolve a host triple to a platform.
    ///
    /// Patterns are tried in priority order: 64-bit Windows, 32-bit Windows,
    /// 64-bit Linux, 32-bit Linux.
    pub fn from_host(host: &str) -> Result<Self> {
        let host = host.trim();
        let matched = HOST_PATTERNS
            .iter()
            .find(|(_, pattern)| pattern.is_match(host))
            .map(|(platform, _)| *platform);
        matched.ok_or_else(|| TargetError::UnsupportedHost {
            host: host.to_string(),
        })
    }

    /// Parse a platform tag by its canonical name (e.g. `x64-mingw32`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// Canonical platform name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformTag::X64Mingw32 => "x64-mingw32",
            PlatformTag::X86Mingw32 => "x86-mingw32",
            PlatformTag::X86_64Linux => "x86_64-linux",
            PlatformTag::X86Linux => "x86-linux",
        }
    }

    /// Operating system family.
    pub fn family(&self) -> OsFamily {
        match self {
            PlatformTag::X64Mingw32 | PlatformTag::X86Mingw32 => OsFamily::Windows,
            PlatformTag::X86_64Linux | PlatformTag::X86Linux => OsFamily::Linux,
        }
    }

    pub fn is_windows(&self) -> bool {
        self.family() == OsFamily::Windows
    }

    /// Cross binutils prefix for this platform.
    pub fn toolchain_prefix(&self) -> &'static str {
        match self {
            PlatformTag::X64Mingw32 => "x86_64-w64-mingw32-",
            PlatformTag::X86Mingw32 => "i686-w64-mingw32-",
            PlatformTag::X86_64Linux => "x86_64-linux-gnu-",
            PlatformTag::X86Linux => "i686-linux-gnu-",
        }
    }

    /// Container format reported by `objdump` (Windows only).
    pub fn container_format(&self) -> Option<&'static str> {
        match self {
            PlatformTag::X64Mingw32 => Some("pei-x86-64"),
            PlatformTag::X86Mingw32 => Some("pei-i386"),
            PlatformTag::X86_64Linux | PlatformTag::X86Linux => None,
        }
    }

    /// Name of the Ruby runtime DLL for an API version suffix (Windows only).
    pub fn runtime_dll(&self, api_version_suffix: &str) -> Option<String> {
        match self {
            PlatformTag::X64Mingw32 => Some(format!("x64-msvcrt-ruby{api_version_suffix}.dll")),
            PlatformTag::X86Mingw32 => Some(format!("msvcrt-ruby{api_version_suffix}.dll")),
            PlatformTag::X86_64Linux | PlatformTag::X86Linux => None,
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_hosts() {
        assert_eq!(
            PlatformTag::from_host("x86_64-w64-mingw32").unwrap(),
            PlatformTag::X64Mingw32
        );
        assert_eq!(
            PlatformTag::from_host("i686-w64-mingw32").unwrap(),
            PlatformTag::X86Mingw32
        );
        assert_eq!(
            PlatformTag::from_host("x86_64-linux").unwrap(),
            PlatformTag::X86_64Linux
        );
        assert_eq!(
            PlatformTag::from_host("x86_64-redhat-linux").unwrap(),
            PlatformTag::X86_64Linux
        );
        assert_eq!(
            PlatformTag::from_host("i386-pc-linux-gnu").unwrap(),
            PlatformTag::X86Linux
        );
    }

    #[test]
    fn windows_takes_priority_over_linux() {
        // Contains both markers; the mingw pattern is tried first.
        assert_eq!(
            PlatformTag::from_host("x86_64-linux-mingw32").unwrap(),
            PlatformTag::X64Mingw32
        );
    }

    #[test]
    fn rejects_unknown_hosts() {
        for host in [
            "aarch64-linux",
            "i786-linux",
            "x86_64-darwin",
            "",
            "linux",
            "pc-x86_64-linux",
            "i68-linux",
        ] {
            let err = PlatformTag::from_host(host).unwrap_err();
            assert!(matches!(err, TargetError::UnsupportedHost { .. }), "{host}");
        }
    }

    #[test]
    fn names_round_trip() {
        for tag in PlatformTag::ALL {
            assert_eq!(PlatformTag::from_name(tag.as_str()), Some(tag));
        }
        assert_eq!(PlatformTag::from_name("arm64-darwin"), None);
    }

    #[test]
    fn family_facts() {
        assert!(PlatformTag::X64Mingw32.is_windows());
        assert!(!PlatformTag::X86Linux.is_windows());
        assert_eq!(PlatformTag::X86Mingw32.container_format(), Some("pei-i386"));
        assert_eq!(PlatformTag::X86_64Linux.container_format(), None);
        assert_eq!(
            PlatformTag::X64Mingw32.runtime_dll("310").as_deref(),
            Some("x64-msvcrt-ruby310.dll")
        );
        assert_eq!(PlatformTag::X86Linux.runtime_dll("310"), None);
        assert_eq!(OsFamily::from_name("Windows"), Some(OsFamily::Windows));
        assert_eq!(OsFamily::from_name("darwin"), None);
    }
}
