//! Extraction of structured facts from `objdump -p` text.
//!
//! This is the only place that knows the dump's textual layout; everything
//! downstream works on [`ArtifactDump`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crossgem_targets::{DottedVersion, OsFamily, ENTRY_POINT};
use regex::Regex;
use serde::Serialize;

static FILE_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"file format (\S+)").expect("valid regex"));

static DLL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)DLL Name: (.*)$").expect("valid regex"));

static NEEDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NEEDED\s+(.*)").expect("valid regex"));

/// Version reference lines: `0x0d696917 0x00 03 GLIBC_2.17`.
static VERSION_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)0x[0-9a-f]+ 0x[0-9a-f]+ [0-9]+ (\w+)_([0-9.]+)\r?$").expect("valid regex")
});

/// Facts extracted from one artifact's dump.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactDump {
    /// First `file format <token>` in the dump.
    pub declared_format: Option<String>,
    /// Exported symbols found in the export table.
    pub exported_symbols: BTreeSet<String>,
    /// Imported libraries, deduplicated, in dump order.
    pub required_libraries: Vec<String>,
    /// `(library family, version)` for every versioned symbol reference.
    pub versioned_symbol_refs: Vec<(String, String)>,
}

impl ArtifactDump {
    pub fn library_set(&self) -> BTreeSet<String> {
        self.required_libraries.iter().cloned().collect()
    }

    pub fn exports(&self, symbol: &str) -> bool {
        self.exported_symbols.contains(symbol)
    }

    /// Highest referenced version per library family.
    pub fn max_symbol_versions(&self) -> BTreeMap<String, String> {
        let mut max: BTreeMap<String, String> = BTreeMap::new();
        for (lib, version) in &self.versioned_symbol_refs {
            let newer = match max.get(lib) {
                Some(current) => DottedVersion::parse(version) > DottedVersion::parse(current),
                None => true,
            };
            if newer {
                max.insert(lib.clone(), version.clone());
            }
        }
        max
    }
}

/// Parser for `objdump -p` output.
#[derive(Debug, Clone)]
pub struct DumpParser {
    entry_point: String,
    /// Entry point delimited by whitespace anywhere after a `table` marker,
    /// ignoring case.
    export_pattern: Regex,
}

impl Default for DumpParser {
    fn default() -> Self {
        Self::new(ENTRY_POINT)
    }
}

impl DumpParser {
    pub fn new(entry_point: impl Into<String>) -> Self {
        let entry_point = entry_point.into();
        let pattern = format!(r"(?is)table.*\s{}\s", regex::escape(&entry_point));
        let export_pattern = Regex::new(&pattern).expect("escaped pattern is valid");
        Self {
            entry_point,
            export_pattern,
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    /// Extract the facts relevant to `family` from raw dump text.
    pub fn parse(&self, text: &str, family: OsFamily) -> ArtifactDump {
        let declared_format = FILE_FORMAT
            .captures(text)
            .map(|caps| caps[1].to_string());

        let mut exported_symbols = BTreeSet::new();
        if self.export_pattern.is_match(text) {
            exported_symbols.insert(self.entry_point.clone());
        }

        let (required_libraries, versioned_symbol_refs) = match family {
            OsFamily::Windows => {
                let libs = DLL_NAME
                    .captures_iter(text)
                    .map(|caps| caps[1].trim().to_lowercase());
                (dedup(libs), Vec::new())
            }
            OsFamily::Linux => {
                let libs = NEEDED
                    .captures_iter(text)
                    .map(|caps| caps[1].trim().to_string());
                let refs = VERSION_REF
                    .captures_iter(text)
                    .map(|caps| (caps[1].to_string(), caps[2].to_string()))
                    .collect();
                (dedup(libs), refs)
            }
        };

        ArtifactDump {
            declared_format,
            exported_symbols,
            required_libraries,
            versioned_symbol_refs,
        }
    }
}

fn dedup(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
