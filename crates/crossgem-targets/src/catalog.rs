//! Loading the cross-compilation catalog.
//!
//! The catalog is a line-oriented file with one `version:host` pair per line.
//! Anything after `#` is a comment. Lines without that shape are skipped.

use std::collections::HashSet;
use std::path::Path;

use crate::descriptor::PlatformDescriptor;
use crate::error::{Result, TargetError};
use crate::platform::{OsFamily, PlatformTag};

/// Deduplicated set of platform descriptors, in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossCompileCatalog {
    descriptors: Vec<PlatformDescriptor>,
}

impl CrossCompileCatalog {
    /// Add a descriptor unless an identical one is already present.
    ///
    /// Returns `true` if the descriptor was new.
    pub fn insert(&mut self, descriptor: PlatformDescriptor) -> bool {
        if self.descriptors.contains(&descriptor) {
            return false;
        }
        self.descriptors.push(descriptor);
        true
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformDescriptor> {
        self.descriptors.iter()
    }

    /// Unique platform tags, in first-appearance order.
    pub fn platforms(&self) -> Vec<PlatformTag> {
        let mut seen = HashSet::new();
        self.descriptors
            .iter()
            .map(PlatformDescriptor::platform)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    /// Unique platform tags belonging to one OS family.
    pub fn platforms_in(&self, family: OsFamily) -> Vec<PlatformTag> {
        self.platforms()
            .into_iter()
            .filter(|p| p.family() == family)
            .collect()
    }

    /// Unique semantic versions joined by `:`, as handed to the build
    /// orchestrator in `RUBY_CC_VERSION`.
    pub fn rc_versions(&self) -> String {
        let mut seen = HashSet::new();
        self.descriptors
            .iter()
            .map(PlatformDescriptor::semantic_version)
            .filter(|v| seen.insert(*v))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl<'a> IntoIterator for &'a CrossCompileCatalog {
    type Item = &'a PlatformDescriptor;
    type IntoIter = std::slice::Iter<'a, PlatformDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.iter()
    }
}

/// Parse catalog text into a deduplicated set of descriptors.
///
/// Malformed lines are skipped; a well-formed line naming an unsupported host
/// or unparsable version is an error.
pub fn parse_catalog(text: &str) -> Result<CrossCompileCatalog> {
    let mut catalog = CrossCompileCatalog::default();
    for (lineno, line) in text.lines().enumerate() {
        let Some((version, host)) = split_entry(line) else {
            continue;
        };
        let descriptor = PlatformDescriptor::parse(version, host)?;
        if !catalog.insert(descriptor) {
            tracing::debug!(line = lineno + 1, "duplicate catalog entry {version}:{host}");
        }
    }
    Ok(catalog)
}

/// Load a catalog file.
pub fn load_catalog(path: &Path) -> Result<CrossCompileCatalog> {
    if !path.exists() {
        return Err(TargetError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&content)?;
    tracing::debug!(
        path = %path.display(),
        entries = catalog.len(),
        "loaded cross-compilation catalog"
    );
    Ok(catalog)
}

/// Split `version:host`, ignoring anything after `#`. The split happens at
/// the last `:` and both sides must be non-blank.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let content = line.split('#').next().unwrap_or_default();
    let (version, host) = content.rsplit_once(':')?;
    let (version, host) = (version.trim(), host.trim());
    if version.is_empty() || host.is_empty() {
        return None;
    }
    Some((version, host))
}
