//! Dotted numeric version comparison.
//!
//! Runtime versions (`2.6.0`) and symbol-version floors (`2.17`) are compared
//! component by component as integers, so `2.10` sorts after `2.9`. A version
//! that is a strict prefix of another sorts first (`2.17 < 2.17.0`).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A version made of `.`-separated numeric components.
#[derive(Debug, Clone)]
pub struct DottedVersion {
    raw: String,
    components: Vec<u64>,
}

impl DottedVersion {
    /// Parse a dotted version. Each component contributes its leading digits;
    /// a component without digits counts as zero, and one too large for a
    /// `u64` saturates.
    pub fn parse(raw: &str) -> Self {
        let components = raw
            .split('.')
            .map(|part| {
                let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() {
                    0
                } else {
                    digits.parse().unwrap_or(u64::MAX)
                }
            })
            .collect();
        Self {
            raw: raw.to_string(),
            components,
        }
    }

    /// The numeric components.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// The original string form.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl PartialEq for DottedVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for DottedVersion {}

impl Hash for DottedVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl Ord for DottedVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl PartialOrd for DottedVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DottedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two dotted version strings numerically.
pub fn compare(a: &str, b: &str) -> Ordering {
    DottedVersion::parse(a).cmp(&DottedVersion::parse(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_not_lexicographic() {
        assert_eq!(compare("2.10.0", "2.9.0"), Ordering::Greater);
        assert_eq!(compare("2.9", "2.10"), Ordering::Less);
        // Plain string comparison would say the opposite.
        assert!("2.10.0" < "2.9.0");
    }

    #[test]
    fn ordering_examples() {
        assert_eq!(compare("2.6.0", "2.5.9"), Ordering::Greater);
        assert!(DottedVersion::parse("2.0.0") >= DottedVersion::parse("2.0.0"));
        assert_eq!(compare("1.9.3", "2.0.0"), Ordering::Less);
    }

    #[test]
    fn strict_prefix_sorts_first() {
        assert_eq!(compare("2.17", "2.17.0"), Ordering::Less);
        assert_eq!(compare("2.9", "2.10.1"), Ordering::Less);
    }

    #[test]
    fn equality_ignores_spelling() {
        assert_eq!(DottedVersion::parse("2.05"), DottedVersion::parse("2.5"));
        assert_ne!(DottedVersion::parse("2.5"), DottedVersion::parse("2.5.0"));
    }

    #[test]
    fn large_components() {
        // Components are not limited to a byte.
        assert_eq!(compare("2.300", "2.255"), Ordering::Greater);
    }

    #[test]
    fn oversized_component_saturates() {
        let huge = DottedVersion::parse("2.99999999999999999999");
        assert_eq!(huge.components(), &[2, u64::MAX]);
        assert_eq!(compare("2.99999999999999999999", "2.1"), Ordering::Greater);
    }

    #[test]
    fn non_numeric_components() {
        let v = DottedVersion::parse("3.4.0dev");
        assert_eq!(v.components(), &[3, 4, 0]);
        assert_eq!(DottedVersion::parse("x.1").components(), &[0, 1]);
        assert_eq!(v.to_string(), "3.4.0dev");
    }
}
