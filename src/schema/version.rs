//! Schema identity: name plus the (read, write, minor) version triple

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::warn;

use crate::error::{SchemaError, VersionComponent, VersionProblem};

/// Identity of a schema revision.
///
/// Equality is full-tuple equality. Ordering only looks at the numeric
/// components, so two keys with different names can compare `Equal`
/// without being `==`; callers compare names separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionKey {
    pub name: String,
    pub read: u32,
    pub write: u32,
    pub minor: u32,
}

impl VersionKey {
    pub fn new(name: impl Into<String>, read: u32, write: u32, minor: u32) -> Self {
        Self {
            name: name.into(),
            read,
            write,
            minor,
        }
    }

    /// Parse a three-part `RR.WW.mm` version string.
    ///
    /// Two-part strings are accepted and routed through the legacy
    /// translation, so `01.03` becomes `01.00.03`.
    pub fn parse(name: impl Into<String>, version: &str) -> Result<Self, SchemaError> {
        let name = name.into();
        let parts: Vec<&str> = version.trim().split('.').collect();

        match parts.len() {
            0..=2 => parse_legacy(version)?.into_key(name, version),
            3 => {
                let read = parse_component(version, parts[0], VersionComponent::Read)?;
                let write = parse_component(version, parts[1], VersionComponent::Write)?;
                let minor = parse_component(version, parts[2], VersionComponent::Minor)?;
                Ok(Self::new(name, read, write, minor))
            }
            n => Err(SchemaError::InvalidVersionString {
                version: version.to_string(),
                problem: VersionProblem::TooManyParts(n),
            }),
        }
    }

    /// Lexicographic comparison over (read, write, minor)
    pub fn compare(&self, other: &VersionKey) -> Ordering {
        (self.read, self.write, self.minor).cmp(&(other.read, other.write, other.minor))
    }

    /// Case-insensitive name comparison, the way schema names are matched on disk
    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// The zero-padded `RR.WW.mm` rendering used in file names
    pub fn version_string(&self) -> String {
        format!("{:02}.{:02}.{:02}", self.read, self.write, self.minor)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.version_string())
    }
}

fn parse_component(
    version: &str,
    part: &str,
    component: VersionComponent,
) -> Result<u32, SchemaError> {
    part.trim()
        .parse::<u32>()
        .map_err(|_| SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::NonNumeric(component),
        })
}

/// Result of translating a legacy `RR.mm` version string.
///
/// Components that are present but not numeric stay `None` instead of
/// defaulting to zero. The write component is always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyVersion {
    pub read: Option<u32>,
    pub write: u32,
    pub minor: Option<u32>,
}

impl LegacyVersion {
    /// Turn the translation into a key, failing if a component was left unset
    pub fn into_key(
        self,
        name: impl Into<String>,
        version: &str,
    ) -> Result<VersionKey, SchemaError> {
        let read = self.read.ok_or_else(|| SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::NonNumeric(VersionComponent::Read),
        })?;
        let minor = self.minor.ok_or_else(|| SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::NonNumeric(VersionComponent::Minor),
        })?;
        Ok(VersionKey::new(name, read, self.write, minor))
    }
}

/// Translate a legacy two-part version string into the three-part scheme.
///
/// A missing part is an error. A non-numeric part is only logged and left
/// unset in the returned value.
pub fn parse_legacy(version: &str) -> Result<LegacyVersion, SchemaError> {
    let parts: Vec<&str> = version.trim().split('.').collect();

    let read_part = parts.first().copied().unwrap_or("").trim();
    if read_part.is_empty() {
        return Err(SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::MissingRead,
        });
    }

    let minor_part = parts.get(1).copied().unwrap_or("").trim();
    if minor_part.is_empty() {
        return Err(SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::MissingMinor,
        });
    }

    if parts.len() > 2 {
        return Err(SchemaError::InvalidVersionString {
            version: version.to_string(),
            problem: VersionProblem::TooManyParts(parts.len()),
        });
    }

    let read = lenient_component(version, read_part, VersionComponent::Read);
    let minor = lenient_component(version, minor_part, VersionComponent::Minor);

    Ok(LegacyVersion {
        read,
        write: 0,
        minor,
    })
}

fn lenient_component(version: &str, part: &str, component: VersionComponent) -> Option<u32> {
    match part.parse::<u32>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Legacy version '{version}': the {component} version '{part}' is not a number");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_inserts_zero_write_component() {
        let legacy = parse_legacy("1.3").unwrap();
        let key = legacy.into_key("Foo", "1.3").unwrap();
        assert_eq!(key, VersionKey::new("Foo", 1, 0, 3));
    }

    #[test]
    fn legacy_keeps_zero_padding_semantics() {
        let key = parse_legacy("02.11").unwrap().into_key("Foo", "02.11").unwrap();
        assert_eq!((key.read, key.write, key.minor), (2, 0, 11));
    }

    #[test]
    fn legacy_empty_string_reports_missing_read() {
        match parse_legacy("") {
            Err(SchemaError::InvalidVersionString { problem, .. }) => {
                assert_eq!(problem, VersionProblem::MissingRead)
            }
            other => panic!("expected missing read version, got {other:?}"),
        }
    }

    #[test]
    fn legacy_single_part_reports_missing_minor() {
        match parse_legacy("10") {
            Err(SchemaError::InvalidVersionString { problem, .. }) => {
                assert_eq!(problem, VersionProblem::MissingMinor)
            }
            other => panic!("expected missing minor version, got {other:?}"),
        }
    }

    #[test]
    fn legacy_trailing_dot_reports_missing_minor() {
        assert!(matches!(
            parse_legacy("10."),
            Err(SchemaError::InvalidVersionString {
                problem: VersionProblem::MissingMinor,
                ..
            })
        ));
    }

    #[test]
    fn legacy_non_numeric_parts_stay_unset_without_failing() {
        let legacy = parse_legacy("1.x").unwrap();
        assert_eq!(legacy.read, Some(1));
        assert_eq!(legacy.minor, None);

        let legacy = parse_legacy("a.2").unwrap();
        assert_eq!(legacy.read, None);
        assert_eq!(legacy.minor, Some(2));
    }

    #[test]
    fn incomplete_legacy_version_cannot_become_a_key() {
        let legacy = parse_legacy("1.x").unwrap();
        assert!(matches!(
            legacy.into_key("Foo", "1.x"),
            Err(SchemaError::InvalidVersionString {
                problem: VersionProblem::NonNumeric(VersionComponent::Minor),
                ..
            })
        ));
    }

    #[test]
    fn parse_accepts_three_parts() {
        let key = VersionKey::parse("BisCore", "01.00.16").unwrap();
        assert_eq!(key, VersionKey::new("BisCore", 1, 0, 16));
    }

    #[test]
    fn parse_routes_two_parts_through_legacy_translation() {
        let key = VersionKey::parse("Foo", "05.02").unwrap();
        assert_eq!(key, VersionKey::new("Foo", 5, 0, 2));
    }

    #[test]
    fn parse_rejects_four_parts() {
        assert!(matches!(
            VersionKey::parse("Foo", "1.2.3.4"),
            Err(SchemaError::InvalidVersionString {
                problem: VersionProblem::TooManyParts(4),
                ..
            })
        ));
    }

    #[test]
    fn compare_is_lexicographic() {
        let a = VersionKey::new("X", 1, 0, 3);
        let b = VersionKey::new("X", 1, 1, 0);
        let c = VersionKey::new("X", 2, 0, 0);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(c.compare(&b), Ordering::Greater);
        assert_eq!(a.compare(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn display_uses_padded_version() {
        assert_eq!(VersionKey::new("Foo", 1, 0, 3).to_string(), "Foo.01.00.03");
    }
}
