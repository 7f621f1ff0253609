//! Semantic version value type, parsing and precedence ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// Error type for version parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Invalid version string \"{0}\"")]
    InvalidVersion(String),
    #[error("Leading zero in numeric identifier \"{0}\"")]
    LeadingZero(String),
    #[error("Numeric component out of range in \"{0}\"")]
    NumberOverflow(String),
    #[error("Empty version string")]
    Empty,
}

lazy_static! {
    // SemVer 2.0 grammar. Numeric components reject leading zeros outright;
    // prerelease identifiers are validated in a second pass because the
    // alphanumeric and numeric forms overlap textually.
    static ref VERSION_RE: Regex = Regex::new(
        r"^(?P<major>0|[1-9]\d*)\.(?P<minor>0|[1-9]\d*)\.(?P<patch>0|[1-9]\d*)(?:-(?P<pre>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+(?P<build>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$"
    ).unwrap();

    static ref MIN: Version = Version::from_parts(0, 0, 0, vec![Identifier::Numeric(0)]);
    static ref MIN_RELEASE: Version = Version::new(0, 0, 0);
    static ref MAX: Version = Version::new(u64::MAX, u64::MAX, u64::MAX);
}

/// A single prerelease identifier: numeric identifiers order below
/// alphanumeric ones at the same position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Numeric(u64),
    AlphaNumeric(String),
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Identifier::Numeric(a), Identifier::Numeric(b)) => a.cmp(b),
            (Identifier::Numeric(_), Identifier::AlphaNumeric(_)) => Ordering::Less,
            (Identifier::AlphaNumeric(_), Identifier::Numeric(_)) => Ordering::Greater,
            (Identifier::AlphaNumeric(a), Identifier::AlphaNumeric(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::AlphaNumeric(s) => write!(f, "{}", s),
        }
    }
}

/// An immutable semantic version: numeric triple, prerelease identifiers
/// and build metadata. Build metadata never participates in precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Vec<Identifier>,
    build_metadata: Option<String>,
}

impl Version {
    /// Create a release version with no prerelease or build metadata
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease: Vec::new(),
            build_metadata: None,
        }
    }

    /// Create a version with a parsed prerelease tag, e.g. `(1, 2, 3, "rc.1")`
    pub fn with_prerelease(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: &str,
    ) -> Result<Self, VersionError> {
        Ok(Version {
            major,
            minor,
            patch,
            prerelease: parse_identifiers(prerelease)?,
            build_metadata: None,
        })
    }

    pub(crate) fn from_parts(
        major: u64,
        minor: u64,
        patch: u64,
        prerelease: Vec<Identifier>,
    ) -> Self {
        Version {
            major,
            minor,
            patch,
            prerelease,
            build_metadata: None,
        }
    }

    /// The lowest representable version, `0.0.0-0`
    pub fn min() -> &'static Version {
        &MIN
    }

    /// The lowest release version, `0.0.0`
    pub fn min_release() -> &'static Version {
        &MIN_RELEASE
    }

    /// The highest representable version; every prerelease of the same
    /// triple orders strictly below it
    pub fn max() -> &'static Version {
        &MAX
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> &[Identifier] {
        &self.prerelease
    }

    pub fn build_metadata(&self) -> Option<&str> {
        self.build_metadata.as_deref()
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }

    pub fn has_build_metadata(&self) -> bool {
        self.build_metadata.is_some()
    }

    /// True when both versions share the same (major, minor, patch) triple
    pub fn same_triple(&self, other: &Version) -> bool {
        self.major == other.major && self.minor == other.minor && self.patch == other.patch
    }

    /// Drop any build metadata, keeping the rest of the version
    pub fn without_build_metadata(mut self) -> Version {
        self.build_metadata = None;
        self
    }

    /// Precedence comparison per the SemVer ordering rules. Build metadata
    /// is ignored.
    pub fn cmp_precedence(&self, other: &Version) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(
                || match (self.prerelease.is_empty(), other.prerelease.is_empty()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => self.prerelease.cmp(&other.prerelease),
                },
            )
    }

    /// The version obtained by appending a `0` prerelease identifier. For a
    /// prerelease version this is its immediate successor in precedence
    /// order; for a release `x.y.z` it is `x.y.z-0`, the lowest version of
    /// that triple.
    pub(crate) fn with_appended_zero_identifier(&self) -> Version {
        let mut prerelease = self.prerelease.clone();
        prerelease.push(Identifier::Numeric(0));
        Version::from_parts(self.major, self.minor, self.patch, prerelease)
    }

    /// The release one patch level up, or None on numeric overflow
    pub(crate) fn with_bumped_patch(&self) -> Option<Version> {
        Some(Version::new(self.major, self.minor, self.patch.checked_add(1)?))
    }

    /// Parse a strict SemVer 2.0 version string
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        if text.is_empty() {
            return Err(VersionError::Empty);
        }

        let caps = VERSION_RE
            .captures(text)
            .ok_or_else(|| VersionError::InvalidVersion(text.to_string()))?;

        let major = parse_numeric_component(caps.name("major").unwrap().as_str(), text)?;
        let minor = parse_numeric_component(caps.name("minor").unwrap().as_str(), text)?;
        let patch = parse_numeric_component(caps.name("patch").unwrap().as_str(), text)?;

        let prerelease = match caps.name("pre") {
            Some(m) => parse_identifiers(m.as_str())?,
            None => Vec::new(),
        };

        let build_metadata = caps.name("build").map(|m| m.as_str().to_string());

        Ok(Version {
            major,
            minor,
            patch,
            prerelease,
            build_metadata,
        })
    }

    /// Parse a version, tolerating surrounding whitespace and a leading
    /// `v`/`V` the way package tooling writes versions
    pub fn parse_lenient(text: &str) -> Result<Self, VersionError> {
        let text = text.trim();
        let text = text.strip_prefix(['v', 'V']).unwrap_or(text);
        Self::parse(text)
    }
}

fn parse_numeric_component(component: &str, version: &str) -> Result<u64, VersionError> {
    component
        .parse::<u64>()
        .map_err(|_| VersionError::NumberOverflow(version.to_string()))
}

/// Parse dot-separated prerelease identifiers, rejecting empty identifiers
/// and numeric identifiers with leading zeros
pub(crate) fn parse_identifiers(text: &str) -> Result<Vec<Identifier>, VersionError> {
    let mut identifiers = Vec::new();

    for part in text.split('.') {
        if part.is_empty() {
            return Err(VersionError::InvalidVersion(text.to_string()));
        }
        if !part.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(VersionError::InvalidVersion(text.to_string()));
        }

        if part.bytes().all(|b| b.is_ascii_digit()) {
            if part.len() > 1 && part.starts_with('0') {
                return Err(VersionError::LeadingZero(part.to_string()));
            }
            let value = part
                .parse::<u64>()
                .map_err(|_| VersionError::NumberOverflow(part.to_string()))?;
            identifiers.push(Identifier::Numeric(value));
        } else {
            identifiers.push(Identifier::AlphaNumeric(part.to_string()));
        }
    }

    Ok(identifiers)
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Build metadata as a final lexical tie-break keeps Ord consistent
        // with the derived Eq.
        self.cmp_precedence(other)
            .then_with(|| self.build_metadata.cmp(&other.build_metadata))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;

        if !self.prerelease.is_empty() {
            write!(f, "-")?;
            for (i, identifier) in self.prerelease.iter().enumerate() {
                if i > 0 {
                    write!(f, ".")?;
                }
                write!(f, "{}", identifier)?;
            }
        }

        if let Some(build) = &self.build_metadata {
            write!(f, "+{}", build)?;
        }

        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let version = Version::parse("1.2.3").unwrap();
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert!(!version.is_prerelease());
        assert!(!version.has_build_metadata());
    }

    #[test]
    fn test_parse_prerelease_and_build() {
        let version = Version::parse("1.2.3-rc.1+build.42").unwrap();
        assert!(version.is_prerelease());
        assert_eq!(
            version.prerelease(),
            &[
                Identifier::AlphaNumeric("rc".to_string()),
                Identifier::Numeric(1)
            ]
        );
        assert_eq!(version.build_metadata(), Some("build.42"));
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1").is_err());
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("1.2.3.4").is_err());
        assert!(Version::parse("01.2.3").is_err());
        assert!(Version::parse("1.02.3").is_err());
        assert!(Version::parse("1.2.3-").is_err());
        assert!(Version::parse("1.2.3-a..b").is_err());
        assert!(Version::parse("1.2.3+").is_err());
        assert!(Version::parse("v1.2.3").is_err());
        assert!(Version::parse("1.2.3 ").is_err());
        assert!(Version::parse("a.b.c").is_err());
    }

    #[test]
    fn test_parse_rejects_leading_zero_identifier() {
        assert_eq!(
            Version::parse("1.2.3-01"),
            Err(VersionError::LeadingZero("01".to_string()))
        );
        // Leading zeros are fine in alphanumeric identifiers
        assert!(Version::parse("1.2.3-01a").is_ok());
    }

    #[test]
    fn test_parse_rejects_overflow() {
        assert!(matches!(
            Version::parse("99999999999999999999999999.0.0"),
            Err(VersionError::NumberOverflow(_))
        ));
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(
            Version::parse_lenient("v1.2.3").unwrap(),
            Version::new(1, 2, 3)
        );
        assert_eq!(
            Version::parse_lenient("  V1.2.3-beta "),
            Version::with_prerelease(1, 2, 3, "beta")
        );
        assert!(Version::parse_lenient("vv1.2.3").is_err());
    }

    #[test]
    fn test_precedence_order() {
        // The canonical ordering chain from the SemVer specification
        let chain = [
            "1.0.0-alpha",
            "1.0.0-alpha.1",
            "1.0.0-alpha.beta",
            "1.0.0-beta",
            "1.0.0-beta.2",
            "1.0.0-beta.11",
            "1.0.0-rc.1",
            "1.0.0",
        ];

        for pair in chain.windows(2) {
            let a = Version::parse(pair[0]).unwrap();
            let b = Version::parse(pair[1]).unwrap();
            assert_eq!(
                a.cmp_precedence(&b),
                Ordering::Less,
                "{} should precede {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_precedence_ignores_build_metadata() {
        let a = Version::parse("1.2.3+build.1").unwrap();
        let b = Version::parse("1.2.3+build.2").unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Equal);
        assert_ne!(a, b);
    }

    #[test]
    fn test_numeric_triple_order() {
        let a = Version::parse("1.9.0").unwrap();
        let b = Version::parse("1.10.0").unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Less);
    }

    #[test]
    fn test_shorter_prerelease_sequence_is_lesser() {
        let a = Version::parse("1.0.0-alpha").unwrap();
        let b = Version::parse("1.0.0-alpha.0").unwrap();
        assert_eq!(a.cmp_precedence(&b), Ordering::Less);
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Version::min(), &Version::parse("0.0.0-0").unwrap());
        assert_eq!(Version::min_release(), &Version::new(0, 0, 0));
        assert_eq!(
            Version::min().cmp_precedence(Version::min_release()),
            Ordering::Less
        );

        // Max is a supremum: any prerelease of the same triple sorts below it
        let below_max =
            Version::with_prerelease(u64::MAX, u64::MAX, u64::MAX, "alpha").unwrap();
        assert_eq!(below_max.cmp_precedence(Version::max()), Ordering::Less);
    }

    #[test]
    fn test_same_triple() {
        let release = Version::parse("1.2.3").unwrap();
        let pre = Version::parse("1.2.3-rc.1").unwrap();
        let other = Version::parse("1.2.4").unwrap();
        assert!(release.same_triple(&pre));
        assert!(!release.same_triple(&other));
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["0.0.0", "1.2.3", "1.2.3-rc.1", "1.2.3-rc.1+build.5", "10.20.30-0"] {
            let version = Version::parse(text).unwrap();
            assert_eq!(version.to_string(), text);
            assert_eq!(text.parse::<Version>().unwrap(), version);
        }
    }

    #[test]
    fn test_without_build_metadata() {
        let version = Version::parse("1.2.3-rc.1+build").unwrap();
        let stripped = version.without_build_metadata();
        assert!(!stripped.has_build_metadata());
        assert_eq!(stripped.to_string(), "1.2.3-rc.1");
    }

    #[test]
    fn test_successor_helpers() {
        let pre = Version::parse("1.2.3-rc").unwrap();
        assert_eq!(
            pre.with_appended_zero_identifier(),
            Version::parse("1.2.3-rc.0").unwrap()
        );

        let release = Version::parse("1.2.3").unwrap();
        assert_eq!(
            release.with_bumped_patch(),
            Some(Version::parse("1.2.4").unwrap())
        );
        assert_eq!(Version::max().with_bumped_patch(), None);
    }
}
