//! Canonical single-interval range over semantic versions

use std::cmp::Ordering;
use std::fmt;

use lazy_static::lazy_static;
use thiserror::Error;

use crate::version::Version;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnbrokenRangeError {
    #[error("Version argument \"{0}\" must not carry build metadata")]
    MetadataNotAllowed(&'static str),
}

lazy_static! {
    // Start after end by construction, so the ordinary bound checks already
    // reject every version and no is-empty special case is needed anywhere.
    static ref EMPTY: UnbrokenRange = UnbrokenRange {
        start: Some(Version::max().clone()),
        start_inclusive: false,
        end: Version::min().clone(),
        end_inclusive: false,
        include_all_prerelease: false,
    };
    static ref ALL: UnbrokenRange = UnbrokenRange {
        start: None,
        start_inclusive: false,
        end: Version::max().clone(),
        end_inclusive: true,
        include_all_prerelease: true,
    };
    static ref ALL_RELEASE: UnbrokenRange = UnbrokenRange {
        include_all_prerelease: false,
        ..ALL.clone()
    };
}

/// A contiguous range of versions: two bounds with per-bound inclusivity
/// and a prerelease-visibility flag. Immutable; every contradictory bound
/// combination normalizes to the one canonical empty value at construction.
///
/// A prerelease version inside the bounds is a member only when
/// `include_all_prerelease` is set, or when one of the bounds itself names a
/// prerelease of the same (major, minor, patch) triple. A bound carrying a
/// prerelease tag opens a window onto exactly that triple's prerelease
/// sequence and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnbrokenRange {
    start: Option<Version>,
    start_inclusive: bool,
    end: Version,
    end_inclusive: bool,
    include_all_prerelease: bool,
}

impl UnbrokenRange {
    /// The canonical range containing no versions
    pub fn empty() -> &'static UnbrokenRange {
        &EMPTY
    }

    /// The range of all versions, prereleases included
    pub fn all() -> &'static UnbrokenRange {
        &ALL
    }

    /// The range of all release versions
    pub fn all_release() -> &'static UnbrokenRange {
        &ALL_RELEASE
    }

    /// Exactly the given version
    pub fn equals(version: Version) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let version = validated(version, "version")?;
        Ok(Self::create(
            Some(version.clone()),
            true,
            version,
            true,
            false,
        ))
    }

    /// Every version strictly above the given one
    pub fn greater_than(
        version: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let version = validated(version, "version")?;
        Ok(Self::create(
            Some(version),
            false,
            Version::max().clone(),
            true,
            include_all_prerelease,
        ))
    }

    /// Every version at or above the given one
    pub fn at_least(
        version: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let version = validated(version, "version")?;
        Ok(Self::create(
            Some(version),
            true,
            Version::max().clone(),
            true,
            include_all_prerelease,
        ))
    }

    /// Every version strictly below the given one
    pub fn less_than(
        version: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let version = validated(version, "version")?;
        Ok(Self::create(None, false, version, false, include_all_prerelease))
    }

    /// Every version at or below the given one
    pub fn at_most(
        version: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let version = validated(version, "version")?;
        Ok(Self::create(None, false, version, true, include_all_prerelease))
    }

    /// The closed interval `[start, end]`
    pub fn inclusive(
        start: Version,
        end: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let (start, end) = validated_pair(start, end)?;
        Ok(Self::create(Some(start), true, end, true, include_all_prerelease))
    }

    /// The half-open interval `[start, end)`
    pub fn inclusive_of_start(
        start: Version,
        end: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let (start, end) = validated_pair(start, end)?;
        Ok(Self::create(Some(start), true, end, false, include_all_prerelease))
    }

    /// The half-open interval `(start, end]`
    pub fn inclusive_of_end(
        start: Version,
        end: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let (start, end) = validated_pair(start, end)?;
        Ok(Self::create(Some(start), false, end, true, include_all_prerelease))
    }

    /// The open interval `(start, end)`
    pub fn exclusive(
        start: Version,
        end: Version,
        include_all_prerelease: bool,
    ) -> Result<UnbrokenRange, UnbrokenRangeError> {
        let (start, end) = validated_pair(start, end)?;
        Ok(Self::create(Some(start), false, end, false, include_all_prerelease))
    }

    pub fn start(&self) -> Option<&Version> {
        self.start.as_ref()
    }

    pub fn start_inclusive(&self) -> bool {
        self.start_inclusive
    }

    pub fn end(&self) -> &Version {
        &self.end
    }

    pub fn end_inclusive(&self) -> bool {
        self.end_inclusive
    }

    pub fn include_all_prerelease(&self) -> bool {
        self.include_all_prerelease
    }

    /// Membership test. The version must not carry build metadata; callers
    /// validate or strip metadata before asking.
    pub fn contains(&self, version: &Version) -> bool {
        debug_assert!(
            !version.has_build_metadata(),
            "membership is defined on metadata-free versions"
        );

        if let Some(start) = &self.start {
            let below_start = match version.cmp_precedence(start) {
                Ordering::Less => true,
                Ordering::Equal => !self.start_inclusive,
                Ordering::Greater => false,
            };
            if below_start {
                return false;
            }
        }

        let above_end = match version.cmp_precedence(&self.end) {
            Ordering::Greater => true,
            Ordering::Equal => !self.end_inclusive,
            Ordering::Less => false,
        };
        if above_end {
            return false;
        }

        if !version.is_prerelease() || self.include_all_prerelease {
            return true;
        }

        // Prerelease visibility: only a bound that itself names a prerelease
        // of this exact triple anchors it into view.
        self.start
            .as_ref()
            .map_or(false, |s| s.is_prerelease() && s.same_triple(version))
            || (self.end.is_prerelease() && self.end.same_triple(version))
    }

    fn create(
        start: Option<Version>,
        start_inclusive: bool,
        end: Version,
        end_inclusive: bool,
        include_all_prerelease: bool,
    ) -> UnbrokenRange {
        if collapses(
            start.as_ref(),
            start_inclusive,
            &end,
            end_inclusive,
            include_all_prerelease,
        ) {
            return EMPTY.clone();
        }

        UnbrokenRange {
            start,
            start_inclusive,
            end,
            end_inclusive,
            include_all_prerelease,
        }
    }
}

fn validated(version: Version, param: &'static str) -> Result<Version, UnbrokenRangeError> {
    if version.has_build_metadata() {
        return Err(UnbrokenRangeError::MetadataNotAllowed(param));
    }
    Ok(version)
}

fn validated_pair(
    start: Version,
    end: Version,
) -> Result<(Version, Version), UnbrokenRangeError> {
    Ok((validated(start, "start")?, validated(end, "end")?))
}

/// True when the bounds describe a set with no visible members
fn collapses(
    start: Option<&Version>,
    start_inclusive: bool,
    end: &Version,
    end_inclusive: bool,
    include_all_prerelease: bool,
) -> bool {
    let start = match start {
        Some(start) => start,
        None => {
            // Unbounded below: empty only when the exclusive end admits
            // nothing beneath it.
            if end_inclusive {
                return false;
            }
            return end == Version::min()
                || (!include_all_prerelease && end == Version::min_release());
        }
    };

    match start.cmp_precedence(end) {
        Ordering::Greater => true,
        Ordering::Equal => !(start_inclusive && end_inclusive),
        Ordering::Less => {
            // An included endpoint is always visible: a release plainly, a
            // prerelease through its own anchor.
            if start_inclusive || end_inclusive {
                return false;
            }

            // Both bounds exclusive: empty exactly when no visible version
            // lies strictly between them.
            if start.is_prerelease() {
                return *end == start.with_appended_zero_identifier();
            }

            match start.with_bumped_patch() {
                None => false,
                Some(next_release) => {
                    let next_prerelease = next_release.with_appended_zero_identifier();
                    if include_all_prerelease {
                        *end == next_prerelease
                    } else {
                        *end == next_release || *end == next_prerelease
                    }
                }
            }
        }
    }
}

impl fmt::Display for UnbrokenRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self == Self::empty() {
            return write!(f, "<0.0.0-0");
        }

        let mut wrote = false;
        if let Some(start) = &self.start {
            write!(f, "{}{}", if self.start_inclusive { ">=" } else { ">" }, start)?;
            wrote = true;
        }

        if !(self.end == *Version::max() && self.end_inclusive) {
            if wrote {
                write!(f, " ")?;
            }
            write!(f, "{}{}", if self.end_inclusive { "<=" } else { "<" }, self.end)?;
            wrote = true;
        }

        if !wrote {
            write!(f, "*")?;
        }

        Ok(())
    }
}
