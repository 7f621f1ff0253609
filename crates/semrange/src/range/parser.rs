//! Compiler from npm range syntax to comparator sets

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::{Comparator, ComparatorSet, Operator, Range};
use crate::version::{self, Identifier, Version};

/// The token separating alternatives of a range expression
pub(crate) const OR_SEPARATOR: &str = "||";

/// Upper bound on accepted range text. Matching is a single linear scan, so
/// capping the input length caps the work; longer inputs are reported as an
/// ordinary parse failure.
const MATCH_BUDGET: usize = 4096;

/// Options controlling range compilation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeOptions {
    /// Admit every prerelease between the bounds instead of only those
    /// anchored by a comparator of the same triple
    pub include_all_prerelease: bool,
}

/// Error type for range compilation. Compilation is all-or-nothing: a
/// single failure aborts the whole parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Could not parse range \"{range}\": {reason}")]
    Syntax { range: String, reason: String },
    #[error("Range text exceeds the matching budget of {0} characters")]
    MatchBudgetExceeded(usize),
}

lazy_static! {
    static ref OR_RE: Regex = Regex::new(r"\s*\|\|\s*").unwrap();

    // A hyphen range must span a whole alternative; both sides are parsed
    // as version patterns afterwards.
    static ref HYPHEN_RE: Regex =
        Regex::new(r"^\s*(?P<from>\S+)\s+-\s+(?P<to>\S+)\s*$").unwrap();

    // Collapse whitespace between a prefix operator and its version so that
    // ">= 1.2" tokenizes as one segment.
    static ref OP_SPACING_RE: Regex = Regex::new(r"(~>|<=|>=|[<>=^~])\s+").unwrap();

    // A partially specified version: 1-3 components, each a numeral or a
    // wildcard, optional prerelease and (ignored) build metadata.
    static ref PATTERN_RE: Regex = Regex::new(
        r"^[vV]?(?P<major>0|[1-9]\d*|[xX*])(?:\.(?P<minor>0|[1-9]\d*|[xX*]))?(?:\.(?P<patch>0|[1-9]\d*|[xX*]))?(?:-(?P<pre>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?(?:\+(?P<build>[0-9A-Za-z-]+(?:\.[0-9A-Za-z-]+)*))?$"
    ).unwrap();
}

/// One component of a version pattern as written: a concrete numeral or a
/// wildcard. An elided component is represented by absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternPart {
    Number(u64),
    Wildcard,
}

impl PatternPart {
    fn number(self) -> Option<u64> {
        match self {
            PatternPart::Number(n) => Some(n),
            PatternPart::Wildcard => None,
        }
    }
}

/// A partial version from range syntax, with its arity preserved: which
/// components were given and which were wildcards. Bound derivation for
/// each syntax form works on this instead of re-inspecting strings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionPattern {
    major: PatternPart,
    minor: Option<PatternPart>,
    patch: Option<PatternPart>,
    prerelease: Vec<Identifier>,
}

impl VersionPattern {
    fn parse(text: &str) -> Result<VersionPattern, String> {
        if text == "*" || text == "x" || text == "X" {
            return Ok(VersionPattern {
                major: PatternPart::Wildcard,
                minor: None,
                patch: None,
                prerelease: Vec::new(),
            });
        }

        let caps = PATTERN_RE
            .captures(text)
            .ok_or_else(|| format!("invalid version \"{}\"", text))?;

        let major = parse_part(caps.name("major").unwrap().as_str())?;
        let minor = caps.name("minor").map(|m| parse_part(m.as_str())).transpose()?;
        let patch = caps.name("patch").map(|m| parse_part(m.as_str())).transpose()?;

        let prerelease = match caps.name("pre") {
            None => Vec::new(),
            Some(m) => {
                let full_triple = matches!(major, PatternPart::Number(_))
                    && matches!(minor, Some(PatternPart::Number(_)))
                    && matches!(patch, Some(PatternPart::Number(_)));
                if !full_triple {
                    return Err(format!(
                        "prerelease tag requires a full version in \"{}\"",
                        text
                    ));
                }
                version::parse_identifiers(m.as_str()).map_err(|e| e.to_string())?
            }
        };

        Ok(VersionPattern {
            major,
            minor,
            patch,
            prerelease,
        })
    }

    /// A wildcard major makes the whole pattern universal
    fn is_any(&self) -> bool {
        self.major == PatternPart::Wildcard
    }

    /// The given minor numeral; None when elided or a wildcard (a wildcard
    /// also hides any component to its right)
    fn minor_number(&self) -> Option<u64> {
        self.minor.and_then(PatternPart::number)
    }

    fn patch_number(&self) -> Option<u64> {
        if self.minor_number().is_none() {
            return None;
        }
        self.patch.and_then(PatternPart::number)
    }

    /// The lowest concrete version matching the pattern: elided and
    /// wildcard components complete to zero, the prerelease tag is kept
    fn floor(&self) -> Version {
        Version::from_parts(
            self.major.number().unwrap_or(0),
            self.minor_number().unwrap_or(0),
            self.patch_number().unwrap_or(0),
            self.prerelease.clone(),
        )
    }
}

fn parse_part(text: &str) -> Result<PatternPart, String> {
    if text == "x" || text == "X" || text == "*" {
        return Ok(PatternPart::Wildcard);
    }
    text.parse::<u64>()
        .map(PatternPart::Number)
        .map_err(|_| format!("version component \"{}\" is out of range", text))
}

/// The prefix a segment may carry in front of its version pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prefix {
    Caret,
    Tilde,
    Op(Operator),
}

pub(crate) fn parse_range(text: &str, options: RangeOptions) -> Result<Range, RangeError> {
    if text.len() > MATCH_BUDGET {
        return Err(RangeError::MatchBudgetExceeded(MATCH_BUDGET));
    }

    let mut sets = Vec::new();
    for alternative in OR_RE.split(text.trim()) {
        let comparators =
            parse_alternative(alternative).map_err(|reason| RangeError::Syntax {
                range: text.to_string(),
                reason,
            })?;
        sets.push(ComparatorSet::new(comparators, options.include_all_prerelease));
    }

    Ok(Range::from_sets(sets))
}

/// Parse one `||`-alternative into its comparators. An empty alternative
/// denotes the universal set.
fn parse_alternative(alternative: &str) -> Result<Vec<Comparator>, String> {
    if let Some(caps) = HYPHEN_RE.captures(alternative) {
        let from = VersionPattern::parse(caps.name("from").unwrap().as_str())?;
        let to = VersionPattern::parse(caps.name("to").unwrap().as_str())?;
        return expand_hyphen(&from, &to);
    }

    let collapsed = OP_SPACING_RE.replace_all(alternative, "$1");

    let mut comparators = Vec::new();
    for segment in collapsed.split_whitespace() {
        comparators.extend(parse_segment(segment)?);
    }

    if comparators.is_empty() {
        comparators.push(Comparator::any());
    }

    Ok(comparators)
}

fn parse_segment(segment: &str) -> Result<Vec<Comparator>, String> {
    let (prefix, rest) = split_prefix(segment);
    let pattern = VersionPattern::parse(rest)?;

    match prefix {
        Prefix::Caret => expand_caret(&pattern),
        Prefix::Tilde => expand_tilde(&pattern),
        Prefix::Op(operator) => expand_comparator(operator, &pattern),
    }
}

fn split_prefix(segment: &str) -> (Prefix, &str) {
    if let Some(rest) = segment.strip_prefix("~>") {
        (Prefix::Tilde, rest)
    } else if let Some(rest) = segment.strip_prefix('~') {
        (Prefix::Tilde, rest)
    } else if let Some(rest) = segment.strip_prefix('^') {
        (Prefix::Caret, rest)
    } else if let Some(rest) = segment.strip_prefix(">=") {
        (Prefix::Op(Operator::GreaterThanOrEqual), rest)
    } else if let Some(rest) = segment.strip_prefix("<=") {
        (Prefix::Op(Operator::LessThanOrEqual), rest)
    } else if let Some(rest) = segment.strip_prefix('>') {
        (Prefix::Op(Operator::GreaterThan), rest)
    } else if let Some(rest) = segment.strip_prefix('<') {
        (Prefix::Op(Operator::LessThan), rest)
    } else if let Some(rest) = segment.strip_prefix('=') {
        (Prefix::Op(Operator::Equal), rest)
    } else {
        (Prefix::Op(Operator::Equal), segment)
    }
}

fn release(major: u64, minor: u64, patch: u64) -> Version {
    Version::new(major, minor, patch)
}

fn gte(version: Version) -> Comparator {
    Comparator::new(Operator::GreaterThanOrEqual, version)
}

fn lt(version: Version) -> Comparator {
    Comparator::new(Operator::LessThan, version)
}

/// A comparator no version can satisfy: strictly below the lowest
/// representable version
fn impossible() -> Comparator {
    Comparator::new(Operator::LessThan, Version::min().clone())
}

fn bumped(component: u64) -> Result<u64, String> {
    component
        .checked_add(1)
        .ok_or_else(|| "version component out of range after increment".to_string())
}

/// A bare or operator-prefixed pattern. A partial version completes its
/// missing components to zero for the lower bound while keeping its breadth:
/// `1.2` under `=` covers all of `[1.2.0, 1.3.0)`, not the single point.
fn expand_comparator(
    operator: Operator,
    pattern: &VersionPattern,
) -> Result<Vec<Comparator>, String> {
    if pattern.is_any() {
        return Ok(match operator {
            Operator::GreaterThan | Operator::LessThan => vec![impossible()],
            _ => vec![Comparator::any()],
        });
    }

    let major = pattern.major.number().expect("checked by is_any");

    let (lower, upper) = match pattern.minor_number() {
        None => (release(major, 0, 0), release(bumped(major)?, 0, 0)),
        Some(minor) => match pattern.patch_number() {
            None => (
                release(major, minor, 0),
                release(major, bumped(minor)?, 0),
            ),
            Some(_) => {
                // Full version: a single ordinary comparator
                return Ok(vec![Comparator::new(operator, pattern.floor())]);
            }
        },
    };

    Ok(match operator {
        Operator::Equal => vec![gte(lower), lt(upper)],
        Operator::GreaterThan => vec![gte(upper)],
        Operator::GreaterThanOrEqual => vec![gte(lower)],
        Operator::LessThan => vec![lt(lower)],
        Operator::LessThanOrEqual => vec![lt(upper)],
    })
}

/// Caret: fixed up to the leftmost non-zero given component
fn expand_caret(pattern: &VersionPattern) -> Result<Vec<Comparator>, String> {
    if pattern.is_any() {
        return Ok(vec![Comparator::any()]);
    }

    let major = pattern.major.number().expect("checked by is_any");

    let upper = match pattern.minor_number() {
        None => release(bumped(major)?, 0, 0),
        Some(minor) => match pattern.patch_number() {
            None => {
                if major == 0 {
                    release(0, bumped(minor)?, 0)
                } else {
                    release(bumped(major)?, 0, 0)
                }
            }
            Some(patch) => {
                if major > 0 {
                    release(bumped(major)?, 0, 0)
                } else if minor > 0 {
                    release(0, bumped(minor)?, 0)
                } else {
                    release(0, 0, bumped(patch)?)
                }
            }
        },
    };

    Ok(vec![gte(pattern.floor()), lt(upper)])
}

/// Tilde: next minor, or next major when the minor is elided
fn expand_tilde(pattern: &VersionPattern) -> Result<Vec<Comparator>, String> {
    if pattern.is_any() {
        return Ok(vec![Comparator::any()]);
    }

    let major = pattern.major.number().expect("checked by is_any");

    let upper = match pattern.minor_number() {
        None => release(bumped(major)?, 0, 0),
        Some(minor) => release(major, bumped(minor)?, 0),
    };

    Ok(vec![gte(pattern.floor()), lt(upper)])
}

/// Hyphen range: closed at a full upper version, right-open at the
/// completion of a partial one (`1.2 - 2.3` covers `[1.2.0, 2.4.0)`)
fn expand_hyphen(
    from: &VersionPattern,
    to: &VersionPattern,
) -> Result<Vec<Comparator>, String> {
    let mut comparators = Vec::new();

    if !from.is_any() {
        comparators.push(gte(from.floor()));
    }

    if !to.is_any() {
        let major = to.major.number().expect("checked by is_any");
        let upper = match to.minor_number() {
            None => lt(release(bumped(major)?, 0, 0)),
            Some(minor) => match to.patch_number() {
                None => lt(release(major, bumped(minor)?, 0)),
                Some(_) => Comparator::new(Operator::LessThanOrEqual, to.floor()),
            },
        };
        comparators.push(upper);
    }

    if comparators.is_empty() {
        comparators.push(Comparator::any());
    }

    Ok(comparators)
}
