//! AND-groups of comparators and the OR-of-AND range expression

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use super::parser::{self, RangeError, RangeOptions};
use super::Comparator;
use crate::version::Version;

/// A conjunction of comparators: one alternative of a range expression.
/// A version is in the set when it satisfies every comparator, and, if it
/// is a prerelease, when at least one comparator in the set anchors its
/// (major, minor, patch) triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparatorSet {
    comparators: Vec<Comparator>,
    include_all_prerelease: bool,
}

impl ComparatorSet {
    pub(crate) fn new(comparators: Vec<Comparator>, include_all_prerelease: bool) -> Self {
        debug_assert!(!comparators.is_empty(), "comparator sets are never empty");
        ComparatorSet {
            comparators,
            include_all_prerelease,
        }
    }

    pub fn comparators(&self) -> &[Comparator] {
        &self.comparators
    }

    pub fn include_all_prerelease(&self) -> bool {
        self.include_all_prerelease
    }

    pub fn contains(&self, version: &Version) -> bool {
        for comparator in &self.comparators {
            if !comparator.matches(version) {
                return false;
            }
        }

        // The group-level prerelease gate: without an anchor the whole set
        // excludes a prerelease even though every comparison passed.
        if version.is_prerelease() && !self.include_all_prerelease {
            return self.comparators.iter().any(|c| c.anchors(version));
        }

        true
    }
}

impl fmt::Display for ComparatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, comparator) in self.comparators.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", comparator)?;
        }
        Ok(())
    }
}

/// A parsed npm-style range: a disjunction of comparator sets. The
/// canonical string rendering is computed lazily and cached; recomputation
/// is idempotent so concurrent readers need no coordination.
#[derive(Debug, Clone)]
pub struct Range {
    sets: Vec<ComparatorSet>,
    rendered: OnceLock<String>,
}

impl Range {
    /// Parse a range with default options
    pub fn parse(text: &str) -> Result<Range, RangeError> {
        Self::parse_with(text, RangeOptions::default())
    }

    /// Parse a range with the given options
    pub fn parse_with(text: &str, options: RangeOptions) -> Result<Range, RangeError> {
        parser::parse_range(text, options)
    }

    pub(crate) fn from_sets(sets: Vec<ComparatorSet>) -> Self {
        debug_assert!(!sets.is_empty(), "range expressions are never empty");
        Range {
            sets,
            rendered: OnceLock::new(),
        }
    }

    pub fn sets(&self) -> &[ComparatorSet] {
        &self.sets
    }

    /// Membership test: true when at least one comparator set contains the
    /// version. Short-circuits on the first satisfied set.
    pub fn contains(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| set.contains(version))
    }

    fn render(&self) -> String {
        let groups: Vec<String> = self.sets.iter().map(|set| set.to_string()).collect();
        groups.join(&format!(" {} ", parser::OR_SEPARATOR))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered.get_or_init(|| self.render()))
    }
}

impl FromStr for Range {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

impl PartialEq for Range {
    fn eq(&self, other: &Self) -> bool {
        // The rendering cache is a memoization detail, not identity
        self.sets == other.sets
    }
}

impl Eq for Range {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Operator;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn set(comparators: Vec<Comparator>) -> ComparatorSet {
        ComparatorSet::new(comparators, false)
    }

    #[test]
    fn test_set_requires_every_comparator() {
        let group = set(vec![
            Comparator::new(Operator::GreaterThanOrEqual, v("1.2.3")),
            Comparator::new(Operator::LessThan, v("2.0.0")),
        ]);

        assert!(group.contains(&v("1.2.3")));
        assert!(group.contains(&v("1.9.9")));
        assert!(!group.contains(&v("2.0.0")));
        assert!(!group.contains(&v("1.2.2")));
    }

    #[test]
    fn test_set_prerelease_gate() {
        let group = set(vec![
            Comparator::new(Operator::GreaterThanOrEqual, v("1.2.3-beta.2")),
            Comparator::new(Operator::LessThan, v("2.0.0")),
        ]);

        // Anchored by the first comparator's triple
        assert!(group.contains(&v("1.2.3-beta.4")));
        assert!(group.contains(&v("1.5.0")));
        // Inside the bounds but no comparator anchors this triple
        assert!(!group.contains(&v("1.2.4-beta.2")));
        assert!(!group.contains(&v("2.0.0-alpha")));
    }

    #[test]
    fn test_set_gate_disabled_by_options() {
        let group = ComparatorSet::new(
            vec![
                Comparator::new(Operator::GreaterThanOrEqual, v("1.2.3")),
                Comparator::new(Operator::LessThan, v("2.0.0")),
            ],
            true,
        );

        assert!(group.contains(&v("1.2.4-alpha")));
        assert!(group.contains(&v("2.0.0-alpha")));
    }

    #[test]
    fn test_range_or_semantics() {
        let range = Range::from_sets(vec![
            set(vec![Comparator::new(Operator::Equal, v("0.1.20"))]),
            set(vec![Comparator::new(Operator::Equal, v("1.2.4"))]),
        ]);

        assert!(range.contains(&v("1.2.4")));
        assert!(range.contains(&v("0.1.20")));
        assert!(!range.contains(&v("1.2.3")));
    }

    #[test]
    fn test_rendering_is_cached_and_stable() {
        let range = Range::from_sets(vec![
            set(vec![
                Comparator::new(Operator::GreaterThanOrEqual, v("1.2.3")),
                Comparator::new(Operator::LessThan, v("2.0.0")),
            ]),
            set(vec![Comparator::any()]),
        ]);

        let first = range.to_string();
        assert_eq!(first, ">=1.2.3 <2.0.0 || *");
        assert_eq!(range.to_string(), first);
    }

    #[test]
    fn test_equality_ignores_cache() {
        let a = Range::from_sets(vec![set(vec![Comparator::new(
            Operator::Equal,
            v("1.0.0"),
        )])]);
        let b = Range::from_sets(vec![set(vec![Comparator::new(
            Operator::Equal,
            v("1.0.0"),
        )])]);

        let _ = a.to_string();
        assert_eq!(a, b);
    }
}
