//! Single atomic constraint of an npm-style range

use std::fmt;

use super::Operator;
use crate::version::Version;

/// One relational test: an operator and a version, or the wildcard
/// comparator produced for `*`/`x` alternatives which matches every version.
/// Comparators are produced only by the range compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    operator: Operator,
    version: Option<Version>,
}

impl Comparator {
    pub(crate) fn new(operator: Operator, version: Version) -> Self {
        Comparator {
            operator,
            version: Some(version),
        }
    }

    /// The wildcard comparator, satisfied by every version
    pub(crate) fn any() -> Self {
        Comparator {
            operator: Operator::Equal,
            version: None,
        }
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// The comparator's version, or None for the wildcard comparator
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn is_any(&self) -> bool {
        self.version.is_none()
    }

    /// Plain operator comparison under precedence order. The prerelease
    /// visibility gate is applied by the owning comparator set, not here.
    pub fn matches(&self, version: &Version) -> bool {
        let own = match &self.version {
            Some(own) => own,
            None => return true,
        };

        let ordering = version.cmp_precedence(own);
        match self.operator {
            Operator::Equal => ordering == std::cmp::Ordering::Equal,
            Operator::LessThan => ordering == std::cmp::Ordering::Less,
            Operator::LessThanOrEqual => ordering != std::cmp::Ordering::Greater,
            Operator::GreaterThan => ordering == std::cmp::Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != std::cmp::Ordering::Less,
        }
    }

    /// True when this comparator opens the prerelease window for the given
    /// version: its own version is a prerelease of the same triple
    pub(crate) fn anchors(&self, version: &Version) -> bool {
        self.version
            .as_ref()
            .map_or(false, |own| own.is_prerelease() && own.same_triple(version))
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            None => write!(f, "*"),
            // Equality renders as the bare version, the form the grammar
            // reads back as an implicit "="
            Some(version) if self.operator == Operator::Equal => write!(f, "{}", version),
            Some(version) => write!(f, "{}{}", self.operator, version),
        }
    }
}
