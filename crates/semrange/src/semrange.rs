//! Facade providing high-level version/range operations on strings

use crate::range::{Range, RangeOptions};
use crate::version::Version;

/// Main facade for range matching over version strings. Versions are
/// accepted leniently (surrounding whitespace, leading `v`); anything that
/// fails to parse simply does not satisfy.
pub struct Semrange;

impl Semrange {
    /// Check if a version satisfies a range
    pub fn satisfies(version: &str, range: &str) -> bool {
        Self::satisfies_with(version, range, RangeOptions::default())
    }

    /// Check if a version satisfies a range with the given options
    pub fn satisfies_with(version: &str, range: &str, options: RangeOptions) -> bool {
        let version = match Version::parse_lenient(version) {
            Ok(v) => v,
            Err(_) => return false,
        };

        let range = match Range::parse_with(range, options) {
            Ok(r) => r,
            Err(_) => return false,
        };

        range.contains(&version.without_build_metadata())
    }

    /// Return all versions that satisfy the given range, in input order
    pub fn satisfied_by(versions: &[&str], range: &str) -> Vec<String> {
        let range = match Range::parse(range) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };

        versions
            .iter()
            .filter_map(|text| {
                let version = Version::parse_lenient(text).ok()?;
                if range.contains(&version.without_build_metadata()) {
                    Some(text.to_string())
                } else {
                    None
                }
            })
            .collect()
    }

    /// The highest version satisfying the range, if any
    pub fn max_satisfying(versions: &[&str], range: &str) -> Option<String> {
        Self::extreme_satisfying(versions, range, true)
    }

    /// The lowest version satisfying the range, if any
    pub fn min_satisfying(versions: &[&str], range: &str) -> Option<String> {
        Self::extreme_satisfying(versions, range, false)
    }

    fn extreme_satisfying(versions: &[&str], range: &str, highest: bool) -> Option<String> {
        let range = Range::parse(range).ok()?;

        let mut best: Option<(Version, &str)> = None;
        for &text in versions {
            let version = match Version::parse_lenient(text) {
                Ok(v) => v.without_build_metadata(),
                Err(_) => continue,
            };
            if !range.contains(&version) {
                continue;
            }

            let better = match &best {
                None => true,
                Some((current, _)) => {
                    let ordering = version.cmp_precedence(current);
                    if highest {
                        ordering == std::cmp::Ordering::Greater
                    } else {
                        ordering == std::cmp::Ordering::Less
                    }
                }
            };
            if better {
                best = Some((version, text));
            }
        }

        best.map(|(_, text)| text.to_string())
    }

    /// Sort versions in ascending precedence order, dropping entries that
    /// do not parse
    pub fn sort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, true)
    }

    /// Sort versions in descending precedence order (reverse sort)
    pub fn rsort(versions: &[&str]) -> Vec<String> {
        Self::usort(versions, false)
    }

    fn usort(versions: &[&str], ascending: bool) -> Vec<String> {
        let mut parsed: Vec<(Version, usize)> = versions
            .iter()
            .enumerate()
            .filter_map(|(i, text)| Some((Version::parse_lenient(text).ok()?, i)))
            .collect();

        parsed.sort_by(|(a, _), (b, _)| {
            let ordering = a.cmp_precedence(b);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        });

        parsed
            .into_iter()
            .map(|(_, i)| versions[i].to_string())
            .collect()
    }
}
