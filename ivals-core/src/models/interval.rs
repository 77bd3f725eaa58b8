use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{IntervalError, ParseIntervalError};
use crate::ordering;
use crate::traits::IntervalLike;

/// An immutable one-dimensional interval with per-endpoint inclusion flags.
///
/// The endpoint type only needs a total order; numeric structure is never
/// assumed. Construction validates that `low <= high` and that a
/// single-point interval includes both of its (coinciding) endpoints, so a
/// value of this type always describes a non-empty point set.
///
/// Intervals are value-like: deriving a different interval always produces a
/// new instance.
///
/// # Examples
///
/// ```
/// use ivals_core::Interval;
///
/// let a = Interval::closed_open(1, 5)?;
/// let b = Interval::closed(2, 8)?;
///
/// assert!(a.overlaps(&b));
/// assert_eq!(a.intersection_with(&b), Some(Interval::closed_open(2, 5)?));
/// assert_eq!(a.to_string(), "[1, 5)");
/// # Ok::<(), ivals_core::IntervalError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Interval<E: Ord + Clone> {
    low: E,
    high: E,
    low_included: bool,
    high_included: bool,
}

impl<E: Ord + Clone> Interval<E> {
    /// Creates an interval from its endpoints and inclusion flags.
    ///
    /// Fails with [`IntervalError::Inverted`] when `low > high` and with
    /// [`IntervalError::Empty`] when the endpoints coincide but either flag
    /// excludes them (such an interval would describe no points at all).
    pub fn new(
        low: E,
        high: E,
        low_included: bool,
        high_included: bool,
    ) -> Result<Self, IntervalError> {
        match low.cmp(&high) {
            Ordering::Greater => Err(IntervalError::Inverted),
            Ordering::Equal if !(low_included && high_included) => Err(IntervalError::Empty),
            _ => Ok(Interval {
                low,
                high,
                low_included,
                high_included,
            }),
        }
    }

    /// `[low, high]`
    pub fn closed(low: E, high: E) -> Result<Self, IntervalError> {
        Self::new(low, high, true, true)
    }

    /// `(low, high)`
    pub fn open(low: E, high: E) -> Result<Self, IntervalError> {
        Self::new(low, high, false, false)
    }

    /// `[low, high)`
    pub fn closed_open(low: E, high: E) -> Result<Self, IntervalError> {
        Self::new(low, high, true, false)
    }

    /// `(low, high]`
    pub fn open_closed(low: E, high: E) -> Result<Self, IntervalError> {
        Self::new(low, high, false, true)
    }

    /// The closed single-point interval `[point, point]`.
    pub fn point(point: E) -> Self {
        Interval {
            low: point.clone(),
            high: point,
            low_included: true,
            high_included: true,
        }
    }

    /// Copies the bounds of any interval-like value into an owned interval.
    pub fn enclosing<V>(value: &V) -> Self
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        Interval {
            low: value.low().clone(),
            high: value.high().clone(),
            low_included: value.low_included(),
            high_included: value.high_included(),
        }
    }

    /// The lower endpoint.
    pub fn low(&self) -> &E {
        &self.low
    }

    /// The upper endpoint.
    pub fn high(&self) -> &E {
        &self.high
    }

    /// Whether the lower endpoint belongs to the point set.
    pub fn low_included(&self) -> bool {
        self.low_included
    }

    /// Whether the upper endpoint belongs to the point set.
    pub fn high_included(&self) -> bool {
        self.high_included
    }

    /// Whether the interval is a single point.
    pub fn is_point(&self) -> bool {
        self.low == self.high
    }

    /// Whether the point sets of `self` and `other` intersect.
    pub fn overlaps<V>(&self, other: &V) -> bool
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        ordering::overlaps(self, other)
    }

    /// Whether `point` belongs to the point set.
    pub fn overlaps_point(&self, point: &E) -> bool {
        ordering::overlaps_point(self, point)
    }

    /// Whether `self`'s point set includes all of `other`'s.
    pub fn contains<V>(&self, other: &V) -> bool
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        ordering::contains(self, other)
    }

    /// Whether `self` contains `other` with room to spare on both sides.
    pub fn strictly_contains<V>(&self, other: &V) -> bool
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        ordering::strictly_contains(self, other)
    }

    /// Whether `self` and `other` share their low endpoint and flag.
    pub fn low_equals<V>(&self, other: &V) -> bool
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        ordering::low_equals(self, other)
    }

    /// Whether `self` and `other` share their high endpoint and flag.
    pub fn high_equals<V>(&self, other: &V) -> bool
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        ordering::high_equals(self, other)
    }

    /// The interval covering exactly the points in both `self` and `other`,
    /// or `None` when they do not overlap.
    pub fn intersection_with<V>(&self, other: &V) -> Option<Self>
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        if !self.overlaps(other) {
            return None;
        }
        let (low, low_included) = match self.low.cmp(other.low()) {
            Ordering::Greater => (self.low.clone(), self.low_included),
            Ordering::Less => (other.low().clone(), other.low_included()),
            Ordering::Equal => (
                self.low.clone(),
                self.low_included && other.low_included(),
            ),
        };
        let (high, high_included) = match self.high.cmp(other.high()) {
            Ordering::Less => (self.high.clone(), self.high_included),
            Ordering::Greater => (other.high().clone(), other.high_included()),
            Ordering::Equal => (
                self.high.clone(),
                self.high_included && other.high_included(),
            ),
        };
        Some(Interval {
            low,
            high,
            low_included,
            high_included,
        })
    }

    /// The smallest interval covering both `self` and `other`.
    pub fn hull_with<V>(&self, other: &V) -> Self
    where
        V: IntervalLike<Endpoint = E> + ?Sized,
    {
        let (low, low_included) = match self.low.cmp(other.low()) {
            Ordering::Less => (self.low.clone(), self.low_included),
            Ordering::Greater => (other.low().clone(), other.low_included()),
            Ordering::Equal => (
                self.low.clone(),
                self.low_included || other.low_included(),
            ),
        };
        let (high, high_included) = match self.high.cmp(other.high()) {
            Ordering::Greater => (self.high.clone(), self.high_included),
            Ordering::Less => (other.high().clone(), other.high_included()),
            Ordering::Equal => (
                self.high.clone(),
                self.high_included || other.high_included(),
            ),
        };
        Interval {
            low,
            high,
            low_included,
            high_included,
        }
    }
}

impl<E: Ord + Clone> IntervalLike for Interval<E> {
    type Endpoint = E;

    fn low(&self) -> &E {
        &self.low
    }

    fn high(&self) -> &E {
        &self.high
    }

    fn low_included(&self) -> bool {
        self.low_included
    }

    fn high_included(&self) -> bool {
        self.high_included
    }
}

impl<E: Ord + Clone> Ord for Interval<E> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        ordering::starts_cmp(self, other)
    }
}

impl<E: Ord + Clone> PartialOrd for Interval<E> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E: Ord + Clone + Display> Display for Interval<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}, {}{}",
            if self.low_included { '[' } else { '(' },
            self.low,
            self.high,
            if self.high_included { ']' } else { ')' },
        )
    }
}

impl<E: Ord + Clone + FromStr> FromStr for Interval<E> {
    type Err = ParseIntervalError;

    /// Parses the string form produced by `Display`: `'['` or `'('`, the low
    /// endpoint, `','`, the high endpoint, `']'` or `')'`. Whitespace around
    /// the delimiters is insignificant. Endpoint text must not itself
    /// contain a comma.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let low_included = match chars.next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(ParseIntervalError::MissingOpening(s.to_string())),
        };
        let high_included = match chars.next_back() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(ParseIntervalError::MissingClosing(s.to_string())),
        };
        let inner = chars.as_str();
        let (low_text, high_text) = inner
            .split_once(',')
            .ok_or_else(|| ParseIntervalError::MissingSeparator(s.to_string()))?;
        let low = low_text
            .trim()
            .parse()
            .map_err(|_| ParseIntervalError::Endpoint(low_text.trim().to_string()))?;
        let high = high_text
            .trim()
            .parse()
            .map_err(|_| ParseIntervalError::Endpoint(high_text.trim().to_string()))?;
        Ok(Self::new(low, high, low_included, high_included)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn rejects_inverted_endpoints() {
        assert_eq!(Interval::closed(5, 1), Err(IntervalError::Inverted));
    }

    #[rstest]
    #[case(false, false)]
    #[case(true, false)]
    #[case(false, true)]
    fn rejects_empty_point_sets(#[case] low_included: bool, #[case] high_included: bool) {
        assert_eq!(
            Interval::new(3, 3, low_included, high_included),
            Err(IntervalError::Empty)
        );
    }

    #[test]
    fn point_interval_is_closed() {
        let p = Interval::point(7);
        assert!(p.is_point());
        assert!(p.low_included() && p.high_included());
        assert!(p.overlaps_point(&7));
    }

    #[rstest]
    #[case("[1, 5)", "[2, 8)", Some("[2, 5)"))]
    #[case("[1, 5]", "[5, 8)", Some("[5, 5]"))]
    #[case("[1, 5)", "[5, 8)", None)]
    #[case("(1, 9)", "[3, 4]", Some("[3, 4]"))]
    fn intersections(#[case] a: &str, #[case] b: &str, #[case] expected: Option<&str>) {
        let a: Interval<i32> = a.parse().unwrap();
        let b: Interval<i32> = b.parse().unwrap();
        let expected = expected.map(|s| s.parse().unwrap());
        assert_eq!(a.intersection_with(&b), expected);
        assert_eq!(b.intersection_with(&a), expected);
    }

    #[rstest]
    #[case("[1, 5)", "[0, 2]", "[0, 5)")]
    #[case("[1, 2]", "[4, 9)", "[1, 9)")]
    #[case("(1, 5]", "[1, 5)", "[1, 5]")]
    fn hulls(#[case] a: &str, #[case] b: &str, #[case] expected: &str) {
        let a: Interval<i32> = a.parse().unwrap();
        let b: Interval<i32> = b.parse().unwrap();
        assert_eq!(a.hull_with(&b), expected.parse().unwrap());
    }

    #[rstest]
    #[case("[1, 5)")]
    #[case("(1, 5]")]
    #[case("(1, 5)")]
    #[case("[-3, 12]")]
    #[case("[7, 7]")]
    fn string_form_round_trips(#[case] text: &str) {
        let parsed: Interval<i32> = text.parse().unwrap();
        assert_eq!(parsed.to_string(), text);
        assert_eq!(parsed.to_string().parse::<Interval<i32>>().unwrap(), parsed);
    }

    #[test]
    fn parsing_ignores_whitespace() {
        let spaced: Interval<i32> = "  [ 1 ,  5 )  ".parse().unwrap();
        assert_eq!(spaced, "[1, 5)".parse().unwrap());
    }

    #[rstest]
    #[case("1, 5)")]
    #[case("[1, 5")]
    #[case("[1 5)")]
    #[case("[x, 5)")]
    #[case("[5, 1]")]
    fn parse_failures(#[case] text: &str) {
        assert!(text.parse::<Interval<i32>>().is_err());
    }

    #[test]
    fn equal_intervals_hash_alike() {
        let a: Interval<i32> = "[1, 5)".parse().unwrap();
        let b: Interval<i32> = "[1, 5)".parse().unwrap();
        let hash = |iv: &Interval<i32>| {
            let mut hasher = DefaultHasher::new();
            iv.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(a, b);
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn canonical_order_is_total_on_samples() {
        let samples: Vec<Interval<i32>> = ["[1, 5)", "[1, 5]", "(1, 5)", "[1, 3]", "[2, 3]"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        for a in &samples {
            for b in &samples {
                match a.cmp(b) {
                    Ordering::Equal => assert_eq!(a, b),
                    ord => assert_eq!(b.cmp(a), ord.reverse()),
                }
                for c in &samples {
                    if a.cmp(b) != Ordering::Greater && b.cmp(c) != Ordering::Greater {
                        assert_ne!(a.cmp(c), Ordering::Greater);
                    }
                }
            }
        }
    }
}
