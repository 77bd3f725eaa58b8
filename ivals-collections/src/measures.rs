//! Derived measures over sorted interval streams.
//!
//! Span, gap, and depth computations are the same for every collection, so
//! they are written once here against an iterator in canonical order and
//! reused by all the capability implementations.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ivals_core::{Interval, IntervalLike};

/// The end of a stored interval, ordered by value with an excluded end
/// before an included one at the same point.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct EndKey<E: Ord>(E, bool);

impl<E: Ord> EndKey<E> {
    /// Whether an interval reaching to `self` is already over when another
    /// one starts at `low`.
    fn ends_before(&self, low: &E, low_included: bool) -> bool {
        match self.0.cmp(low) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => !(self.1 && low_included),
            std::cmp::Ordering::Greater => false,
        }
    }
}

/// The smallest interval covering every member of `items`, or `None` for an
/// empty stream. The stream does not need to be sorted.
pub fn span_of<I>(items: I) -> Option<Interval<<I::Item as IntervalLike>::Endpoint>>
where
    I: IntoIterator,
    I::Item: IntervalLike,
{
    items.into_iter().fold(None, |span, item| {
        Some(match span {
            None => Interval::enclosing(&item),
            Some(span) => span.hull_with(&item),
        })
    })
}

/// The largest number of members whose point sets share a common point.
///
/// `sorted` must arrive in canonical order. A sweep keeps the ends of the
/// members currently covering the sweep point in a min-heap; each arriving
/// member first retires the ends lying strictly before its low.
pub fn maximum_depth<I>(sorted: I) -> usize
where
    I: IntoIterator,
    I::Item: IntervalLike,
{
    let mut active: BinaryHeap<Reverse<EndKey<_>>> = BinaryHeap::new();
    let mut deepest = 0;
    for item in sorted {
        while let Some(Reverse(end)) = active.peek() {
            if end.ends_before(item.low(), item.low_included()) {
                active.pop();
            } else {
                break;
            }
        }
        active.push(Reverse(EndKey(item.high().clone(), item.high_included())));
        deepest = deepest.max(active.len());
    }
    deepest
}

/// The maximal uncovered intervals between consecutive covered stretches.
///
/// `sorted` must arrive in canonical order. The returned gaps are pairwise
/// disjoint, lie strictly inside the stream's span, and together cover
/// exactly the points of the span no member covers. A gap's inclusion flags
/// are the complements of the covered ends around it, so a gap can be a
/// single point (between `[a, b)` and `(b, c]`).
pub fn gaps<I>(sorted: I) -> Vec<Interval<<I::Item as IntervalLike>::Endpoint>>
where
    I: IntoIterator,
    I::Item: IntervalLike,
{
    let mut found = Vec::new();
    let mut covered: Option<EndKey<<I::Item as IntervalLike>::Endpoint>> = None;
    for item in sorted {
        if let Some(frontier) = &covered {
            let gap_low = frontier.0.clone();
            let gap_low_included = !frontier.1;
            let gap_high = item.low().clone();
            let gap_high_included = !item.low_included();
            let genuine = match gap_low.cmp(&gap_high) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => gap_low_included && gap_high_included,
                std::cmp::Ordering::Greater => false,
            };
            if genuine {
                found.push(
                    Interval::new(gap_low, gap_high, gap_low_included, gap_high_included)
                        .expect("gap bounds are ordered"),
                );
            }
        }
        let reach = EndKey(item.high().clone(), item.high_included());
        covered = Some(match covered {
            None => reach,
            Some(frontier) => frontier.max(reach),
        });
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn sorted(specs: &[&str]) -> Vec<Interval<i32>> {
        let mut items: Vec<Interval<i32>> = specs.iter().map(|s| s.parse().unwrap()).collect();
        items.sort();
        items
    }

    #[rstest]
    #[case(&["[1, 5)", "[2, 3]", "[4, 7)", "[10, 12]"], 2)]
    #[case(&["[1, 2]", "[3, 4]", "[5, 6]"], 1)]
    #[case(&["[1, 9]", "[2, 8]", "[3, 7]"], 3)]
    #[case(&["[1, 5)", "[5, 9)"], 1)]
    #[case(&["[1, 5]", "[5, 9)"], 2)]
    #[case(&[], 0)]
    fn depth_cases(#[case] specs: &[&str], #[case] expected: usize) {
        assert_eq!(maximum_depth(sorted(specs)), expected);
    }

    #[rstest]
    fn span_covers_all_members() {
        let span = span_of(sorted(&["[1, 5)", "[2, 3]", "[10, 12)"])).unwrap();
        assert_eq!(span.to_string(), "[1, 12)");
        assert_eq!(span_of(Vec::<Interval<i32>>::new()), None);
    }

    #[rstest]
    #[case(&["[1, 5)", "[6, 9]"], &["[5, 6)"])]
    #[case(&["[1, 5)", "(5, 9]"], &["[5, 5]"])]
    #[case(&["[1, 5]", "(5, 9]"], &[])]
    #[case(&["[1, 10]", "[2, 3]", "[12, 13]"], &["(10, 12)"])]
    #[case(&["[1, 2]"], &[])]
    fn gap_cases(#[case] specs: &[&str], #[case] expected: &[&str]) {
        let found: Vec<String> = gaps(sorted(specs)).iter().map(|g| g.to_string()).collect();
        assert_eq!(found, expected.to_vec());
    }
}
