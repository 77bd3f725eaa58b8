//! Endpoint orders and overlap primitives.
//!
//! Everything sorted in this ecosystem is sorted by one of two orders built
//! here: the *starts order* (low endpoint first, the canonical enumeration
//! order) or the *ends order* (high endpoint first). The third comparison,
//! [`cmp_low_high`], relates one interval's low to another's high and is the
//! single primitive all overlap queries reduce to.

use std::cmp::Ordering;

use crate::traits::IntervalLike;

/// The canonical order: by low endpoint, an included low before an excluded
/// one, then by high endpoint, an excluded high before an included one.
#[inline]
pub fn starts_cmp<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    a.low()
        .cmp(b.low())
        .then_with(|| b.low_included().cmp(&a.low_included()))
        .then_with(|| a.high().cmp(b.high()))
        .then_with(|| a.high_included().cmp(&b.high_included()))
}

/// The ending order: by high endpoint, an excluded high before an included
/// one, then by low endpoint, an included low before an excluded one.
#[inline]
pub fn ends_cmp<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    a.high()
        .cmp(b.high())
        .then_with(|| a.high_included().cmp(&b.high_included()))
        .then_with(|| a.low().cmp(b.low()))
        .then_with(|| b.low_included().cmp(&a.low_included()))
}

/// Compares `a`'s low endpoint against `b`'s high endpoint.
///
/// Coinciding points compare `Equal` only when both ends include them;
/// otherwise `a`'s low is past `b`'s high and the result is `Greater`. The
/// overlap relation is exactly `cmp_low_high(a, b) <= 0` in both directions.
#[inline]
pub fn cmp_low_high<A, B>(a: &A, b: &B) -> Ordering
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    match a.low().cmp(b.high()) {
        Ordering::Equal if a.low_included() && b.high_included() => Ordering::Equal,
        Ordering::Equal => Ordering::Greater,
        ord => ord,
    }
}

/// Whether the point sets of `a` and `b` intersect.
#[inline]
pub fn overlaps<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    cmp_low_high(a, b) != Ordering::Greater && cmp_low_high(b, a) != Ordering::Greater
}

/// Whether `a`'s point set includes the point `p`.
#[inline]
pub fn overlaps_point<A: IntervalLike + ?Sized>(a: &A, p: &A::Endpoint) -> bool {
    let low = match a.low().cmp(p) {
        Ordering::Equal => a.low_included(),
        ord => ord == Ordering::Less,
    };
    let high = match a.high().cmp(p) {
        Ordering::Equal => a.high_included(),
        ord => ord == Ordering::Greater,
    };
    low && high
}

/// Whether `a`'s point set includes all of `b`'s.
#[inline]
pub fn contains<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    let low = match a.low().cmp(b.low()) {
        Ordering::Less => true,
        Ordering::Equal => a.low_included() || !b.low_included(),
        Ordering::Greater => false,
    };
    let high = match a.high().cmp(b.high()) {
        Ordering::Greater => true,
        Ordering::Equal => a.high_included() || !b.high_included(),
        Ordering::Less => false,
    };
    low && high
}

/// Whether `a` contains `b` with room to spare on both sides.
#[inline]
pub fn strictly_contains<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    let low = match a.low().cmp(b.low()) {
        Ordering::Less => true,
        Ordering::Equal => a.low_included() && !b.low_included(),
        Ordering::Greater => false,
    };
    let high = match a.high().cmp(b.high()) {
        Ordering::Greater => true,
        Ordering::Equal => a.high_included() && !b.high_included(),
        Ordering::Less => false,
    };
    low && high
}

/// Whether `a` and `b` share their low endpoint, inclusion flag and all.
#[inline]
pub fn low_equals<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    a.low() == b.low() && a.low_included() == b.low_included()
}

/// Whether `a` and `b` share their high endpoint, inclusion flag and all.
#[inline]
pub fn high_equals<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    a.high() == b.high() && a.high_included() == b.high_included()
}

/// Whether `a` and `b` describe the same point set.
#[inline]
pub fn interval_equals<A, B>(a: &A, b: &B) -> bool
where
    A: IntervalLike + ?Sized,
    B: IntervalLike<Endpoint = A::Endpoint> + ?Sized,
{
    low_equals(a, b) && high_equals(a, b)
}

/// The starts-order comparer as a plain function pointer, ready to hand to a
/// `Layer` or a merge queue.
pub fn starts_order<V: IntervalLike>() -> fn(&V, &V) -> Ordering {
    starts_cmp::<V, V>
}

/// The ends-order comparer as a plain function pointer.
pub fn ends_order<V: IntervalLike>() -> fn(&V, &V) -> Ordering {
    ends_cmp::<V, V>
}
