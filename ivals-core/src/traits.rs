use std::rc::Rc;

/// A trait for anything that carries a one-dimensional interval.
///
/// Collections in the `ivals` ecosystem are generic over this trait rather
/// than over a concrete interval struct, so clients can store their own
/// interval-carrying record types (an annotated span, a scheduled slot, a
/// versioned range) without wrapping them.
///
/// An implementor describes the point set between `low` and `high`, where
/// each endpoint is part of the set only when the matching inclusion flag is
/// `true`. Implementations must uphold `low <= high`, and when the endpoints
/// coincide both flags must be `true`; [`Interval`](crate::Interval) enforces
/// this at construction and is the canonical implementor.
pub trait IntervalLike {
    /// The endpoint type. Any total order works; no numeric structure is
    /// assumed.
    type Endpoint: Ord + Clone;

    /// The lower endpoint.
    fn low(&self) -> &Self::Endpoint;

    /// The upper endpoint.
    fn high(&self) -> &Self::Endpoint;

    /// Whether `low` itself belongs to the point set.
    fn low_included(&self) -> bool;

    /// Whether `high` itself belongs to the point set.
    fn high_included(&self) -> bool;

    /// Whether the interval is a single point.
    fn is_point(&self) -> bool {
        self.low() == self.high()
    }
}

impl<V: IntervalLike + ?Sized> IntervalLike for &V {
    type Endpoint = V::Endpoint;

    fn low(&self) -> &Self::Endpoint {
        (**self).low()
    }

    fn high(&self) -> &Self::Endpoint {
        (**self).high()
    }

    fn low_included(&self) -> bool {
        (**self).low_included()
    }

    fn high_included(&self) -> bool {
        (**self).high_included()
    }
}

impl<V: IntervalLike + ?Sized> IntervalLike for Rc<V> {
    type Endpoint = V::Endpoint;

    fn low(&self) -> &Self::Endpoint {
        (**self).low()
    }

    fn high(&self) -> &Self::Endpoint {
        (**self).high()
    }

    fn low_included(&self) -> bool {
        (**self).low_included()
    }

    fn high_included(&self) -> bool {
        (**self).high_included()
    }
}
