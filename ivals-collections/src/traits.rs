use std::rc::Rc;

use ivals_core::{Interval, IntervalLike};

/// The base capability every interval collection offers.
///
/// A collection stores shared handles to interval-like records and answers
/// stabbing and overlap queries about them. Structural measures (`span`,
/// `maximum_depth`, `gaps`) describe the stored set as a whole.
///
/// The boolean and counting queries have derived defaults so a concrete
/// collection only has to supply the primitives; implementations with a
/// cheaper path (a pruned descent that stops at the first hit, a run count
/// that never materializes members) override them.
pub trait IntervalCollection<V: IntervalLike> {
    /// Number of stored members.
    fn count(&self) -> usize;

    /// Whether nothing is stored.
    fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// The smallest interval covering every member, or `None` when empty.
    fn span(&self) -> Option<Interval<V::Endpoint>>;

    /// The first member in canonical order, or `None` when empty.
    fn lowest_interval(&self) -> Option<Rc<V>>;

    /// The largest number of members sharing a common point.
    fn maximum_depth(&self) -> usize;

    /// The maximal uncovered intervals inside the span, in canonical order.
    fn gaps(&self) -> Vec<Interval<V::Endpoint>>;

    /// Every member overlapping `query`.
    fn find_overlaps(&self, query: &Interval<V::Endpoint>) -> Vec<Rc<V>>;

    /// Every member whose point set includes `point`.
    fn find_overlaps_point(&self, point: &V::Endpoint) -> Vec<Rc<V>> {
        self.find_overlaps(&Interval::point(point.clone()))
    }

    /// Whether any member overlaps `query`.
    fn find_overlap(&self, query: &Interval<V::Endpoint>) -> bool {
        !self.find_overlaps(query).is_empty()
    }

    /// Whether any member's point set includes `point`.
    fn find_overlap_point(&self, point: &V::Endpoint) -> bool {
        self.find_overlap(&Interval::point(point.clone()))
    }

    /// Number of members overlapping `query`.
    fn count_overlaps(&self, query: &Interval<V::Endpoint>) -> usize {
        self.find_overlaps(query).len()
    }

    /// Number of members whose point set includes `point`.
    fn count_overlaps_point(&self, point: &V::Endpoint) -> usize {
        self.count_overlaps(&Interval::point(point.clone()))
    }
}

/// A collection that supports membership changes.
///
/// `add` and `remove` report success instead of failing: a rejected insert
/// (a conflicting neighbor) and a removal of an unknown member both return
/// `false` and leave the collection unchanged.
pub trait MutableIntervalCollection<V: IntervalLike>: IntervalCollection<V> {
    /// Stores `item`. Returns `false` when the collection rejects it.
    fn add(&mut self, item: Rc<V>) -> bool;

    /// Removes the member that *is* `item` (handle identity, not value
    /// equality). Returns `false` when no such member is stored.
    fn remove(&mut self, item: &Rc<V>) -> bool;

    /// Drops every member.
    fn clear(&mut self);
}

/// A collection whose members can be enumerated in canonical order.
///
/// The iterators borrow the collection, so the borrow checker rules out
/// mutation while an enumeration is live.
pub trait SortedIntervalCollection<V: IntervalLike>: IntervalCollection<V> {
    /// The members in canonical order.
    fn sorted(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_>;

    /// The members in reverse canonical order.
    fn sorted_backwards(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_>;
}

/// A sorted collection with constant-time positional access.
pub trait IndexedIntervalCollection<V: IntervalLike>: SortedIntervalCollection<V> {
    /// The member at `index`, or `None` past the end.
    fn get(&self, index: usize) -> Option<Rc<V>>;

    /// The members from `index` onward, in canonical order.
    fn iter_from_index(&self, index: usize) -> Box<dyn Iterator<Item = Rc<V>> + '_>;

    /// The members at `index` and below, last to first.
    fn iter_backwards_from_index(&self, index: usize) -> Box<dyn Iterator<Item = Rc<V>> + '_>;

    /// The members from the first one canonically at or above `query`.
    fn iter_from(&self, query: &Interval<V::Endpoint>) -> Box<dyn Iterator<Item = Rc<V>> + '_>;

    /// The members from the first one canonically at or above the point
    /// interval at `point`.
    fn iter_from_point(&self, point: &V::Endpoint) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        self.iter_from(&Interval::point(point.clone()))
    }
}
