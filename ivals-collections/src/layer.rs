use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::ops::Index;
use std::rc::Rc;

use ivals_core::ordering::{self, starts_order};
use ivals_core::{Interval, IntervalLike};

use crate::measures;
use crate::traits::{
    IndexedIntervalCollection, IntervalCollection, MutableIntervalCollection,
    SortedIntervalCollection,
};

/// An order over stored members, usually one of
/// [`starts_order`](ivals_core::ordering::starts_order) or
/// [`ends_order`](ivals_core::ordering::ends_order).
pub type Order<V> = fn(&V, &V) -> Ordering;

/// A symmetric conflict predicate applied to adjacent members on insertion.
pub type Conflict<V> = fn(&V, &V) -> bool;

/// The stock conflict predicates a [`Layer`] can be built with.
pub mod conflict {
    use ivals_core::IntervalLike;
    use ivals_core::ordering;

    /// Admits every neighbor.
    pub fn never<V: IntervalLike>(_: &V, _: &V) -> bool {
        false
    }

    /// Rejects neighbors whose point sets intersect.
    pub fn overlapping<V: IntervalLike>(a: &V, b: &V) -> bool {
        ordering::overlaps(a, b)
    }

    /// Rejects neighbors where either contains the other.
    pub fn containing<V: IntervalLike>(a: &V, b: &V) -> bool {
        ordering::contains(a, b) || ordering::contains(b, a)
    }
}

/// An endpoint-sorted sequence of intervals that keeps adjacent members free
/// of a configured conflict.
///
/// The layer is the building block the other collections compose: it owns a
/// sorted `Vec` of shared handles, answers binary-searched membership and
/// overlap-bound queries, and enforces its conflict predicate against the
/// would-be neighbors of every insertion. With the
/// [`containing`](conflict::containing) conflict a layer is containment-free,
/// which also makes member highs ascend along with their lows; the
/// overlap-bound searches rely on that shape.
///
/// Members are held as `Rc<V>`: the same stored interval can sit in several
/// layers at once (the dynamic tree files each interval under both of its
/// endpoints), and [`remove`](Layer::remove) distinguishes value-equal
/// members by handle identity.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use ivals_collections::layer::{conflict, Layer};
/// use ivals_core::Interval;
/// use ivals_core::ordering::starts_order;
///
/// let mut layer = Layer::with_conflict(starts_order(), conflict::overlapping);
/// assert!(layer.add(Rc::new(Interval::closed_open(1, 5).unwrap())));
/// // [4, 9) collides with [1, 5)
/// assert!(!layer.add(Rc::new(Interval::closed_open(4, 9).unwrap())));
/// assert_eq!(layer.len(), 1);
/// ```
pub struct Layer<V: IntervalLike> {
    entries: Vec<Rc<V>>,
    order: Order<V>,
    conflicts: Conflict<V>,
}

impl<V: IntervalLike> Layer<V> {
    /// An empty layer in the canonical starts order admitting any neighbors.
    pub fn new() -> Self {
        Self::with_order(starts_order::<V>())
    }

    /// An empty layer in the given order admitting any neighbors.
    pub fn with_order(order: Order<V>) -> Self {
        Self::with_conflict(order, conflict::never::<V>)
    }

    /// An empty layer in the given order that rejects insertions whose
    /// neighbors would satisfy `conflicts`.
    pub fn with_conflict(order: Order<V>, conflicts: Conflict<V>) -> Self {
        Layer {
            entries: Vec::new(),
            order,
            conflicts,
        }
    }

    /// Number of stored members.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the layer stores nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The member at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Rc<V>> {
        self.entries.get(index)
    }

    /// The first member in layer order.
    #[inline]
    pub fn first(&self) -> Option<&Rc<V>> {
        self.entries.first()
    }

    /// The last member in layer order.
    #[inline]
    pub fn last(&self) -> Option<&Rc<V>> {
        self.entries.last()
    }

    /// The members as a sorted slice.
    #[inline]
    pub fn as_slice(&self) -> &[Rc<V>] {
        &self.entries
    }

    /// Binary search for `query` under the layer order.
    ///
    /// Returns `Ok` with the *lowest* index whose member compares equal to
    /// `query` (the search keeps narrowing its upper bound on equality), or
    /// `Err` with the insertion point when no member matches.
    pub fn find(&self, query: &V) -> Result<usize, usize> {
        let mut lo = 0;
        let mut hi = self.entries.len();
        let mut matched = false;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match (self.order)(&self.entries[mid], query) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => {
                    matched = true;
                    hi = mid;
                }
            }
        }
        if matched { Ok(lo) } else { Err(lo) }
    }

    /// The smallest index whose member can still overlap `query`, or
    /// [`len`](Layer::len) when every member ends before `query` starts.
    ///
    /// A one-sided binary search on
    /// [`cmp_low_high`](ivals_core::ordering::cmp_low_high): it skips the
    /// prefix of members whose high endpoint lies before `query`'s low, so
    /// it is exact whenever member highs ascend (any conflict-free layer,
    /// and any layer whose members share a low endpoint group).
    pub fn find_first_overlap<Q>(&self, query: &Q) -> usize
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        self.entries
            .partition_point(|m| ordering::cmp_low_high(query, m.as_ref()) == Ordering::Greater)
    }

    /// The exclusive upper bound of the overlap region: the smallest index
    /// from which no member overlaps `query`. Exact whenever member lows
    /// ascend, which every layer order guarantees.
    pub fn find_last_overlap<Q>(&self, query: &Q) -> usize
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        self.entries
            .partition_point(|m| ordering::cmp_low_high(m.as_ref(), query) != Ordering::Greater)
    }

    /// Inserts `item` at its position in the layer order.
    ///
    /// Returns `false` and leaves the layer unchanged when either would-be
    /// neighbor satisfies the conflict predicate.
    pub fn add(&mut self, item: Rc<V>) -> bool {
        let at = match self.find(&item) {
            Ok(index) => index,
            Err(index) => index,
        };
        if at > 0 && (self.conflicts)(&self.entries[at - 1], &item) {
            return false;
        }
        if at < self.entries.len() && (self.conflicts)(&item, &self.entries[at]) {
            return false;
        }
        self.entries.insert(at, item);
        true
    }

    /// Removes the member that *is* `item`.
    ///
    /// Looks up by layer-order equality, then scans the run of equal members
    /// for the one sharing `item`'s identity. A member that is merely
    /// value-equal is left alone; the layer may legitimately hold several
    /// distinct handles with equal bounds.
    pub fn remove(&mut self, item: &Rc<V>) -> bool {
        let Ok(mut at) = self.find(item) else {
            return false;
        };
        while at < self.entries.len()
            && (self.order)(&self.entries[at], item) == Ordering::Equal
        {
            if Rc::ptr_eq(&self.entries[at], item) {
                self.entries.remove(at);
                return true;
            }
            at += 1;
        }
        false
    }

    /// Drops every member.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates the members in layer order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rc<V>> {
        self.entries.iter()
    }

    /// Iterates the members from `index` onward. `index` may equal
    /// [`len`](Layer::len) for an empty tail; anything beyond is a caller
    /// error and panics.
    pub fn iter_from(&self, index: usize) -> std::slice::Iter<'_, Rc<V>> {
        self.entries[index..].iter()
    }

    /// Iterates the members at `index` and below, last to first. `index`
    /// must be a valid member index.
    pub fn iter_backwards_from(
        &self,
        index: usize,
    ) -> std::iter::Rev<std::slice::Iter<'_, Rc<V>>> {
        self.entries[..=index].iter().rev()
    }

    /// Iterates the members of `[from, to)`.
    pub fn iter_range(&self, from: usize, to: usize) -> std::slice::Iter<'_, Rc<V>> {
        self.entries[from..to].iter()
    }
}

impl<V: IntervalLike> Default for Layer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IntervalLike> Clone for Layer<V> {
    fn clone(&self) -> Self {
        Layer {
            entries: self.entries.clone(),
            order: self.order,
            conflicts: self.conflicts,
        }
    }
}

impl<V: IntervalLike + Debug> Debug for Layer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}

impl<V: IntervalLike> Index<usize> for Layer<V> {
    type Output = Rc<V>;

    fn index(&self, index: usize) -> &Rc<V> {
        &self.entries[index]
    }
}

impl<'a, V: IntervalLike> IntoIterator for &'a Layer<V> {
    type Item = &'a Rc<V>;
    type IntoIter = std::slice::Iter<'a, Rc<V>>;

    fn into_iter(self) -> std::slice::Iter<'a, Rc<V>> {
        self.entries.iter()
    }
}

/// The collection capabilities read the layer as a starts-ordered sequence:
/// a conflict-free layer in starts order is itself the simplest indexed
/// interval collection. Layers built with
/// [`ends_order`](ivals_core::ordering::ends_order) should be queried
/// through the inherent methods instead.
impl<V: IntervalLike> IntervalCollection<V> for Layer<V> {
    fn count(&self) -> usize {
        self.entries.len()
    }

    fn span(&self) -> Option<Interval<V::Endpoint>> {
        measures::span_of(self.iter())
    }

    fn lowest_interval(&self) -> Option<Rc<V>> {
        self.entries.first().cloned()
    }

    fn maximum_depth(&self) -> usize {
        measures::maximum_depth(self.iter())
    }

    fn gaps(&self) -> Vec<Interval<V::Endpoint>> {
        measures::gaps(self.iter())
    }

    fn find_overlaps(&self, query: &Interval<V::Endpoint>) -> Vec<Rc<V>> {
        let last = self.find_last_overlap(query);
        let first = self.find_first_overlap(query).min(last);
        self.entries[first..last]
            .iter()
            .filter(|m| ordering::overlaps(m.as_ref(), query))
            .cloned()
            .collect()
    }

    fn find_overlap(&self, query: &Interval<V::Endpoint>) -> bool {
        let last = self.find_last_overlap(query);
        let first = self.find_first_overlap(query).min(last);
        self.entries[first..last]
            .iter()
            .any(|m| ordering::overlaps(m.as_ref(), query))
    }

    fn count_overlaps(&self, query: &Interval<V::Endpoint>) -> usize {
        let last = self.find_last_overlap(query);
        let first = self.find_first_overlap(query).min(last);
        self.entries[first..last]
            .iter()
            .filter(|m| ordering::overlaps(m.as_ref(), query))
            .count()
    }
}

impl<V: IntervalLike> MutableIntervalCollection<V> for Layer<V> {
    fn add(&mut self, item: Rc<V>) -> bool {
        Layer::add(self, item)
    }

    fn remove(&mut self, item: &Rc<V>) -> bool {
        Layer::remove(self, item)
    }

    fn clear(&mut self) {
        Layer::clear(self)
    }
}

impl<V: IntervalLike> SortedIntervalCollection<V> for Layer<V> {
    fn sorted(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter().cloned())
    }

    fn sorted_backwards(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter().rev().cloned())
    }
}

impl<V: IntervalLike> IndexedIntervalCollection<V> for Layer<V> {
    fn get(&self, index: usize) -> Option<Rc<V>> {
        self.entries.get(index).cloned()
    }

    fn iter_from_index(&self, index: usize) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter_from(index).cloned())
    }

    fn iter_backwards_from_index(&self, index: usize) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter_backwards_from(index).cloned())
    }

    fn iter_from(&self, query: &Interval<V::Endpoint>) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        let from = self
            .entries
            .partition_point(|m| ordering::starts_cmp(m.as_ref(), query) == Ordering::Less);
        Box::new(self.entries[from..].iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ivals_core::Interval;
    use ivals_core::ordering::ends_order;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    fn iv(s: &str) -> Rc<Interval<i32>> {
        Rc::new(s.parse().unwrap())
    }

    #[fixture]
    fn disjoint() -> Layer<Interval<i32>> {
        let mut layer = Layer::with_conflict(starts_order(), conflict::overlapping);
        for s in ["[1, 5)", "[5, 8)", "[10, 12]"] {
            assert!(layer.add(iv(s)));
        }
        layer
    }

    #[rstest]
    fn overlap_conflict_rejects_and_leaves_layer_unchanged() {
        let mut layer = Layer::with_conflict(starts_order(), conflict::overlapping);
        assert!(layer.add(iv("[1, 5)")));
        assert!(!layer.add(iv("[4, 9)")));
        assert_eq!(layer.len(), 1);
        assert_eq!(layer[0].as_ref(), &"[1, 5)".parse().unwrap());
    }

    #[rstest]
    fn containment_conflict_rejects_nested_neighbors() {
        let mut layer = Layer::with_conflict(starts_order(), conflict::containing);
        assert!(layer.add(iv("[1, 10]")));
        assert!(!layer.add(iv("[3, 4]")));
        assert!(layer.add(iv("[11, 12]")));
        let stored: Vec<String> = layer.iter().map(|m| m.to_string()).collect();
        assert_eq!(stored, vec!["[1, 10]", "[11, 12]"]);
    }

    #[rstest]
    fn find_returns_lowest_equal_index() {
        let mut layer: Layer<Interval<i32>> = Layer::new();
        for s in ["[1, 2]", "[3, 4]", "[3, 4]", "[3, 4]", "[5, 6]"] {
            assert!(layer.add(iv(s)));
        }
        assert_eq!(layer.find(&"[3, 4]".parse().unwrap()), Ok(1));
        assert_eq!(layer.find(&"[2, 9]".parse().unwrap()), Err(1));
        assert_eq!(layer.find(&"[9, 9]".parse().unwrap()), Err(5));
    }

    #[rstest]
    fn overlap_bounds_delimit_the_overlap_run(disjoint: Layer<Interval<i32>>) {
        let query: Interval<i32> = "[4, 10)".parse().unwrap();
        let first = disjoint.find_first_overlap(&query);
        let last = disjoint.find_last_overlap(&query);
        assert_eq!((first, last), (0, 2));

        let outside: Interval<i32> = "[13, 14]".parse().unwrap();
        assert_eq!(disjoint.find_first_overlap(&outside), disjoint.len());
        assert_eq!(disjoint.find_last_overlap(&outside), disjoint.len());
    }

    #[rstest]
    fn remove_matches_identity_not_value() {
        let mut layer: Layer<Interval<i32>> = Layer::new();
        let original = iv("[3, 4]");
        let twin = iv("[3, 4]");
        assert!(layer.add(Rc::clone(&original)));
        assert!(layer.add(Rc::clone(&twin)));

        let stranger = iv("[3, 4]");
        assert!(!layer.remove(&stranger));
        assert_eq!(layer.len(), 2);

        assert!(layer.remove(&twin));
        assert_eq!(layer.len(), 1);
        assert!(Rc::ptr_eq(&layer[0], &original));
    }

    #[rstest]
    fn ends_ordered_layer_sorts_by_high() {
        let mut layer = Layer::with_order(ends_order());
        for s in ["[1, 9]", "[2, 3]", "[4, 6)"] {
            assert!(layer.add(iv(s)));
        }
        let stored: Vec<String> = layer.iter().map(|m| m.to_string()).collect();
        assert_eq!(stored, vec!["[2, 3]", "[4, 6)", "[1, 9]"]);
    }

    #[rstest]
    fn directional_iteration(disjoint: Layer<Interval<i32>>) {
        let forward: Vec<String> = disjoint.iter_from(1).map(|m| m.to_string()).collect();
        assert_eq!(forward, vec!["[5, 8)", "[10, 12]"]);

        let backward: Vec<String> = disjoint
            .iter_backwards_from(1)
            .map(|m| m.to_string())
            .collect();
        assert_eq!(backward, vec!["[5, 8)", "[1, 5)"]);

        let range: Vec<String> = disjoint.iter_range(0, 2).map(|m| m.to_string()).collect();
        assert_eq!(range, vec!["[1, 5)", "[5, 8)"]);
    }
}
