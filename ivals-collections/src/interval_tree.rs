use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::mem;
use std::rc::Rc;

use ivals_core::ordering::{self, ends_order, starts_order};
use ivals_core::sorting::timsort;
use ivals_core::{Interval, IntervalLike};

use crate::layer::{Conflict, Layer, conflict};
use crate::measures;
use crate::merge_queue::MultiWayMergeQueue;
use crate::traits::{IntervalCollection, MutableIntervalCollection, SortedIntervalCollection};

/// Covered range of a subtree, kept as raw bounds so it can widen without
/// re-validation.
#[derive(Debug, Clone)]
struct SpanBound<E: Ord + Clone> {
    low: E,
    low_included: bool,
    high: E,
    high_included: bool,
}

impl<E: Ord + Clone> SpanBound<E> {
    fn to_interval(&self) -> Interval<E> {
        Interval::new(
            self.low.clone(),
            self.high.clone(),
            self.low_included,
            self.high_included,
        )
        .expect("span bounds are ordered")
    }

    fn widen_low(&mut self, low: &E, included: bool) {
        match low.cmp(&self.low) {
            Ordering::Less => {
                self.low = low.clone();
                self.low_included = included;
            }
            Ordering::Equal => self.low_included |= included,
            Ordering::Greater => {}
        }
    }

    fn widen_high(&mut self, high: &E, included: bool) {
        match high.cmp(&self.high) {
            Ordering::Greater => {
                self.high = high.clone();
                self.high_included = included;
            }
            Ordering::Equal => self.high_included |= included,
            Ordering::Less => {}
        }
    }

    fn widen(&mut self, other: &SpanBound<E>) {
        self.widen_low(&other.low, other.low_included);
        self.widen_high(&other.high, other.high_included);
    }
}

impl<E: Ord + Clone> IntervalLike for SpanBound<E> {
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

/// Which of a node's two layers an operation touches.
#[derive(Clone, Copy)]
enum Side {
    Start,
    End,
}

struct Node<V: IntervalLike> {
    key: V::Endpoint,
    /// Members whose low endpoint equals `key`, in starts order.
    starting: Layer<V>,
    /// Members whose high endpoint equals `key`, in ends order.
    ending: Layer<V>,
    height: i64,
    /// Range covered by every member filed in this subtree. `None` only
    /// transiently, while a mutation is in flight.
    span: Option<SpanBound<V::Endpoint>>,
    left: Option<Box<Node<V>>>,
    right: Option<Box<Node<V>>>,
}

fn height<V: IntervalLike>(slot: &Option<Box<Node<V>>>) -> i64 {
    slot.as_ref().map_or(0, |node| node.height)
}

/// Furthest end reached by the members of a starts-ordered layer whose lows
/// all equal the node key. The layer splits into an included-low group and
/// an excluded-low group, each ascending by high, so the furthest end is the
/// larger of the two group tails.
fn highest_end<V: IntervalLike>(starting: &Layer<V>) -> Option<(&V::Endpoint, bool)> {
    let entries = starting.as_slice();
    let split = entries.partition_point(|m| m.low_included());
    let mut best: Option<(&V::Endpoint, bool)> = None;
    fn consider<'a, V: IntervalLike>(
        best: &mut Option<(&'a V::Endpoint, bool)>,
        candidate: Option<&'a Rc<V>>,
    ) {
        if let Some(member) = candidate {
            let reach = (member.high(), member.high_included());
            *best = Some(match *best {
                None => reach,
                Some(held) => {
                    match reach.0.cmp(held.0).then_with(|| reach.1.cmp(&held.1)) {
                        Ordering::Greater => reach,
                        _ => held,
                    }
                }
            });
        }
    }
    let first_tail = entries[..split].last();
    let second_tail = entries[split..].last();
    consider(&mut best, first_tail);
    consider(&mut best, second_tail);
    best
}

/// Nearest start reached by the members of an ends-ordered layer whose highs
/// all equal the node key. Symmetric to [`highest_end`]: the layer splits
/// into an excluded-high group and an included-high group, each ascending by
/// low, so the nearest start is the smaller of the two group heads.
fn lowest_start<V: IntervalLike>(ending: &Layer<V>) -> Option<(&V::Endpoint, bool)> {
    let entries = ending.as_slice();
    let split = entries.partition_point(|m| !m.high_included());
    let mut best: Option<(&V::Endpoint, bool)> = None;
    fn consider<'a, V: IntervalLike>(
        best: &mut Option<(&'a V::Endpoint, bool)>,
        candidate: Option<&'a Rc<V>>,
    ) {
        if let Some(member) = candidate {
            let reach = (member.low(), member.low_included());
            *best = Some(match *best {
                None => reach,
                Some(held) => {
                    match reach.0.cmp(held.0).then_with(|| held.1.cmp(&reach.1)) {
                        Ordering::Less => reach,
                        _ => held,
                    }
                }
            });
        }
    }
    let first_head = entries[..split].first();
    let second_head = entries[split..].first();
    consider(&mut best, first_head);
    consider(&mut best, second_head);
    best
}

/// Whether any member of an ends-ordered layer includes the shared high
/// endpoint.
fn any_end_included<V: IntervalLike>(ending: &Layer<V>) -> bool {
    let entries = ending.as_slice();
    entries.partition_point(|m| !m.high_included()) < entries.len()
}

/// The members of `group` (a single inclusion group of a starting layer,
/// sharing their low endpoint and flag) that overlap `query`, as a suffix.
fn overlap_suffix<'a, V, Q>(group: &'a [Rc<V>], query: &Q) -> &'a [Rc<V>]
where
    V: IntervalLike,
    Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
{
    if group.is_empty() || ordering::cmp_low_high(&group[0], query) == Ordering::Greater {
        return &group[..0];
    }
    let from = group
        .partition_point(|m| ordering::cmp_low_high(query, m.as_ref()) == Ordering::Greater);
    &group[from..]
}

/// The members of a starting layer overlapping `query`: one suffix per
/// inclusion group (the groups differ on whether the shared low endpoint
/// counts when it touches `query`'s high).
fn starting_runs<'a, V, Q>(starting: &'a Layer<V>, query: &Q) -> [&'a [Rc<V>]; 2]
where
    V: IntervalLike,
    Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
{
    let entries = starting.as_slice();
    let split = entries.partition_point(|m| m.low_included());
    let (included, excluded) = entries.split_at(split);
    [
        overlap_suffix(included, query),
        overlap_suffix(excluded, query),
    ]
}

impl<V: IntervalLike> Node<V> {
    fn new(key: V::Endpoint, conflicts: Conflict<V>) -> Self {
        Node {
            key,
            starting: Layer::with_conflict(starts_order::<V>(), conflicts),
            ending: Layer::with_conflict(ends_order::<V>(), conflicts),
            height: 1,
            span: None,
            left: None,
            right: None,
        }
    }

    fn layer_mut(&mut self, side: Side) -> &mut Layer<V> {
        match side {
            Side::Start => &mut self.starting,
            Side::End => &mut self.ending,
        }
    }

    /// Range covered by the members filed at this node alone.
    fn local_bound(&self) -> Option<SpanBound<V::Endpoint>> {
        let mut bound: Option<SpanBound<V::Endpoint>> = None;
        if let Some(first) = self.starting.first() {
            let (high, high_included) =
                highest_end(&self.starting).expect("layer has a first member");
            bound = Some(SpanBound {
                low: self.key.clone(),
                low_included: first.low_included(),
                high: high.clone(),
                high_included,
            });
        }
        if !self.ending.is_empty() {
            let (low, low_included) =
                lowest_start(&self.ending).expect("layer checked non-empty");
            let piece = SpanBound {
                low: low.clone(),
                low_included,
                high: self.key.clone(),
                high_included: any_end_included(&self.ending),
            };
            bound = Some(match bound {
                None => piece,
                Some(mut held) => {
                    held.widen(&piece);
                    held
                }
            });
        }
        bound
    }

    /// Recomputes height and subtree span from the children and the local
    /// layers.
    fn update(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
        let mut span = self.left.as_ref().and_then(|child| child.span.clone());
        if let Some(local) = self.local_bound() {
            span = Some(match span {
                None => local,
                Some(mut held) => {
                    held.widen(&local);
                    held
                }
            });
        }
        if let Some(child_span) = self.right.as_ref().and_then(|child| child.span.as_ref()) {
            span = Some(match span {
                None => child_span.clone(),
                Some(mut held) => {
                    held.widen(child_span);
                    held
                }
            });
        }
        self.span = span;
    }

    /// Restores the AVL shape at this node after a child changed height,
    /// refreshing the cached summaries along the way.
    fn repair(&mut self) {
        let left_h = height(&self.left);
        let right_h = height(&self.right);
        if (left_h - right_h).abs() <= 1 {
            self.update();
        } else if right_h > left_h {
            {
                let right = self
                    .right
                    .as_mut()
                    .expect("invalid tree: leaf is taller than its sibling");
                if height(&right.left) > height(&right.right) {
                    right.rotate_right();
                }
            }
            self.rotate_left();
        } else {
            {
                let left = self
                    .left
                    .as_mut()
                    .expect("invalid tree: leaf is taller than its sibling");
                if height(&left.right) > height(&left.left) {
                    left.rotate_left();
                }
            }
            self.rotate_right();
        }
    }

    /// Swaps the payload with the right child so the subtree pivots in
    /// place; both layers travel with their key, so every member stays filed
    /// under its own endpoints throughout.
    fn rotate_left(&mut self) {
        let mut new_root = self
            .right
            .take()
            .expect("left rotation requires a right child");
        let t1 = self.left.take();
        let t2 = new_root.left.take();
        let t3 = new_root.right.take();
        self.swap_payload(&mut new_root);

        new_root.left = t1;
        new_root.right = t2;
        new_root.update();

        self.right = t3;
        self.left = Some(new_root);
        self.update();
    }

    fn rotate_right(&mut self) {
        let mut new_root = self
            .left
            .take()
            .expect("right rotation requires a left child");
        let t1 = new_root.left.take();
        let t2 = new_root.right.take();
        let t3 = self.right.take();
        self.swap_payload(&mut new_root);

        new_root.left = t2;
        new_root.right = t3;
        new_root.update();

        self.left = t1;
        self.right = Some(new_root);
        self.update();
    }

    fn swap_payload(&mut self, other: &mut Node<V>) {
        mem::swap(&mut self.key, &mut other.key);
        mem::swap(&mut self.starting, &mut other.starting);
        mem::swap(&mut self.ending, &mut other.ending);
    }
}

/// A dynamic interval tree: an AVL tree over endpoint values whose nodes
/// file every stored member twice, under its low endpoint (`starting` layer,
/// starts order) and under its high endpoint (`ending` layer, ends order).
///
/// Each node caches the range covered by its whole subtree, which prunes
/// overlap queries down to the nodes that can contribute; each contribution
/// is a binary-searched run of a `starting` layer, and the runs stream
/// through a [`MultiWayMergeQueue`] so results arrive in canonical order.
/// Every member is emitted from the node owning its low endpoint, so
/// nothing is reported twice.
///
/// Insertion and removal keep the tree balanced with the usual single and
/// double rotations; a rotation moves each node's layers together with its
/// key, and removal unlinks a node once both its layers are empty.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use ivals_collections::interval_tree::DynamicIntervalTree;
/// use ivals_collections::traits::{IntervalCollection, MutableIntervalCollection};
/// use ivals_core::Interval;
///
/// let mut tree: DynamicIntervalTree<Interval<u32>> = DynamicIntervalTree::new();
/// for s in ["[1, 5)", "[2, 3]", "[4, 7)", "[10, 12]"] {
///     assert!(tree.add(Rc::new(s.parse().unwrap())));
/// }
///
/// assert_eq!(tree.span().unwrap().to_string(), "[1, 12]");
/// assert_eq!(tree.count_overlaps_point(&3), 2);
/// ```
pub struct DynamicIntervalTree<V: IntervalLike> {
    root: Option<Box<Node<V>>>,
    len: usize,
    conflicts: Conflict<V>,
}

impl<V: IntervalLike> DynamicIntervalTree<V> {
    /// An empty tree admitting arbitrarily overlapping members.
    pub fn new() -> Self {
        Self::with_conflict(conflict::never::<V>)
    }

    /// An empty tree whose per-node endpoint groups reject members that
    /// conflict with their neighbors.
    pub fn with_conflict(conflicts: Conflict<V>) -> Self {
        DynamicIntervalTree {
            root: None,
            len: 0,
            conflicts,
        }
    }

    /// Number of stored members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `item`, filing it under both endpoints. Returns `false` and
    /// leaves the tree unchanged when a conflict rejects it.
    pub fn add(&mut self, item: Rc<V>) -> bool {
        if !Self::descend_add(&mut self.root, item.low(), &item, Side::Start, self.conflicts) {
            return false;
        }
        if !Self::descend_add(&mut self.root, item.high(), &item, Side::End, self.conflicts) {
            let rolled_back =
                Self::descend_remove(&mut self.root, item.low(), &item, Side::Start);
            debug_assert!(rolled_back, "rollback must find the half-filed member");
            return false;
        }
        self.len += 1;
        true
    }

    /// Removes the member that *is* `item` (handle identity). Returns
    /// `false` when it is not stored.
    pub fn remove(&mut self, item: &Rc<V>) -> bool {
        if !Self::descend_remove(&mut self.root, item.low(), item, Side::Start) {
            return false;
        }
        let unfiled = Self::descend_remove(&mut self.root, item.high(), item, Side::End);
        debug_assert!(unfiled, "member filed under its low must be filed under its high");
        self.len -= 1;
        true
    }

    /// Drops every member.
    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// The range covered by the stored members, or `None` when empty.
    pub fn span(&self) -> Option<Interval<V::Endpoint>> {
        self.root
            .as_ref()
            .and_then(|node| node.span.as_ref())
            .map(SpanBound::to_interval)
    }

    /// The members in canonical order; the iterator borrows the tree.
    pub fn iter_sorted(&self) -> Sorted<'_, V> {
        Sorted::new(&self.root)
    }

    /// The members in reverse canonical order; the iterator borrows the
    /// tree.
    pub fn iter_sorted_backwards(&self) -> SortedBackwards<'_, V> {
        SortedBackwards::new(&self.root)
    }

    /// The members overlapping `query`, merged into canonical order.
    pub fn find_overlaps_iter<Q>(&self, query: &Q) -> MultiWayMergeQueue<V>
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let mut runs = Vec::new();
        Self::collect_runs(&self.root, query, &mut runs);
        let mut backing = Vec::with_capacity(runs.iter().map(|run| run.len()).sum());
        let mut bounds = Vec::with_capacity(runs.len());
        for run in &runs {
            let start = backing.len();
            backing.extend(run.iter().cloned());
            bounds.push((start, backing.len()));
        }
        let mut queue = MultiWayMergeQueue::new(backing, bounds.len().max(1));
        for (first, last) in bounds {
            queue
                .insert(first, last)
                .expect("one section per contributing node fits the queue");
        }
        queue
    }

    fn descend_add(
        slot: &mut Option<Box<Node<V>>>,
        key: &V::Endpoint,
        item: &Rc<V>,
        side: Side,
        conflicts: Conflict<V>,
    ) -> bool {
        match slot {
            None => {
                let mut node = Box::new(Node::new(key.clone(), conflicts));
                let filed = node.layer_mut(side).add(Rc::clone(item));
                debug_assert!(filed, "an empty layer has no conflicting neighbors");
                node.update();
                *slot = Some(node);
                true
            }
            Some(node) => match key.cmp(&node.key) {
                Ordering::Equal => {
                    let filed = node.layer_mut(side).add(Rc::clone(item));
                    if filed {
                        node.update();
                    }
                    filed
                }
                Ordering::Less => {
                    let filed = Self::descend_add(&mut node.left, key, item, side, conflicts);
                    if filed {
                        node.repair();
                    }
                    filed
                }
                Ordering::Greater => {
                    let filed = Self::descend_add(&mut node.right, key, item, side, conflicts);
                    if filed {
                        node.repair();
                    }
                    filed
                }
            },
        }
    }

    fn descend_remove(
        slot: &mut Option<Box<Node<V>>>,
        key: &V::Endpoint,
        item: &Rc<V>,
        side: Side,
    ) -> bool {
        let Some(node) = slot else {
            return false;
        };
        let unfiled = match key.cmp(&node.key) {
            Ordering::Less => Self::descend_remove(&mut node.left, key, item, side),
            Ordering::Greater => Self::descend_remove(&mut node.right, key, item, side),
            Ordering::Equal => {
                let unfiled = node.layer_mut(side).remove(item);
                if unfiled && node.starting.is_empty() && node.ending.is_empty() {
                    Self::unlink(slot);
                    return true;
                }
                unfiled
            }
        };
        if unfiled {
            if let Some(node) = slot {
                node.repair();
            }
        }
        unfiled
    }

    /// Unlinks the node at `slot`, splicing its in-order successor's payload
    /// into place when both children are present.
    fn unlink(slot: &mut Option<Box<Node<V>>>) {
        let mut node = slot.take().expect("unlink target exists");
        match (node.left.take(), node.right.take()) {
            (None, None) => {}
            (Some(child), None) | (None, Some(child)) => *slot = Some(child),
            (Some(left), Some(right)) => {
                let mut right = Some(right);
                let successor = Self::take_leftmost(&mut right);
                node.key = successor.key;
                node.starting = successor.starting;
                node.ending = successor.ending;
                node.left = Some(left);
                node.right = right;
                node.repair();
                *slot = Some(node);
            }
        }
    }

    fn take_leftmost(slot: &mut Option<Box<Node<V>>>) -> Box<Node<V>> {
        let has_left = slot
            .as_ref()
            .expect("leftmost of a non-empty subtree")
            .left
            .is_some();
        if has_left {
            let node = slot.as_mut().expect("checked non-empty above");
            let leftmost = Self::take_leftmost(&mut node.left);
            node.repair();
            leftmost
        } else {
            let mut taken = slot.take().expect("checked non-empty above");
            *slot = taken.right.take();
            taken
        }
    }

    fn collect_runs<'a, Q>(
        slot: &'a Option<Box<Node<V>>>,
        query: &Q,
        runs: &mut Vec<&'a [Rc<V>]>,
    ) where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let Some(node) = slot else {
            return;
        };
        let Some(span) = node.span.as_ref() else {
            return;
        };
        if !ordering::overlaps(query, span) {
            return;
        }
        Self::collect_runs(&node.left, query, runs);
        for run in starting_runs(&node.starting, query) {
            if !run.is_empty() {
                runs.push(run);
            }
        }
        Self::collect_runs(&node.right, query, runs);
    }

    fn count_runs<Q>(slot: &Option<Box<Node<V>>>, query: &Q) -> usize
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let Some(node) = slot else {
            return 0;
        };
        let Some(span) = node.span.as_ref() else {
            return 0;
        };
        if !ordering::overlaps(query, span) {
            return 0;
        }
        let local: usize = starting_runs(&node.starting, query)
            .iter()
            .map(|run| run.len())
            .sum();
        local + Self::count_runs(&node.left, query) + Self::count_runs(&node.right, query)
    }

    fn any_run<Q>(slot: &Option<Box<Node<V>>>, query: &Q) -> bool
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let Some(node) = slot else {
            return false;
        };
        let Some(span) = node.span.as_ref() else {
            return false;
        };
        if !ordering::overlaps(query, span) {
            return false;
        }
        starting_runs(&node.starting, query)
            .iter()
            .any(|run| !run.is_empty())
            || Self::any_run(&node.left, query)
            || Self::any_run(&node.right, query)
    }

    /// Verifies the search-tree order, the balance factors, the cached
    /// heights and spans, and that every member is filed under its own
    /// endpoints. Test support; panics on the first violation.
    #[doc(hidden)]
    pub fn assert_structure(&self) {
        Self::check_node(&self.root, None, None);
    }

    fn check_node(
        slot: &Option<Box<Node<V>>>,
        lower: Option<&V::Endpoint>,
        upper: Option<&V::Endpoint>,
    ) -> i64 {
        let Some(node) = slot else {
            return 0;
        };
        if let Some(bound) = lower {
            assert!(*bound < node.key, "key order violated");
        }
        if let Some(bound) = upper {
            assert!(node.key < *bound, "key order violated");
        }
        assert!(
            !node.starting.is_empty() || !node.ending.is_empty(),
            "empty node left in the tree"
        );
        for member in node.starting.iter() {
            assert!(member.low() == &node.key, "member filed under a foreign low");
        }
        for member in node.ending.iter() {
            assert!(member.high() == &node.key, "member filed under a foreign high");
        }
        let left_h = Self::check_node(&node.left, lower, Some(&node.key));
        let right_h = Self::check_node(&node.right, Some(&node.key), upper);
        assert!((left_h - right_h).abs() <= 1, "balance factor out of range");
        assert!(node.height == 1 + left_h.max(right_h), "stale cached height");

        let mut expected = node.left.as_ref().and_then(|child| child.span.clone());
        if let Some(local) = node.local_bound() {
            expected = Some(match expected {
                None => local,
                Some(mut held) => {
                    held.widen(&local);
                    held
                }
            });
        }
        if let Some(child_span) = node.right.as_ref().and_then(|child| child.span.as_ref()) {
            expected = Some(match expected {
                None => child_span.clone(),
                Some(mut held) => {
                    held.widen(child_span);
                    held
                }
            });
        }
        let (cached, fresh) = (node.span.as_ref(), expected.as_ref());
        let agree = match (cached, fresh) {
            (Some(a), Some(b)) => ordering::interval_equals(a, b),
            (None, None) => true,
            _ => false,
        };
        assert!(agree, "stale cached span");
        node.height
    }
}

impl<V: IntervalLike> Default for DynamicIntervalTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: IntervalLike> IntervalCollection<V> for DynamicIntervalTree<V> {
    fn count(&self) -> usize {
        self.len
    }

    fn span(&self) -> Option<Interval<V::Endpoint>> {
        DynamicIntervalTree::span(self)
    }

    fn lowest_interval(&self) -> Option<Rc<V>> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        node.starting.first().cloned()
    }

    fn maximum_depth(&self) -> usize {
        measures::maximum_depth(self.iter_sorted())
    }

    fn gaps(&self) -> Vec<Interval<V::Endpoint>> {
        measures::gaps(self.iter_sorted())
    }

    fn find_overlaps(&self, query: &Interval<V::Endpoint>) -> Vec<Rc<V>> {
        self.find_overlaps_iter(query).collect()
    }

    fn find_overlap(&self, query: &Interval<V::Endpoint>) -> bool {
        Self::any_run(&self.root, query)
    }

    fn count_overlaps(&self, query: &Interval<V::Endpoint>) -> usize {
        Self::count_runs(&self.root, query)
    }
}

impl<V: IntervalLike> MutableIntervalCollection<V> for DynamicIntervalTree<V> {
    fn add(&mut self, item: Rc<V>) -> bool {
        DynamicIntervalTree::add(self, item)
    }

    fn remove(&mut self, item: &Rc<V>) -> bool {
        DynamicIntervalTree::remove(self, item)
    }

    fn clear(&mut self) {
        DynamicIntervalTree::clear(self)
    }
}

impl<V: IntervalLike> SortedIntervalCollection<V> for DynamicIntervalTree<V> {
    fn sorted(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter_sorted().cloned())
    }

    fn sorted_backwards(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter_sorted_backwards().cloned())
    }
}

impl<V: IntervalLike> FromIterator<Rc<V>> for DynamicIntervalTree<V> {
    fn from_iter<I: IntoIterator<Item = Rc<V>>>(iter: I) -> Self {
        let mut items: Vec<Rc<V>> = iter.into_iter().collect();
        timsort(&mut items, |a, b| ordering::starts_cmp(a.as_ref(), b.as_ref()));
        let mut tree = Self::new();
        for item in items {
            tree.add(item);
        }
        tree
    }
}

impl<V: IntervalLike> Extend<Rc<V>> for DynamicIntervalTree<V> {
    fn extend<I: IntoIterator<Item = Rc<V>>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<V: IntervalLike + Debug> Debug for DynamicIntervalTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter_sorted()).finish()
    }
}

/// In-order walk chaining the `starting` layers, which is exactly the
/// canonical member order.
pub struct Sorted<'a, V: IntervalLike> {
    stack: Vec<&'a Node<V>>,
    run: std::slice::Iter<'a, Rc<V>>,
}

impl<'a, V: IntervalLike> Sorted<'a, V> {
    fn new(root: &'a Option<Box<Node<V>>>) -> Self {
        let mut walk = Sorted {
            stack: Vec::new(),
            run: std::slice::Iter::default(),
        };
        walk.push_left(root);
        walk
    }

    fn push_left(&mut self, mut slot: &'a Option<Box<Node<V>>>) {
        while let Some(node) = slot {
            self.stack.push(node);
            slot = &node.left;
        }
    }
}

impl<'a, V: IntervalLike> Iterator for Sorted<'a, V> {
    type Item = &'a Rc<V>;

    fn next(&mut self) -> Option<&'a Rc<V>> {
        loop {
            if let Some(member) = self.run.next() {
                return Some(member);
            }
            let node = self.stack.pop()?;
            self.run = node.starting.as_slice().iter();
            self.push_left(&node.right);
        }
    }
}

/// Reverse in-order walk over reversed `starting` layers: the exact reverse
/// of [`Sorted`].
pub struct SortedBackwards<'a, V: IntervalLike> {
    stack: Vec<&'a Node<V>>,
    run: std::iter::Rev<std::slice::Iter<'a, Rc<V>>>,
}

impl<'a, V: IntervalLike> SortedBackwards<'a, V> {
    fn new(root: &'a Option<Box<Node<V>>>) -> Self {
        let mut walk = SortedBackwards {
            stack: Vec::new(),
            run: std::slice::Iter::default().rev(),
        };
        walk.push_right(root);
        walk
    }

    fn push_right(&mut self, mut slot: &'a Option<Box<Node<V>>>) {
        while let Some(node) = slot {
            self.stack.push(node);
            slot = &node.right;
        }
    }
}

impl<'a, V: IntervalLike> Iterator for SortedBackwards<'a, V> {
    type Item = &'a Rc<V>;

    fn next(&mut self) -> Option<&'a Rc<V>> {
        loop {
            if let Some(member) = self.run.next() {
                return Some(member);
            }
            let node = self.stack.pop()?;
            self.run = node.starting.as_slice().iter().rev();
            self.push_right(&node.left);
        }
    }
}
