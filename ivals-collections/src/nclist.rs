use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::rc::Rc;

use ivals_core::sorting::merge_sort;
use ivals_core::{Interval, IntervalLike, ordering};

use crate::layer::{Layer, conflict};
use crate::measures;
use crate::merge_queue::MultiWayMergeQueue;
use crate::traits::{IntervalCollection, SortedIntervalCollection};

/// The build order: containers ahead of the intervals they contain.
///
/// Low ascending with an included low first, then high *descending* with an
/// included high first. The canonical order alone cannot seed the level
/// structure: it puts `[1, 5)` ahead of `[1, 10]`, and the container must
/// come first to claim the outer level.
fn nesting_cmp<V: IntervalLike + ?Sized>(a: &V, b: &V) -> Ordering {
    a.low()
        .cmp(b.low())
        .then_with(|| b.low_included().cmp(&a.low_included()))
        .then_with(|| b.high().cmp(a.high()))
        .then_with(|| b.high_included().cmp(&a.high_included()))
}

/// One level of the containment hierarchy: a containment-free layer plus,
/// per entry, the `[from, to)` run of its direct children in the next level.
struct Level<V: IntervalLike> {
    run: Layer<V>,
    children: Vec<(usize, usize)>,
}

impl<V: IntervalLike> Level<V> {
    fn new() -> Self {
        Level {
            run: Layer::with_conflict(ordering::starts_order::<V>(), conflict::containing),
            children: Vec::new(),
        }
    }
}

/// A static nested containment list.
///
/// Built once from a batch of intervals, the list peels the input into
/// levels: the outermost level holds the members contained in no other
/// member, each deeper level holds the members directly contained in an
/// entry of the level above, and every level is containment-free. Within a
/// containment-free level the member highs ascend along with the lows, so an
/// overlap query on a level is a binary search plus a forward scan, and only
/// the children of scanned entries need descending into. Queries are
/// output-sensitive: `O(log n + k)` for `k` reported members.
///
/// The structure is immutable after construction; rebuilding from a new
/// batch costs `O(n log n)`.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use ivals_collections::nclist::NestedContainmentList;
/// use ivals_collections::traits::IntervalCollection;
/// use ivals_core::Interval;
///
/// let list: NestedContainmentList<Interval<u32>> = ["[1, 10]", "[2, 3]", "[6, 9]"]
///     .iter()
///     .map(|s| Rc::new(s.parse().unwrap()))
///     .collect();
///
/// assert_eq!(list.count_overlaps_point(&7), 2);
/// assert_eq!(list.span().unwrap().to_string(), "[1, 10]");
/// ```
pub struct NestedContainmentList<V: IntervalLike> {
    levels: Vec<Level<V>>,
    len: usize,
}

impl<V: IntervalLike> NestedContainmentList<V> {
    /// Builds the list from a batch of members.
    pub fn build(intervals: Vec<Rc<V>>) -> Self {
        let mut items = intervals;
        merge_sort(&mut items, |a, b| nesting_cmp(a.as_ref(), b.as_ref()));
        let count = items.len();

        // The containment stack assigns each member its nesting depth and
        // direct parent in one pass over the build order.
        let mut depth = vec![0usize; count];
        let mut parent = vec![usize::MAX; count];
        let mut stack: Vec<usize> = Vec::new();
        for (at, item) in items.iter().enumerate() {
            while let Some(&top) = stack.last() {
                if ordering::contains(items[top].as_ref(), item.as_ref()) {
                    break;
                }
                stack.pop();
            }
            if let Some(&top) = stack.last() {
                parent[at] = top;
            }
            depth[at] = stack.len();
            stack.push(at);
        }

        let level_count = depth.iter().map(|d| d + 1).max().unwrap_or(0);
        let mut levels: Vec<Level<V>> = (0..level_count).map(|_| Level::new()).collect();
        let mut position = vec![0usize; count];
        for at in 0..count {
            let level = &mut levels[depth[at]];
            position[at] = level.run.len();
            let added = level.run.add(Rc::clone(&items[at]));
            debug_assert!(added, "levels are containment-free by construction");
            level.children.push((0, 0));
        }

        // A parent's children are consecutive in the next level, so the run
        // is just first child..last child.
        for at in 0..count {
            let up = parent[at];
            if up == usize::MAX {
                continue;
            }
            let child = position[at];
            let range = &mut levels[depth[up]].children[position[up]];
            if range.0 == range.1 {
                *range = (child, child + 1);
            } else {
                range.1 = child + 1;
            }
        }

        NestedContainmentList { levels, len: count }
    }

    /// Number of stored members.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of nesting levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Lazily merges every level into one canonical-order stream.
    pub fn iter_sorted(&self) -> MultiWayMergeQueue<V> {
        let mut backing = Vec::with_capacity(self.len);
        let mut bounds = Vec::with_capacity(self.levels.len());
        for level in &self.levels {
            let start = backing.len();
            backing.extend(level.run.iter().cloned());
            bounds.push((start, backing.len()));
        }
        let mut queue = MultiWayMergeQueue::new(backing, bounds.len().max(1));
        for (first, last) in bounds {
            queue
                .insert(first, last)
                .expect("one section per level fits the queue");
        }
        queue
    }

    /// The members overlapping `query`, merged into canonical order.
    pub fn find_overlaps_iter<Q>(&self, query: &Q) -> MultiWayMergeQueue<V>
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let runs = self.overlap_runs(query);
        let total = runs.iter().map(|&(_, from, to)| to - from).sum();
        let mut backing = Vec::with_capacity(total);
        let mut bounds = Vec::with_capacity(runs.len());
        for &(level, from, to) in &runs {
            let start = backing.len();
            backing.extend(self.levels[level].run.as_slice()[from..to].iter().cloned());
            bounds.push((start, backing.len()));
        }
        let mut queue = MultiWayMergeQueue::new(backing, bounds.len().max(1));
        for (first, last) in bounds {
            queue
                .insert(first, last)
                .expect("one section per scanned run fits the queue");
        }
        queue
    }

    /// Walks the levels collecting the contiguous run each one contributes,
    /// descending only into the children of overlapping entries.
    fn overlap_runs<Q>(&self, query: &Q) -> Vec<(usize, usize, usize)>
    where
        Q: IntervalLike<Endpoint = V::Endpoint> + ?Sized,
    {
        let mut runs = Vec::new();
        let mut pending: VecDeque<(usize, usize, usize)> = VecDeque::new();
        if self.levels.first().is_some_and(|root| !root.run.is_empty()) {
            pending.push_back((0, 0, self.levels[0].run.len()));
        }
        while let Some((at, from, to)) = pending.pop_front() {
            let level = &self.levels[at];
            let slice = &level.run.as_slice()[from..to];
            let first = from
                + slice.partition_point(|m| {
                    ordering::cmp_low_high(query, m.as_ref()) == Ordering::Greater
                });
            let mut next = first;
            while next < to
                && ordering::cmp_low_high(level.run[next].as_ref(), query) != Ordering::Greater
            {
                let (child_from, child_to) = level.children[next];
                if child_from < child_to {
                    pending.push_back((at + 1, child_from, child_to));
                }
                next += 1;
            }
            if next > first {
                runs.push((at, first, next));
            }
        }
        runs
    }
}

impl<V: IntervalLike> IntervalCollection<V> for NestedContainmentList<V> {
    fn count(&self) -> usize {
        self.len
    }

    fn span(&self) -> Option<Interval<V::Endpoint>> {
        let root = self.levels.first()?;
        let first = root.run.first()?;
        let last = root.run.last()?;
        Some(
            Interval::new(
                first.low().clone(),
                last.high().clone(),
                first.low_included(),
                last.high_included(),
            )
            .expect("outermost level bounds are ordered"),
        )
    }

    fn lowest_interval(&self) -> Option<Rc<V>> {
        let root = self.levels.first()?;
        root.run.first()?;
        let mut level = 0;
        let mut at = 0;
        loop {
            let entry = &self.levels[level].run[at];
            let (child_from, child_to) = self.levels[level].children[at];
            if child_from < child_to {
                // a child sharing the low endpoint precedes its container
                // canonically (it must end earlier)
                let child = &self.levels[level + 1].run[child_from];
                if ordering::low_equals(child.as_ref(), entry.as_ref()) {
                    level += 1;
                    at = child_from;
                    continue;
                }
            }
            return Some(Rc::clone(entry));
        }
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
        // every member is contained in some outermost entry, so a hit
        // anywhere implies a hit in the outermost level
        let Some(root) = self.levels.first() else {
            return false;
        };
        let first = root.run.find_first_overlap(query);
        first < root.run.len()
            && ordering::cmp_low_high(root.run[first].as_ref(), query) != Ordering::Greater
    }

    fn count_overlaps(&self, query: &Interval<V::Endpoint>) -> usize {
        self.overlap_runs(query)
            .iter()
            .map(|&(_, from, to)| to - from)
            .sum()
    }
}

impl<V: IntervalLike> SortedIntervalCollection<V> for NestedContainmentList<V> {
    fn sorted(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        Box::new(self.iter_sorted())
    }

    fn sorted_backwards(&self) -> Box<dyn Iterator<Item = Rc<V>> + '_> {
        let forward: Vec<Rc<V>> = self.iter_sorted().collect();
        Box::new(forward.into_iter().rev())
    }
}

impl<V: IntervalLike> FromIterator<Rc<V>> for NestedContainmentList<V> {
    fn from_iter<I: IntoIterator<Item = Rc<V>>>(iter: I) -> Self {
        Self::build(iter.into_iter().collect())
    }
}

impl<V: IntervalLike + Debug> Debug for NestedContainmentList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels = f.debug_list();
        for level in &self.levels {
            levels.entry(&level.run);
        }
        levels.finish()
    }
}
