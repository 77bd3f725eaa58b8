use std::cmp::Ordering;
use std::rc::Rc;

use thiserror::Error;

use ivals_core::IntervalLike;
use ivals_core::ordering::starts_order;

use crate::layer::Order;

/// Errors that can occur when feeding a [`MultiWayMergeQueue`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeQueueError {
    /// The queue already holds its configured number of sections.
    #[error("merge queue is at its section capacity ({capacity})")]
    CapacityExceeded { capacity: usize },
    /// The section is empty or reaches past the backing buffer.
    #[error("section [{first}, {last}) is empty or outside a backing buffer of length {len}")]
    InvalidSection {
        first: usize,
        last: usize,
        len: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct Section {
    first: usize,
    last: usize,
    seq: usize,
}

/// A fixed-capacity k-way merge over disjoint sorted sections of one backing
/// buffer.
///
/// Callers record up to `capacity` non-empty `[first, last)` sections with
/// [`insert`](MultiWayMergeQueue::insert); [`pop`](MultiWayMergeQueue::pop)
/// then yields the globally smallest remaining member under the queue's
/// order. Sections that compare equal at their heads yield in insertion
/// order, which is what lets callers preserve a deterministic order across
/// runs gathered from several sources. A drained section swaps with the last
/// live slot and the heap shrinks.
///
/// The queue implements [`Iterator`], so the merged stream can be consumed
/// directly.
///
/// # Examples
///
/// ```
/// use std::rc::Rc;
/// use ivals_collections::merge_queue::MultiWayMergeQueue;
/// use ivals_core::Interval;
///
/// let backing: Vec<Rc<Interval<u32>>> = ["[1, 4)", "[6, 9)", "[2, 3]", "[7, 8]"]
///     .iter()
///     .map(|s| Rc::new(s.parse().unwrap()))
///     .collect();
///
/// let mut queue = MultiWayMergeQueue::new(backing, 2);
/// queue.insert(0, 2).unwrap();
/// queue.insert(2, 4).unwrap();
///
/// let merged: Vec<String> = queue.map(|m| m.to_string()).collect();
/// assert_eq!(merged, vec!["[1, 4)", "[2, 3]", "[6, 9)", "[7, 8]"]);
/// ```
#[derive(Debug)]
pub struct MultiWayMergeQueue<V: IntervalLike> {
    backing: Vec<Rc<V>>,
    cmp: Order<V>,
    sections: Vec<Section>,
    capacity: usize,
    next_seq: usize,
}

impl<V: IntervalLike> MultiWayMergeQueue<V> {
    /// A queue over `backing` in the canonical starts order.
    pub fn new(backing: Vec<Rc<V>>, capacity: usize) -> Self {
        Self::with_order(backing, capacity, starts_order::<V>())
    }

    /// A queue over `backing` in the given order.
    pub fn with_order(backing: Vec<Rc<V>>, capacity: usize, cmp: Order<V>) -> Self {
        MultiWayMergeQueue {
            backing,
            cmp,
            sections: Vec::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Records the non-empty section `[first, last)` of the backing buffer.
    pub fn insert(&mut self, first: usize, last: usize) -> Result<(), MergeQueueError> {
        if self.sections.len() == self.capacity {
            return Err(MergeQueueError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if first >= last || last > self.backing.len() {
            return Err(MergeQueueError::InvalidSection {
                first,
                last,
                len: self.backing.len(),
            });
        }
        self.sections.push(Section {
            first,
            last,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        self.sift_up(self.sections.len() - 1);
        Ok(())
    }

    /// The next smallest member across all live sections, or `None` once
    /// every section is drained.
    pub fn pop(&mut self) -> Option<Rc<V>> {
        if self.sections.is_empty() {
            return None;
        }
        let head = self.sections[0].first;
        let item = Rc::clone(&self.backing[head]);
        self.sections[0].first += 1;
        if self.sections[0].first == self.sections[0].last {
            let last = self.sections.len() - 1;
            self.sections.swap(0, last);
            self.sections.pop();
        }
        if !self.sections.is_empty() {
            self.sift_down(0);
        }
        Some(item)
    }

    /// Members not yet popped.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.last - s.first).sum()
    }

    /// Whether every section is drained.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn precedes(&self, a: usize, b: usize) -> bool {
        let (a, b) = (self.sections[a], self.sections[b]);
        match (self.cmp)(
            self.backing[a.first].as_ref(),
            self.backing[b.first].as_ref(),
        ) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => a.seq < b.seq,
        }
    }

    fn sift_up(&mut self, mut at: usize) {
        while at > 0 {
            let parent = (at - 1) / 2;
            if self.precedes(at, parent) {
                self.sections.swap(at, parent);
                at = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut at: usize) {
        loop {
            let left = 2 * at + 1;
            let right = left + 1;
            let mut smallest = at;
            if left < self.sections.len() && self.precedes(left, smallest) {
                smallest = left;
            }
            if right < self.sections.len() && self.precedes(right, smallest) {
                smallest = right;
            }
            if smallest == at {
                break;
            }
            self.sections.swap(at, smallest);
            at = smallest;
        }
    }
}

impl<V: IntervalLike> Iterator for MultiWayMergeQueue<V> {
    type Item = Rc<V>;

    fn next(&mut self) -> Option<Rc<V>> {
        self.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ivals_core::Interval;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn backing(specs: &[&str]) -> Vec<Rc<Interval<i32>>> {
        specs.iter().map(|s| Rc::new(s.parse().unwrap())).collect()
    }

    #[rstest]
    fn merges_three_sections_in_canonical_order() {
        let buffer = backing(&[
            "[1, 4)", "[6, 9)", // section 0
            "[2, 3]", "[7, 8]", // section 1
            "[0, 10]", // section 2
        ]);
        let mut queue = MultiWayMergeQueue::new(buffer, 3);
        queue.insert(0, 2).unwrap();
        queue.insert(2, 4).unwrap();
        queue.insert(4, 5).unwrap();

        let merged: Vec<String> = queue.map(|m| m.to_string()).collect();
        assert_eq!(merged, vec!["[0, 10]", "[1, 4)", "[2, 3]", "[6, 9)", "[7, 8]"]);
    }

    #[rstest]
    fn equal_heads_yield_in_insertion_order() {
        let twin_a = Rc::new("[3, 4]".parse::<Interval<i32>>().unwrap());
        let twin_b = Rc::new("[3, 4]".parse::<Interval<i32>>().unwrap());
        let buffer = vec![Rc::clone(&twin_a), Rc::clone(&twin_b)];
        let mut queue = MultiWayMergeQueue::new(buffer, 2);
        queue.insert(0, 1).unwrap();
        queue.insert(1, 2).unwrap();

        assert!(Rc::ptr_eq(&queue.pop().unwrap(), &twin_a));
        assert!(Rc::ptr_eq(&queue.pop().unwrap(), &twin_b));
        assert_eq!(queue.pop(), None);
    }

    #[rstest]
    fn rejects_sections_past_capacity() {
        let buffer = backing(&["[1, 2]", "[3, 4]"]);
        let mut queue = MultiWayMergeQueue::new(buffer, 1);
        queue.insert(0, 1).unwrap();
        assert_eq!(
            queue.insert(1, 2),
            Err(MergeQueueError::CapacityExceeded { capacity: 1 })
        );
    }

    #[rstest]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(0, 3)]
    fn rejects_degenerate_sections(#[case] first: usize, #[case] last: usize) {
        let buffer = backing(&["[1, 2]", "[3, 4]"]);
        let mut queue = MultiWayMergeQueue::new(buffer, 4);
        assert_eq!(
            queue.insert(first, last),
            Err(MergeQueueError::InvalidSection {
                first,
                last,
                len: 2
            })
        );
    }

    #[rstest]
    fn len_counts_unpopped_members() {
        let buffer = backing(&["[1, 2]", "[3, 4]", "[5, 6]"]);
        let mut queue = MultiWayMergeQueue::new(buffer, 2);
        queue.insert(0, 2).unwrap();
        queue.insert(2, 3).unwrap();
        assert_eq!(queue.len(), 3);
        queue.pop();
        assert_eq!(queue.len(), 2);
        assert!(!queue.is_empty());
        queue.pop();
        queue.pop();
        assert!(queue.is_empty());
        assert_eq!(queue.pop(), None);
    }
}
