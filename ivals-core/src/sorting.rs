//! Stable comparison sorts used by the batch construction paths.
//!
//! Two algorithms are provided: [`merge_sort`], a stable in-place merge sort
//! that rearranges through rotations and needs no auxiliary buffer (and no
//! `Clone`), and [`timsort`], a natural-run merge sort that trades a buffer
//! of half the input for fewer comparisons on partially ordered data.
//!
//! Both uphold the same stability contract: elements that compare equal keep
//! their input order.

use std::cmp::Ordering;

const INSERTION_CUTOFF: usize = 12;
const MIN_MERGE: usize = 32;

/// Sorts `items` stably by `cmp` without allocating.
///
/// # Examples
///
/// ```
/// use ivals_core::sorting::merge_sort;
///
/// let mut values = vec![(3, 'a'), (1, 'b'), (3, 'c'), (2, 'd')];
/// merge_sort(&mut values, |a, b| a.0.cmp(&b.0));
/// assert_eq!(values, vec![(1, 'b'), (2, 'd'), (3, 'a'), (3, 'c')]);
/// ```
pub fn merge_sort<T, F>(items: &mut [T], cmp: F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    sort_range(items, 0, len, &cmp);
}

fn sort_range<T, F>(items: &mut [T], from: usize, to: usize, cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    if to - from <= INSERTION_CUTOFF {
        insertion_sort(items, from, to, cmp);
        return;
    }
    let mid = from + (to - from) / 2;
    sort_range(items, from, mid, cmp);
    sort_range(items, mid, to, cmp);
    merge_in_place(items, from, mid, to, cmp);
}

fn insertion_sort<T, F>(items: &mut [T], from: usize, to: usize, cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    for i in (from + 1)..to {
        let mut j = i;
        while j > from && cmp(&items[j], &items[j - 1]) == Ordering::Less {
            items.swap(j, j - 1);
            j -= 1;
        }
    }
}

/// First index in `items[from..from + len]` whose element is not less than
/// the element at `probe`.
fn lower<T, F>(items: &[T], mut from: usize, mut len: usize, probe: usize, cmp: &F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    while len > 0 {
        let half = len / 2;
        let mid = from + half;
        if cmp(&items[mid], &items[probe]) == Ordering::Less {
            from = mid + 1;
            len = len - half - 1;
        } else {
            len = half;
        }
    }
    from
}

/// First index in `items[from..from + len]` whose element is greater than
/// the element at `probe`.
fn upper<T, F>(items: &[T], mut from: usize, mut len: usize, probe: usize, cmp: &F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    while len > 0 {
        let half = len / 2;
        let mid = from + half;
        if cmp(&items[probe], &items[mid]) == Ordering::Less {
            len = half;
        } else {
            from = mid + 1;
            len = len - half - 1;
        }
    }
    from
}

/// Merges the sorted runs `items[from..pivot]` and `items[pivot..to]` using
/// rotations: split the longer run at its middle, binary-search the matching
/// cut in the other run, rotate the two inner pieces past each other, and
/// recurse on both halves.
fn merge_in_place<T, F>(items: &mut [T], from: usize, pivot: usize, to: usize, cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    let len1 = pivot - from;
    let len2 = to - pivot;
    if len1 == 0 || len2 == 0 || cmp(&items[pivot], &items[pivot - 1]) != Ordering::Less {
        return;
    }
    if len1 + len2 == 2 {
        items.swap(from, pivot);
        return;
    }
    let (first_cut, second_cut) = if len1 > len2 {
        let first_cut = from + len1 / 2;
        // keep equal keys from the right run behind the probe
        (first_cut, lower(items, pivot, to - pivot, first_cut, cmp))
    } else {
        let second_cut = pivot + len2 / 2;
        // keep equal keys from the left run ahead of the probe
        (upper(items, from, pivot - from, second_cut, cmp), second_cut)
    };
    items[first_cut..second_cut].rotate_left(pivot - first_cut);
    let new_pivot = first_cut + (second_cut - pivot);
    merge_in_place(items, from, first_cut, new_pivot, cmp);
    merge_in_place(items, new_pivot, second_cut, to, cmp);
}

/// Sorts `items` stably by `cmp` using natural runs.
///
/// Detects ascending and strictly descending runs, extends short ones with a
/// binary insertion sort up to the computed minimum run length, and merges
/// pending runs under the usual stack invariants. Descending runs are only
/// taken while strictly decreasing, so reversing them cannot reorder equal
/// elements.
pub fn timsort<T, F>(items: &mut [T], cmp: F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    if len < MIN_MERGE {
        let run = count_run(items, 0, &cmp);
        binary_insertion(items, 0, len, run, &cmp);
        return;
    }

    let min_run = min_run_length(len);
    let mut runs: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = count_run(items, start, &cmp);
        if end - start < min_run {
            let forced = usize::min(start + min_run, len);
            binary_insertion(items, start, forced, end - start, &cmp);
            end = forced;
        }
        runs.push((start, end - start));
        start = end;
        collapse(items, &mut runs, &cmp);
    }
    while runs.len() > 1 {
        let at = runs.len() - 2;
        merge_at(items, &mut runs, at, &cmp);
    }
}

/// Length of the run beginning at `from`, reversing it first when it is
/// strictly descending. Returns the exclusive end index.
fn count_run<T, F>(items: &mut [T], from: usize, cmp: &F) -> usize
where
    F: Fn(&T, &T) -> Ordering,
{
    let len = items.len();
    if from + 1 >= len {
        return len;
    }
    let mut end = from + 1;
    if cmp(&items[end], &items[from]) == Ordering::Less {
        while end + 1 < len && cmp(&items[end + 1], &items[end]) == Ordering::Less {
            end += 1;
        }
        items[from..=end].reverse();
    } else {
        while end + 1 < len && cmp(&items[end + 1], &items[end]) != Ordering::Less {
            end += 1;
        }
    }
    end + 1
}

/// Extends the sorted prefix `items[from..from + sorted]` to cover
/// `items[from..to]`, inserting each element after its equals.
fn binary_insertion<T, F>(items: &mut [T], from: usize, to: usize, sorted: usize, cmp: &F)
where
    F: Fn(&T, &T) -> Ordering,
{
    for i in (from + sorted.max(1))..to {
        let mut lo = from;
        let mut hi = i;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if cmp(&items[i], &items[mid]) == Ordering::Less {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        items[lo..=i].rotate_right(1);
    }
}

fn min_run_length(mut len: usize) -> usize {
    let mut carry = 0;
    while len >= MIN_MERGE {
        carry |= len & 1;
        len >>= 1;
    }
    len + carry
}

fn collapse<T, F>(items: &mut [T], runs: &mut Vec<(usize, usize)>, cmp: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    while runs.len() > 1 {
        let n = runs.len();
        if (n >= 3 && runs[n - 3].1 <= runs[n - 2].1 + runs[n - 1].1)
            || (n >= 4 && runs[n - 4].1 <= runs[n - 3].1 + runs[n - 2].1)
        {
            if runs[n - 3].1 < runs[n - 1].1 {
                merge_at(items, runs, n - 3, cmp);
            } else {
                merge_at(items, runs, n - 2, cmp);
            }
        } else if runs[n - 2].1 <= runs[n - 1].1 {
            merge_at(items, runs, n - 2, cmp);
        } else {
            break;
        }
    }
}

fn merge_at<T, F>(items: &mut [T], runs: &mut Vec<(usize, usize)>, at: usize, cmp: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    let (start1, len1) = runs[at];
    let (start2, len2) = runs[at + 1];
    debug_assert_eq!(start1 + len1, start2);
    merge_runs(items, start1, start2, start2 + len2, cmp);
    runs[at] = (start1, len1 + len2);
    runs.remove(at + 1);
}

/// Buffered merge of `items[from..mid]` and `items[mid..to]`, preferring the
/// left run on ties.
fn merge_runs<T, F>(items: &mut [T], from: usize, mid: usize, to: usize, cmp: &F)
where
    T: Clone,
    F: Fn(&T, &T) -> Ordering,
{
    if cmp(&items[mid], &items[mid - 1]) != Ordering::Less {
        return;
    }
    let left: Vec<T> = items[from..mid].to_vec();
    let mut i = 0;
    let mut j = mid;
    let mut k = from;
    while i < left.len() && j < to {
        if cmp(&items[j], &left[i]) == Ordering::Less {
            items[k] = items[j].clone();
            j += 1;
        } else {
            items[k] = left[i].clone();
            i += 1;
        }
        k += 1;
    }
    while i < left.len() {
        items[k] = left[i].clone();
        i += 1;
        k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    fn key_sorted_reference(mut pairs: Vec<(u32, usize)>) -> Vec<(u32, usize)> {
        pairs.sort_by_key(|&(key, _)| key);
        pairs
    }

    fn random_pairs(len: usize, key_space: u32, seed: u64) -> Vec<(u32, usize)> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len)
            .map(|seq| (rng.random_range(0..key_space), seq))
            .collect()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(13)]
    #[case(100)]
    #[case(5000)]
    fn merge_sort_matches_reference(#[case] len: usize) {
        let input = random_pairs(len, 17, len as u64);
        let mut sorted = input.clone();
        merge_sort(&mut sorted, |a, b| a.0.cmp(&b.0));
        assert_eq!(sorted, key_sorted_reference(input));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(31)]
    #[case(32)]
    #[case(100)]
    #[case(5000)]
    fn timsort_matches_reference(#[case] len: usize) {
        let input = random_pairs(len, 17, 1000 + len as u64);
        let mut sorted = input.clone();
        timsort(&mut sorted, |a, b| a.0.cmp(&b.0));
        assert_eq!(sorted, key_sorted_reference(input));
    }

    fn assert_ties_in_input_order(sorted: &[(u32, usize)]) {
        for window in sorted.windows(2) {
            if window[0].0 == window[1].0 {
                assert!(window[0].1 < window[1].1, "equal keys reordered");
            }
        }
    }

    #[test]
    fn stability_holds_among_heavy_ties() {
        // Narrow key space forces long runs of equal keys; the sequence
        // numbers must come out still ascending inside each run.
        let input = random_pairs(4096, 3, 7);

        let mut sorted = input.clone();
        merge_sort(&mut sorted, |a, b| a.0.cmp(&b.0));
        assert_ties_in_input_order(&sorted);

        let mut sorted = input.clone();
        timsort(&mut sorted, |a, b| a.0.cmp(&b.0));
        assert_ties_in_input_order(&sorted);
    }

    #[test]
    fn timsort_handles_presorted_and_reversed_input() {
        let mut ascending: Vec<(u32, usize)> = (0..500).map(|i| (i as u32, i)).collect();
        let expected = ascending.clone();
        timsort(&mut ascending, |a, b| a.0.cmp(&b.0));
        assert_eq!(ascending, expected);

        let mut descending: Vec<(u32, usize)> =
            (0..500).rev().map(|i| (i as u32, 499 - i)).collect();
        timsort(&mut descending, |a, b| a.0.cmp(&b.0));
        assert_eq!(descending, expected);
    }
}
