//! Randomized whole-collection properties, checked against exhaustive scans
//! over small endpoint universes.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstest::*;

use ivals_collections::layer::{Layer, conflict};
use ivals_collections::traits::{
    IntervalCollection, MutableIntervalCollection, SortedIntervalCollection,
};
use ivals_collections::{DynamicIntervalTree, NestedContainmentList};
use ivals_core::Interval;
use ivals_core::ordering::{self, starts_order};

const UNIVERSE: i32 = 40;

fn random_interval(rng: &mut StdRng) -> Rc<Interval<i32>> {
    let a = rng.random_range(0..UNIVERSE);
    let b = rng.random_range(0..UNIVERSE);
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let (low_included, high_included) = if low == high {
        (true, true)
    } else {
        (rng.random_bool(0.5), rng.random_bool(0.5))
    };
    Rc::new(Interval::new(low, high, low_included, high_included).unwrap())
}

fn random_members(count: usize, seed: u64) -> Vec<Rc<Interval<i32>>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| random_interval(&mut rng)).collect()
}

/// Point coordinates that hit every distinct region: each integer plus the
/// open segments on either side of it.
fn sample_points() -> Vec<f64> {
    (-1..=UNIVERSE)
        .flat_map(|p| [p as f64 - 0.25, p as f64, p as f64 + 0.25])
        .collect()
}

fn covers(member: &Interval<i32>, point: f64) -> bool {
    let low = *member.low() as f64;
    let high = *member.high() as f64;
    (low < point || (low == point && member.low_included()))
        && (point < high || (point == high && member.high_included()))
}

fn is_canonically_sorted(members: &[Rc<Interval<i32>>]) -> bool {
    members
        .windows(2)
        .all(|pair| ordering::starts_cmp(pair[0].as_ref(), pair[1].as_ref()).is_le())
}

#[rstest]
#[case(0, 10)]
#[case(1, 60)]
#[case(2, 200)]
fn tree_stabbing_matches_exhaustive_scan(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();
    tree.assert_structure();

    for point in 0..UNIVERSE {
        let reported = tree.find_overlaps_point(&point);
        assert!(is_canonically_sorted(&reported), "output out of order");

        let mut expected: Vec<Rc<Interval<i32>>> = members
            .iter()
            .filter(|m| m.overlaps_point(&point))
            .cloned()
            .collect();
        expected.sort_by(|a, b| ordering::starts_cmp(a.as_ref(), b.as_ref()));

        assert_eq!(reported.len(), expected.len(), "wrong hit count at {point}");
        for (got, want) in reported.iter().zip(&expected) {
            assert_eq!(got.as_ref(), want.as_ref(), "wrong member at {point}");
        }
        assert_eq!(tree.count_overlaps_point(&point), expected.len());
        assert_eq!(tree.find_overlap_point(&point), !expected.is_empty());
    }
}

#[rstest]
#[case(3, 120)]
#[case(4, 250)]
fn tree_interval_queries_match_exhaustive_scan(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();

    let mut rng = StdRng::seed_from_u64(seed.wrapping_mul(31).wrapping_add(7));
    for _ in 0..60 {
        let query = random_interval(&mut rng);
        let reported = tree.find_overlaps(&query);
        assert!(is_canonically_sorted(&reported));

        let expected: Vec<&Rc<Interval<i32>>> = members
            .iter()
            .filter(|m| m.overlaps(query.as_ref()))
            .collect();
        assert_eq!(reported.len(), expected.len(), "wrong hit count for {query}");
        assert_eq!(tree.count_overlaps(&query), expected.len());
        assert_eq!(tree.find_overlap(&query), !expected.is_empty());
    }
}

#[rstest]
#[case(5, 150)]
fn containment_list_agrees_with_tree(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();
    let list: NestedContainmentList<Interval<i32>> = members.iter().cloned().collect();

    assert_eq!(list.count(), tree.count());
    assert_eq!(list.span(), tree.span());
    assert_eq!(list.maximum_depth(), tree.maximum_depth());
    assert_eq!(list.gaps(), tree.gaps());
    assert_eq!(
        list.lowest_interval().unwrap().as_ref(),
        tree.lowest_interval().unwrap().as_ref()
    );

    let from_list: Vec<String> = list.sorted().map(|m| m.to_string()).collect();
    let from_tree: Vec<String> = tree.sorted().map(|m| m.to_string()).collect();
    assert_eq!(from_list, from_tree);

    for point in 0..UNIVERSE {
        let list_hits: Vec<String> = list
            .find_overlaps_point(&point)
            .iter()
            .map(|m| m.to_string())
            .collect();
        let tree_hits: Vec<String> = tree
            .find_overlaps_point(&point)
            .iter()
            .map(|m| m.to_string())
            .collect();
        assert_eq!(list_hits, tree_hits, "disagreement at {point}");
    }
}

#[rstest]
#[case(6, 80)]
#[case(7, 150)]
fn insert_remove_round_trip_in_random_order(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let mut tree = DynamicIntervalTree::new();
    for (stored, member) in members.iter().enumerate() {
        assert!(tree.add(Rc::clone(member)));
        assert_eq!(tree.count(), stored + 1);
    }
    tree.assert_structure();

    // remove in a shuffled order, checking shape and count at every step
    let mut order: Vec<usize> = (0..members.len()).collect();
    let mut rng = StdRng::seed_from_u64(seed ^ 0xDEAD);
    for at in (1..order.len()).rev() {
        order.swap(at, rng.random_range(0..=at));
    }
    for (removed, &at) in order.iter().enumerate() {
        assert!(tree.remove(&members[at]), "member lost before removal");
        assert!(!tree.remove(&members[at]), "double removal succeeded");
        tree.assert_structure();
        assert_eq!(tree.count(), members.len() - removed - 1);
    }
    assert!(tree.is_empty());
    assert_eq!(tree.span(), None);
    assert!(tree.sorted().next().is_none());
}

#[rstest]
#[case(8, 400)]
fn containment_free_layer_holds_no_nested_pair(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let mut layer = Layer::with_conflict(starts_order(), conflict::containing);
    for member in members {
        layer.add(member);
    }
    for (at, a) in layer.iter().enumerate() {
        for b in layer.iter().skip(at + 1) {
            assert!(
                !ordering::contains(a.as_ref(), b.as_ref())
                    && !ordering::contains(b.as_ref(), a.as_ref()),
                "nested members {a} and {b} both accepted"
            );
        }
    }
}

#[rstest]
#[case(9, 120)]
#[case(10, 30)]
fn gaps_partition_the_uncovered_span(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();
    let gaps = tree.gaps();
    let span = tree.span().unwrap();

    for pair in gaps.windows(2) {
        assert!(!pair[0].overlaps(&pair[1]), "gaps must be disjoint");
        assert!(
            ordering::starts_cmp(&pair[0], &pair[1]).is_lt(),
            "gaps must arrive in order"
        );
    }

    for point in sample_points() {
        let in_span = covers(&span, point);
        let covered = members.iter().any(|m| covers(m, point));
        let in_gap = gaps.iter().any(|g| covers(g, point));
        if in_span {
            assert_ne!(covered, in_gap, "gap disagreement at {point}");
        } else {
            assert!(!in_gap, "gap outside the span at {point}");
        }
    }
}

#[rstest]
#[case(11, 100)]
#[case(12, 250)]
fn depth_matches_deepest_sample_point(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();

    let deepest = sample_points()
        .into_iter()
        .map(|point| members.iter().filter(|m| covers(m, point)).count())
        .max()
        .unwrap_or(0);
    assert_eq!(tree.maximum_depth(), deepest);
}

#[rstest]
#[case(13, 130)]
fn backwards_enumeration_mirrors_forward(#[case] seed: u64, #[case] count: usize) {
    let members = random_members(count, seed);
    let tree: DynamicIntervalTree<Interval<i32>> = members.iter().cloned().collect();

    let forward: Vec<Rc<Interval<i32>>> = tree.sorted().collect();
    let mut backward: Vec<Rc<Interval<i32>>> = tree.sorted_backwards().collect();
    backward.reverse();
    assert_eq!(forward.len(), backward.len());
    for (f, b) in forward.iter().zip(&backward) {
        assert!(Rc::ptr_eq(f, b), "backwards enumeration is not the mirror");
    }
}

#[rstest]
fn parse_round_trip_over_random_intervals() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..500 {
        let member = random_interval(&mut rng);
        let reparsed: Interval<i32> = member.to_string().parse().unwrap();
        assert_eq!(&reparsed, member.as_ref());
    }
}
