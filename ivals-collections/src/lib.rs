//! # ivals-collections
//!
//! Interval collections over the `ivals-core` primitives.
//!
//! ## Purpose
//!
//! This crate holds the data structures that answer stabbing, overlap, and
//! ordered enumeration queries over stored intervals. All overlap
//! computation reduces to the layer searches and the merge queue defined
//! here; the higher structures compose them rather than reimplementing
//! them.
//!
//! ## Main Components
//!
//! - **[`Layer`]**: endpoint-sorted, conflict-free sequence; the building
//!   block every other structure composes
//! - **[`MultiWayMergeQueue`]**: fixed-capacity k-way merge over sorted runs
//!   of one backing buffer
//! - **[`NestedContainmentList`]**: immutable layered index for batch-built
//!   sets
//! - **[`DynamicIntervalTree`]**: AVL-balanced tree supporting insertion and
//!   removal with output-sensitive queries
//! - **[`traits`]**: the capability tower (`IntervalCollection` and its
//!   mutable, sorted, and indexed extensions)
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use ivals_collections::{DynamicIntervalTree, IntervalCollection, MutableIntervalCollection};
//! use ivals_core::Interval;
//!
//! let mut tree: DynamicIntervalTree<Interval<u32>> = DynamicIntervalTree::new();
//! tree.add(Rc::new("[100, 200)".parse().unwrap()));
//! tree.add(Rc::new("[150, 250)".parse().unwrap()));
//!
//! let hits = tree.find_overlaps_point(&175);
//! assert_eq!(hits.len(), 2);
//! ```

pub mod interval_tree;
pub mod layer;
pub mod measures;
pub mod merge_queue;
pub mod nclist;
pub mod traits;

// re-exports
pub use self::interval_tree::DynamicIntervalTree;
pub use self::layer::{Conflict, Layer, Order, conflict};
pub use self::merge_queue::{MergeQueueError, MultiWayMergeQueue};
pub use self::nclist::NestedContainmentList;
pub use self::traits::{
    IndexedIntervalCollection, IntervalCollection, MutableIntervalCollection,
    SortedIntervalCollection,
};
