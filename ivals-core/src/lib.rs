//! # ivals-core
//!
//! Core building blocks for the `ivals` interval-collection ecosystem.
//!
//! ## Purpose
//!
//! This crate holds everything the collection crates agree on: the
//! [`Interval`] value type, the [`IntervalLike`] trait that lets clients
//! store their own interval-carrying records, the two endpoint orders and
//! the overlap primitives they reduce to, and the stable sorts used by
//! batch construction.
//!
//! ## Main Components
//!
//! - **[`Interval`]**: immutable, validated interval value with inclusion
//!   flags and a round-tripping string form
//! - **[`IntervalLike`]**: the trait seam every collection is generic over
//! - **[`ordering`]**: the starts/ends orders and the `cmp_low_high`
//!   primitive all overlap queries are built from
//! - **[`sorting`]**: stable in-place merge sort and a Timsort variant
//!
//! ## Example
//!
//! ```
//! use ivals_core::Interval;
//!
//! let a: Interval<u32> = "[10, 20)".parse().unwrap();
//! let b = Interval::closed(15, 25).unwrap();
//!
//! assert!(a.overlaps(&b));
//! assert!(!a.overlaps_point(&20));
//! ```

pub mod errors;
pub mod models;
pub mod ordering;
pub mod sorting;
pub mod traits;

// re-exports
pub use self::errors::{IntervalError, ParseIntervalError};
pub use self::models::Interval;
pub use self::traits::IntervalLike;
