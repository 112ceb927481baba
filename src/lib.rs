//! A multi-level index whose nodes partition the key space into half-open
//! ranges `[ge, lt)`.
//!
//! Every range of a node may own one child node one level deeper, and all
//! nodes of the same level are chained from left to right with sibling links.
//! Keys are inserted at an explicit level, the index walks down from the root
//! until it reaches that level or has to create a new node on the way.
//!
//! ```rust
//! use leveled_range_index::{Error, RangeIndex};
//!
//! fn main() -> std::result::Result<(), Error> {
//!     let mut index = RangeIndex::<i64>::new();
//!     index.insert(3)?.insert(5)?;
//!     index.insert_at(1, 2)?.insert_at(3, 2)?.insert_at(5, 2)?;
//!
//!     let level_two: Vec<_> = index.siblings(2).map(|n| n.keys().to_vec()).collect();
//!     assert_eq!(vec![vec![1], vec![3], vec![5]], level_two);
//!     Ok(())
//! }
//! ```

use serde_derive::{Deserialize, Serialize};
use std::fmt::Debug;

mod error;
mod index;

pub use error::{Error, Result};
pub use index::{
    node::{Node, NodeId},
    range_pointer::RangePointer,
    NodeShape, RangeIndex, Siblings, ROOT_LEVEL,
};

/// Types that can be used as keys of a [`RangeIndex`].
pub trait KeyType: Ord + Clone + Debug {}

macro_rules! impl_key_type {
    ( $type:ident ) => {
        impl KeyType for $type {}
    };
}

impl_key_type!(u8);
impl_key_type!(u16);
impl_key_type!(u32);
impl_key_type!(u64);
impl_key_type!(usize);
impl_key_type!(i8);
impl_key_type!(i16);
impl_key_type!(i32);
impl_key_type!(i64);
impl_key_type!(isize);

/// Configuration for a [`RangeIndex`].
///
/// Use the [`Default`] implementation and the builder methods to change single settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    check_invariants: bool,
    initial_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            check_invariants: false,
            initial_capacity: 16,
        }
    }
}

impl IndexConfig {
    /// Verify the structure of the whole index after each insertion.
    ///
    /// An insertion that leaves the index in an inconsistent state fails with
    /// [`Error::InvariantViolation`]. This walks all nodes and is meant for debugging.
    pub fn check_invariants(mut self, check_invariants: bool) -> Self {
        self.check_invariants = check_invariants;
        self
    }

    /// Number of nodes to reserve space for when creating the index.
    pub fn initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
