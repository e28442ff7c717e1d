//! An ordered map implemented with an AVL tree.
//!
//! [`AvlTreeMap`] keeps its entries sorted by key and rebalances on every
//! insertion and removal, so lookups, insertions and removals take O(log n).
//! Iteration can walk the entries in ascending order, descending order, or
//! top-down (level by level), chosen through [`TraversalMode`].
//!
//! ```
//! use avltree::{AvlError, AvlTreeMap, TraversalMode};
//!
//! let mut map = AvlTreeMap::with_traversal(TraversalMode::ReverseOrder);
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key * 10).unwrap();
//! }
//! assert_eq!(map.insert(5, 0), Err(AvlError::DuplicateKey));
//!
//! let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
//! assert_eq!(keys, [9, 8, 7, 5, 4, 3, 1]);
//! assert_eq!(map.min_key(), Ok(&1));
//! assert_eq!(map.height(), 2);
//! ```

mod entry;
mod error;
mod map;

pub use entry::MapEntry;
pub use error::{AvlError, Result};
pub use map::{AvlTreeMap, Iter, IterMut, TraversalMode};
