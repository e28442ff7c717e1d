//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use tracing::trace;

use crate::entry::MapEntry;
use crate::error::{AvlError, Result};

mod iter;
mod node;

pub use iter::{Iter, IterMut, TraversalMode};
use node::{Link, LinkPtr, Node, NodePtr};

/// An ordered map implemented with an AVL tree.
///
/// Keys are unique; inserting an existing key fails instead of overwriting.
/// Iteration follows the map's configured [`TraversalMode`].
///
/// ```
/// use avltree::{AvlTreeMap, TraversalMode};
/// let mut map = AvlTreeMap::new();
/// map.insert(2, "two").unwrap();
/// map.insert(1, "one").unwrap();
/// map.insert(3, "three").unwrap();
/// assert_eq!(map.get(&1).unwrap().value(), &&"one");
///
/// map.set_traversal(TraversalMode::TopDown);
/// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
/// assert_eq!(keys, [2, 1, 3]);
///
/// let removed = map.remove(&2).unwrap();
/// assert_eq!(removed.into_parts(), (2, "two"));
/// ```
pub struct AvlTreeMap<K, V> {
    root: Link<K, V>,
    num_nodes: usize,
    traversal: TraversalMode,
}

/// Ancestors of the node being worked on, root first.
/// The last element is the parent of the next node to visit.
type Path<K, V> = Vec<NodePtr<K, V>>;

impl<K, V> AvlTreeMap<K, V> {
    /// Creates an empty map that iterates in ascending key order.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self::with_traversal(TraversalMode::InOrder)
    }

    /// Creates an empty map that iterates in the given order.
    pub fn with_traversal(traversal: TraversalMode) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            traversal,
        }
    }

    /// Returns true if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the order used by [`iter`](Self::iter) and [`iter_mut`](Self::iter_mut).
    pub fn traversal(&self) -> TraversalMode {
        self.traversal
    }

    /// Sets the order used by iterators created from now on.
    pub fn set_traversal(&mut self, traversal: TraversalMode) {
        self.traversal = traversal;
    }

    /// Returns the height of the tree: the number of edges on the longest path
    /// from the root to a leaf. Zero for an empty map and for a single entry.
    pub fn height(&self) -> usize {
        match self.root {
            None => 0,
            Some(root_ptr) => unsafe { root_ptr.as_ref().height() },
        }
    }

    /// Returns the balance factor of the root (left height minus right height).
    /// Always in `-1..=1`; zero for an empty map.
    pub fn balance_factor(&self) -> isize {
        match self.root {
            None => 0,
            Some(root_ptr) => unsafe { root_ptr.as_ref().balance_factor() },
        }
    }

    /// Clears the map, deallocating all memory. The traversal mode is kept.
    pub fn clear(&mut self) {
        let mut pending: Vec<NodePtr<K, V>> = self.root.take().into_iter().collect();
        while let Some(node_ptr) = pending.pop() {
            let node = unsafe { node_ptr.as_ref() };
            pending.extend(node.left);
            pending.extend(node.right);
            unsafe { Node::destroy(node_ptr) };
        }
        if self.num_nodes > 0 {
            trace!(released = self.num_nodes, "cleared tree");
            self.num_nodes = 0;
        }
    }

    /// Returns an iterator over the entries in the configured traversal order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iter_with(self.traversal)
    }

    /// Returns an iterator over the entries in the given order.
    pub fn iter_with(&self, traversal: TraversalMode) -> Iter<'_, K, V> {
        Iter::new(self.root, self.num_nodes, traversal)
    }

    /// Returns an iterator over the entries in the configured traversal order,
    /// with mutable references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        self.iter_mut_with(self.traversal)
    }

    /// Returns an iterator over the entries in the given order,
    /// with mutable references to the values.
    pub fn iter_mut_with(&mut self, traversal: TraversalMode) -> IterMut<'_, K, V> {
        IterMut::new(self.root, self.num_nodes, traversal)
    }

    fn leftmost(&self) -> Link<K, V> {
        let mut current = self.root?;
        while let Some(left_ptr) = unsafe { current.as_ref().left } {
            current = left_ptr;
        }
        Some(current)
    }

    fn rightmost(&self) -> Link<K, V> {
        let mut current = self.root?;
        while let Some(right_ptr) = unsafe { current.as_ref().right } {
            current = right_ptr;
        }
        Some(current)
    }
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Returns the entry for the key.
    ///
    /// The key may be any borrowed form of the map's key type, but the ordering
    /// on the borrowed form *must* match the ordering on the key type.
    pub fn get<Q>(&self, key: &Q) -> Result<MapEntry<&K, &V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_ptr = self.find(key).ok_or(AvlError::NotFound)?;
        let node = unsafe { &*node_ptr.as_ptr() };
        Ok(MapEntry::new(node.key(), &node.value))
    }

    /// Returns a mutable reference to the value for the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node_ptr = self.find(key).ok_or(AvlError::NotFound)?;
        Ok(&mut unsafe { &mut *node_ptr.as_ptr() }.value)
    }

    /// Returns true if the map contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find(key).is_some()
    }

    /// Replaces the value for an existing key and returns the old value.
    /// The shape of the tree does not change.
    pub fn replace<Q>(&mut self, key: &Q, value: V) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key).map(|slot| std::mem::replace(slot, value))
    }

    /// Returns the smallest key.
    pub fn min_key(&self) -> Result<&K> {
        let node_ptr = self.leftmost().ok_or(AvlError::EmptyTree)?;
        Ok(unsafe { &*node_ptr.as_ptr() }.key())
    }

    /// Returns the largest key.
    pub fn max_key(&self) -> Result<&K> {
        let node_ptr = self.rightmost().ok_or(AvlError::EmptyTree)?;
        Ok(unsafe { &*node_ptr.as_ptr() }.key())
    }

    /// Inserts a key-value pair into the map.
    ///
    /// Fails with [`AvlError::DuplicateKey`] if the key is already present,
    /// leaving the map untouched.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let (path, mut link_ptr) = self.find_insert_pos(&key)?;
        unsafe {
            *link_ptr.as_mut() = Some(Node::create(key, value));
        }
        self.num_nodes += 1;
        trace!(len = self.num_nodes, depth = path.len(), "attached node");
        self.rebalance_once(path);
        Ok(())
    }

    /// Removes a key from the map and returns the removed entry.
    ///
    /// Fails with [`AvlError::NotFound`] if the key is absent, leaving the map untouched.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<MapEntry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        // Find node to-be-removed and its ancestors
        let mut path = Path::new();
        let mut current = self.root;
        let node_ptr = loop {
            let node_ptr = current.ok_or(AvlError::NotFound)?;
            let node = unsafe { node_ptr.as_ref() };
            current = match key.cmp(node.key().borrow()) {
                Ordering::Equal => break node_ptr,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            path.push(node_ptr);
        };

        debug_assert!(self.num_nodes >= 1);
        self.unlink_node(node_ptr, &mut path);
        self.rebalance(path);
        self.num_nodes -= 1;
        let (key, value) = unsafe { Node::destroy(node_ptr) };
        Ok(MapEntry::new(key, value))
    }

    /// Asserts the AVL invariants for every node: cached heights, balance,
    /// key order, and the element count.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let mut num_nodes = 0;
        let mut pending: Vec<NodePtr<K, V>> = self.root.into_iter().collect();
        while let Some(node_ptr) = pending.pop() {
            let node = unsafe { node_ptr.as_ref() };
            let mut left_height = -1;
            let mut right_height = -1;

            // Check link for left child node
            if let Some(left_ptr) = node.left {
                let left = unsafe { left_ptr.as_ref() };
                assert!(left.key() < node.key());
                left_height = left.height() as isize;
                pending.push(left_ptr);
            }

            // Check link for right child node
            if let Some(right_ptr) = node.right {
                let right = unsafe { right_ptr.as_ref() };
                assert!(right.key() > node.key());
                right_height = right.height() as isize;
                pending.push(right_ptr);
            }

            // Check height
            assert_eq!(node.height() as isize, 1 + left_height.max(right_height));

            // Check AVL condition (nearly balance)
            assert_eq!(node.balance_factor(), left_height - right_height);
            assert!((-1..=1).contains(&node.balance_factor()));

            num_nodes += 1;
        }

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);

        // Check global order, not just parent-child order
        let mut keys = self.iter_with(TraversalMode::InOrder).map(|(k, _)| k);
        if let Some(mut previous) = keys.next() {
            for key in keys {
                assert!(previous < key);
                previous = key;
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Link<K, V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node_ptr) = current {
            current = unsafe {
                match key.cmp(node_ptr.as_ref().key().borrow()) {
                    Ordering::Equal => break,
                    Ordering::Less => node_ptr.as_ref().left,
                    Ordering::Greater => node_ptr.as_ref().right,
                }
            }
        }
        current
    }

    /// Returns the ancestors of the insert position and the empty link to fill.
    fn find_insert_pos(&mut self, key: &K) -> Result<(Path<K, V>, LinkPtr<K, V>)> {
        let mut path = Path::new();
        let mut link_ptr: LinkPtr<K, V> = unsafe { LinkPtr::new_unchecked(&mut self.root) };
        unsafe {
            while let Some(mut node_ptr) = *link_ptr.as_ref() {
                path.push(node_ptr);
                link_ptr = match key.cmp(node_ptr.as_ref().key()) {
                    Ordering::Equal => return Err(AvlError::DuplicateKey),
                    Ordering::Less => LinkPtr::new_unchecked(&mut node_ptr.as_mut().left),
                    Ordering::Greater => LinkPtr::new_unchecked(&mut node_ptr.as_mut().right),
                };
            }
        }
        Ok((path, link_ptr))
    }
}

impl<K, V> AvlTreeMap<K, V> {
    /// Detaches `node_ptr` from the tree, moving a replacement into its place.
    /// On return `path` holds every node whose subtree changed, root first.
    fn unlink_node(&mut self, node_ptr: NodePtr<K, V>, path: &mut Path<K, V>) {
        let parent = path.last().copied();
        let node = unsafe { node_ptr.as_ref() };
        let replacement = match node.right {
            // No right subtree: splice in the left subtree
            None => {
                trace!(case = "left", "unlinked node");
                node.left
            }
            Some(mut right_ptr) => unsafe {
                match right_ptr.as_ref().left {
                    // Right child is the successor: it adopts the left subtree
                    None => {
                        right_ptr.as_mut().left = node.left;
                        path.push(right_ptr);
                        trace!(case = "right", "unlinked node");
                        Some(right_ptr)
                    }
                    // Successor is deeper: detach it and move it up
                    Some(mut min_child_ptr) => {
                        let mut min_parent_ptr = right_ptr;
                        let mut relocated: Path<K, V> = vec![right_ptr];
                        while let Some(left_ptr) = min_child_ptr.as_ref().left {
                            min_parent_ptr = min_child_ptr;
                            relocated.push(min_child_ptr);
                            min_child_ptr = left_ptr;
                        }
                        min_parent_ptr.as_mut().left = min_child_ptr.as_ref().right;
                        min_child_ptr.as_mut().left = node.left;
                        min_child_ptr.as_mut().right = node.right;
                        trace!(case = "successor", relocated = relocated.len(), "unlinked node");
                        path.push(min_child_ptr);
                        path.extend(relocated);
                        Some(min_child_ptr)
                    }
                }
            },
        };
        self.replace_child(parent, node_ptr, replacement);
    }

    /// Points the link that holds `old_ptr` (in `parent`, or the root link) at `new`.
    fn replace_child(&mut self, parent: Link<K, V>, old_ptr: NodePtr<K, V>, new: Link<K, V>) {
        match parent {
            None => self.root = new,
            Some(mut parent_ptr) => unsafe {
                let parent = parent_ptr.as_mut();
                if parent.left == Some(old_ptr) {
                    parent.left = new;
                } else {
                    debug_assert!(parent.right == Some(old_ptr));
                    parent.right = new;
                }
            },
        }
    }

    /// Rotates the subtree at `node_ptr` to the left.
    fn rotate_left(&mut self, mut node_ptr: NodePtr<K, V>, parent: Link<K, V>) {
        unsafe {
            if let Some(mut right_ptr) = node_ptr.as_ref().right {
                node_ptr.as_mut().right = right_ptr.as_ref().left;
                right_ptr.as_mut().left = Some(node_ptr);

                node_ptr.as_mut().recalculate_height();
                right_ptr.as_mut().recalculate_height();

                self.replace_child(parent, node_ptr, Some(right_ptr));
                trace!(height = right_ptr.as_ref().height(), "rotated left");
            }
        }
    }

    /// Rotates the subtree at `node_ptr` to the right.
    fn rotate_right(&mut self, mut node_ptr: NodePtr<K, V>, parent: Link<K, V>) {
        unsafe {
            if let Some(mut left_ptr) = node_ptr.as_ref().left {
                node_ptr.as_mut().left = left_ptr.as_ref().right;
                left_ptr.as_mut().right = Some(node_ptr);

                node_ptr.as_mut().recalculate_height();
                left_ptr.as_mut().recalculate_height();

                self.replace_child(parent, node_ptr, Some(left_ptr));
                trace!(height = left_ptr.as_ref().height(), "rotated right");
            }
        }
    }

    /// Rebalances every node on `path`, from the deepest up to the root.
    /// Removal may need rotations on several levels.
    fn rebalance(&mut self, mut path: Path<K, V>) {
        while let Some(node_ptr) = path.pop() {
            let parent = path.last().copied();
            self.rebalance_node(node_ptr, parent);
        }
    }

    /// Rebalances nodes on `path` from the deepest up to the root, rotating at
    /// most once. This is enough to restore balance after a single insert;
    /// heights above the rotation are still refreshed.
    fn rebalance_once(&mut self, mut path: Path<K, V>) {
        let mut rotated = false;
        while let Some(mut node_ptr) = path.pop() {
            if rotated {
                unsafe { node_ptr.as_mut().recalculate_height() };
                debug_assert!((-1..=1).contains(&unsafe { node_ptr.as_ref() }.balance_factor()));
            } else {
                let parent = path.last().copied();
                rotated = self.rebalance_node(node_ptr, parent);
            }
        }
    }

    /// Restores the AVL condition at the given node if necessary, after
    /// refreshing its height. The resulting balance factor is +1, 0 or -1.
    /// The initial balance factor must not exceed +2 or -2, which always holds
    /// after a single update.
    /// Returns whether a rotation had been necessary.
    fn rebalance_node(&mut self, mut node_ptr: NodePtr<K, V>, parent: Link<K, V>) -> bool {
        unsafe {
            node_ptr.as_mut().recalculate_height();
            let balance = node_ptr.as_ref().balance_factor();
            assert!(
                (-2..=2).contains(&balance),
                "AVL balance factor {balance} out of range after a single update"
            );
            if balance > 1 {
                // Left heavy, rebalance right
                if let Some(left_ptr) = node_ptr.as_ref().left {
                    if left_ptr.as_ref().balance_factor() < 0 {
                        self.rotate_left(left_ptr, Some(node_ptr));
                    }
                }
                self.rotate_right(node_ptr, parent);
                true
            } else if balance < -1 {
                // Right heavy, rebalance left
                if let Some(right_ptr) = node_ptr.as_ref().right {
                    if right_ptr.as_ref().balance_factor() > 0 {
                        self.rotate_right(right_ptr, Some(node_ptr));
                    }
                }
                self.rotate_left(node_ptr, parent);
                true
            } else {
                false
            }
        }
    }
}

impl<K, V> Drop for AvlTreeMap<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for AvlTreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> Clone for AvlTreeMap<K, V> {
    /// Rebuilds the tree by inserting the entries in top-down order,
    /// which needs no sorting and keeps the copy balanced.
    fn clone(&self) -> Self {
        let mut map = Self::with_traversal(self.traversal);
        for (key, value) in self.iter_with(TraversalMode::TopDown) {
            let inserted = map.insert(key.clone(), value.clone());
            debug_assert!(inserted.is_ok());
        }
        map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for AvlTreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter_with(TraversalMode::InOrder))
            .finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for AvlTreeMap<K, V> {
    /// Maps are equal when they hold the same entries, whatever their shape
    /// or traversal mode.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter_with(TraversalMode::InOrder)
                .eq(other.iter_with(TraversalMode::InOrder))
    }
}

impl<K: Eq, V: Eq> Eq for AvlTreeMap<K, V> {}

impl<'a, K, V> IntoIterator for &'a AvlTreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut AvlTreeMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

unsafe impl<K: Send, V: Send> Send for AvlTreeMap<K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for AvlTreeMap<K, V> {}
