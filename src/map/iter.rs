//! Traversal cursors over the nodes of an [`AvlTreeMap`](crate::AvlTreeMap).

use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::node::{Link, NodePtr};

/// Order in which iterators visit the entries of a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TraversalMode {
    /// Ascending key order.
    #[default]
    InOrder,
    /// Descending key order.
    ReverseOrder,
    /// Level by level, starting at the root, left to right within a level.
    ///
    /// Inserting entries into an empty map in this order rebuilds a balanced
    /// tree with the same contents without any sorting step.
    TopDown,
}

/// Pending nodes of a traversal.
enum WorkList<K, V> {
    /// In-order and reverse-order: the path of nodes whose own entry has not
    /// been yielded yet. The bottom of the stack acts as the end marker.
    Stack(Vec<NodePtr<K, V>>),
    /// Top-down: nodes of the current and the next level.
    Queue(VecDeque<NodePtr<K, V>>),
}

/// Single-pass, forward-only walk over the nodes of a tree.
///
/// The cursor holds raw node pointers; the wrapping iterator types tie it to a
/// borrow of the map so that no insertion or removal can happen while it is live.
struct Cursor<K, V> {
    mode: TraversalMode,
    work: WorkList<K, V>,
    remaining: usize,
}

impl<K, V> Cursor<K, V> {
    fn new(root: Link<K, V>, len: usize, mode: TraversalMode) -> Self {
        let mut cursor = Self {
            mode,
            work: match mode {
                TraversalMode::InOrder | TraversalMode::ReverseOrder => {
                    WorkList::Stack(Vec::new())
                }
                TraversalMode::TopDown => WorkList::Queue(VecDeque::new()),
            },
            remaining: len,
        };
        if let Some(root_ptr) = root {
            match &mut cursor.work {
                WorkList::Stack(stack) => Self::unwind(stack, root_ptr, mode),
                WorkList::Queue(queue) => queue.push_back(root_ptr),
            }
        }
        cursor
    }

    /// Pushes `node_ptr` and then its chain of near children: left children
    /// for in-order, right children for reverse order.
    fn unwind(stack: &mut Vec<NodePtr<K, V>>, node_ptr: NodePtr<K, V>, mode: TraversalMode) {
        let mut current = Some(node_ptr);
        while let Some(node_ptr) = current {
            stack.push(node_ptr);
            let node = unsafe { node_ptr.as_ref() };
            current = match mode {
                TraversalMode::ReverseOrder => node.right,
                _ => node.left,
            };
        }
    }

    fn advance(&mut self) -> Option<NodePtr<K, V>> {
        let node_ptr = match &mut self.work {
            WorkList::Stack(stack) => {
                let node_ptr = stack.pop()?;
                let node = unsafe { node_ptr.as_ref() };
                let far_child = match self.mode {
                    TraversalMode::ReverseOrder => node.left,
                    _ => node.right,
                };
                if let Some(child_ptr) = far_child {
                    Self::unwind(stack, child_ptr, self.mode);
                }
                node_ptr
            }
            WorkList::Queue(queue) => {
                let node_ptr = queue.pop_front()?;
                let node = unsafe { node_ptr.as_ref() };
                queue.extend(node.left);
                queue.extend(node.right);
                node_ptr
            }
        };
        self.remaining -= 1;
        Some(node_ptr)
    }

    fn is_exhausted(&self) -> bool {
        match &self.work {
            WorkList::Stack(stack) => stack.is_empty(),
            WorkList::Queue(queue) => queue.is_empty(),
        }
    }
}

/// An iterator over the entries of a map, in the order of a [`TraversalMode`].
///
/// This `struct` is created by [`AvlTreeMap::iter`](crate::AvlTreeMap::iter) and
/// [`AvlTreeMap::iter_with`](crate::AvlTreeMap::iter_with).
pub struct Iter<'a, K, V> {
    cursor: Cursor<K, V>,
    marker: PhantomData<(&'a K, &'a V)>,
}

/// A mutable iterator over the entries of a map, in the order of a [`TraversalMode`].
///
/// Only values can be changed; keys stay fixed so the tree keeps its order.
pub struct IterMut<'a, K, V> {
    cursor: Cursor<K, V>,
    marker: PhantomData<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(root: Link<K, V>, len: usize, mode: TraversalMode) -> Self {
        Self {
            cursor: Cursor::new(root, len, mode),
            marker: PhantomData,
        }
    }

    /// Returns the order this iterator walks in.
    pub fn mode(&self) -> TraversalMode {
        self.cursor.mode
    }
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(super) fn new(root: Link<K, V>, len: usize, mode: TraversalMode) -> Self {
        Self {
            cursor: Cursor::new(root, len, mode),
            marker: PhantomData,
        }
    }

    /// Returns the order this iterator walks in.
    pub fn mode(&self) -> TraversalMode {
        self.cursor.mode
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.cursor.advance()?;
        let node = unsafe { &*node_ptr.as_ptr() };
        Some((node.key(), &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node_ptr = self.cursor.advance()?;
        // Every node is yielded at most once, so the value borrows never alias.
        let node = unsafe { &mut *node_ptr.as_ptr() };
        Some(node.key_value_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.cursor.remaining, Some(self.cursor.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}
impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        let work = match &self.cursor.work {
            WorkList::Stack(stack) => WorkList::Stack(stack.clone()),
            WorkList::Queue(queue) => WorkList::Queue(queue.clone()),
        };
        Self {
            cursor: Cursor {
                mode: self.cursor.mode,
                work,
                remaining: self.cursor.remaining,
            },
            marker: PhantomData,
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("mode", &self.cursor.mode)
            .field("remaining", &self.cursor.remaining)
            .field("exhausted", &self.cursor.is_exhausted())
            .finish()
    }
}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut")
            .field("mode", &self.cursor.mode)
            .field("remaining", &self.cursor.remaining)
            .field("exhausted", &self.cursor.is_exhausted())
            .finish()
    }
}

unsafe impl<K: Sync, V: Sync> Send for Iter<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for Iter<'_, K, V> {}
unsafe impl<K: Sync, V: Send> Send for IterMut<'_, K, V> {}
unsafe impl<K: Sync, V: Sync> Sync for IterMut<'_, K, V> {}
