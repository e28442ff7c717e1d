use std::cmp;
use std::ptr::NonNull;

pub(super) type NodePtr<K, V> = NonNull<Node<K, V>>;
pub(super) type Link<K, V> = Option<NodePtr<K, V>>;
pub(super) type LinkPtr<K, V> = NonNull<Link<K, V>>;

/// A tree node. Owned by the link of its parent (or the map's root link).
///
/// `height` counts edges on the longest downward path, so a leaf has height 0
/// and a missing child counts as height -1.
pub(super) struct Node<K, V> {
    key: K,
    pub(super) value: V,
    pub(super) left: Link<K, V>,
    pub(super) right: Link<K, V>,
    height: usize,
}

impl<K, V> Node<K, V> {
    pub(super) fn create(key: K, value: V) -> NodePtr<K, V> {
        let boxed = Box::new(Node {
            key,
            value,
            left: None,
            right: None,
            height: 0,
        });
        unsafe { NodePtr::new_unchecked(Box::into_raw(boxed)) }
    }

    /// Frees a node that is no longer reachable from the root and returns its contents.
    ///
    /// # Safety
    /// `node_ptr` must come from [`Node::create`] and must not be used afterwards.
    pub(super) unsafe fn destroy(node_ptr: NodePtr<K, V>) -> (K, V) {
        let mut boxed = Box::from_raw(node_ptr.as_ptr());
        boxed.left = None;
        boxed.right = None;
        (boxed.key, boxed.value)
    }

    pub(super) fn key(&self) -> &K {
        &self.key
    }

    pub(super) fn key_value_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    pub(super) fn height(&self) -> usize {
        self.height
    }

    /// Height of the left subtree minus height of the right subtree.
    pub(super) fn balance_factor(&self) -> isize {
        Self::link_height(self.left) - Self::link_height(self.right)
    }

    /// Recomputes the height from the cached heights of the children.
    /// Children must be up to date, so call this bottom-up.
    pub(super) fn recalculate_height(&mut self) {
        self.height = (1 + cmp::max(Self::link_height(self.left), Self::link_height(self.right))) as usize;
    }

    fn link_height(link: Link<K, V>) -> isize {
        match link {
            None => -1,
            Some(node_ptr) => unsafe { node_ptr.as_ref().height as isize },
        }
    }
}
