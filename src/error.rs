//! Error type shared by all fallible map operations.

/// Result type alias for map operations.
pub type Result<T, E = AvlError> = core::result::Result<T, E>;

/// Reasons a map operation can fail.
///
/// A failed operation never changes the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AvlError {
    /// The key passed to [`insert`](crate::AvlTreeMap::insert) is already in the map.
    #[error("key already exists in tree")]
    DuplicateKey,

    /// The requested key is not in the map.
    #[error("key not present in tree")]
    NotFound,

    /// The map has no elements to take a minimum or maximum of.
    #[error("tree is empty")]
    EmptyTree,
}
