/// A key-value pair handed out by [`get`] (borrowed) and [`remove`] (owned).
///
/// The pair is detached from the tree: holding a `MapEntry` does not keep any
/// node alive, and the entry cannot be used to change the map.
///
/// [`get`]: crate::AvlTreeMap::get
/// [`remove`]: crate::AvlTreeMap::remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapEntry<K, V> {
    key: K,
    value: V,
}

impl<K, V> MapEntry<K, V> {
    pub(crate) fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Returns a reference to the key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns a reference to the value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Splits the entry into key and value.
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<MapEntry<K, V>> for (K, V) {
    fn from(entry: MapEntry<K, V>) -> Self {
        entry.into_parts()
    }
}
