use avltree::{AvlError, AvlTreeMap, TraversalMode};
use pretty_assertions::assert_eq;

fn keys<V>(map: &AvlTreeMap<i32, V>) -> Vec<i32> {
    map.iter().map(|(k, _)| *k).collect()
}

/// Smallest possible AVL height (in edges) for `n` nodes: a complete tree.
fn min_height(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize - 1
}

#[test]
fn small_tree_in_order() {
    let mut map = AvlTreeMap::new();
    for key in [5, 3, 8, 1, 4, 7, 9] {
        map.insert(key, key.to_string()).unwrap();
    }
    assert_eq!(keys(&map), vec![1, 3, 4, 5, 7, 8, 9]);
    // 1.44 * log2(8) rounded up
    assert!(map.height() <= 5);
    assert_eq!(map.len(), 7);
}

#[test]
fn ascending_inserts_build_minimal_height() {
    let mut map = AvlTreeMap::new();
    for key in 0..255 {
        map.insert(key, key.to_string()).unwrap();
    }
    assert_eq!(map.len(), 255);
    assert_eq!(map.height(), min_height(255));
    assert_eq!(map.height(), 7);
    assert_eq!(map.balance_factor(), 0);
    assert_eq!(keys(&map), (0..255).collect::<Vec<_>>());

    map.set_traversal(TraversalMode::TopDown);
    let top_down = keys(&map);
    assert_eq!(top_down[0], 127);
    assert_eq!(&top_down[1..3], &[63, 191]);
}

#[test]
fn remove_root_of_three_node_tree() {
    let mut map = AvlTreeMap::new();
    map.insert(2, "two").unwrap();
    map.insert(1, "one").unwrap();
    map.insert(3, "three").unwrap();

    let removed = map.remove(&2).unwrap();
    assert_eq!(removed.key(), &2);
    assert_eq!(removed.into_parts(), (2, "two"));
    assert_eq!(map.len(), 2);
    assert_eq!(keys(&map), vec![1, 3]);
}

#[test]
fn min_max_on_empty_tree() {
    let map = AvlTreeMap::<i32, ()>::new();
    assert_eq!(map.min_key(), Err(AvlError::EmptyTree));
    assert_eq!(map.max_key(), Err(AvlError::EmptyTree));
    assert_eq!(map.height(), 0);
    assert_eq!(map.balance_factor(), 0);
    assert_eq!(map.iter().next(), None);
}

#[test]
fn failures_leave_tree_unchanged() {
    let mut map = AvlTreeMap::new();
    for key in 0..10 {
        map.insert(key, key * 2).unwrap();
    }
    let before = keys(&map);

    assert_eq!(map.insert(4, 0), Err(AvlError::DuplicateKey));
    assert_eq!(map.get(&4).map(|entry| *entry.value()), Ok(&8));
    assert_eq!(map.remove(&42).unwrap_err(), AvlError::NotFound);
    assert_eq!(map.get(&42).unwrap_err(), AvlError::NotFound);

    assert_eq!(map.len(), 10);
    assert_eq!(keys(&map), before);
}

#[test]
fn traversal_modes() {
    let mut map = AvlTreeMap::with_traversal(TraversalMode::ReverseOrder);
    for key in [4, 2, 6, 1, 3, 5, 7] {
        map.insert(key, ()).unwrap();
    }
    assert_eq!(keys(&map), vec![7, 6, 5, 4, 3, 2, 1]);

    map.set_traversal(TraversalMode::TopDown);
    assert_eq!(map.traversal(), TraversalMode::TopDown);
    assert_eq!(keys(&map), vec![4, 2, 6, 1, 3, 5, 7]);

    let in_order: Vec<_> = map
        .iter_with(TraversalMode::InOrder)
        .map(|(k, _)| *k)
        .collect();
    assert_eq!(in_order, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn top_down_reload() {
    let mut map = AvlTreeMap::new();
    for key in (0..500).map(|i| (i * 7919) % 1009) {
        map.insert(key, key).unwrap();
    }
    for key in (0..1009).step_by(3) {
        let _ = map.remove(&key);
    }

    let mut reloaded = AvlTreeMap::new();
    for (key, value) in map.iter_with(TraversalMode::TopDown) {
        reloaded.insert(*key, *value).unwrap();
    }
    assert_eq!(reloaded.len(), map.len());
    assert_eq!(keys(&reloaded), keys(&map));
    assert_eq!(reloaded, map);
}

#[test]
fn entries_convert_into_tuples() {
    let mut map = AvlTreeMap::new();
    map.insert(String::from("key"), 1).unwrap();
    let (key, value): (String, i32) = map.remove("key").unwrap().into();
    assert_eq!((key.as_str(), value), ("key", 1));
    assert!(map.is_empty());
}
