use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avltree::{AvlTreeMap, TraversalMode};

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("map_insert", |b| {
        b.iter(|| {
            let mut map = AvlTreeMap::new();
            for value in &values {
                let _ = map.insert(*value, *value);
            }
            map
        })
    });

    let mut map = AvlTreeMap::new();
    for value in &values {
        let _ = map.insert(*value, *value);
    }

    c.bench_function("map_get", |b| {
        b.iter(|| {
            for value in &values {
                let _ = black_box(map.get(value));
            }
        })
    });

    for (name, mode) in [
        ("map_iter_in_order", TraversalMode::InOrder),
        ("map_iter_reverse_order", TraversalMode::ReverseOrder),
        ("map_iter_top_down", TraversalMode::TopDown),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                for (k, v) in map.iter_with(mode) {
                    black_box((k, v));
                }
            })
        });
    }

    c.bench_function("map_reload_top_down", |b| {
        b.iter(|| map.clone())
    });

    c.bench_function("map_remove", |b| {
        b.iter(|| {
            let mut map = map.clone();
            for value in &values {
                let _ = map.remove(value);
            }
            map
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
