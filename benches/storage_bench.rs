//! Benchmarks for the storage backends.

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use ordkv::backends::{MemoryStorage, RedbStorage};
use ordkv::{Batch, Cursor, Storage, Write};

/// Benchmark single key-value writes.
fn bench_put_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_single");
    group.throughput(Throughput::Elements(1));

    group.bench_function("memory", |b| {
        b.iter_batched(
            MemoryStorage::new,
            |store| {
                store.put(b"key", b"value").unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("redb", |b| {
        b.iter_batched(
            || RedbStorage::in_memory().unwrap(),
            |store| {
                store.put(b"key", b"value").unwrap();
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark batched writes at several sizes.
fn bench_put_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_batch");

    for size in [10u64, 100, 1000] {
        group.throughput(Throughput::Elements(size));

        group.bench_function(format!("memory_{size}"), |b| {
            b.iter_batched(
                MemoryStorage::new,
                |store| {
                    let mut batch = store.batch().unwrap();
                    for i in 0..size {
                        let key = format!("key:{i:05}");
                        let value = format!("value:{i:05}");
                        batch.put(key.as_bytes(), value.as_bytes());
                    }
                    batch.commit().unwrap();
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function(format!("redb_{size}"), |b| {
            b.iter_batched(
                || RedbStorage::in_memory().unwrap(),
                |store| {
                    let mut batch = store.batch().unwrap();
                    for i in 0..size {
                        let key = format!("key:{i:05}");
                        let value = format!("value:{i:05}");
                        batch.put(key.as_bytes(), value.as_bytes());
                    }
                    batch.commit().unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark single key reads against a populated store.
fn bench_get_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_single");
    group.throughput(Throughput::Elements(1));

    group.bench_function("memory", |b| {
        b.iter_batched(
            || {
                let store = MemoryStorage::new();
                store.put(b"key", b"value").unwrap();
                store
            },
            |store| {
                let _ = black_box(store.get(b"key").unwrap());
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("redb", |b| {
        b.iter_batched(
            || {
                let store = RedbStorage::in_memory().unwrap();
                store.put(b"key", b"value").unwrap();
                store
            },
            |store| {
                let _ = black_box(store.get(b"key").unwrap());
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

/// Benchmark a full forward scan over 1000 keys.
fn bench_scan(c: &mut Criterion) {
    const NUM_KEYS: u64 = 1000;

    let mut group = c.benchmark_group("scan");
    group.throughput(Throughput::Elements(NUM_KEYS));

    fn populate<S: Storage>(store: &S) {
        let mut batch = store.batch().unwrap();
        for i in 0..NUM_KEYS {
            let key = format!("key:{i:05}");
            let value = format!("value:{i:05}");
            batch.put(key.as_bytes(), value.as_bytes());
        }
        batch.commit().unwrap();
    }

    fn scan<S: Storage>(store: &S) -> usize {
        let mut cursor = store.iter(None, None).unwrap();
        let mut count = 0;
        while cursor.next().unwrap() {
            black_box(cursor.key());
            count += 1;
        }
        count
    }

    group.bench_function("memory", |b| {
        b.iter_batched(
            || {
                let store = MemoryStorage::new();
                populate(&store);
                store
            },
            |store| {
                assert_eq!(scan(&store), NUM_KEYS as usize);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("redb", |b| {
        b.iter_batched(
            || {
                let store = RedbStorage::in_memory().unwrap();
                populate(&store);
                store
            },
            |store| {
                assert_eq!(scan(&store), NUM_KEYS as usize);
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_put_single, bench_put_batch, bench_get_single, bench_scan);
criterion_main!(benches);
