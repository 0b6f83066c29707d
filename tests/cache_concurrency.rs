// ==============================================
// SHARDED CACHE CONCURRENCY TESTS (integration)
// ==============================================
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use evictkit::prelude::*;

fn shared(capacity: usize, shards: usize, policy: PolicyKind) -> Arc<Cache<u64, u64>> {
    Arc::new(
        CacheBuilder::new(capacity)
            .shard_count(shards)
            .policy(policy)
            .build()
            .unwrap(),
    )
}

#[test]
fn concurrent_disjoint_puts_respect_capacity() {
    for policy in PolicyKind::ALL {
        let capacity = 256;
        let cache = shared(capacity, 8, policy);
        let num_threads: usize = 8;
        let puts_per_thread: usize = 500;

        let handles: Vec<_> = (0..num_threads)
            .map(|thread_id| {
                let cache = cache.clone();
                thread::spawn(move || {
                    for i in 0..puts_per_thread {
                        let key = (thread_id * 1_000_000 + i) as u64;
                        cache.put(key, key).unwrap();
                        assert!(cache.len() <= capacity);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(
            cache.len() <= capacity,
            "{policy}: cache length {} exceeded capacity {}",
            cache.len(),
            capacity
        );
        let stats = cache.stats();
        assert_eq!(stats.inserts, (num_threads * puts_per_thread) as u64);
        assert_eq!(stats.inserts - stats.evictions, cache.len() as u64);
        cache.check_invariants().unwrap();
    }
}

#[test]
fn no_key_lost_when_capacity_suffices() {
    let num_threads: usize = 8;
    let keys_per_thread: usize = 100;
    // generous per-shard headroom so hash skew never forces an eviction
    let cache = shared(num_threads * keys_per_thread * 4, 4, PolicyKind::Lru);

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..keys_per_thread {
                    let key = (thread_id * keys_per_thread + i) as u64;
                    cache.put(key, key * 2).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), num_threads * keys_per_thread);
    for key in 0..(num_threads * keys_per_thread) as u64 {
        assert_eq!(cache.get(&key).unwrap(), Some(key * 2));
    }
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn read_after_write_sees_latest_value() {
    let cache = shared(1_024, 4, PolicyKind::Lfu);
    let failures = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6u64)
        .map(|thread_id| {
            let cache = cache.clone();
            let failures = failures.clone();
            thread::spawn(move || {
                let key = thread_id;
                for version in 0..2_000u64 {
                    cache.put(key, version).unwrap();
                    if cache.get(&key).unwrap() != Some(version) {
                        failures.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(failures.load(Ordering::SeqCst), 0);
}

#[test]
fn policy_switches_interleave_with_traffic() {
    let capacity = 128;
    let cache = shared(capacity, 4, PolicyKind::Lru);
    let stop = Arc::new(AtomicBool::new(false));

    let workers: Vec<_> = (0..4u64)
        .map(|thread_id| {
            let cache = cache.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut i = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    let key = thread_id * 10_000 + (i % 300);
                    match i % 3 {
                        0 | 1 => cache.put(key, i).unwrap(),
                        _ => {
                            cache.get(&key).unwrap();
                        },
                    }
                    if i % 50 == 0 {
                        cache.delete(&key).unwrap();
                    }
                    i += 1;
                }
            })
        })
        .collect();

    let switchers: Vec<_> = (0..2)
        .map(|offset| {
            let cache = cache.clone();
            thread::spawn(move || {
                for round in 0..30 {
                    let policy = PolicyKind::ALL[(round + offset) % PolicyKind::ALL.len()];
                    cache.set_policy(policy).unwrap();
                    assert!(cache.len() <= capacity);
                }
            })
        })
        .collect();

    for switcher in switchers {
        switcher.join().unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(cache.len() <= capacity);
    assert_eq!(cache.stats().policy_switches, 2 * 30 * 4);
    cache.check_invariants().unwrap();
}

#[test]
fn contention_errors_are_retryable() {
    let cache: Arc<Cache<u64, u64>> = Arc::new(
        CacheBuilder::new(64)
            .shard_count(2)
            .lock_timeout(Duration::from_millis(10))
            .build()
            .unwrap(),
    );

    // whole-cache clears contend with puts; any failure must be a timeout
    let handles: Vec<_> = (0..8u64)
        .map(|thread_id| {
            let cache = cache.clone();
            thread::spawn(move || {
                for i in 0..500 {
                    let result = if i % 100 == 0 {
                        cache.clear()
                    } else {
                        cache.put(thread_id * 1_000 + i, i)
                    };
                    if let Err(err) = result {
                        assert!(err.is_retryable(), "unexpected error: {err}");
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    cache.check_invariants().unwrap();
}
