#![no_main]

use evictkit::{CacheBuilder, PolicyKind};
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on a small sharded Cache
//
// The first two bytes pick capacity and shard count; the rest is a stream
// of (op, key) pairs. Capacity and the policy/store key bijection are
// checked after every operation.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let shards = usize::from(data[1] % 4) + 1;
    let capacity = usize::from(data[0] % 32).max(shards);
    let cache = match CacheBuilder::new(capacity).shard_count(shards).build::<u8, u32>() {
        Ok(cache) => cache,
        Err(_) => return,
    };

    for chunk in data[2..].chunks_exact(2) {
        let key = chunk[1] % 64;

        match chunk[0] % 8 {
            0..=2 => cache.put(key, u32::from(chunk[0])).unwrap(),
            3 | 4 => {
                let _ = cache.get(&key).unwrap();
            }
            5 => {
                cache.delete(&key).unwrap();
                assert_eq!(cache.peek(&key).unwrap(), None);
            }
            6 => {
                let kind = PolicyKind::ALL[usize::from(chunk[1]) % PolicyKind::ALL.len()];
                cache.set_policy(kind).unwrap();
                assert_eq!(cache.policy(), kind);
            }
            _ => cache.clear().unwrap(),
        }

        assert!(cache.len() <= capacity);
        cache.check_invariants().unwrap();
    }
});
