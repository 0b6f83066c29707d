#![no_main]

use evictkit::ds::FrequencyBuckets;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on FrequencyBuckets
//
// Every pop must return the lowest frequency present, and the tracked
// minimum must always match a linear scan.
fuzz_target!(|data: &[u8]| {
    let mut buckets: FrequencyBuckets<u32> = FrequencyBuckets::new();

    for chunk in data.chunks_exact(2) {
        let key = u32::from(chunk[1] % 32);

        match chunk[0] % 6 {
            0 => {
                let fresh = !buckets.contains(&key);
                assert_eq!(buckets.insert(key), fresh);
            }
            1 => {
                let before = buckets.frequency(&key);
                assert_eq!(buckets.touch(&key), before.map(|f| f + 1));
            }
            2 => {
                buckets.remove(&key);
                assert!(!buckets.contains(&key));
            }
            3 => {
                let expected = buckets.min_freq();
                assert_eq!(buckets.pop_min().map(|(_, f)| f), expected);
            }
            4 => {
                let _ = buckets.peek_min();
            }
            _ => buckets.clear(),
        }

        let scanned = buckets.keys().filter_map(|k| buckets.frequency(k)).min();
        assert_eq!(buckets.min_freq(), scanned);
        assert_eq!(buckets.keys().count(), buckets.len());
    }
});
