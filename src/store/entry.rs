/// A stored value plus the bookkeeping the store keeps for it.
///
/// Sequence numbers come from a per-store counter that advances on every
/// `put` and every hit, so they order events within one store only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) inserted_at: u64,
    pub(crate) last_access: u64,
    pub(crate) frequency: u64,
}

impl<K, V> Entry<K, V> {
    pub(crate) fn new(key: K, value: V, tick: u64) -> Self {
        Self {
            key,
            value,
            inserted_at: tick,
            last_access: tick,
            frequency: 1,
        }
    }

    pub(crate) fn touch(&mut self, tick: u64) {
        self.last_access = tick;
        self.frequency = self.frequency.saturating_add(1);
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Sequence number of the put that created this entry.
    pub fn inserted_at(&self) -> u64 {
        self.inserted_at
    }

    /// Sequence number of the latest read or overwrite.
    pub fn last_access(&self) -> u64 {
        self.last_access
    }

    /// 1 on creation, +1 per read or overwrite.
    pub fn frequency(&self) -> u64 {
        self.frequency
    }
}
