//! Index structures the policies are built from: a slot arena, an
//! intrusive list over it, O(1) frequency buckets and the shard selector.

pub mod frequency_buckets;
pub mod intrusive_list;
pub mod shard;
pub mod slot_arena;

pub use frequency_buckets::FrequencyBuckets;
pub use intrusive_list::IntrusiveList;
pub use shard::ShardSelector;
pub use slot_arena::{SlotArena, SlotId};
