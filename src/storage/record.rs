use std::fmt::{Display, Formatter};

use xxhash_rust::xxh3::xxh3_64_with_seed;

/// key (8) + payload (8)
pub const RECORD_SIZE: usize = 16;

const PARTITION_HASH_SEED: u64 = 0x9e37_79b9_7f4a_7c15;
const PROBE_HASH_SEED: u64 = 0xc2b2_ae3d_27d4_eb4f;

/// Fixed-shape tuple. Joins are equi-joins on `key`; `payload` rides along.
#[derive(derive_new::new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    pub key: i64,
    pub payload: u64,
}

impl Record {
    /// Join predicate.
    pub fn joins_with(&self, other: &Record) -> bool {
        self.key == other.key
    }

    /// Hash used to route records to partition buckets.
    pub fn partition_hash(&self) -> u64 {
        self.partition_hash_with_seed(0)
    }

    /// Partition hash family; each re-partitioning level picks its own seed.
    pub fn partition_hash_with_seed(&self, seed: u64) -> u64 {
        xxh3_64_with_seed(
            &self.key.to_be_bytes(),
            PARTITION_HASH_SEED.wrapping_add(seed.wrapping_mul(PROBE_HASH_SEED)),
        )
    }

    /// Hash used by the in-memory table of the probe phase.
    pub fn probe_hash(&self) -> u64 {
        // mixes a second time so that it stays independent of every partition seed
        let first = xxh3_64_with_seed(&self.key.to_le_bytes(), PROBE_HASH_SEED);
        xxh3_64_with_seed(&first.to_le_bytes(), PROBE_HASH_SEED)
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.key, self.payload)
    }
}
