pub mod bucket;
pub mod grace_hash_join;
pub mod hash_table;
pub mod partition;
pub mod probe;

pub use bucket::{Bucket, BucketBuilder, Side};
pub use grace_hash_join::{GraceHashJoin, JoinOutcome, JoinStats};
pub use hash_table::JoinHashTable;
pub use partition::Partitioner;
pub use probe::{ProbeStats, Prober};
