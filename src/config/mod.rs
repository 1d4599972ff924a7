use derive_with::With;

use crate::buffer::{MAX_RECORDS_PER_PAGE, RECORDS_PER_PAGE};
use crate::error::{QuillJoinError, QuillJoinResult};

/// Default number of memory frames (`M`) handed to a join.
pub const MEM_SIZE_IN_PAGE: usize = 16;

/// What the probe phase does when a bucket's build side does not fit the hash table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Report `QuillJoinError::Overflow` and abort the join.
    #[default]
    Fail,
    /// Re-partition the bucket with a fresh hash seed, at most `max_depth` levels deep.
    Repartition { max_depth: usize },
}

#[derive(Debug, Clone, Copy, With)]
pub struct JoinConfig {
    /// Memory budget `M`, in frames.
    pub mem_size_in_page: usize,
    /// Slots per page, shared by input, partition and output pages.
    pub records_per_page: usize,
    pub overflow: OverflowPolicy,
}

impl JoinConfig {
    pub fn validate(&self) -> QuillJoinResult<()> {
        // partition needs one scan frame plus at least one bucket buffer,
        // probe needs output + scan + at least one hash table slot
        if self.mem_size_in_page < 3 {
            return Err(QuillJoinError::Config(format!(
                "mem_size_in_page must be at least 3, got {}",
                self.mem_size_in_page
            )));
        }
        if self.records_per_page == 0 || self.records_per_page > MAX_RECORDS_PER_PAGE {
            return Err(QuillJoinError::Config(format!(
                "records_per_page must be within 1..={}, got {}",
                MAX_RECORDS_PER_PAGE, self.records_per_page
            )));
        }
        Ok(())
    }

    /// Number of partition buckets, `B = M - 1`.
    pub fn num_buckets(&self) -> usize {
        self.mem_size_in_page - 1
    }

    /// Records the probe-phase hash table may hold, `(M - 2)` pages worth.
    pub fn hash_table_budget(&self) -> usize {
        (self.mem_size_in_page - 2) * self.records_per_page
    }
}

impl Default for JoinConfig {
    fn default() -> Self {
        JoinConfig {
            mem_size_in_page: MEM_SIZE_IN_PAGE,
            records_per_page: RECORDS_PER_PAGE,
            overflow: OverflowPolicy::default(),
        }
    }
}
