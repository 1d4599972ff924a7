use thiserror::Error;

use crate::buffer::PageId;

pub type QuillJoinResult<T, E = QuillJoinError> = Result<T, E>;

#[derive(Debug, Error)]
pub enum QuillJoinError {
    #[error("Storage fault: {0}")]
    StorageFault(String),

    #[error("Capacity violation: {0}")]
    CapacityViolation(String),

    #[error(
        "Overflow: bucket {bucket} build side holds {records} records at depth {depth}, hash table budget is {budget}"
    )]
    Overflow {
        /// Top-level bucket index, also for sub-buckets of a re-partition.
        bucket: usize,
        depth: usize,
        records: usize,
        budget: usize,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuillJoinError {
    pub fn page_not_found(page_id: PageId) -> Self {
        QuillJoinError::StorageFault(format!("page {} not found", page_id))
    }
}
