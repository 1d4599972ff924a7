//! External equi-join of two disk-resident relations with the two-phase
//! grace hash join, under a fixed budget of page-sized memory frames.

pub mod buffer;
pub mod config;
pub mod error;
pub mod execution;
pub mod storage;
pub mod utils;

pub use config::{JoinConfig, OverflowPolicy};
pub use error::{QuillJoinError, QuillJoinResult};
pub use execution::{Bucket, GraceHashJoin, JoinOutcome, Partitioner, Prober};
