pub mod codec;
pub mod disk_manager;
pub mod memory_store;
pub mod record;
pub mod relation;

use crate::buffer::{PageId, RecordPage};
use crate::error::QuillJoinResult;

pub use disk_manager::DiskManager;
pub use memory_store::InMemoryPageStore;
pub use record::Record;
pub use relation::{load_relation, read_pairs, read_records, PageRange};

/// Page transfers performed by a store since it was opened.
#[derive(derive_new::new, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IoStats {
    pub reads: u64,
    pub writes: u64,
}

impl std::ops::Sub for IoStats {
    type Output = IoStats;

    fn sub(self, rhs: Self) -> Self::Output {
        IoStats {
            reads: self.reads - rhs.reads,
            writes: self.writes - rhs.writes,
        }
    }
}

/// Block storage addressed by page id. Every write allocates a fresh id,
/// ids are never reused.
pub trait PageStore {
    /// Fails with `StorageFault` when `page_id` was never written.
    fn read_page(&self, page_id: PageId) -> QuillJoinResult<RecordPage>;

    fn write_page(&self, page: &RecordPage) -> QuillJoinResult<PageId>;

    fn io_stats(&self) -> IoStats;
}
