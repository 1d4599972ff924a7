pub mod buffer_pool;
pub mod frame_layout;
pub mod page;

pub use buffer_pool::{BufferPool, FrameId};
pub use frame_layout::{FrameLayout, FrameRole};
pub use page::{
    PageEntry, PageId, RecordPage, INVALID_PAGE_ID, MAX_RECORDS_PER_PAGE, PAGE_SIZE,
    RECORDS_PER_PAGE,
};
