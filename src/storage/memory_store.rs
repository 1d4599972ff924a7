use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::buffer::{PageId, RecordPage, INVALID_PAGE_ID};
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::{IoStats, PageStore};

/// Page store kept entirely in memory. Page `n` is `pages[n - 1]`.
#[derive(Debug, Default)]
pub struct InMemoryPageStore {
    pages: RwLock<Vec<RecordPage>>,
    reads: AtomicU64,
    writes: AtomicU64,
}

impl InMemoryPageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_pages(&self) -> usize {
        self.pages.read().len()
    }
}

impl PageStore for InMemoryPageStore {
    fn read_page(&self, page_id: PageId) -> QuillJoinResult<RecordPage> {
        if page_id == INVALID_PAGE_ID {
            return Err(QuillJoinError::page_not_found(page_id));
        }
        let page = self
            .pages
            .read()
            .get(page_id as usize - 1)
            .cloned()
            .ok_or_else(|| QuillJoinError::page_not_found(page_id))?;
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(page)
    }

    fn write_page(&self, page: &RecordPage) -> QuillJoinResult<PageId> {
        let mut pages = self.pages.write();
        pages.push(page.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(pages.len() as PageId)
    }

    fn io_stats(&self) -> IoStats {
        IoStats::new(
            self.reads.load(Ordering::Relaxed),
            self.writes.load(Ordering::Relaxed),
        )
    }
}
