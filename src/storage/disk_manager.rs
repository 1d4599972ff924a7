use log::debug;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::buffer::{PageId, RecordPage, INVALID_PAGE_ID, MAX_RECORDS_PER_PAGE, PAGE_SIZE};
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::codec::RecordPageCodec;
use crate::storage::{IoStats, PageStore};

/// File of `PAGE_SIZE` blocks; page `n` lives at offset `(n - 1) * PAGE_SIZE`.
#[derive(Debug)]
pub struct DiskManager {
    // guards the file handle and the next page id together, so an id is
    // only handed out once its block is on disk
    inner: Mutex<DiskFile>,
    reads: AtomicU64,
    writes: AtomicU64,
}

#[derive(Debug)]
struct DiskFile {
    file: File,
    next_page_id: PageId,
}

impl DiskManager {
    pub fn try_new(db_path: impl AsRef<Path>) -> QuillJoinResult<Self> {
        let db_path = db_path.as_ref();
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(db_path)?;

        // calculate next page id
        let db_file_len = file.metadata()?.len();
        if db_file_len % PAGE_SIZE as u64 != 0 {
            return Err(QuillJoinError::Internal(format!(
                "db file size {} not a multiple of {}",
                db_file_len, PAGE_SIZE,
            )));
        }
        let next_page_id = (db_file_len / PAGE_SIZE as u64 + 1) as PageId;
        debug!(
            "Initialized disk_manager for {:?}, next_page_id: {}",
            db_path, next_page_id
        );

        Ok(Self {
            inner: Mutex::new(DiskFile { file, next_page_id }),
            reads: AtomicU64::new(0),
            writes: AtomicU64::new(0),
        })
    }

    /// Number of pages written so far, including pages from earlier sessions.
    pub fn num_pages(&self) -> usize {
        self.inner.lock().next_page_id as usize - 1
    }

    pub fn db_file_len(&self) -> QuillJoinResult<u64> {
        let guard = self.inner.lock();
        Ok(guard.file.metadata()?.len())
    }

    fn page_offset(page_id: PageId) -> u64 {
        (page_id as u64 - 1) * PAGE_SIZE as u64
    }
}

impl PageStore for DiskManager {
    fn read_page(&self, page_id: PageId) -> QuillJoinResult<RecordPage> {
        let mut guard = self.inner.lock();
        if page_id == INVALID_PAGE_ID || page_id >= guard.next_page_id {
            return Err(QuillJoinError::page_not_found(page_id));
        }

        let mut buf = vec![0u8; PAGE_SIZE];
        guard.file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        guard.file.read_exact(&mut buf)?;
        drop(guard);
        self.reads.fetch_add(1, Ordering::Relaxed);

        let (page, _) = RecordPageCodec::decode(&buf).map_err(|e| {
            QuillJoinError::StorageFault(format!("page {} unreadable: {}", page_id, e))
        })?;
        Ok(page)
    }

    fn write_page(&self, page: &RecordPage) -> QuillJoinResult<PageId> {
        if page.capacity() > MAX_RECORDS_PER_PAGE {
            return Err(QuillJoinError::CapacityViolation(format!(
                "page capacity {} exceeds the on-disk limit {}",
                page.capacity(),
                MAX_RECORDS_PER_PAGE
            )));
        }
        let bytes = RecordPageCodec::encode(page);

        let mut guard = self.inner.lock();
        let page_id = guard.next_page_id;
        guard.file.seek(SeekFrom::Start(Self::page_offset(page_id)))?;
        guard.file.write_all(&bytes)?;
        guard.file.flush()?;
        guard.next_page_id += 1;
        drop(guard);

        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(page_id)
    }

    fn io_stats(&self) -> IoStats {
        IoStats::new(
            self.reads.load(Ordering::Relaxed),
            self.writes.load(Ordering::Relaxed),
        )
    }
}
