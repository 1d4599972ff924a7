use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::record::{Record, RECORD_SIZE};

pub type PageId = u32;

pub const INVALID_PAGE_ID: PageId = 0;
pub const PAGE_SIZE: usize = 4096;

/// capacity (2) + number of entries (2)
pub const PAGE_HEADER_SIZE: usize = 4;
/// tag (1) + room for a joined pair
pub const PAGE_ENTRY_SIZE: usize = 1 + 2 * RECORD_SIZE;
pub const MAX_RECORDS_PER_PAGE: usize = (PAGE_SIZE - PAGE_HEADER_SIZE) / PAGE_ENTRY_SIZE;
pub const RECORDS_PER_PAGE: usize = 64;

/// One slot of a page. Input and partition pages hold single records,
/// join output pages hold matched `(left, right)` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEntry {
    Record(Record),
    Pair(Record, Record),
}

/**
 * Fixed-capacity page of entries, the unit moved between storage and memory frames.
 *
 * On-disk layout (size in bytes):
 * ```text
 *  -------------------------------------------------------------------------
 *  | Capacity (2) | NumEntries (2) | Entry_1 | Entry_2 | ... | zero padding |
 *  -------------------------------------------------------------------------
 * ```
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    capacity: usize,
    entries: Vec<PageEntry>,
}

impl RecordPage {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn try_from_entries(capacity: usize, entries: Vec<PageEntry>) -> QuillJoinResult<Self> {
        if entries.len() > capacity {
            return Err(QuillJoinError::CapacityViolation(format!(
                "{} entries do not fit a page of capacity {}",
                entries.len(),
                capacity
            )));
        }
        let mut page = Self::new(capacity);
        page.entries = entries;
        Ok(page)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn push_record(&mut self, record: Record) -> QuillJoinResult<()> {
        self.push(PageEntry::Record(record))
    }

    pub fn push_pair(&mut self, left: Record, right: Record) -> QuillJoinResult<()> {
        self.push(PageEntry::Pair(left, right))
    }

    fn push(&mut self, entry: PageEntry) -> QuillJoinResult<()> {
        if self.is_full() {
            return Err(QuillJoinError::CapacityViolation(format!(
                "append to a full page of capacity {}",
                self.capacity
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entry(&self, index: usize) -> QuillJoinResult<&PageEntry> {
        self.entries.get(index).ok_or_else(|| {
            QuillJoinError::Internal(format!(
                "entry {} out of range, page holds {}",
                index,
                self.entries.len()
            ))
        })
    }

    pub fn record(&self, index: usize) -> QuillJoinResult<Record> {
        match self.entry(index)? {
            PageEntry::Record(record) => Ok(*record),
            PageEntry::Pair(..) => Err(QuillJoinError::Internal(format!(
                "entry {} is a joined pair, not a record",
                index
            ))),
        }
    }

    pub fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
