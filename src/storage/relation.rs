use std::ops::Range;

use log::debug;

use crate::buffer::{PageEntry, PageId, RecordPage};
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::record::Record;
use crate::storage::PageStore;

/// Pages `[first, last)` of one input relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    first: PageId,
    last: PageId,
}

impl PageRange {
    pub fn try_new(first: PageId, last: PageId) -> QuillJoinResult<Self> {
        if first > last {
            return Err(QuillJoinError::Config(format!(
                "invalid page range [{}, {})",
                first, last
            )));
        }
        Ok(Self { first, last })
    }

    pub fn empty() -> Self {
        Self { first: 0, last: 0 }
    }

    pub fn first(&self) -> PageId {
        self.first
    }

    pub fn last(&self) -> PageId {
        self.last
    }

    pub fn num_pages(&self) -> usize {
        (self.last - self.first) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.first == self.last
    }

    pub fn page_ids(&self) -> Range<PageId> {
        self.first..self.last
    }
}

/// Writes `records` densely into consecutive pages and returns their range.
///
/// The store must hand out consecutive ids, which both bundled stores do.
pub fn load_relation(
    store: &dyn PageStore,
    records: impl IntoIterator<Item = Record>,
    records_per_page: usize,
) -> QuillJoinResult<PageRange> {
    let mut page = RecordPage::new(records_per_page);
    let mut page_ids = Vec::new();
    for record in records {
        page.push_record(record)?;
        if page.is_full() {
            page_ids.push(store.write_page(&page)?);
            page.reset();
        }
    }
    if !page.is_empty() {
        page_ids.push(store.write_page(&page)?);
    }

    let (Some(first), Some(last)) = (page_ids.first(), page_ids.last()) else {
        return Ok(PageRange::empty());
    };
    if (last - first) as usize + 1 != page_ids.len() {
        return Err(QuillJoinError::Internal(format!(
            "store allocated non-consecutive pages {:?}",
            page_ids
        )));
    }
    debug!(
        "loaded relation into pages [{}, {})",
        first,
        last + 1
    );
    PageRange::try_new(*first, last + 1)
}

/// Reads every record stored in `page_ids`, in page order.
pub fn read_records(
    store: &dyn PageStore,
    page_ids: impl IntoIterator<Item = PageId>,
) -> QuillJoinResult<Vec<Record>> {
    let mut records = Vec::new();
    for page_id in page_ids {
        let page = store.read_page(page_id)?;
        for index in 0..page.len() {
            records.push(page.record(index)?);
        }
    }
    Ok(records)
}

/// Reads the joined pairs of a join output run, in output order.
pub fn read_pairs(
    store: &dyn PageStore,
    page_ids: impl IntoIterator<Item = PageId>,
) -> QuillJoinResult<Vec<(Record, Record)>> {
    let mut pairs = Vec::new();
    for page_id in page_ids {
        let page = store.read_page(page_id)?;
        for entry in page.entries() {
            match entry {
                PageEntry::Pair(left, right) => pairs.push((*left, *right)),
                PageEntry::Record(_) => {
                    return Err(QuillJoinError::Internal(format!(
                        "page {} holds plain records, not join output",
                        page_id
                    )))
                }
            }
        }
    }
    Ok(pairs)
}
