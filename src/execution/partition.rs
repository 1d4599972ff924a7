use log::{debug, info};

use crate::buffer::{BufferPool, FrameId, FrameLayout, PageId};
use crate::error::QuillJoinResult;
use crate::execution::bucket::{Bucket, BucketBuilder, Side};
use crate::storage::{PageRange, PageStore};

/// Phase one of the grace hash join: routes every record of both relations
/// into one of `B = M - 1` buckets spilled to storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Partitioner {
    seed: u64,
}

impl Partitioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitioner hashing with `partition_hash_with_seed(seed)`.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn partition(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        left: PageRange,
        right: PageRange,
    ) -> QuillJoinResult<Vec<Bucket>> {
        self.partition_pages(store, pool, left.page_ids(), right.page_ids())
    }

    /// Partitions explicit page lists, e.g. the page runs of an oversized bucket.
    pub fn partition_pages(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        left: impl IntoIterator<Item = PageId>,
        right: impl IntoIterator<Item = PageId>,
    ) -> QuillJoinResult<Vec<Bucket>> {
        pool.ensure_empty()?;
        let layout = FrameLayout::partition(pool.capacity())?;
        let mut builders = (0..layout.num_partition_buffers())
            .map(BucketBuilder::new)
            .collect::<Vec<_>>();

        self.partition_side(store, pool, &layout, Side::Left, left, &mut builders)?;
        self.partition_side(store, pool, &layout, Side::Right, right, &mut builders)?;

        let buckets = builders
            .into_iter()
            .map(BucketBuilder::seal)
            .collect::<Vec<_>>();
        info!(
            "partitioned {} left and {} right records into {} buckets (seed {})",
            buckets.iter().map(Bucket::left_count).sum::<usize>(),
            buckets.iter().map(Bucket::right_count).sum::<usize>(),
            buckets.len(),
            self.seed
        );
        Ok(buckets)
    }

    fn partition_side(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        layout: &FrameLayout,
        side: Side,
        pages: impl IntoIterator<Item = PageId>,
        builders: &mut [BucketBuilder],
    ) -> QuillJoinResult<()> {
        let scan_frame = layout.scan_frame()?;
        let buffers = layout.partition_buffers();
        let num_buckets = buffers.len() as u64;

        let mut num_pages = 0usize;
        for page_id in pages {
            pool.load_from_storage(store, page_id, scan_frame)?;
            let num_records = pool.frame(scan_frame)?.len();
            for index in 0..num_records {
                let record = pool.frame(scan_frame)?.record(index)?;
                let bucket = (record.partition_hash_with_seed(self.seed) % num_buckets) as usize;
                let buffer = buffers[bucket];

                pool.frame_mut(buffer)?.push_record(record)?;
                if pool.frame(buffer)?.is_full() {
                    Self::spill(store, pool, buffer, side, &mut builders[bucket])?;
                }
            }
            pool.reset_frame(scan_frame)?;
            num_pages += 1;
        }

        // partial pages must not leak into the other side's scan
        for (bucket, buffer) in buffers.iter().enumerate() {
            if !pool.frame(*buffer)?.is_empty() {
                Self::spill(store, pool, *buffer, side, &mut builders[bucket])?;
            }
        }
        debug!("partitioned {} pages of the {} relation", num_pages, side);
        Ok(())
    }

    fn spill(
        store: &dyn PageStore,
        pool: &mut BufferPool,
        buffer: FrameId,
        side: Side,
        builder: &mut BucketBuilder,
    ) -> QuillJoinResult<()> {
        let num_records = pool.frame(buffer)?.len();
        let page_id = pool.flush_to_storage(store, buffer)?;
        builder.append_page(side, page_id, num_records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Partitioner;
    use crate::buffer::BufferPool;
    use crate::execution::bucket::{Bucket, Side};
    use crate::storage::record::Record;
    use crate::storage::{load_relation, read_records, InMemoryPageStore, PageRange, PageStore};

    fn keys(range: std::ops::RangeInclusive<i64>) -> Vec<Record> {
        range.map(|key| Record::new(key, key as u64)).collect()
    }

    fn assert_coverage(
        store: &InMemoryPageStore,
        buckets: &[Bucket],
        side: Side,
        input: &[Record],
        seed: u64,
    ) {
        let mut seen = Vec::new();
        for bucket in buckets {
            let records = read_records(store, bucket.pages(side).iter().copied()).unwrap();
            assert_eq!(records.len(), bucket.count(side));
            for record in records.iter() {
                assert_eq!(
                    (record.partition_hash_with_seed(seed) % buckets.len() as u64) as usize,
                    bucket.index()
                );
            }
            seen.extend(records);
        }
        let mut expected = input.to_vec();
        expected.sort_by_key(|r| (r.key, r.payload));
        seen.sort_by_key(|r| (r.key, r.payload));
        assert_eq!(seen, expected);
    }

    #[test]
    fn every_record_lands_in_its_hash_bucket() {
        let store = InMemoryPageStore::new();
        let left = keys(1..=50);
        let right = keys(25..=90);
        let left_range = load_relation(&store, left.clone(), 4).unwrap();
        let right_range = load_relation(&store, right.clone(), 4).unwrap();

        let mut pool = BufferPool::new(5, 4);
        let buckets = Partitioner::new()
            .partition(&store, &mut pool, left_range, right_range)
            .unwrap();

        assert_eq!(buckets.len(), 4);
        assert_coverage(&store, &buckets, Side::Left, &left, 0);
        assert_coverage(&store, &buckets, Side::Right, &right, 0);
        pool.ensure_empty().unwrap();
    }

    #[test]
    fn reads_every_input_page_once() {
        let store = InMemoryPageStore::new();
        let left_range = load_relation(&store, keys(1..=30), 3).unwrap();
        let right_range = load_relation(&store, keys(1..=7), 3).unwrap();
        let before = store.io_stats();

        let mut pool = BufferPool::new(4, 3);
        let buckets = Partitioner::new()
            .partition(&store, &mut pool, left_range, right_range)
            .unwrap();

        let io = store.io_stats() - before;
        assert_eq!(io.reads as usize, left_range.num_pages() + right_range.num_pages());
        let written = buckets
            .iter()
            .map(|b| b.left_pages().len() + b.right_pages().len())
            .sum::<usize>();
        assert_eq!(io.writes as usize, written);
    }

    #[test]
    fn boundary_pages_are_not_lost() {
        // left: last page exactly full, right: last page holds a single record
        let store = InMemoryPageStore::new();
        let left = keys(1..=9);
        let right = keys(1..=7);
        let left_range = load_relation(&store, left.clone(), 3).unwrap();
        let right_range = load_relation(&store, right.clone(), 3).unwrap();
        assert_eq!(store.read_page(left_range.last() - 1).unwrap().len(), 3);
        assert_eq!(store.read_page(right_range.last() - 1).unwrap().len(), 1);

        let mut pool = BufferPool::new(4, 3);
        let buckets = Partitioner::new()
            .partition(&store, &mut pool, left_range, right_range)
            .unwrap();

        assert_coverage(&store, &buckets, Side::Left, &left, 0);
        assert_coverage(&store, &buckets, Side::Right, &right, 0);
    }

    #[test]
    fn empty_relation_yields_no_pages() {
        let store = InMemoryPageStore::new();
        let right_range = load_relation(&store, keys(1..=5), 2).unwrap();

        let mut pool = BufferPool::new(3, 2);
        let buckets = Partitioner::new()
            .partition(&store, &mut pool, PageRange::empty(), right_range)
            .unwrap();

        assert_eq!(buckets.len(), 2);
        for bucket in buckets.iter() {
            assert!(bucket.left_pages().is_empty());
            assert_eq!(bucket.left_count(), 0);
        }
        assert_eq!(buckets.iter().map(Bucket::right_count).sum::<usize>(), 5);
    }

    #[test]
    fn seeded_partitioner_covers_explicit_page_lists() {
        let store = InMemoryPageStore::new();
        let left = keys(1..=20);
        let right = keys(10..=12);
        let left_range = load_relation(&store, left.clone(), 4).unwrap();
        let right_range = load_relation(&store, right.clone(), 4).unwrap();

        let mut pool = BufferPool::new(4, 4);
        let partitioner = Partitioner::with_seed(3);
        let buckets = partitioner
            .partition_pages(
                &store,
                &mut pool,
                left_range.page_ids().collect::<Vec<_>>(),
                right_range.page_ids(),
            )
            .unwrap();

        assert_eq!(partitioner.seed(), 3);
        assert_coverage(&store, &buckets, Side::Left, &left, 3);
        assert_coverage(&store, &buckets, Side::Right, &right, 3);
    }

    #[test]
    fn refuses_pool_with_unflushed_frames() {
        let store = InMemoryPageStore::new();
        let mut pool = BufferPool::new(3, 2);
        pool.frame_mut(0)
            .unwrap()
            .push_record(Record::new(1, 1))
            .unwrap();
        assert!(Partitioner::new()
            .partition(&store, &mut pool, PageRange::empty(), PageRange::empty())
            .is_err());
    }

    #[test]
    fn missing_input_page_is_a_storage_fault() {
        let store = InMemoryPageStore::new();
        let mut pool = BufferPool::new(3, 2);
        let bogus = PageRange::try_new(1, 3).unwrap();
        assert!(matches!(
            Partitioner::new().partition(&store, &mut pool, bogus, PageRange::empty()),
            Err(crate::error::QuillJoinError::StorageFault(_))
        ));
    }
}
