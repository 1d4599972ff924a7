use log::{debug, info, warn};

use crate::buffer::{BufferPool, FrameId, FrameLayout, PageId};
use crate::config::OverflowPolicy;
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::execution::bucket::{Bucket, Side};
use crate::execution::hash_table::JoinHashTable;
use crate::execution::partition::Partitioner;
use crate::storage::record::Record;
use crate::storage::PageStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStats {
    pub buckets_probed: usize,
    pub buckets_skipped: usize,
    pub pairs_emitted: usize,
    pub repartitions: usize,
    pub max_depth: usize,
}

/// Phase two of the grace hash join: joins every bucket with a build/probe
/// hash join and writes the matching pairs to an output run.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prober {
    overflow: OverflowPolicy,
}

/// State shared by all buckets of one probe phase.
struct ProbeRun<'a> {
    store: &'a dyn PageStore,
    pool: &'a mut BufferPool,
    output_frame: FrameId,
    scan_frame: FrameId,
    hash_table_slots: usize,
    output: Vec<PageId>,
    stats: ProbeStats,
}

impl ProbeRun<'_> {
    fn emit(&mut self, left: Record, right: Record) -> QuillJoinResult<()> {
        self.pool
            .frame_mut(self.output_frame)?
            .push_pair(left, right)?;
        self.stats.pairs_emitted += 1;
        if self.pool.frame(self.output_frame)?.is_full() {
            let page_id = self.pool.flush_to_storage(self.store, self.output_frame)?;
            self.output.push(page_id);
        }
        Ok(())
    }

    fn flush_output(&mut self) -> QuillJoinResult<()> {
        if !self.pool.frame(self.output_frame)?.is_empty() {
            let page_id = self.pool.flush_to_storage(self.store, self.output_frame)?;
            self.output.push(page_id);
        }
        Ok(())
    }

    /// Records the hash table may hold: one page worth per slot.
    fn hash_table_budget(&self) -> usize {
        self.hash_table_slots * self.pool.page_capacity()
    }
}

impl Prober {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self { overflow }
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn probe(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        buckets: &[Bucket],
    ) -> QuillJoinResult<Vec<PageId>> {
        let (output, _) = self.probe_with_stats(store, pool, buckets)?;
        Ok(output)
    }

    pub fn probe_with_stats(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        buckets: &[Bucket],
    ) -> QuillJoinResult<(Vec<PageId>, ProbeStats)> {
        pool.ensure_empty()?;
        let layout = FrameLayout::probe(pool.capacity())?;
        let mut run = ProbeRun {
            store,
            output_frame: layout.output_frame()?,
            scan_frame: layout.scan_frame()?,
            hash_table_slots: layout.num_hash_table_slots(),
            pool,
            output: Vec::new(),
            stats: ProbeStats::default(),
        };

        self.probe_buckets(&mut run, buckets, None, 0)?;
        run.flush_output()?;

        info!(
            "probe emitted {} pairs into {} pages ({} buckets probed, {} skipped, {} re-partitioned)",
            run.stats.pairs_emitted,
            run.output.len(),
            run.stats.buckets_probed,
            run.stats.buckets_skipped,
            run.stats.repartitions
        );
        Ok((run.output, run.stats))
    }

    fn probe_buckets(
        &self,
        run: &mut ProbeRun<'_>,
        buckets: &[Bucket],
        origin: Option<usize>,
        depth: usize,
    ) -> QuillJoinResult<()> {
        for bucket in buckets {
            // sub-buckets report the top-level bucket they were split from
            let origin = origin.unwrap_or(bucket.index());
            self.probe_bucket(run, bucket, origin, depth)?;
        }
        Ok(())
    }

    fn probe_bucket(
        &self,
        run: &mut ProbeRun<'_>,
        bucket: &Bucket,
        origin: usize,
        depth: usize,
    ) -> QuillJoinResult<()> {
        if bucket.is_unjoinable() {
            debug!(
                "skip bucket {} at depth {} ({} left, {} right records)",
                bucket.index(),
                depth,
                bucket.left_count(),
                bucket.right_count()
            );
            run.stats.buckets_skipped += 1;
            return Ok(());
        }

        let build_side = bucket.build_side();
        let build_records = bucket.count(build_side);
        let budget = run.hash_table_budget();
        if build_records > budget {
            return self.handle_overflow(run, bucket, origin, depth, budget);
        }

        let table = Self::build(run, bucket.pages(build_side))?;
        debug!(
            "bucket {} at depth {}: built {} {} records, longest chain {}",
            bucket.index(),
            depth,
            table.len(),
            build_side,
            table.longest_chain()
        );
        Self::stream_probe_side(run, &table, bucket.pages(bucket.probe_side()), build_side)?;
        run.stats.buckets_probed += 1;
        Ok(())
    }

    fn build(run: &mut ProbeRun<'_>, pages: &[PageId]) -> QuillJoinResult<JoinHashTable> {
        let mut table = JoinHashTable::try_new(run.hash_table_slots)?;
        for page_id in pages {
            run.pool
                .load_from_storage(run.store, *page_id, run.scan_frame)?;
            let frame = run.pool.frame(run.scan_frame)?;
            for index in 0..frame.len() {
                table.insert(frame.record(index)?);
            }
            run.pool.reset_frame(run.scan_frame)?;
        }
        Ok(table)
    }

    fn stream_probe_side(
        run: &mut ProbeRun<'_>,
        table: &JoinHashTable,
        pages: &[PageId],
        build_side: Side,
    ) -> QuillJoinResult<()> {
        for page_id in pages {
            run.pool
                .load_from_storage(run.store, *page_id, run.scan_frame)?;
            let num_records = run.pool.frame(run.scan_frame)?.len();
            for index in 0..num_records {
                let record = run.pool.frame(run.scan_frame)?.record(index)?;
                // full predicate check, a shared slot does not imply a shared key
                for candidate in table.candidates(&record) {
                    if !candidate.joins_with(&record) {
                        continue;
                    }
                    match build_side {
                        Side::Left => run.emit(*candidate, record)?,
                        Side::Right => run.emit(record, *candidate)?,
                    }
                }
            }
            run.pool.reset_frame(run.scan_frame)?;
        }
        Ok(())
    }

    fn handle_overflow(
        &self,
        run: &mut ProbeRun<'_>,
        bucket: &Bucket,
        origin: usize,
        depth: usize,
        budget: usize,
    ) -> QuillJoinResult<()> {
        let records = bucket.count(bucket.build_side());
        match self.overflow {
            OverflowPolicy::Repartition { max_depth } if depth < max_depth => {
                warn!(
                    "bucket {} (from {}) at depth {} holds {} build records over budget {}, re-partitioning",
                    bucket.index(),
                    origin,
                    depth,
                    records,
                    budget
                );
                // the sub-partition owns every frame, the output frame included
                run.flush_output()?;
                let partitioner = Partitioner::with_seed(depth as u64 + 1);
                let sub_buckets = partitioner.partition_pages(
                    run.store,
                    run.pool,
                    bucket.left_pages().iter().copied(),
                    bucket.right_pages().iter().copied(),
                )?;
                run.stats.repartitions += 1;
                run.stats.max_depth = run.stats.max_depth.max(depth + 1);
                self.probe_buckets(run, &sub_buckets, Some(origin), depth + 1)
            }
            _ => {
                warn!(
                    "bucket {} (from {}) at depth {} overflows the hash table: {} records, budget {}",
                    bucket.index(),
                    origin,
                    depth,
                    records,
                    budget
                );
                Err(QuillJoinError::Overflow {
                    bucket: origin,
                    depth,
                    records,
                    budget,
                })
            }
        }
    }
}
