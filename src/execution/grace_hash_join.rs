use log::info;

use crate::buffer::{BufferPool, PageId};
use crate::config::JoinConfig;
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::execution::bucket::Bucket;
use crate::execution::partition::Partitioner;
use crate::execution::probe::{ProbeStats, Prober};
use crate::storage::{IoStats, PageRange, PageStore};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JoinStats {
    pub left_records: usize,
    pub right_records: usize,
    pub num_buckets: usize,
    pub partition_io: IoStats,
    pub probe_io: IoStats,
    pub probe: ProbeStats,
}

#[derive(Debug)]
pub struct JoinOutcome {
    pub buckets: Vec<Bucket>,
    pub output_pages: Vec<PageId>,
    pub stats: JoinStats,
}

/// Runs partition to completion, then probe, within the configured frame budget.
#[derive(Debug, Clone)]
pub struct GraceHashJoin {
    config: JoinConfig,
}

impl GraceHashJoin {
    pub fn try_new(config: JoinConfig) -> QuillJoinResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    /// Fresh pool of `M` empty frames.
    pub fn new_buffer_pool(&self) -> BufferPool {
        BufferPool::new(self.config.mem_size_in_page, self.config.records_per_page)
    }

    pub fn execute(
        &self,
        store: &dyn PageStore,
        left: PageRange,
        right: PageRange,
    ) -> QuillJoinResult<JoinOutcome> {
        let mut pool = self.new_buffer_pool();
        self.execute_with_pool(store, &mut pool, left, right)
    }

    pub fn execute_with_pool(
        &self,
        store: &dyn PageStore,
        pool: &mut BufferPool,
        left: PageRange,
        right: PageRange,
    ) -> QuillJoinResult<JoinOutcome> {
        if pool.capacity() != self.config.mem_size_in_page
            || pool.page_capacity() != self.config.records_per_page
        {
            return Err(QuillJoinError::Config(format!(
                "buffer pool of {} frames x {} records does not match config {} x {}",
                pool.capacity(),
                pool.page_capacity(),
                self.config.mem_size_in_page,
                self.config.records_per_page
            )));
        }
        info!(
            "grace hash join: left pages {}, right pages {}, {} frames",
            left.num_pages(),
            right.num_pages(),
            pool.capacity()
        );

        let start = store.io_stats();
        let buckets = Partitioner::new().partition(store, pool, left, right)?;
        let partitioned = store.io_stats();

        let (output_pages, probe) =
            Prober::new(self.config.overflow).probe_with_stats(store, pool, &buckets)?;
        let finished = store.io_stats();

        let stats = JoinStats {
            left_records: buckets.iter().map(Bucket::left_count).sum(),
            right_records: buckets.iter().map(Bucket::right_count).sum(),
            num_buckets: buckets.len(),
            partition_io: partitioned - start,
            probe_io: finished - partitioned,
            probe,
        };
        Ok(JoinOutcome {
            buckets,
            output_pages,
            stats,
        })
    }
}
