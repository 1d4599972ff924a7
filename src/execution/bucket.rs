use crate::buffer::PageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SideRun {
    pages: Vec<PageId>,
    num_records: usize,
}

/// Partition output of one hash slot while partitioning is still running.
///
/// Append-only; turned into a read-only [`Bucket`] by [`BucketBuilder::seal`].
#[derive(Debug)]
pub struct BucketBuilder {
    index: usize,
    left: SideRun,
    right: SideRun,
}

impl BucketBuilder {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            left: SideRun::default(),
            right: SideRun::default(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Records a flushed page holding `num_records` records of `side`.
    pub fn append_page(&mut self, side: Side, page_id: PageId, num_records: usize) {
        let run = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        run.pages.push(page_id);
        run.num_records += num_records;
    }

    pub fn seal(self) -> Bucket {
        Bucket {
            index: self.index,
            left: self.left,
            right: self.right,
        }
    }
}

/// Sealed partition output of one hash slot: page runs and record counts per side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    index: usize,
    left: SideRun,
    right: SideRun,
}

impl Bucket {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn pages(&self, side: Side) -> &[PageId] {
        &self.run(side).pages
    }

    pub fn count(&self, side: Side) -> usize {
        self.run(side).num_records
    }

    pub fn left_pages(&self) -> &[PageId] {
        self.pages(Side::Left)
    }

    pub fn right_pages(&self) -> &[PageId] {
        self.pages(Side::Right)
    }

    pub fn left_count(&self) -> usize {
        self.count(Side::Left)
    }

    pub fn right_count(&self) -> usize {
        self.count(Side::Right)
    }

    /// Side materialized in the probe-phase hash table: the one with fewer
    /// records, the left side on a tie.
    pub fn build_side(&self) -> Side {
        if self.left_count() <= self.right_count() {
            Side::Left
        } else {
            Side::Right
        }
    }

    pub fn probe_side(&self) -> Side {
        match self.build_side() {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// True when one side is empty, so the bucket cannot produce matches.
    pub fn is_unjoinable(&self) -> bool {
        self.left_count() == 0 || self.right_count() == 0
    }

    fn run(&self, side: Side) -> &SideRun {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}
