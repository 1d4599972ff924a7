use std::fmt::{Display, Formatter};

use crate::buffer::FrameId;
use crate::error::{QuillJoinError, QuillJoinResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    /// Staging frame for pages read from storage.
    Scan,
    /// Output buffer of one partition bucket.
    PartitionBuffer(usize),
    /// Output frame collecting joined pairs.
    JoinOutput,
    /// Memory reserved for one slot of the probe-phase hash table.
    HashTable(usize),
}

impl Display for FrameRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameRole::Scan => write!(f, "Scan"),
            FrameRole::PartitionBuffer(bucket) => write!(f, "PartitionBuffer({})", bucket),
            FrameRole::JoinOutput => write!(f, "JoinOutput"),
            FrameRole::HashTable(slot) => write!(f, "HashTable({})", slot),
        }
    }
}

/// Frame allocation map of one phase: slot index -> role.
///
/// A layout never claims more frames than the pool holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    roles: Vec<FrameRole>,
}

impl FrameLayout {
    /// Partition phase with `B = M - 1`: frames `0..B` buffer buckets, frame `B` scans input.
    pub fn partition(mem_size: usize) -> QuillJoinResult<Self> {
        Self::partition_with_buckets(mem_size, mem_size.saturating_sub(1))
    }

    /// Partition phase with `num_buckets` bucket buffers plus one scan frame.
    pub fn partition_with_buckets(mem_size: usize, num_buckets: usize) -> QuillJoinResult<Self> {
        if num_buckets == 0 {
            return Err(QuillJoinError::Config(format!(
                "partition phase needs at least 1 bucket, memory holds {} frames",
                mem_size
            )));
        }
        let mut roles = (0..num_buckets)
            .map(FrameRole::PartitionBuffer)
            .collect::<Vec<_>>();
        roles.push(FrameRole::Scan);
        Self::try_new(roles, mem_size)
    }

    /// Probe phase: frame 0 collects output, frame 1 scans, the rest back the hash table.
    pub fn probe(mem_size: usize) -> QuillJoinResult<Self> {
        Self::probe_with_slots(mem_size, mem_size.saturating_sub(2))
    }

    /// Probe phase with `num_slots` hash table frames after output and scan.
    pub fn probe_with_slots(mem_size: usize, num_slots: usize) -> QuillJoinResult<Self> {
        if num_slots == 0 {
            return Err(QuillJoinError::Config(format!(
                "probe phase needs at least 1 hash table slot, memory holds {} frames",
                mem_size
            )));
        }
        let mut roles = vec![FrameRole::JoinOutput, FrameRole::Scan];
        roles.extend((0..num_slots).map(FrameRole::HashTable));
        Self::try_new(roles, mem_size)
    }

    fn try_new(roles: Vec<FrameRole>, mem_size: usize) -> QuillJoinResult<Self> {
        if roles.len() > mem_size {
            return Err(QuillJoinError::CapacityViolation(format!(
                "layout uses {} frames, memory holds {}",
                roles.len(),
                mem_size
            )));
        }
        Ok(Self { roles })
    }

    pub fn frames_in_use(&self) -> usize {
        self.roles.len()
    }

    pub fn role(&self, frame_id: FrameId) -> Option<FrameRole> {
        self.roles.get(frame_id).copied()
    }

    pub fn frame_of(&self, role: FrameRole) -> QuillJoinResult<FrameId> {
        self.roles
            .iter()
            .position(|r| *r == role)
            .ok_or_else(|| QuillJoinError::Internal(format!("no frame assigned to {}", role)))
    }

    pub fn scan_frame(&self) -> QuillJoinResult<FrameId> {
        self.frame_of(FrameRole::Scan)
    }

    pub fn output_frame(&self) -> QuillJoinResult<FrameId> {
        self.frame_of(FrameRole::JoinOutput)
    }

    pub fn partition_buffer(&self, bucket: usize) -> QuillJoinResult<FrameId> {
        self.frame_of(FrameRole::PartitionBuffer(bucket))
    }

    /// Frames with a partition buffer role, in bucket order.
    pub fn partition_buffers(&self) -> Vec<FrameId> {
        self.frames_where(|role| matches!(role, FrameRole::PartitionBuffer(_)))
    }

    pub fn num_partition_buffers(&self) -> usize {
        self.partition_buffers().len()
    }

    pub fn num_hash_table_slots(&self) -> usize {
        self.frames_where(|role| matches!(role, FrameRole::HashTable(_)))
            .len()
    }

    fn frames_where(&self, pred: impl Fn(&FrameRole) -> bool) -> Vec<FrameId> {
        self.roles
            .iter()
            .enumerate()
            .filter(|(_, role)| pred(role))
            .map(|(frame_id, _)| frame_id)
            .collect()
    }
}
