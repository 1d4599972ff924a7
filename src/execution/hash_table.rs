use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::record::Record;

/// Transient chained hash table of the probe phase, one chain per slot,
/// addressed with `probe_hash`.
#[derive(Debug)]
pub struct JoinHashTable {
    slots: Vec<Vec<Record>>,
    len: usize,
}

impl JoinHashTable {
    pub fn try_new(num_slots: usize) -> QuillJoinResult<Self> {
        if num_slots == 0 {
            return Err(QuillJoinError::Config(
                "hash table needs at least one slot".to_string(),
            ));
        }
        Ok(Self {
            slots: vec![Vec::new(); num_slots],
            len: 0,
        })
    }

    pub fn num_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn slot_of(&self, record: &Record) -> usize {
        (record.probe_hash() % self.slots.len() as u64) as usize
    }

    pub fn insert(&mut self, record: Record) {
        let slot = self.slot_of(&record);
        self.slots[slot].push(record);
        self.len += 1;
    }

    /// Records sharing the slot of `record`; may include other keys.
    pub fn candidates(&self, record: &Record) -> &[Record] {
        &self.slots[self.slot_of(record)]
    }

    pub fn longest_chain(&self) -> usize {
        self.slots.iter().map(Vec::len).max().unwrap_or(0)
    }
}
