use crate::buffer::{PageEntry, RecordPage, MAX_RECORDS_PER_PAGE, PAGE_SIZE};
use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::codec::{CommonCodec, DecodedData};
use crate::storage::record::Record;

const ENTRY_TAG_RECORD: u8 = 0;
const ENTRY_TAG_PAIR: u8 = 1;

pub struct RecordPageCodec;

impl RecordPageCodec {
    /// Encodes a page into exactly `PAGE_SIZE` bytes.
    pub fn encode(page: &RecordPage) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PAGE_SIZE);
        bytes.extend(CommonCodec::encode_u16(page.capacity() as u16));
        bytes.extend(CommonCodec::encode_u16(page.len() as u16));
        for entry in page.entries() {
            bytes.extend(PageEntryCodec::encode(entry));
        }
        bytes.resize(PAGE_SIZE, 0);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> QuillJoinResult<DecodedData<RecordPage>> {
        if bytes.len() != PAGE_SIZE {
            return Err(QuillJoinError::Internal(format!(
                "Record page size is not {} instead of {}",
                PAGE_SIZE,
                bytes.len()
            )));
        }
        let mut left_bytes = bytes;

        let (capacity, offset) = CommonCodec::decode_u16(left_bytes)?;
        left_bytes = &left_bytes[offset..];
        let (num_entries, offset) = CommonCodec::decode_u16(left_bytes)?;
        left_bytes = &left_bytes[offset..];

        let capacity = capacity as usize;
        if capacity == 0 || capacity > MAX_RECORDS_PER_PAGE {
            return Err(QuillJoinError::Internal(format!(
                "corrupted record page header, capacity {}",
                capacity
            )));
        }

        let mut entries = Vec::with_capacity(num_entries as usize);
        for _ in 0..num_entries {
            let (entry, offset) = PageEntryCodec::decode(left_bytes)?;
            left_bytes = &left_bytes[offset..];
            entries.push(entry);
        }
        Ok((RecordPage::try_from_entries(capacity, entries)?, PAGE_SIZE))
    }
}

pub struct PageEntryCodec;

impl PageEntryCodec {
    pub fn encode(entry: &PageEntry) -> Vec<u8> {
        let mut bytes = Vec::new();
        match entry {
            PageEntry::Record(record) => {
                bytes.extend(CommonCodec::encode_u8(ENTRY_TAG_RECORD));
                bytes.extend(RecordCodec::encode(record));
            }
            PageEntry::Pair(left, right) => {
                bytes.extend(CommonCodec::encode_u8(ENTRY_TAG_PAIR));
                bytes.extend(RecordCodec::encode(left));
                bytes.extend(RecordCodec::encode(right));
            }
        }
        bytes
    }

    pub fn decode(bytes: &[u8]) -> QuillJoinResult<DecodedData<PageEntry>> {
        let mut left_bytes = bytes;
        let (tag, offset) = CommonCodec::decode_u8(left_bytes)?;
        left_bytes = &left_bytes[offset..];

        let entry = match tag {
            ENTRY_TAG_RECORD => {
                let (record, offset) = RecordCodec::decode(left_bytes)?;
                left_bytes = &left_bytes[offset..];
                PageEntry::Record(record)
            }
            ENTRY_TAG_PAIR => {
                let (left, offset) = RecordCodec::decode(left_bytes)?;
                left_bytes = &left_bytes[offset..];
                let (right, offset) = RecordCodec::decode(left_bytes)?;
                left_bytes = &left_bytes[offset..];
                PageEntry::Pair(left, right)
            }
            other => {
                return Err(QuillJoinError::Internal(format!(
                    "unknown page entry tag {}",
                    other
                )))
            }
        };
        Ok((entry, bytes.len() - left_bytes.len()))
    }
}

pub struct RecordCodec;

impl RecordCodec {
    pub fn encode(record: &Record) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(CommonCodec::encode_i64(record.key));
        bytes.extend(CommonCodec::encode_u64(record.payload));
        bytes
    }

    pub fn decode(bytes: &[u8]) -> QuillJoinResult<DecodedData<Record>> {
        let mut left_bytes = bytes;

        let (key, offset) = CommonCodec::decode_i64(left_bytes)?;
        left_bytes = &left_bytes[offset..];

        let (payload, offset) = CommonCodec::decode_u64(left_bytes)?;
        left_bytes = &left_bytes[offset..];

        Ok((Record::new(key, payload), bytes.len() - left_bytes.len()))
    }
}
