mod common;
mod record_page;

pub use common::CommonCodec;
pub use record_page::{PageEntryCodec, RecordCodec, RecordPageCodec};

// data + consumed offset
pub type DecodedData<T> = (T, usize);
