use crate::error::{QuillJoinError, QuillJoinResult};
use crate::storage::codec::DecodedData;

pub struct CommonCodec;

impl CommonCodec {
    pub fn encode_u8(data: u8) -> Vec<u8> {
        data.to_be_bytes().to_vec()
    }

    pub fn decode_u8(bytes: &[u8]) -> QuillJoinResult<DecodedData<u8>> {
        let data = Self::take::<1>(bytes)?;
        Ok((u8::from_be_bytes(data), 1))
    }

    pub fn encode_u16(data: u16) -> Vec<u8> {
        data.to_be_bytes().to_vec()
    }

    pub fn decode_u16(bytes: &[u8]) -> QuillJoinResult<DecodedData<u16>> {
        let data = Self::take::<2>(bytes)?;
        Ok((u16::from_be_bytes(data), 2))
    }

    pub fn encode_u64(data: u64) -> Vec<u8> {
        data.to_be_bytes().to_vec()
    }

    pub fn decode_u64(bytes: &[u8]) -> QuillJoinResult<DecodedData<u64>> {
        let data = Self::take::<8>(bytes)?;
        Ok((u64::from_be_bytes(data), 8))
    }

    pub fn encode_i64(data: i64) -> Vec<u8> {
        data.to_be_bytes().to_vec()
    }

    pub fn decode_i64(bytes: &[u8]) -> QuillJoinResult<DecodedData<i64>> {
        let data = Self::take::<8>(bytes)?;
        Ok((i64::from_be_bytes(data), 8))
    }

    fn take<const N: usize>(bytes: &[u8]) -> QuillJoinResult<[u8; N]> {
        if bytes.len() < N {
            return Err(QuillJoinError::Internal(format!(
                "bytes length {} is less than {}",
                bytes.len(),
                N
            )));
        }
        let mut data = [0u8; N];
        data.copy_from_slice(&bytes[..N]);
        Ok(data)
    }
}
