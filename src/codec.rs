//! Typed read/write of fixed-layout records on top of a [`Device`], plus
//! chunked read/write for `Complex` payloads.

use device::Device;
use zerocopy::{AsBytes, FromBytes, Unaligned};

use crate::error::StorageError;
use crate::layout::{is_exist, ComplexTypeHeader, OffsetType, STATE_COMPLEX_BEGIN, STATE_COMPLEX_SEQUEL};

pub struct DataCodec<D: Device> {
    device: D,
}

impl<D: Device> DataCodec<D> {
    pub fn new(device: D) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn read<T: FromBytes + Unaligned>(&mut self, offset: OffsetType) -> Result<T, StorageError> {
        let bytes = self.device.read(offset, std::mem::size_of::<T>())?;
        T::read_from(bytes.as_slice()).ok_or(StorageError::CorruptedHeaderError)
    }

    pub fn write<T: AsBytes>(&mut self, offset: OffsetType, value: &T) -> Result<(), StorageError> {
        self.device.write(offset, value.as_bytes())?;
        Ok(())
    }

    pub fn read_bytes(&mut self, offset: OffsetType, len: usize) -> Result<Vec<u8>, StorageError> {
        Ok(self.device.read(offset, len)?)
    }

    pub fn write_bytes(&mut self, offset: OffsetType, bytes: &[u8]) -> Result<(), StorageError> {
        self.device.write(offset, bytes)?;
        Ok(())
    }

    /// Walks a `Complex` chunk chain starting at `first_chunk_offset`,
    /// concatenating each chunk's inline payload.
    pub fn read_complex(&mut self, first_chunk_offset: OffsetType) -> Result<Vec<u8>, StorageError> {
        let mut out = Vec::new();
        let mut offset = first_chunk_offset;
        let mut first = true;

        loop {
            let header: ComplexTypeHeader = self.read(offset)?;
            let expect_flag = if first { STATE_COMPLEX_BEGIN } else { STATE_COMPLEX_SEQUEL };
            if header.state.value_state & expect_flag == 0 {
                return Err(StorageError::CorruptedHeaderError);
            }

            let payload_offset = offset + crate::layout::COMPLEX_HEADER_SIZE as OffsetType;
            let chunk = self.read_bytes(payload_offset, header.chunk_size as usize)?;
            out.extend_from_slice(&chunk);

            first = false;
            if !is_exist(header.sequel_offset) {
                break;
            }
            offset = header.sequel_offset;
        }

        Ok(out)
    }

    /// Writes a single `Complex` chunk (header + inline payload) at `offset`
    /// and returns the number of payload bytes written.
    #[allow(clippy::too_many_arguments)]
    pub fn write_complex_chunk(
        &mut self,
        offset: OffsetType,
        value_type: crate::layout::PVType,
        is_first: bool,
        overall_size: Option<OffsetType>,
        sequel_offset: OffsetType,
        payload: &[u8],
    ) -> Result<OffsetType, StorageError> {
        let header = ComplexTypeHeader {
            state: crate::layout::PVState {
                value_type: value_type.into(),
                value_state: if is_first { STATE_COMPLEX_BEGIN } else { STATE_COMPLEX_SEQUEL },
            },
            expired_time_high: 0,
            expired_time_low: 0,
            overall_size: overall_size.unwrap_or(crate::layout::NON_EXIST),
            chunk_size: payload.len() as OffsetType,
            sequel_offset,
            next_free_entry_offset: crate::layout::NON_EXIST,
        };

        self.write(offset, &header)?;
        self.write_bytes(offset + crate::layout::COMPLEX_HEADER_SIZE as OffsetType, payload)?;
        Ok(payload.len() as OffsetType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PVType;
    use device::MemoryDevice;

    #[test]
    fn single_chunk_round_trips() {
        let mut codec = DataCodec::new(MemoryDevice::new());
        let payload = b"hello, yas";
        codec.write_complex_chunk(0, PVType::String, true, Some(payload.len() as u64), crate::layout::NON_EXIST, payload).unwrap();
        let out = codec.read_complex(0).unwrap();
        assert_eq!(out, payload);
    }

    #[test]
    fn sequel_without_begin_flag_is_rejected() {
        let mut codec = DataCodec::new(MemoryDevice::new());
        // Write a lone chunk incorrectly flagged as a sequel.
        codec.write_complex_chunk(0, PVType::Blob, false, None, crate::layout::NON_EXIST, b"x").unwrap();
        assert!(matches!(codec.read_complex(0), Err(StorageError::CorruptedHeaderError)));
    }
}
