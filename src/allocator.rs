//! Expands the PV by whole clusters when the freelist cannot satisfy an
//! allocation request.

use device::Device;

use crate::codec::DataCodec;
use crate::error::StorageError;
use crate::layout::{ComplexTypeHeader, OffsetType, PVState, PVType, NON_EXIST, STATE_COMPLEX_BEGIN};

pub struct EntriesAllocator {
    device_end: OffsetType,
    cluster_size: u32,
}

impl EntriesAllocator {
    pub fn new(cluster_size: u32) -> Self {
        Self { device_end: 0, cluster_size }
    }

    pub fn device_end(&self) -> OffsetType {
        self.device_end
    }

    pub fn set_device_end(&mut self, device_end: OffsetType) {
        self.device_end = device_end;
    }

    pub fn cluster_size(&self) -> u32 {
        self.cluster_size
    }

    /// Grows the device by exactly one cluster, formatting the new space as
    /// a single `EmptyComplex` free entry linking to `current_head`, and
    /// returns the new entry's offset.
    pub fn expand<D: Device>(
        &mut self,
        codec: &mut DataCodec<D>,
        current_head: OffsetType,
    ) -> Result<OffsetType, StorageError> {
        let new_offset = self.device_end;
        let payload_len = self.cluster_size as usize - crate::layout::COMPLEX_HEADER_SIZE;

        let header = ComplexTypeHeader {
            state: PVState { value_type: PVType::EmptyComplex.into(), value_state: STATE_COMPLEX_BEGIN },
            expired_time_high: 0,
            expired_time_low: 0,
            overall_size: self.cluster_size as OffsetType,
            chunk_size: self.cluster_size as OffsetType,
            sequel_offset: NON_EXIST,
            next_free_entry_offset: current_head,
        };

        codec.write(new_offset, &header).map_err(|_| StorageError::DeviceExpandError)?;
        codec
            .write_bytes(new_offset + crate::layout::COMPLEX_HEADER_SIZE as OffsetType, &vec![0u8; payload_len])
            .map_err(|_| StorageError::DeviceExpandError)?;

        self.device_end += self.cluster_size as OffsetType;
        Ok(new_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::NON_EXIST;
    use device::MemoryDevice;

    #[test]
    fn expand_adds_exactly_one_cluster() {
        let mut codec = DataCodec::new(MemoryDevice::new());
        let mut allocator = EntriesAllocator::new(4096);
        let offset = allocator.expand(&mut codec, NON_EXIST).unwrap();
        assert_eq!(offset, 0);
        assert_eq!(allocator.device_end(), 4096);
        assert_eq!(codec.device().size(), 4096);
    }

    #[test]
    fn second_expand_links_to_first() {
        let mut codec = DataCodec::new(MemoryDevice::new());
        let mut allocator = EntriesAllocator::new(4096);
        let first = allocator.expand(&mut codec, NON_EXIST).unwrap();
        let second = allocator.expand(&mut codec, first).unwrap();
        assert_eq!(second, 4096);
        let header: ComplexTypeHeader = codec.read(second).unwrap();
        assert_eq!({ header.next_free_entry_offset }, first);
    }
}
