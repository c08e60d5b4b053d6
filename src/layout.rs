//! On-disk record layouts: `PVHeader`, `FreelistHeader`, the per-entry
//! `PVState` tag and the three concrete entry headers.
//!
//! Every record here is `#[repr(C, packed)]` and derives zerocopy's
//! `AsBytes`/`FromBytes`/`Unaligned` so [`crate::codec::DataCodec`] can read
//! and write it directly against device bytes with no padding and no
//! endian conversion (the on-disk byte order is whatever the writer's CPU
//! uses, per spec).
//!
//! The C++ original overlays `expired_time_low_ + value_` and
//! `next_free_entry_offset_` in a real union. We represent that as two
//! distinct, equally-sized structs (`*Live` / the free form) instead of a
//! language union, per the "two accessors over the same byte range" design
//! note: callers pick which one to read/write based on `value_type`.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use zerocopy::{AsBytes, FromBytes, Unaligned};

pub type OffsetType = u64;

/// Reserved sentinel meaning "no such offset" — the max value of `OffsetType`.
pub const NON_EXIST: OffsetType = OffsetType::MAX;

pub fn is_exist(offset: OffsetType) -> bool {
    offset != NON_EXIST
}

pub const PV_SIGNATURE: [u8; 6] = *b"YAS_PV";
pub const DEFAULT_CLUSTER_SIZE: u32 = 4096;
pub const FREELIST_BINS_COUNT: usize = 11;

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, AsBytes, FromBytes, Unaligned)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

/// The highest format version this build writes and will accept on read.
pub const ENGINE_VERSION: Version = Version::new(1, 0);

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct PVHeader {
    pub signature: [u8; 6],
    pub version: Version,
    pub pv_size: OffsetType,
    pub cluster_size: u32,
    pub priority: i32,
    pub inverted_index_offset: OffsetType,
    pub freelist_bins_count: u32,
}

impl Default for PVHeader {
    fn default() -> Self {
        Self {
            signature: PV_SIGNATURE,
            version: ENGINE_VERSION,
            pv_size: 0,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            priority: 0,
            inverted_index_offset: NON_EXIST,
            freelist_bins_count: FREELIST_BINS_COUNT as u32,
        }
    }
}

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct FreelistHeader {
    pub bins: [OffsetType; FREELIST_BINS_COUNT],
}

impl Default for FreelistHeader {
    fn default() -> Self {
        Self { bins: [NON_EXIST; FREELIST_BINS_COUNT] }
    }
}

/// The runtime-typed tag stored in every entry's first two bytes.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum PVType {
    Int8 = 0,
    Uint8 = 1,
    Int16 = 2,
    Uint16 = 3,
    Int32 = 4,
    Uint32 = 5,
    Float = 6,

    Double = 7,
    Int64 = 8,
    Uint64 = 9,

    String = 10,
    Blob = 11,
    InvertedIndex = 12,

    Empty4Simple = 13,
    Empty8Simple = 14,
    EmptyComplex = 15,
}

impl PVType {
    pub fn is_empty(self) -> bool {
        matches!(self, PVType::Empty4Simple | PVType::Empty8Simple | PVType::EmptyComplex)
    }
}

pub const STATE_EMPTY: u8 = 0x00;
pub const STATE_EXPIRED: u8 = 0x01;
pub const STATE_COMPLEX_BEGIN: u8 = 0x02;
pub const STATE_COMPLEX_SEQUEL: u8 = 0x04;

#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct PVState {
    pub value_type: u8,
    pub value_state: u8,
}

impl PVState {
    pub fn pv_type(&self) -> Option<PVType> {
        PVType::try_from(self.value_type).ok()
    }

    pub fn is_expired_flag_set(&self) -> bool {
        self.value_state & STATE_EXPIRED != 0
    }
}

/// Live form of a 1/2/4-byte-scalar-or-float entry: 12 bytes.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct Simple4TypeHeaderLive {
    pub state: PVState,
    pub expired_time_high: u16,
    pub expired_time_low: u32,
    pub value: u32,
}

/// Free form of the same 12-byte slot: the value-carrying fields are
/// replaced by a single freelist link.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct Simple4TypeHeaderFree {
    pub state: PVState,
    pub expired_time_high: u16,
    pub next_free_entry_offset: OffsetType,
}

pub const SIMPLE4_HEADER_SIZE: usize = std::mem::size_of::<Simple4TypeHeaderLive>();

/// Live form of an 8-byte-scalar-or-double entry: 16 bytes.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct Simple8TypeHeaderLive {
    pub state: PVState,
    pub expired_time_high: u16,
    pub expired_time_low: u32,
    pub value: u64,
}

/// Free form of the same 16-byte slot; 4 trailing bytes are unused padding
/// (the live union member is 4 bytes longer than `next_free_entry_offset`).
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct Simple8TypeHeaderFree {
    pub state: PVState,
    pub expired_time_high: u16,
    pub next_free_entry_offset: OffsetType,
    pub _pad: [u8; 4],
}

pub const SIMPLE8_HEADER_SIZE: usize = std::mem::size_of::<Simple8TypeHeaderLive>();

/// Header for a (possibly chunked) variable-length entry. Unlike the
/// Simple4/8 headers this shape is identical whether the entry is live or
/// free: `next_free_entry_offset` is simply unused while live (see
/// SPEC_FULL.md's resolved open question on this field), and the chunk's
/// payload bytes follow immediately after the header rather than aliasing it.
#[repr(C, packed)]
#[derive(Clone, Copy, Debug, AsBytes, FromBytes, Unaligned)]
pub struct ComplexTypeHeader {
    pub state: PVState,
    pub expired_time_high: u16,
    pub expired_time_low: u32,
    pub overall_size: OffsetType,
    pub chunk_size: OffsetType,
    pub sequel_offset: OffsetType,
    pub next_free_entry_offset: OffsetType,
}

impl Default for ComplexTypeHeader {
    fn default() -> Self {
        Self {
            state: PVState { value_type: PVType::EmptyComplex.into(), value_state: STATE_EMPTY },
            expired_time_high: 0,
            expired_time_low: 0,
            overall_size: NON_EXIST,
            chunk_size: NON_EXIST,
            sequel_offset: NON_EXIST,
            next_free_entry_offset: NON_EXIST,
        }
    }
}

pub const COMPLEX_HEADER_SIZE: usize = std::mem::size_of::<ComplexTypeHeader>();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes_match_spec() {
        assert_eq!(std::mem::size_of::<PVHeader>(), 20 + 2 * std::mem::size_of::<OffsetType>());
        assert_eq!(SIMPLE4_HEADER_SIZE, 12);
        assert_eq!(SIMPLE8_HEADER_SIZE, 16);
        assert_eq!(COMPLEX_HEADER_SIZE, 8 + 4 * std::mem::size_of::<OffsetType>());
        assert_eq!(std::mem::size_of::<Simple4TypeHeaderFree>(), SIMPLE4_HEADER_SIZE);
        assert_eq!(std::mem::size_of::<Simple8TypeHeaderFree>(), SIMPLE8_HEADER_SIZE);
    }

    #[test]
    fn non_exist_is_max_value() {
        assert_eq!(NON_EXIST, u64::MAX);
        assert!(!is_exist(NON_EXIST));
        assert!(is_exist(0));
    }
}
