//! `StorageValue`: the runtime-typed sum type over the 11 value kinds YAS
//! stores. Dispatch in [`crate::entries::EntriesManager`] is a `match` on
//! this tag, not reflection, mirroring the original's `std::any` + a
//! `PVType` discriminant.

use crate::layout::PVType;

#[derive(Clone, Debug, PartialEq)]
pub enum StorageValue {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Float(f32),
    Double(f64),
    Int64(i64),
    Uint64(u64),
    String(String),
    Blob(Vec<u8>),
}

impl StorageValue {
    pub fn pv_type(&self) -> PVType {
        match self {
            StorageValue::Int8(_) => PVType::Int8,
            StorageValue::Uint8(_) => PVType::Uint8,
            StorageValue::Int16(_) => PVType::Int16,
            StorageValue::Uint16(_) => PVType::Uint16,
            StorageValue::Int32(_) => PVType::Int32,
            StorageValue::Uint32(_) => PVType::Uint32,
            StorageValue::Float(_) => PVType::Float,
            StorageValue::Double(_) => PVType::Double,
            StorageValue::Int64(_) => PVType::Int64,
            StorageValue::Uint64(_) => PVType::Uint64,
            StorageValue::String(_) => PVType::String,
            StorageValue::Blob(_) => PVType::Blob,
        }
    }

    /// Bit-exact encoding into the 32-bit slot of a `Simple4TypeHeaderLive`.
    /// Integers narrower than 32 bits are zero-extended (the sign/width is
    /// recovered on read from `pv_type`, not from the stored bits); `f32`
    /// is reinterpreted bit-for-bit so NaN payloads survive.
    pub fn to_u32_slot(&self) -> Option<u32> {
        match *self {
            StorageValue::Int8(v) => Some(v as u8 as u32),
            StorageValue::Uint8(v) => Some(v as u32),
            StorageValue::Int16(v) => Some(v as u16 as u32),
            StorageValue::Uint16(v) => Some(v as u32),
            StorageValue::Int32(v) => Some(v as u32),
            StorageValue::Uint32(v) => Some(v),
            StorageValue::Float(v) => Some(v.to_bits()),
            _ => None,
        }
    }

    /// Bit-exact encoding into the 64-bit slot of a `Simple8TypeHeaderLive`.
    pub fn to_u64_slot(&self) -> Option<u64> {
        match *self {
            StorageValue::Int64(v) => Some(v as u64),
            StorageValue::Uint64(v) => Some(v),
            StorageValue::Double(v) => Some(v.to_bits()),
            _ => None,
        }
    }

    /// Payload bytes for a `Complex` entry (`String`/`Blob`).
    pub fn to_payload(&self) -> Option<Vec<u8>> {
        match self {
            StorageValue::String(s) => Some(s.as_bytes().to_vec()),
            StorageValue::Blob(b) => Some(b.clone()),
            _ => None,
        }
    }

    pub fn from_u32_slot(pv_type: PVType, raw: u32) -> Option<Self> {
        Some(match pv_type {
            PVType::Int8 => StorageValue::Int8(raw as u8 as i8),
            PVType::Uint8 => StorageValue::Uint8(raw as u8),
            PVType::Int16 => StorageValue::Int16(raw as u16 as i16),
            PVType::Uint16 => StorageValue::Uint16(raw as u16),
            PVType::Int32 => StorageValue::Int32(raw as i32),
            PVType::Uint32 => StorageValue::Uint32(raw),
            PVType::Float => StorageValue::Float(f32::from_bits(raw)),
            _ => return None,
        })
    }

    pub fn from_u64_slot(pv_type: PVType, raw: u64) -> Option<Self> {
        Some(match pv_type {
            PVType::Int64 => StorageValue::Int64(raw as i64),
            PVType::Uint64 => StorageValue::Uint64(raw),
            PVType::Double => StorageValue::Double(f64::from_bits(raw)),
            _ => return None,
        })
    }

    pub fn from_payload(pv_type: PVType, bytes: Vec<u8>) -> Option<Self> {
        match pv_type {
            PVType::String => String::from_utf8(bytes).ok().map(StorageValue::String),
            PVType::Blob => Some(StorageValue::Blob(bytes)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_nan_bits_survive_round_trip() {
        let nan = f32::from_bits(0x7fc0_1234);
        let value = StorageValue::Float(nan);
        let raw = value.to_u32_slot().unwrap();
        let back = StorageValue::from_u32_slot(PVType::Float, raw).unwrap();
        match back {
            StorageValue::Float(f) => assert_eq!(f.to_bits(), nan.to_bits()),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn double_nan_bits_survive_round_trip() {
        let nan = f64::from_bits(0x7ff8_dead_beef_0000);
        let value = StorageValue::Double(nan);
        let raw = value.to_u64_slot().unwrap();
        let back = StorageValue::from_u64_slot(PVType::Double, raw).unwrap();
        match back {
            StorageValue::Double(f) => assert_eq!(f.to_bits(), nan.to_bits()),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn negative_int8_zero_extends_then_recovers_sign() {
        let value = StorageValue::Int8(-5);
        let raw = value.to_u32_slot().unwrap();
        let back = StorageValue::from_u32_slot(PVType::Int8, raw).unwrap();
        assert_eq!(back, value);
    }
}
