//! `PVManager`: the thin user-facing facade over [`crate::entries::EntriesManager`]
//! and [`crate::index::InvertedIndex`], grounded on
//! `examples/original_source/include/storage/IStorage.hpp`.

use device::Device;

use crate::entries::EntriesManager;
use crate::error::StorageError;
use crate::index::InvertedIndex;
use crate::layout::{is_exist, OffsetType, Version, DEFAULT_CLUSTER_SIZE, ENGINE_VERSION, NON_EXIST};
use crate::time::Time;
use crate::value::StorageValue;

/// Knobs for creating a brand-new physical volume.
#[derive(Clone, Copy, Debug)]
pub struct PVConfig {
    pub version: Version,
    pub priority: i32,
    pub cluster_size: u32,
}

impl Default for PVConfig {
    fn default() -> Self {
        Self { version: ENGINE_VERSION, priority: 0, cluster_size: DEFAULT_CLUSTER_SIZE }
    }
}

pub struct PVManager<D: Device> {
    entries: EntriesManager<D>,
    index: InvertedIndex,
    index_offset: OffsetType,
}

impl<D: Device> PVManager<D> {
    pub fn create(device: D, config: PVConfig) -> Result<Self, StorageError> {
        let entries = EntriesManager::create(device, config.version, config.priority, config.cluster_size)?;
        Ok(Self { entries, index: InvertedIndex::new(), index_offset: NON_EXIST })
    }

    pub fn load(device: D) -> Result<Self, StorageError> {
        let (mut entries, index_offset) = EntriesManager::load(device)?;
        let blob = entries.read_index_entry(index_offset)?;
        let index = InvertedIndex::from_bytes(&blob)?;
        Ok(Self { entries, index, index_offset })
    }

    pub fn put(&mut self, key: &str, value: StorageValue) -> Result<(), StorageError> {
        if self.index.has_key(key) {
            return Err(StorageError::KeyAlreadyCreated);
        }
        let offset = self.entries.create_entry(&value)?;
        if !self.index.insert(key, offset) {
            return Err(StorageError::KeyAlreadyCreated);
        }
        Ok(())
    }

    pub fn get(&mut self, key: &str) -> Result<StorageValue, StorageError> {
        let offset = self.index.get(key);
        if !is_exist(offset) {
            return Err(StorageError::KeyNotFound);
        }
        self.entries.read_entry(offset)
    }

    pub fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        let offset = self.index.get(key);
        if !is_exist(offset) {
            return Err(StorageError::KeyNotFound);
        }
        self.entries.delete_entry(offset)?;
        self.index.delete(key);
        Ok(())
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.index.has_key(key)
    }

    pub fn set_expired_date(&mut self, key: &str, time: Time) -> Result<(), StorageError> {
        let offset = self.index.get(key);
        if !is_exist(offset) {
            return Err(StorageError::KeyNotFound);
        }
        self.entries.set_expired(offset, time)
    }

    /// Returns `KeyDoesntExpire` when no expiration was ever set, else the
    /// stored `Time` — even if it is already in the past. Callers compare it
    /// against "now" themselves; the on-disk format has no separate bit for
    /// "expiration in the past".
    pub fn get_expired_date(&mut self, key: &str) -> Result<Time, StorageError> {
        let offset = self.index.get(key);
        if !is_exist(offset) {
            return Err(StorageError::KeyNotFound);
        }
        self.entries.get_expired(offset)?.ok_or(StorageError::KeyDoesntExpire)
    }

    /// Serializes the trie, allocates a fresh complex entry for it, frees
    /// the previous one, and rewrites `PVHeader` + `FreelistHeader`.
    pub fn close(mut self) -> Result<D, StorageError> {
        let bytes = self.index.to_bytes();
        let new_offset = self.entries.create_index_entry(&bytes)?;

        if is_exist(self.index_offset) {
            self.entries.delete_index_entry(self.index_offset)?;
        }
        self.entries.write_start_sections(new_offset)?;
        Ok(self.entries.into_device())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::MemoryDevice;

    #[test]
    fn scalar_survives_close_and_reload() {
        let device = MemoryDevice::new();
        let mut pv = PVManager::create(device, PVConfig::default()).unwrap();
        pv.put("pi", StorageValue::Double(3.14)).unwrap();
        pv.put("answer", StorageValue::Int64(42)).unwrap();
        let device = pv.close().unwrap();

        let mut reopened = PVManager::load(device).unwrap();
        assert_eq!(reopened.get("pi").unwrap(), StorageValue::Double(3.14));
        assert_eq!(reopened.get("answer").unwrap(), StorageValue::Int64(42));
    }

    #[test]
    fn duplicate_put_is_rejected_and_preserves_original() {
        let mut pv = PVManager::create(MemoryDevice::new(), PVConfig::default()).unwrap();
        pv.put("k", StorageValue::Int32(1)).unwrap();
        assert!(matches!(pv.put("k", StorageValue::Int32(2)), Err(StorageError::KeyAlreadyCreated)));
        assert_eq!(pv.get("k").unwrap(), StorageValue::Int32(1));
    }

    #[test]
    fn delete_then_put_reuses_offset() {
        let mut pv = PVManager::create(MemoryDevice::new(), PVConfig::default()).unwrap();
        pv.put("x", StorageValue::Int32(1)).unwrap();
        pv.put("y", StorageValue::Int32(2)).unwrap();
        pv.delete("x").unwrap();
        pv.put("z", StorageValue::Int32(3)).unwrap();
        assert_eq!(pv.get("z").unwrap(), StorageValue::Int32(3));
    }

    #[test]
    fn expiration_round_trips_at_max_value() {
        let mut pv = PVManager::create(MemoryDevice::new(), PVConfig::default()).unwrap();
        pv.put("k", StorageValue::Uint8(1)).unwrap();
        assert!(matches!(pv.get_expired_date("k"), Err(StorageError::KeyDoesntExpire)));

        let t = Time::from_seconds((1u64 << 47) - 1);
        pv.set_expired_date("k", t).unwrap();
        assert_eq!(pv.get_expired_date("k").unwrap(), t);
    }

    #[test]
    fn get_on_missing_key_errors() {
        let mut pv = PVManager::create(MemoryDevice::new(), PVConfig::default()).unwrap();
        assert!(matches!(pv.get("missing"), Err(StorageError::KeyNotFound)));
    }
}
