//! Process-wide deduplication of open physical volumes by canonical path,
//! grounded on
//! `examples/original_source/lib/yet_another_storage/src/storage/PVManagerFactory.hpp`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use device::FileDevice;
use lazy_static::lazy_static;

use crate::error::StorageError;
use crate::layout::{Version, ENGINE_VERSION};
use crate::pv::{PVConfig, PVManager};

/// The newest on-disk format version this build will open or create.
pub const MAX_SUPPORTED_VERSION: Version = ENGINE_VERSION;

lazy_static! {
    static ref OPEN_VOLUMES: Mutex<HashMap<PathBuf, Arc<Mutex<PVManager<FileDevice>>>>> =
        Mutex::new(HashMap::new());
}

/// Opens (or creates) the PV at `path`, handing back a shared handle.
/// Concurrent requests for the same canonical path get the same `Arc`
/// rather than each opening their own file handle.
pub fn get_or_create(
    path: &Path,
    requested_version: Version,
    config: PVConfig,
) -> Result<Arc<Mutex<PVManager<FileDevice>>>, StorageError> {
    if requested_version > MAX_SUPPORTED_VERSION {
        return Err(StorageError::PVVersionUnsupportedRequest);
    }

    let key = canonical_key(path);
    let mut volumes = OPEN_VOLUMES.lock().map_err(|_| StorageError::UnknownError)?;
    if let Some(existing) = volumes.get(&key) {
        return Ok(existing.clone());
    }

    let manager = if path.exists() {
        let device = FileDevice::open(path)?;
        PVManager::load(device)?
    } else {
        let device = FileDevice::create(path)?;
        PVManager::create(device, config)?
    };

    let handle = Arc::new(Mutex::new(manager));
    volumes.insert(key, handle.clone());
    Ok(handle)
}

/// Drops the factory's shared handle for `path`. Any clone of the `Arc`
/// already held elsewhere keeps the volume alive; this only stops *new*
/// callers from being handed the same handle.
pub fn forget(path: &Path) {
    let key = canonical_key(path);
    if let Ok(mut volumes) = OPEN_VOLUMES.lock() {
        volumes.remove(&key);
    }
}

fn canonical_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    fn scratch_path(name: &str) -> PathBuf {
        temp_dir().join(format!("yas-factory-test-{name}-{}", std::process::id()))
    }

    #[test]
    fn repeated_get_or_create_returns_the_same_handle() {
        let path = scratch_path("dedup");
        let first = get_or_create(&path, ENGINE_VERSION, PVConfig::default()).unwrap();
        let second = get_or_create(&path, ENGINE_VERSION, PVConfig::default()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        forget(&path);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn requested_version_above_max_is_rejected() {
        let path = scratch_path("version");
        let too_new = Version::new(ENGINE_VERSION.major + 1, 0);
        assert!(matches!(
            get_or_create(&path, too_new, PVConfig::default()),
            Err(StorageError::PVVersionUnsupportedRequest)
        ));
    }
}
