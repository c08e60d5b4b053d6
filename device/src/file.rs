use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::{Device, DeviceError};

/// A device backed by a real file, opened or created by the caller and kept
/// open for the lifetime of this handle.
pub struct FileDevice {
    file: File,
    size: u64,
}

impl FileDevice {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();
        Ok(Self { file, size })
    }

    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, DeviceError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self { file, size: 0 })
    }
}

impl Device for FileDevice {
    fn read(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, DeviceError> {
        if offset.saturating_add(len as u64) > self.size {
            return Err(DeviceError::Read { offset, len, size: self.size });
        }

        let mut buf = vec![0u8; len];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, DeviceError> {
        if offset > self.size {
            return Err(DeviceError::Write { offset, size: self.size });
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.size = self.size.max(offset + data.len() as u64);
        Ok(data.len())
    }

    fn size(&self) -> u64 {
        self.size
    }
}
