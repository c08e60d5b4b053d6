//! Block-I/O device abstraction used by the physical volume layer.
//!
//! A `Device` is a byte-addressable, growable store: `read` never extends
//! it, `write` extends it exactly when writing at the current end.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("device read out of bounds: offset {offset} len {len} size {size}")]
    Read { offset: u64, len: usize, size: u64 },
    #[error("device write out of bounds: offset {offset} size {size}")]
    Write { offset: u64, size: u64 },
    #[error("device I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A byte-addressable, growable backing store for a physical volume.
///
/// `write` at `offset == size()` extends the device by `data.len()` bytes;
/// `write` at `offset < size()` overwrites in place; `offset > size()` is an
/// error. `read` past the current end is always an error.
pub trait Device {
    fn read(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, DeviceError>;
    fn write(&mut self, offset: u64, data: &[u8]) -> Result<usize, DeviceError>;
    fn size(&self) -> u64;
}

pub mod file;
pub mod memory;

pub use file::FileDevice;
pub use memory::MemoryDevice;
