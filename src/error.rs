//! The engine's closed, matchable error taxonomy.
//!
//! `DeviceError` is unpacked into its own three spec-§7 kinds rather than
//! folded behind one opaque variant, so callers can match on
//! `DeviceReadError`/`DeviceWriteError` specifically; `KeyNotFound`/
//! `KeyAlreadyCreated` are normal user-visible outcomes rather than internal
//! faults, but they still live in this one enum so every public operation
//! returns a single `Result<_, StorageError>`.

use device::DeviceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("device error: {0}")]
    DeviceGeneralError(#[from] std::io::Error),

    #[error("device read out of bounds: offset {offset} len {len} size {size}")]
    DeviceReadError { offset: u64, len: usize, size: u64 },

    #[error("device write out of bounds: offset {offset} size {size}")]
    DeviceWriteError { offset: u64, size: u64 },

    #[error("failed to expand the physical volume")]
    DeviceExpandError,

    #[error("inverted index blob is malformed")]
    InvertedIndexDeserializationError,

    #[error("inverted index blob version is newer than this build supports")]
    InvertedIndexDeserializationVersionUnsupportedError,

    #[error("entry header is corrupted")]
    CorruptedHeaderError,

    #[error("physical volume signature is invalid")]
    InvalidPVSignatureError,

    #[error("physical volume version is newer than this build supports")]
    PVVersionNotSupported,

    #[error("key not found")]
    KeyNotFound,

    #[error("key has expired")]
    KeyExpired,

    #[error("key has no expiration set")]
    KeyDoesntExpire,

    #[error("value does not match the requested storage type")]
    IncorrectStorageValue,

    #[error("key already exists")]
    KeyAlreadyCreated,

    #[error("not enough memory to complete the operation")]
    MemoryNotEnough,

    #[error("catalog not found")]
    CatalogNotFoundError,

    #[error("requested physical volume version is unsupported")]
    PVVersionUnsupportedRequest,

    #[error("unknown error")]
    UnknownError,
}

impl From<DeviceError> for StorageError {
    fn from(err: DeviceError) -> Self {
        match err {
            DeviceError::Read { offset, len, size } => StorageError::DeviceReadError { offset, len, size },
            DeviceError::Write { offset, size } => StorageError::DeviceWriteError { offset, size },
            DeviceError::Io(e) => StorageError::DeviceGeneralError(e),
        }
    }
}
