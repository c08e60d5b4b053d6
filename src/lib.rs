//! YAS — an embedded, single-file key-value store. See `SPEC_FULL.md` for
//! the full module breakdown; this crate's layers, bottom-up:
//!
//! `layout` (on-disk records) → `codec` (typed device I/O) →
//! `freelist` + `allocator` (space management) → `entries` (entry CRUD) →
//! `index` (the trie) → `pv` (the user-facing facade) → `factory`
//! (process-wide open-PV dedup).

pub mod allocator;
pub mod codec;
pub mod entries;
pub mod error;
pub mod factory;
pub mod freelist;
pub mod index;
pub mod layout;
pub mod logging;
pub mod pv;
pub mod time;
pub mod value;

pub use error::StorageError;
pub use pv::{PVConfig, PVManager};
pub use time::Time;
pub use value::StorageValue;
