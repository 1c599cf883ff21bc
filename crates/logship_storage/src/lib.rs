//! # logship Storage
//!
//! Log record storage contract for the logship collector.
//!
//! The collector never owns the records it ships. It talks to a
//! [`LogStorage`] implementation which buffers serialized records, hands
//! them out one at a time during bucket assembly, and tags every extracted
//! record with the bucket id it was shipped in. Delivery outcomes are then
//! applied per bucket: acknowledged buckets are removed, failed buckets are
//! untagged and become eligible again.
//!
//! ## Available Storages
//!
//! - [`InMemoryLogStorage`] - Volatile FIFO storage for tests and tooling
//!
//! ## Example
//!
//! ```rust
//! use logship_storage::{InMemoryLogStorage, LogStorage};
//!
//! let mut storage = InMemoryLogStorage::new();
//! let mut record = storage.allocate_record_buffer(5).unwrap();
//! record.as_mut_slice().copy_from_slice(b"hello");
//! storage.add_record(record).unwrap();
//!
//! let mut out = [0u8; 16];
//! let len = storage.write_next_record(&mut out, 1).unwrap();
//! assert_eq!(&out[..len], b"hello");
//! assert_eq!(storage.records_count(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;
mod record;

pub use backend::{BucketId, LogStorage};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryLogStorage;
pub use record::{LogRecord, RejectedRecord};
