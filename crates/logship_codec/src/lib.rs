//! # logship Codec
//!
//! Byte-exact framing for the logging extension of a client sync message.
//!
//! This crate provides:
//! - [`MessageWriter`] / [`MessageReader`]: bounds-checked big-endian cursors
//! - Reserved [`Slot`]s for length and count fields written after the fact
//! - [`ExtensionHeader`] framing shared by every sync extension
//! - The logging extension's request and acknowledgment layouts
//!
//! This is a pure protocol crate with no I/O operations. Nothing in it
//! panics on malformed or truncated input.
//!
//! ## Usage
//!
//! ```
//! use logship_codec::{DeliveryResult, LogDeliveryStatus, MessageReader, MessageWriter};
//!
//! let mut buf = [0u8; 4];
//! let mut writer = MessageWriter::new(&mut buf);
//! LogDeliveryStatus::new(42, DeliveryResult::Success)
//!     .encode(&mut writer)
//!     .unwrap();
//!
//! let status = LogDeliveryStatus::decode(&mut MessageReader::new(&buf)).unwrap();
//! assert_eq!(status.bucket_id, 42);
//! assert!(status.result.is_success());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod header;
mod logging;
mod reader;
mod writer;

pub use error::{CodecError, CodecResult};
pub use header::{align_down, aligned_size, ExtensionHeader, ALIGNMENT, EXTENSION_HEADER_SIZE};
pub use logging::{
    framed_record_size, DeliveryResult, LogDeliveryStatus, LogSyncRequest, BUCKET_FIELDS_SIZE,
    DELIVERY_STATUS_SIZE, LOGGING_EXTENSION_TYPE, MAX_PADDING_LENGTH, RECEIVE_UPDATES_FLAG,
    RECORD_LENGTH_PREFIX_SIZE,
};
pub use reader::MessageReader;
pub use writer::{MessageWriter, Slot};
