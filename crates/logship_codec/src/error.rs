//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while framing or parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A write would run past the end of the output buffer.
    #[error("buffer overflow: need {needed} bytes, {remaining} remaining")]
    BufferOverflow {
        /// Bytes the write required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A read would run past the end of the input.
    #[error("unexpected end of input: need {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the input.
        remaining: usize,
    },

    /// The input does not follow the expected layout.
    #[error("invalid structure: {message}")]
    InvalidStructure {
        /// Description of the structural error.
        message: String,
    },

    /// A value does not fit in its wire field.
    #[error("value {value} exceeds field maximum {max}")]
    ValueTooLarge {
        /// The offending value.
        value: u64,
        /// Largest value the field can carry.
        max: u64,
    },
}

impl CodecError {
    /// Create an invalid structure error.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }
}
