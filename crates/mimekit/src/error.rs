//! Error types for MIME operations.

use std::string::FromUtf8Error;

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Multipart body is structurally broken (e.g. the closing boundary is missing).
    #[error("Not a valid MIME message: {0}")]
    MalformedMessage(String),

    /// Header field outside the set a part can carry.
    #[error("Unknown header for MIME part: {0}")]
    UnknownHeader(String),

    /// Positional access past the end of the part list.
    #[error("Part index {index} out of range (message has {len} parts)")]
    PartIndex {
        /// Requested index.
        index: usize,
        /// Number of parts in the message.
        len: usize,
    },

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Invalid encoding.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),
}
