//! Wire decoding errors.

/// Why a message failed to decode.
///
/// The core drops the offending message and logs; the connection stays up.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the payload did.
    #[error("message truncated: wanted {wanted} more bytes, {remaining} left")]
    Truncated {
        /// Bytes the decoder needed.
        wanted: usize,
        /// Bytes actually remaining.
        remaining: usize,
    },

    /// The leading byte names no known message.
    #[error("unknown message id {0:#04x}")]
    UnknownMessageId(u8),

    /// A field held a value outside its legal range.
    #[error("invalid {what}: {value}")]
    InvalidField {
        /// Which field was malformed.
        what: &'static str,
        /// The offending raw value.
        value: u32,
    },

    /// An empty buffer cannot carry a message id.
    #[error("empty message")]
    Empty,
}
