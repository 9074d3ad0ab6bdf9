//! Error taxonomy for shard-key construction, decoding, and parsing.
use std::fmt;

/// A shard-key `Result`, normally returning a shard-key [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while constructing, encoding, or decoding a
/// [`crate::key`] value.
///
/// All variants are leaves: a malformed buffer has nothing underneath it to
/// chain to, so there is no `source()` beyond the variant itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Construction requested an `Empty`-origin (`'0'`) key with a nonzero
    /// payload, or a non-empty origin with every payload forced to empty.
    InvalidShardArguments,
    /// Decoded metadata didn't match the expected arity or type code for
    /// the target variant.
    InvalidMetadata {
        /// What the decoder expected to find.
        expected_type: &'static str,
    },
    /// The binary form failed a structural check: too short, version bit
    /// clear, reserved byte nonzero, or a payload decode overran the buffer.
    InvalidBinary {
        /// Human-readable description of which check failed.
        reason: &'static str,
    },
    /// The external string's checksum didn't match its body, a character
    /// outside the URL-safe alphabet was present, or the string was
    /// shorter than the minimum possible length.
    CorruptExternal,
    /// A decoded key's origin didn't match the origin a specific API
    /// endpoint expected. Raised by consumers, not by the codec itself.
    InvalidDataOrigin {
        /// The origin the caller expected.
        expected: char,
        /// The origin actually present on the key.
        actual: char,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidShardArguments => {
                write!(f, "empty-origin keys must carry only empty payloads")
            }
            Error::InvalidMetadata { expected_type } => {
                write!(f, "metadata did not match expected type {expected_type}")
            }
            Error::InvalidBinary { reason } => write!(f, "invalid binary shard key: {reason}"),
            Error::CorruptExternal => {
                write!(f, "external shard key string failed checksum validation")
            }
            Error::InvalidDataOrigin { expected, actual } => write!(
                f,
                "expected shard key origin '{expected}', found '{actual}'"
            ),
        }
    }
}

impl std::error::Error for Error {}
