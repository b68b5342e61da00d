// SPDX-License-Identifier: Apache-2.0

use crate::kind::Kind;

/// Errors surfaced by parsing, printing, and tree mutation.
///
/// Every error aborts the operation that raised it. Mutating operations
/// guarantee the tree is observably unchanged whenever `Rejected` is
/// returned; structural parsers release any partially built subtree before
/// a `Parse` error propagates.
#[derive(Debug)]
pub enum Error {
    /// Malformed input text. Carries the byte offset of the last consumed
    /// byte, the offending byte if one was read, and a description.
    Parse {
        offset: u64,
        byte: Option<u8>,
        reason: String,
    },
    /// An operation was applied to a node of the wrong kind.
    Type {
        actual: Kind,
        required: &'static str,
    },
    /// An array or root index outside the current bounds.
    Index { index: usize, length: usize },
    /// An object key was absent on a removal lookup.
    NotFound { key: String },
    /// The validation hook vetoed a mutation. The mutation has been rolled
    /// back in full before this error is returned.
    Rejected { reason: String },
    /// An error from the underlying byte stream.
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn parse_at(offset: u64, byte: Option<u8>, reason: impl Into<String>) -> Error {
        Error::Parse {
            offset,
            byte,
            reason: reason.into(),
        }
    }

    pub(crate) fn bad_type(actual: Kind, required: &'static str) -> Error {
        Error::Type { actual, required }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Parse {
                offset,
                byte,
                reason,
            } => match byte {
                Some(b) if b.is_ascii_graphic() || *b == b' ' => {
                    write!(
                        f,
                        "Invalid character at {offset}: {b:#04x} '{}': {reason}",
                        *b as char
                    )
                }
                Some(b) => write!(f, "Invalid character at {offset}: {b:#04x}: {reason}"),
                None => write!(f, "Invalid input at {offset}: end of data: {reason}"),
            },
            Error::Type { actual, required } => {
                write!(f, "Invalid node type: {actual}. Requires {required}.")
            }
            Error::Index { index, length } => {
                write!(
                    f,
                    "Invalid index (out of bounds): {index} (length: {length})."
                )
            }
            Error::NotFound { key } => {
                write!(f, "Key provided was not found in object: \"{key}\".")
            }
            Error::Rejected { reason } => {
                write!(f, "Mutation rejected by validation hook: {reason}")
            }
            Error::Io(e) => write!(f, "Stream error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
