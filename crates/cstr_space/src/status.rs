//! Status codes reported to remote callers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a remote operation, numbered like the OPC UA status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCode {
    Good,
    BadInternalError,
    BadDecodingError,
    BadServiceUnsupported,
    BadNodeIdUnknown,
    BadIndexRangeInvalid,
    BadNotReadable,
    BadNotWritable,
    BadOutOfRange,
    BadNotFound,
    BadTypeMismatch,
    BadInvalidArgument,
}

impl StatusCode {
    /// The 32-bit numeric code.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            StatusCode::Good => 0x0000_0000,
            StatusCode::BadInternalError => 0x8002_0000,
            StatusCode::BadDecodingError => 0x8007_0000,
            StatusCode::BadServiceUnsupported => 0x800B_0000,
            StatusCode::BadNodeIdUnknown => 0x8034_0000,
            StatusCode::BadIndexRangeInvalid => 0x8036_0000,
            StatusCode::BadNotReadable => 0x803A_0000,
            StatusCode::BadNotWritable => 0x803B_0000,
            StatusCode::BadOutOfRange => 0x803C_0000,
            StatusCode::BadNotFound => 0x803E_0000,
            StatusCode::BadTypeMismatch => 0x8074_0000,
            StatusCode::BadInvalidArgument => 0x80AB_0000,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?} (0x{:08X})", self.code())
    }
}
