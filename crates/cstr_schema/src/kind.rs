//! Primitive kinds and access modes of declared child variables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The primitive kind of a scalar variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    /// IEEE-754 binary64.
    Double,
    /// Unsigned 32-bit integer.
    UInt32,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Double => f.write_str("Double"),
            ScalarKind::UInt32 => f.write_str("UInt32"),
        }
    }
}

/// Remote access mode of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Remote callers may read but never write.
    ReadOnly,
    /// Remote callers may read and write.
    ReadWrite,
}

impl AccessLevel {
    /// Returns `true` if remote writes are permitted.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        matches!(self, AccessLevel::ReadWrite)
    }
}
