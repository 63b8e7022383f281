//! Operation status codes.
//!
//! Every read and write against the address space resolves to a
//! `StatusCode`. Protocol-level rejections (ranged access against a
//! scalar source, writes to read-only nodes) travel as codes on the
//! result envelope rather than as hard errors, so callers must inspect
//! the status before trusting the payload.

use std::fmt;

/// Status of a completed read or write operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    /// Operation completed successfully.
    #[default]
    Good,
    /// A sub-range was requested but the target only serves whole scalars.
    BadIndexRangeInvalid,
    /// The value could not be allocated.
    BadOutOfMemory,
    /// The underlying resource produced an unusable reading.
    BadInternalError,
    /// No node with the given identifier exists in the address space.
    BadNodeIdUnknown,
    /// The target node has no readable value.
    BadNotReadable,
    /// The target node does not accept writes.
    BadNotWritable,
    /// The written value has the wrong scalar kind for the target.
    BadTypeMismatch,
}

impl StatusCode {
    /// Whether the operation succeeded.
    pub fn is_good(self) -> bool {
        self == StatusCode::Good
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Good => "Good",
            Self::BadIndexRangeInvalid => "BadIndexRangeInvalid",
            Self::BadOutOfMemory => "BadOutOfMemory",
            Self::BadInternalError => "BadInternalError",
            Self::BadNodeIdUnknown => "BadNodeIdUnknown",
            Self::BadNotReadable => "BadNotReadable",
            Self::BadNotWritable => "BadNotWritable",
            Self::BadTypeMismatch => "BadTypeMismatch",
        };
        write!(f, "{name}")
    }
}
