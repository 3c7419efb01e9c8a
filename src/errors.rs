//! Error types.

use core::fmt;

/// Alias for [`core::result::Result`] with the `devcred` error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A required input was malformed: a syntactically invalid OID, a bad
    /// string tag, or a key reference that does not parse as key material.
    InvalidArgument,

    /// The backend does not recognize the requested curve or digest
    /// algorithm.
    Unsupported,

    /// The backend failed while generating, signing or encoding. The output
    /// buffer holds scratch bytes only.
    Protocol,

    /// Allocation failed while building the subject name list.
    OutOfMemory,

    /// The key reference did not resolve to any key material.
    NotFound,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::Unsupported => write!(f, "curve or digest algorithm not supported"),
            Error::Protocol => write!(f, "backend generation, signing or encoding failure"),
            Error::OutOfMemory => write!(f, "allocation failure"),
            Error::NotFound => write!(f, "key material not found"),
        }
    }
}

impl std::error::Error for Error {}
