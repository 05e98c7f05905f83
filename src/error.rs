use std::io;

use thiserror::Error as ThisError;

/// Result type returned by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error taxonomy for fs-verity measurement computation.
///
/// Mirrors the three-way split a C implementation would return as negative
/// errno values (`-EINVAL`, `-ENOMEM`, and whatever the read callback
/// produced): [`Error::InvalidArgument`] for rejected parameters or an
/// internal sizing bug, [`Error::OutOfMemory`] for allocation failure, and
/// [`Error::Io`] for a failed read. None are retried internally.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Parameter validation failed, the hash algorithm id is unknown, or an
    /// internal sizing invariant (`num_levels`, the root-write postcondition)
    /// was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A buffer, padded salt, hash context, or digest allocation failed.
    #[error("out of memory")]
    OutOfMemory,

    /// The read callback returned an error. The diagnostic is fixed per the
    /// wire contract; the underlying cause is preserved as the error source.
    #[error("error reading file")]
    Io(#[source] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
