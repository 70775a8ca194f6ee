//! I/O error types.

use std::io;

/// Errors from the I/O core.
///
/// Backend errors pass through unmodified as [`IoError::Io`]; the remaining
/// variants are synthesized by the layered components at their lifecycle and
/// transfer checks.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Underlying OS or backend I/O error.
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Operation issued outside the lifecycle state that permits it.
    #[error("invalid state: {reason}")]
    InvalidState { reason: &'static str },

    /// The backend cannot perform the requested operation.
    #[error("unsupported operation: {op}")]
    Unsupported { op: &'static str },

    /// Seek or resize arithmetic left the representable range.
    #[error("argument out of range: {what}")]
    OutOfRange { what: &'static str },

    /// An exact transfer or flush could not move the required bytes.
    #[error("unexpected end of file: moved {actual} of {expected} bytes")]
    UnexpectedEof { expected: u64, actual: u64 },

    /// A computed stream offset does not fit the 64-bit domain.
    #[error("stream offset overflows the 64-bit domain")]
    OffsetOverflow,
}

impl IoError {
    pub(crate) fn invalid_state(reason: &'static str) -> Self {
        Self::InvalidState { reason }
    }

    /// Whether this is an interrupted-call error (`EINTR`), the one kind the
    /// [`retry`](crate::retry) helpers absorb.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Io { source } if source.kind() == io::ErrorKind::Interrupted)
    }
}
