//! Backend over forward-only readers.

use std::fmt;
use std::io;

use crate::IoError;
use crate::backend::{FileBackend, Whence};

/// Adapts any [`io::Read`] stream (standard input, a pipe, a decompressor)
/// to the file capability.
///
/// The stream is forward-only: `write`, `seek` and `truncate` fail with
/// [`IoError::Unsupported`]. That is enough for consumers that only read
/// ahead, such as [`FileSearcher`](crate::FileSearcher).
pub struct ReadBackend<R> {
    inner: R,
}

impl<R: io::Read> ReadBackend<R> {
    /// Wraps a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Consumes the backend, returning the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> fmt::Debug for ReadBackend<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadBackend").finish_non_exhaustive()
    }
}

impl<R: io::Read> FileBackend for ReadBackend<R> {
    fn open(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        Ok(self.inner.read(buf)?)
    }

    fn write(&mut self, _buf: &[u8]) -> Result<usize, IoError> {
        Err(IoError::Unsupported {
            op: "write on a forward-only stream",
        })
    }

    fn seek(&mut self, _offset: i64, _whence: Whence) -> Result<u64, IoError> {
        Err(IoError::Unsupported {
            op: "seek on a forward-only stream",
        })
    }

    fn truncate(&mut self, _size: u64) -> Result<(), IoError> {
        Err(IoError::Unsupported {
            op: "truncate on a forward-only stream",
        })
    }
}
