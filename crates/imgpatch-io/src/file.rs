//! The polymorphic file capability and its lifecycle state machine.

use crate::IoError;
use crate::backend::{FileBackend, Whence};

/// Lifecycle state shared by all backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Unopened,
    Open,
}

/// An abstract byte-addressable resource over an injected backend.
///
/// A `File` starts unopened; every operation except [`open`](Self::open)
/// fails with [`IoError::InvalidState`] until `open` succeeds, and again
/// after [`close`](Self::close). Moving a `File` transfers the capability
/// wholesale; the moved-from binding is unusable by the ownership rules, so
/// no runtime "moved" tag exists.
///
/// Dropping an open `File` closes it best-effort and discards the outcome;
/// call [`close`](Self::close) explicitly to observe close failures.
#[derive(Debug)]
pub struct File {
    backend: Box<dyn FileBackend>,
    state: Lifecycle,
}

impl File {
    /// Creates an unopened file over the given backend.
    pub fn new(backend: impl FileBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            state: Lifecycle::Unopened,
        }
    }

    /// Acquires the underlying resource.
    pub fn open(&mut self) -> Result<(), IoError> {
        if self.state == Lifecycle::Open {
            return Err(IoError::invalid_state("open on an already-open file"));
        }
        self.backend.open()?;
        self.state = Lifecycle::Open;
        tracing::debug!(backend = ?self.backend, "file opened");
        Ok(())
    }

    /// Releases the underlying resource.
    ///
    /// Idempotent: closing an unopened file is a no-op success. The file
    /// leaves the open state even when the backend close fails.
    pub fn close(&mut self) -> Result<(), IoError> {
        if self.state != Lifecycle::Open {
            return Ok(());
        }
        self.state = Lifecycle::Unopened;
        let result = self.backend.close();
        tracing::debug!(ok = result.is_ok(), "file closed");
        result
    }

    /// Reads into `buf`, returning the bytes transferred.
    ///
    /// A short read is not EOF; only a zero-byte result is.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.ensure_open("read on a file that is not open")?;
        self.backend.read(buf)
    }

    /// Writes from `buf`, returning the bytes transferred.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        self.ensure_open("write on a file that is not open")?;
        self.backend.write(buf)
    }

    /// Moves the cursor, returning the new absolute position.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError> {
        self.ensure_open("seek on a file that is not open")?;
        self.backend.seek(offset, whence)
    }

    /// Resizes the resource to `size` bytes. The cursor does not move.
    pub fn truncate(&mut self, size: u64) -> Result<(), IoError> {
        self.ensure_open("truncate on a file that is not open")?;
        self.backend.truncate(size)
    }

    /// Whether the file is in the open state.
    pub fn is_open(&self) -> bool {
        self.state == Lifecycle::Open
    }

    fn ensure_open(&self, reason: &'static str) -> Result<(), IoError> {
        if self.state == Lifecycle::Open {
            Ok(())
        } else {
            Err(IoError::invalid_state(reason))
        }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
