//! In-memory backend for tests and scratch images.

use std::cell::RefCell;
use std::rc::Rc;

use crate::IoError;
use crate::backend::{FileBackend, Whence};

/// Backend over a growable in-memory byte buffer.
///
/// Behaves like a regular file: the cursor may be positioned past the end,
/// a write there zero-fills the gap, and truncating larger zero-fills the
/// extension. The buffer lives behind `Rc<RefCell<_>>` so callers can keep a
/// [`shared`](Self::shared) handle and inspect the final bytes after the
/// owning [`File`](crate::File) is gone.
#[derive(Debug, Default)]
pub struct MemBackend {
    buf: Rc<RefCell<Vec<u8>>>,
    pos: u64,
}

impl MemBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-filled with `data`, cursor at zero.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            buf: Rc::new(RefCell::new(data.into())),
            pos: 0,
        }
    }

    /// Returns a handle to the shared underlying buffer.
    pub fn shared(&self) -> Rc<RefCell<Vec<u8>>> {
        Rc::clone(&self.buf)
    }

    fn cursor(&self) -> Result<usize, IoError> {
        usize::try_from(self.pos).map_err(|_| IoError::OutOfRange {
            what: "cursor is beyond the addressable range",
        })
    }
}

impl FileBackend for MemBackend {
    fn open(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let pos = self.cursor()?;
        let data = self.buf.borrow();
        if pos >= data.len() {
            return Ok(0);
        }
        let n = buf.len().min(data.len() - pos);
        buf[..n].copy_from_slice(&data[pos..pos + n]);
        drop(data);
        self.pos += n as u64;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        let pos = self.cursor()?;
        let end = pos.checked_add(buf.len()).ok_or(IoError::OutOfRange {
            what: "write extends beyond the addressable range",
        })?;
        let mut data = self.buf.borrow_mut();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[pos..end].copy_from_slice(buf);
        drop(data);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError> {
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => self.pos,
            Whence::End => self.buf.borrow().len() as u64,
        };
        let pos = base.checked_add_signed(offset).ok_or(IoError::OutOfRange {
            what: "seek target is before the start or past the addressable range",
        })?;
        self.pos = pos;
        Ok(pos)
    }

    fn truncate(&mut self, size: u64) -> Result<(), IoError> {
        let size = usize::try_from(size).map_err(|_| IoError::OutOfRange {
            what: "truncate size is beyond the addressable range",
        })?;
        self.buf.borrow_mut().resize(size, 0);
        Ok(())
    }
}
