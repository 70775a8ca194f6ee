//! Read-ahead / write-behind buffering over [`File`].

use crate::IoError;
use crate::backend::Whence;
use crate::file::File;
use crate::retry;

/// Default capacity for both staging buffers.
pub const DEFAULT_BUF_SIZE: usize = 4096;

/// Transparent buffering decorator over a borrowed [`File`].
///
/// `BufferedFile` amortizes small transfers without changing the externally
/// observable stream semantics. Reads are staged through a read-ahead buffer
/// and writes through a write-behind buffer; one
/// [`set_buf_size`](Self::set_buf_size) governs the capacity of both.
/// Transfers at least as large as the buffer bypass the staging entirely.
///
/// The decorator tracks the backend's *real* cursor, which leads the logical
/// position by the amount of unconsumed read-ahead. Pending writes are only
/// sent on [`flush`](Self::flush), before any seek or truncate, or when the
/// write buffer would overflow. Reads never flush implicitly: reading while
/// writes are pending is an [`IoError::InvalidState`].
///
/// Dropping a bound decorator flushes best-effort and discards the outcome;
/// call [`flush`](Self::flush) or [`unbind`](Self::unbind) to observe it.
#[derive(Debug)]
pub struct BufferedFile<'f> {
    file: Option<&'f mut File>,
    rbuf: Vec<u8>,
    rpos: usize,
    rcap: usize,
    wbuf: Vec<u8>,
    buf_size: usize,
    real_pos: u64,
}

impl<'f> BufferedFile<'f> {
    /// Creates an unbound decorator with the default buffer capacity.
    pub fn new() -> Self {
        Self {
            file: None,
            rbuf: vec![0; DEFAULT_BUF_SIZE],
            rpos: 0,
            rcap: 0,
            wbuf: Vec::with_capacity(DEFAULT_BUF_SIZE),
            buf_size: DEFAULT_BUF_SIZE,
            real_pos: 0,
        }
    }

    /// Resizes both staging buffers. Only legal while unbound.
    pub fn set_buf_size(&mut self, size: usize) -> Result<(), IoError> {
        if self.file.is_some() {
            return Err(IoError::invalid_state(
                "buffer resize while bound to a file",
            ));
        }
        if size == 0 {
            return Err(IoError::OutOfRange {
                what: "buffer capacity of zero",
            });
        }
        self.buf_size = size;
        self.rbuf = vec![0; size];
        self.wbuf = Vec::with_capacity(size);
        Ok(())
    }

    /// Binds the decorator to an open file.
    ///
    /// The backend's cursor is learned with one zero-length relative seek; a
    /// backend that cannot seek binds at position 0, which still supports
    /// purely forward buffered reads.
    pub fn bind(&mut self, file: &'f mut File) -> Result<(), IoError> {
        if self.file.is_some() {
            return Err(IoError::invalid_state("bind on an already-bound buffer"));
        }
        self.real_pos = match file.seek(0, Whence::Cur) {
            Ok(pos) => pos,
            Err(IoError::Unsupported { .. }) => 0,
            Err(e) => return Err(e),
        };
        self.rpos = 0;
        self.rcap = 0;
        self.wbuf.clear();
        self.file = Some(file);
        Ok(())
    }

    /// Flushes pending writes and releases the binding. A no-op when
    /// already unbound.
    pub fn unbind(&mut self) -> Result<(), IoError> {
        if self.file.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.file = None;
        self.rpos = 0;
        self.rcap = 0;
        Ok(())
    }

    /// Whether the decorator is bound to a file.
    pub fn is_bound(&self) -> bool {
        self.file.is_some()
    }

    /// Reads into `buf`, serving from the read-ahead buffer when possible.
    ///
    /// At most one underlying read is issued: either directly into `buf`
    /// when it is at least a buffer's worth and nothing is cached, or to
    /// refill the cache. A short refill is recorded as-is, so a short return
    /// from this method is not EOF; only a zero-byte return is.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("read on an unbound buffer"));
        };
        if !self.wbuf.is_empty() {
            return Err(IoError::invalid_state("read with pending buffered writes"));
        }
        if self.rpos == self.rcap {
            if buf.len() >= self.buf_size {
                let n = file.read(buf)?;
                self.real_pos += n as u64;
                return Ok(n);
            }
            let n = file.read(&mut self.rbuf)?;
            self.rpos = 0;
            self.rcap = n;
            self.real_pos += n as u64;
        }
        let n = (self.rcap - self.rpos).min(buf.len());
        buf[..n].copy_from_slice(&self.rbuf[self.rpos..self.rpos + n]);
        self.rpos += n;
        Ok(n)
    }

    /// Writes from `buf`, staging small transfers in the write buffer.
    ///
    /// Any cached read-ahead is first cancelled with one backward relative
    /// seek so the backend cursor matches the logical position. Returns the
    /// bytes accepted.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("write on an unbound buffer"));
        };
        if self.rpos < self.rcap {
            let back = (self.rcap - self.rpos) as i64;
            self.real_pos = file.seek(-back, Whence::Cur)?;
            self.rpos = 0;
            self.rcap = 0;
        }
        if self.wbuf.len() + buf.len() > self.buf_size {
            Self::flush_pending(file, &mut self.wbuf, &mut self.real_pos)?;
        }
        if buf.len() >= self.buf_size {
            let n = file.write(buf)?;
            self.real_pos += n as u64;
            return Ok(n);
        }
        self.wbuf.extend_from_slice(buf);
        Ok(buf.len())
    }

    /// Seeks to a new logical position, flushing pending writes first.
    ///
    /// A relative seek landing inside the cached read-ahead resolves without
    /// touching the backend. Otherwise the cached remainder is folded into
    /// one residual relative seek; if that subtraction would underflow the
    /// signed offset domain, two underlying seeks are issued instead: one
    /// cancelling the cached remainder, then one with the original offset.
    /// Returns the new logical position.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("seek on an unbound buffer"));
        };
        Self::flush_pending(file, &mut self.wbuf, &mut self.real_pos)?;

        if whence == Whence::Cur {
            let ahead = self.rcap - self.rpos;
            if offset >= 0 && offset as u64 <= ahead as u64 {
                self.rpos += offset as usize;
                return Ok(self.real_pos - (self.rcap - self.rpos) as u64);
            }
            let pos = match offset.checked_sub(ahead as i64) {
                Some(residual) => file.seek(residual, Whence::Cur)?,
                None => {
                    file.seek(-(ahead as i64), Whence::Cur)?;
                    file.seek(offset, Whence::Cur)?
                }
            };
            self.rpos = 0;
            self.rcap = 0;
            self.real_pos = pos;
            return Ok(pos);
        }

        let pos = file.seek(offset, whence)?;
        self.rpos = 0;
        self.rcap = 0;
        self.real_pos = pos;
        Ok(pos)
    }

    /// Truncates the underlying file, flushing pending writes and dropping
    /// any cached read-ahead first. No seek is issued; writing past the new
    /// end afterwards grows the file again.
    pub fn truncate(&mut self, size: u64) -> Result<(), IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("truncate on an unbound buffer"));
        };
        Self::flush_pending(file, &mut self.wbuf, &mut self.real_pos)?;
        self.rpos = 0;
        self.rcap = 0;
        file.truncate(size)
    }

    /// Sends pending writes to the backend with one exact transfer. A no-op
    /// when nothing is pending.
    pub fn flush(&mut self) -> Result<(), IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("flush on an unbound buffer"));
        };
        Self::flush_pending(file, &mut self.wbuf, &mut self.real_pos)
    }

    /// Re-learns the backend's cursor after external code moved it, via a
    /// zero-length relative seek. Cached read-ahead is discarded.
    pub fn sync_pos(&mut self) -> Result<u64, IoError> {
        let Some(file) = self.file.as_deref_mut() else {
            return Err(IoError::invalid_state("sync_pos on an unbound buffer"));
        };
        let pos = file.seek(0, Whence::Cur)?;
        self.rpos = 0;
        self.rcap = 0;
        self.real_pos = pos;
        Ok(pos)
    }

    fn flush_pending(
        file: &mut File,
        wbuf: &mut Vec<u8>,
        real_pos: &mut u64,
    ) -> Result<(), IoError> {
        if wbuf.is_empty() {
            return Ok(());
        }
        tracing::trace!(pending = wbuf.len(), "flushing write-behind buffer");
        retry::write_exact(file, wbuf)?;
        *real_pos += wbuf.len() as u64;
        wbuf.clear();
        Ok(())
    }
}

impl Default for BufferedFile<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BufferedFile<'_> {
    fn drop(&mut self) {
        if self.file.is_some() {
            let _ = self.flush();
        }
    }
}
