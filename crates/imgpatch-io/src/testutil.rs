//! Deterministic fault injection for tests.
//!
//! [`ScriptBackend`] is an in-memory backend that consumes queues of
//! scripted faults and logs every primitive call it receives, so tests can
//! force short transfers, interrupted calls and premature EOF, and pin the
//! exact sequence of underlying operations a component issued.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use crate::IoError;
use crate::backend::{FileBackend, Whence};
use crate::mem_backend::MemBackend;

/// One scripted behavior, consumed by the next read or write.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Fault {
    /// Fail one call with `ErrorKind::Interrupted`, transferring nothing.
    Interrupt,
    /// Serve at most this many bytes on one call.
    Short(usize),
    /// Report end-of-stream (zero bytes) on one call.
    Eof,
    /// Fail one call with the given error kind.
    Error(io::ErrorKind),
}

/// A primitive call as seen by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Call {
    Open,
    Close,
    Read(usize),
    Write(usize),
    Seek(i64, Whence),
    Truncate(u64),
}

/// In-memory backend with scripted faults and a shared call log.
#[derive(Debug)]
pub(crate) struct ScriptBackend {
    inner: MemBackend,
    read_faults: VecDeque<Fault>,
    write_faults: VecDeque<Fault>,
    stub_seeks: bool,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl ScriptBackend {
    pub(crate) fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: MemBackend::from_bytes(data),
            read_faults: VecDeque::new(),
            write_faults: VecDeque::new(),
            stub_seeks: false,
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Queues a fault for a future read call.
    pub(crate) fn read_fault(mut self, fault: Fault) -> Self {
        self.read_faults.push_back(fault);
        self
    }

    /// Queues a fault for a future write call.
    pub(crate) fn write_fault(mut self, fault: Fault) -> Self {
        self.write_faults.push_back(fault);
        self
    }

    /// Makes every seek succeed with position 0 without moving the inner
    /// cursor, so tests can pin seek sequences with arbitrary offsets.
    pub(crate) fn stub_seeks(mut self) -> Self {
        self.stub_seeks = true;
        self
    }

    /// Handle to the underlying byte buffer.
    pub(crate) fn shared(&self) -> Rc<RefCell<Vec<u8>>> {
        self.inner.shared()
    }

    /// Handle to the call log.
    pub(crate) fn call_log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    fn log(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

fn apply(fault: Option<Fault>) -> Result<Option<usize>, IoError> {
    match fault {
        None => Ok(None),
        Some(Fault::Interrupt) => Err(io::Error::from(io::ErrorKind::Interrupted).into()),
        Some(Fault::Error(kind)) => Err(io::Error::from(kind).into()),
        Some(Fault::Eof) => Ok(Some(0)),
        Some(Fault::Short(n)) => Ok(Some(n.max(1))),
    }
}

impl FileBackend for ScriptBackend {
    fn open(&mut self) -> Result<(), IoError> {
        self.log(Call::Open);
        self.inner.open()
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.log(Call::Close);
        self.inner.close()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.log(Call::Read(buf.len()));
        match apply(self.read_faults.pop_front())? {
            Some(0) => Ok(0),
            Some(limit) => {
                let n = limit.min(buf.len());
                self.inner.read(&mut buf[..n])
            }
            None => self.inner.read(buf),
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        self.log(Call::Write(buf.len()));
        match apply(self.write_faults.pop_front())? {
            Some(0) => Ok(0),
            Some(limit) => {
                let n = limit.min(buf.len());
                self.inner.write(&buf[..n])
            }
            None => self.inner.write(buf),
        }
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError> {
        self.log(Call::Seek(offset, whence));
        if self.stub_seeks {
            return Ok(0);
        }
        self.inner.seek(offset, whence)
    }

    fn truncate(&mut self, size: u64) -> Result<(), IoError> {
        self.log(Call::Truncate(size));
        self.inner.truncate(size)
    }
}
