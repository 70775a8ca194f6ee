//! EINTR-tolerant and exact-transfer helpers over [`File`].
//!
//! [`File::read`] and [`File::write`] report what a single backend call did,
//! which may be less than requested. The helpers here loop those single-shot
//! calls: interrupted calls are retried without consuming progress, other
//! errors propagate immediately, and a zero-byte transfer stops the loop as
//! true end-of-stream.

use crate::IoError;
use crate::backend::Whence;
use crate::file::File;

/// Scratch-buffer size for [`move_range`] chunks.
const MOVE_SCRATCH_SIZE: usize = 4096;

/// Reads until `buf` is full, retrying interrupted calls and accumulating
/// short transfers.
///
/// Returns the bytes read; less than `buf.len()` only at end of stream.
pub fn read_retry(file: &mut File, buf: &mut [u8]) -> Result<usize, IoError> {
    let mut done = 0;
    while done < buf.len() {
        match file.read(&mut buf[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.is_interrupted() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(done)
}

/// Writes all of `buf`, retrying interrupted calls and accumulating short
/// transfers.
///
/// Returns the bytes written; less than `buf.len()` only when the backend
/// reports a zero-byte write.
pub fn write_retry(file: &mut File, buf: &[u8]) -> Result<usize, IoError> {
    let mut done = 0;
    while done < buf.len() {
        match file.write(&buf[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) if e.is_interrupted() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(done)
}

/// Like [`read_retry`], but a short total is an [`IoError::UnexpectedEof`].
pub fn read_exact(file: &mut File, buf: &mut [u8]) -> Result<(), IoError> {
    let n = read_retry(file, buf)?;
    if n < buf.len() {
        return Err(IoError::UnexpectedEof {
            expected: buf.len() as u64,
            actual: n as u64,
        });
    }
    Ok(())
}

/// Like [`write_retry`], but a short total is an [`IoError::UnexpectedEof`].
pub fn write_exact(file: &mut File, buf: &[u8]) -> Result<(), IoError> {
    let n = write_retry(file, buf)?;
    if n < buf.len() {
        return Err(IoError::UnexpectedEof {
            expected: buf.len() as u64,
            actual: n as u64,
        });
    }
    Ok(())
}

/// Moves `size` bytes from `src` to `dest` within one file's own address
/// space, like `memmove`: chunks are copied front-to-back when `dest < src`
/// and back-to-front otherwise, so overlapping ranges stay correct.
///
/// Each chunk costs two absolute seeks (read side, then write side) through
/// a fixed scratch buffer. Returns the bytes actually moved. A short write
/// during the forward pass stops the move with partial progress; during the
/// backward pass it shrinks the amount still to move and the copy continues.
/// A write that makes no progress at all is an [`IoError::UnexpectedEof`].
/// `src == dest` or `size == 0` returns `size` without any I/O.
pub fn move_range(file: &mut File, src: u64, dest: u64, size: u64) -> Result<u64, IoError> {
    if size == 0 || src == dest {
        return Ok(size);
    }
    tracing::debug!(src, dest, size, "moving byte range");

    let cap = MOVE_SCRATCH_SIZE.min(usize::try_from(size).unwrap_or(MOVE_SCRATCH_SIZE));
    let mut scratch = vec![0u8; cap];
    let mut done = 0u64;

    if dest < src {
        while done < size {
            let n = chunk_len(&scratch, size - done);
            seek_to(file, src + done)?;
            read_exact(file, &mut scratch[..n])?;
            seek_to(file, dest + done)?;
            let written = write_retry(file, &scratch[..n])?;
            if written == 0 {
                return Err(IoError::UnexpectedEof {
                    expected: n as u64,
                    actual: 0,
                });
            }
            done += written as u64;
            if written < n {
                break;
            }
        }
    } else {
        let mut remaining = size;
        while remaining > 0 {
            let n = chunk_len(&scratch, remaining);
            let at = remaining - n as u64;
            seek_to(file, src + at)?;
            read_exact(file, &mut scratch[..n])?;
            seek_to(file, dest + at)?;
            let written = write_retry(file, &scratch[..n])?;
            if written == 0 {
                return Err(IoError::UnexpectedEof {
                    expected: n as u64,
                    actual: 0,
                });
            }
            // A short write shrinks the amount still to move; the shortfall
            // is not revisited.
            remaining -= written as u64;
            done += written as u64;
        }
    }
    Ok(done)
}

fn chunk_len(scratch: &[u8], left: u64) -> usize {
    scratch.len().min(usize::try_from(left).unwrap_or(scratch.len()))
}

fn seek_to(file: &mut File, pos: u64) -> Result<u64, IoError> {
    let offset = i64::try_from(pos).map_err(|_| IoError::OutOfRange {
        what: "range-move offset exceeds the signed seek domain",
    })?;
    file.seek(offset, Whence::Set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem_backend::MemBackend;
    use crate::testutil::{Call, Fault, ScriptBackend};

    fn open_script(backend: ScriptBackend) -> File {
        let mut file = File::new(backend);
        file.open().unwrap();
        file
    }

    #[test]
    fn read_retry_absorbs_interrupts_with_one_extra_call_each() {
        let backend = ScriptBackend::new(*b"hello world")
            .read_fault(Fault::Interrupt)
            .read_fault(Fault::Interrupt);
        let calls = backend.call_log();
        let mut file = open_script(backend);

        let mut buf = [0u8; 11];
        assert_eq!(read_retry(&mut file, &mut buf).unwrap(), 11);
        assert_eq!(&buf, b"hello world");

        // N interrupts, then one successful transfer: N + 1 calls.
        let reads = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Read(_)))
            .count();
        assert_eq!(reads, 3);
    }

    #[test]
    fn write_retry_absorbs_interrupts_and_short_writes() {
        let backend = ScriptBackend::new(Vec::new())
            .write_fault(Fault::Interrupt)
            .write_fault(Fault::Short(4));
        let shared = backend.shared();
        let calls = backend.call_log();
        let mut file = open_script(backend);

        assert_eq!(write_retry(&mut file, b"patchwork").unwrap(), 9);
        assert_eq!(&*shared.borrow(), b"patchwork");

        // One interrupt, one short transfer, one final transfer.
        let writes = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Write(_)))
            .count();
        assert_eq!(writes, 3);
    }

    #[test]
    fn read_retry_stops_at_eof_without_error() {
        let mut file = open_script(ScriptBackend::new(*b"abc"));
        let mut buf = [0u8; 8];
        assert_eq!(read_retry(&mut file, &mut buf).unwrap(), 3);
    }

    #[test]
    fn exact_transfers_report_unexpected_eof() {
        let mut file = open_script(ScriptBackend::new(*b"abc"));
        let mut buf = [0u8; 8];
        let err = read_exact(&mut file, &mut buf).unwrap_err();
        assert!(matches!(
            err,
            IoError::UnexpectedEof {
                expected: 8,
                actual: 3
            }
        ));

        let mut file = open_script(ScriptBackend::new(Vec::new()).write_fault(Fault::Eof));
        let err = write_exact(&mut file, b"xyz").unwrap_err();
        assert!(matches!(err, IoError::UnexpectedEof { .. }));
    }

    #[test]
    fn non_interrupt_errors_propagate_immediately() {
        let backend = ScriptBackend::new(*b"abc").read_fault(Fault::Error(
            std::io::ErrorKind::PermissionDenied,
        ));
        let mut file = open_script(backend);
        let mut buf = [0u8; 3];
        assert!(matches!(
            read_retry(&mut file, &mut buf),
            Err(IoError::Io { .. })
        ));
    }

    #[test]
    fn move_range_forward_matches_memmove() {
        let data: Vec<u8> = (0..20).collect();
        let backend = MemBackend::from_bytes(data.clone());
        let shared = backend.shared();
        let mut file = File::new(backend);
        file.open().unwrap();

        assert_eq!(move_range(&mut file, 5, 2, 10).unwrap(), 10);

        let mut expected = data;
        expected.copy_within(5..15, 2);
        assert_eq!(&*shared.borrow(), &expected);
    }

    #[test]
    fn move_range_backward_matches_memmove() {
        let data: Vec<u8> = (0..20).collect();
        let backend = MemBackend::from_bytes(data.clone());
        let shared = backend.shared();
        let mut file = File::new(backend);
        file.open().unwrap();

        assert_eq!(move_range(&mut file, 2, 5, 10).unwrap(), 10);

        let mut expected = data;
        expected.copy_within(2..12, 5);
        assert_eq!(&*shared.borrow(), &expected);
    }

    #[test]
    fn move_range_spanning_many_chunks() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let backend = MemBackend::from_bytes(data.clone());
        let shared = backend.shared();
        let mut file = File::new(backend);
        file.open().unwrap();

        assert_eq!(move_range(&mut file, 1_000, 9_000, 10_000).unwrap(), 10_000);

        let mut expected = data;
        expected.copy_within(1_000..11_000, 9_000);
        assert_eq!(&*shared.borrow(), &expected);
    }

    #[test]
    fn move_range_degenerate_cases_do_no_io() {
        let backend = ScriptBackend::new(*b"abcdef");
        let calls = backend.call_log();
        let mut file = open_script(backend);

        assert_eq!(move_range(&mut file, 3, 3, 4).unwrap(), 4);
        assert_eq!(move_range(&mut file, 1, 4, 0).unwrap(), 0);
        assert_eq!(&*calls.borrow(), &[Call::Open]);
    }
}
