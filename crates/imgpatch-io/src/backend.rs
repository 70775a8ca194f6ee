//! The backend seam for [`File`](crate::File).
//!
//! A [`FileBackend`] is the table of primitive operations binding the file
//! capability to a real resource or a test double. Backends are injected at
//! construction, which is what makes the layered components unit-testable
//! with forced short reads, interrupted calls, and premature EOF instead of
//! real OS resources.

use std::fmt;

use crate::IoError;

/// Origin of a seek offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute offset from the start of the resource.
    Set,
    /// Relative to the current cursor.
    Cur,
    /// Relative to the end of the resource.
    End,
}

/// Flags for opening file-system backed resources.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading.
    pub read: bool,
    /// Open for writing.
    pub write: bool,
    /// Create the file if it doesn't exist.
    pub create: bool,
    /// Truncate to zero length on open.
    pub truncate: bool,
}

impl OpenFlags {
    /// Flags for reading an existing file.
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    /// Flags for patching an existing file in place.
    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Self::default()
        }
    }

    /// Flags for creating or overwriting a file.
    pub fn read_write_create() -> Self {
        Self {
            read: true,
            write: true,
            create: true,
            ..Self::default()
        }
    }
}

/// Primitive operations behind a [`File`](crate::File).
///
/// The lifecycle state machine lives in `File`; backends only see calls that
/// the state machine has already admitted. Implementations report what the
/// resource actually did: short transfers are returned as-is, and operations
/// the resource cannot perform fail with [`IoError::Unsupported`].
pub trait FileBackend: fmt::Debug {
    /// Acquires the underlying resource.
    fn open(&mut self) -> Result<(), IoError>;

    /// Releases the underlying resource.
    fn close(&mut self) -> Result<(), IoError>;

    /// Reads into `buf`, returning the bytes transferred.
    ///
    /// May transfer fewer bytes than requested for reasons other than end of
    /// stream (signal interruption, backend granularity). Zero means EOF.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError>;

    /// Writes from `buf`, returning the bytes transferred.
    ///
    /// The same short-transfer caveat as [`read`](Self::read) applies.
    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError>;

    /// Moves the cursor, returning the new absolute position.
    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError>;

    /// Resizes the resource to `size` bytes.
    fn truncate(&mut self, size: u64) -> Result<(), IoError>;
}
