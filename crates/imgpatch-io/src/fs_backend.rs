//! File-system backend over `std::fs`.

use std::fs;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::IoError;
use crate::backend::{FileBackend, OpenFlags, Whence};

/// Backend binding the file capability to a path on the local file system.
///
/// The path and flags are captured at construction; the descriptor is only
/// acquired when the owning [`File`](crate::File) is opened.
#[derive(Debug)]
pub struct FsBackend {
    path: PathBuf,
    flags: OpenFlags,
    file: Option<fs::File>,
}

impl FsBackend {
    /// Creates a backend for `path`, to be opened with `flags`.
    pub fn new(path: impl AsRef<Path>, flags: OpenFlags) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            flags,
            file: None,
        }
    }

    fn file_mut(&mut self) -> Result<&mut fs::File, IoError> {
        self.file
            .as_mut()
            .ok_or_else(|| IoError::invalid_state("backend has no open descriptor"))
    }
}

impl FileBackend for FsBackend {
    fn open(&mut self) -> Result<(), IoError> {
        let mut opts = fs::OpenOptions::new();
        if self.flags.read {
            opts.read(true);
        }
        if self.flags.write {
            opts.write(true);
        }
        if self.flags.create {
            opts.create(true);
        }
        if self.flags.truncate {
            opts.truncate(true);
        }
        self.file = Some(opts.open(&self.path)?);
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.file = None;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        Ok(self.file_mut()?.read(buf)?)
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        Ok(self.file_mut()?.write(buf)?)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, IoError> {
        let pos = match whence {
            Whence::Set => {
                let offset = u64::try_from(offset).map_err(|_| IoError::OutOfRange {
                    what: "absolute seek offset is negative",
                })?;
                SeekFrom::Start(offset)
            }
            Whence::Cur => SeekFrom::Current(offset),
            Whence::End => SeekFrom::End(offset),
        };
        Ok(self.file_mut()?.seek(pos)?)
    }

    fn truncate(&mut self, size: u64) -> Result<(), IoError> {
        Ok(self.file_mut()?.set_len(size)?)
    }
}
