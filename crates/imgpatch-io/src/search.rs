//! Streaming substring search over a [`File`].

use bytes::Bytes;
use memchr::memmem;

use crate::IoError;
use crate::file::File;
use crate::retry;

/// Default window capacity in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 4096;

/// Enumerates the non-overlapping occurrences of a byte pattern across a
/// stream too large to hold in memory, in one forward pass.
///
/// The searcher borrows the file for its whole lifetime and treats the
/// file's position at construction as stream origin (offset 0). The window
/// always holds at least twice the pattern length, so a match can never be
/// missed merely because it straddles a refill boundary.
///
/// After a match, the search resumes immediately past it, not one byte into
/// it. The file's position after [`next_match`](Self::next_match) returns is
/// unspecified; callers needing unrelated I/O on the same file afterwards
/// must reseek explicitly.
#[derive(Debug)]
pub struct FileSearcher<'f> {
    file: &'f mut File,
    pattern: Bytes,
    finder: memmem::Finder<'static>,
    window: Vec<u8>,
    begin: usize,
    end: usize,
    base: u64,
}

impl<'f> FileSearcher<'f> {
    /// Binds a searcher to `file` at its current position, with the default
    /// window size.
    pub fn new(file: &'f mut File, pattern: impl Into<Bytes>) -> Self {
        Self::with_window_size(file, pattern, DEFAULT_WINDOW_SIZE)
    }

    /// Like [`new`](Self::new) with an explicit window size. The effective
    /// capacity is `max(window_size, 2 × pattern length)`.
    pub fn with_window_size(
        file: &'f mut File,
        pattern: impl Into<Bytes>,
        window_size: usize,
    ) -> Self {
        let pattern = pattern.into();
        let capacity = window_size.max(pattern.len().saturating_mul(2));
        let finder = memmem::Finder::new(&pattern).into_owned();
        Self {
            file,
            finder,
            window: vec![0; capacity],
            begin: 0,
            end: 0,
            base: 0,
            pattern,
        }
    }

    /// The pattern this searcher was built with.
    pub fn pattern(&self) -> &[u8] {
        &self.pattern
    }

    /// Returns the offset of the next match relative to the stream origin,
    /// or `None` once the stream is exhausted.
    ///
    /// An empty pattern never matches. Offsets past the 64-bit domain are an
    /// [`IoError::OffsetOverflow`] rather than a wrap.
    pub fn next_match(&mut self) -> Result<Option<u64>, IoError> {
        if self.pattern.is_empty() {
            return Ok(None);
        }
        loop {
            if let Some(i) = self.finder.find(&self.window[self.begin..self.end]) {
                let local = self.begin + i;
                self.begin = local + self.pattern.len();
                let offset = self
                    .base
                    .checked_add(local as u64)
                    .ok_or(IoError::OffsetOverflow)?;
                return Ok(Some(offset));
            }

            // Keep the longest tail that could still open a match spanning
            // the refill boundary; everything before it is done for good.
            let keep = (self.end - self.begin).min(self.pattern.len() - 1);
            let discarded = (self.end - keep) as u64;
            self.window.copy_within(self.end - keep..self.end, 0);
            self.base = self
                .base
                .checked_add(discarded)
                .ok_or(IoError::OffsetOverflow)?;
            self.begin = 0;
            self.end = keep;

            let n = retry::read_retry(self.file, &mut self.window[keep..])?;
            self.end += n;
            tracing::trace!(refilled = n, base = self.base, "search window refill");
            if self.end < self.pattern.len() {
                return Ok(None);
            }
        }
    }
}
