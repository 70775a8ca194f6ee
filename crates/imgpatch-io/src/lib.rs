//! # imgpatch-io: Byte-Stream I/O Core for imgpatch
//!
//! This crate is the I/O foundation of the imgpatch toolkit. It provides a
//! polymorphic file capability over injectable backends, a transparent
//! read/write buffering decorator, and a streaming substring search that
//! operates on streams too large to hold in memory:
//!
//! - **[`File`]**: the abstract capability (open/close/read/write/seek/
//!   truncate) with a lifecycle state machine shared by all backends
//! - **[`FileBackend`]**: the injectable primitive-operation seam, with
//!   [`FsBackend`] bound to the local file system, [`MemBackend`] over an
//!   in-memory buffer, and [`ReadBackend`] over forward-only streams
//! - **[`BufferedFile`]**: read-ahead / write-behind buffering that leaves
//!   the observable stream semantics bit-exact
//! - **[`FileSearcher`]**: boundary-safe multi-block pattern search
//! - **[`retry`]**: EINTR-tolerant and exact-transfer helpers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐   ┌──────────────────┐
//! │  BufferedFile   │   │   FileSearcher   │
//! │ (read-ahead /   │   │ (sliding window, │
//! │  write-behind)  │   │  retry-backed)   │
//! └────────┬────────┘   └────────┬─────────┘
//!          │       ┌─────────────┘
//! ┌────────┴───────┴─────────┐
//! │           File           │
//! │  (lifecycle state + ops) │
//! └────────────┬─────────────┘
//! ┌────────────┴─────────────┐
//! │   dyn FileBackend        │
//! │  ┌────┐ ┌─────┐ ┌─────┐  │
//! │  │ fs │ │ mem │ │read │  │
//! │  └────┘ └─────┘ └─────┘  │
//! └──────────────────────────┘
//! ```
//!
//! Backends are injected at construction, so tests substitute doubles that
//! force short transfers, interrupted calls, or premature EOF without
//! touching real OS resources.
//!
//! Everything here is single-threaded and blocking. Nothing is internally
//! synchronized; concurrent use of one `File` requires external locking.

mod backend;
mod buffered;
mod error;
mod file;
mod fs_backend;
mod mem_backend;
mod read_backend;
pub mod retry;
mod search;

pub use backend::{FileBackend, OpenFlags, Whence};
pub use buffered::{BufferedFile, DEFAULT_BUF_SIZE};
pub use error::IoError;
pub use file::File;
pub use fs_backend::FsBackend;
pub use mem_backend::MemBackend;
pub use read_backend::ReadBackend;
pub use search::{DEFAULT_WINDOW_SIZE, FileSearcher};

#[cfg(test)]
pub(crate) mod testutil;
