//! Buffered stream core.
//!
//! A [`Stream`] owns one backend handle and one fixed-capacity buffer that is
//! shared by the read and write paths. [`BufferState`] records which path last
//! touched the buffer, and every operation that switches paths reconciles the
//! buffer with the backend's real position first:
//!
//! - leaving `Writing` flushes the pending bytes;
//! - leaving `Reading` seeks the backend back over the read-ahead that the
//!   caller has not consumed yet.
//!
//! End of stream and hard I/O failures are recorded in a sticky
//! [`ErrorState`] that [`Stream::at_end`] and [`Stream::has_error`] report.
//! Once a hard failure has been recorded, data transfer short-circuits with
//! [`StreamError::Faulted`] and only a fresh stream recovers.

mod mode;

pub use mode::OpenMode;

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::RawFd;
use std::path::Path;
use tracing::{debug, trace, warn};

use crate::backend::{Backend, FdBackend};
use crate::config::{StreamConfig, DEFAULT_BUFFER_CAPACITY};
use crate::error::{Result, StreamError};

/// Which path last touched the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Idle,
    /// `buffer[cursor..valid]` has been read from the backend but not yet
    /// handed to the caller.
    Reading { cursor: usize, valid: usize },
    /// `buffer[..cursor]` is pending and not yet written to the backend.
    Writing { cursor: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorState {
    #[default]
    None,
    EndOfStream,
    Io,
}

pub struct Stream<B: Backend = FdBackend> {
    backend: B,
    buffer: Box<[u8]>,
    state: BufferState,
    error: ErrorState,
    closed: bool,
}

impl Stream<FdBackend> {
    /// Open `path` with a stdio mode token and the default buffer capacity.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self> {
        Self::open_with(path, mode, &StreamConfig::default())
    }

    pub fn open_with(path: impl AsRef<Path>, mode: &str, config: &StreamConfig) -> Result<Self> {
        let mode = OpenMode::parse(mode)?;
        let path = path.as_ref();

        let file = mode
            .options()
            .open(path)
            .map_err(|e| StreamError::unavailable(format!("file {}", path.display()), e))?;

        debug!(
            "Opened {} with mode {} ({} byte buffer)",
            path.display(),
            mode,
            config.buffer_capacity
        );
        Ok(Self::with_backend(FdBackend::from_file(file), config.buffer_capacity))
    }
}

impl<B: Backend> Stream<B> {
    /// Build an idle stream over an already open backend.
    ///
    /// `capacity` must be nonzero. Release builds round a zero capacity up to
    /// a one-byte buffer.
    pub fn with_backend(backend: B, capacity: usize) -> Self {
        debug_assert!(capacity > 0, "stream buffer capacity must be nonzero");
        Self {
            backend,
            buffer: vec![0u8; capacity.max(1)].into_boxed_slice(),
            state: BufferState::Idle,
            error: ErrorState::None,
            closed: false,
        }
    }

    pub fn with_default_capacity(backend: B) -> Self {
        Self::with_backend(backend, DEFAULT_BUFFER_CAPACITY)
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn error_state(&self) -> ErrorState {
        self.error
    }

    /// Bytes currently held in the buffer: unread read-ahead or pending writes.
    pub fn buffered_len(&self) -> usize {
        match self.state {
            BufferState::Idle => 0,
            BufferState::Reading { cursor, valid } => valid - cursor,
            BufferState::Writing { cursor } => cursor,
        }
    }

    pub fn at_end(&self) -> bool {
        self.error == ErrorState::EndOfStream
    }

    pub fn has_error(&self) -> bool {
        self.error == ErrorState::Io
    }

    /// Descriptor of the backing file or pipe end.
    pub fn fd_of(&self) -> Option<RawFd> {
        self.backend.raw_fd()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn ensure_healthy(&self) -> Result<()> {
        if self.error == ErrorState::Io {
            return Err(StreamError::Faulted);
        }
        Ok(())
    }

    /// Read one byte, refilling the buffer with a single block read when it
    /// is exhausted.
    ///
    /// End of stream and I/O failure are both errors here; [`Self::at_end`]
    /// and [`Self::has_error`] tell them apart afterwards.
    pub fn get_byte(&mut self) -> Result<u8> {
        self.ensure_healthy()?;

        match self.state {
            BufferState::Reading { cursor, valid } if cursor < valid => {
                self.state = BufferState::Reading {
                    cursor: cursor + 1,
                    valid,
                };
                return Ok(self.buffer[cursor]);
            }
            BufferState::Writing { .. } => self.flush()?,
            _ => {}
        }

        self.refill()
    }

    fn refill(&mut self) -> Result<u8> {
        self.state = BufferState::Idle;
        match self.backend.read(&mut self.buffer) {
            Ok(0) => {
                trace!("Refill hit end of stream");
                self.error = ErrorState::EndOfStream;
                Err(StreamError::EndOfStream)
            }
            Ok(valid) => {
                trace!("Refilled {} bytes", valid);
                self.error = ErrorState::None;
                self.state = BufferState::Reading { cursor: 1, valid };
                Ok(self.buffer[0])
            }
            Err(e) => {
                debug!("Refill failed: {}", e);
                self.error = ErrorState::Io;
                Err(e.into())
            }
        }
    }

    /// Buffer one byte, flushing first when the buffer is full.
    ///
    /// Returns the byte on success. If the flush fails the byte is not
    /// buffered and the stream enters its error state.
    pub fn put_byte(&mut self, byte: u8) -> Result<u8> {
        self.ensure_healthy()?;

        let cursor = match self.state {
            BufferState::Writing { cursor } => cursor,
            BufferState::Reading { .. } => {
                self.discard_read_ahead()?;
                0
            }
            BufferState::Idle => 0,
        };
        self.state = BufferState::Writing { cursor };

        let cursor = if cursor == self.buffer.len() {
            self.flush()?;
            0
        } else {
            cursor
        };

        self.buffer[cursor] = byte;
        self.state = BufferState::Writing { cursor: cursor + 1 };
        Ok(byte)
    }

    /// Read up to `count` elements of `size` bytes into `buf`.
    ///
    /// Returns the number of whole elements transferred; a short count with
    /// [`Self::at_end`] set means the stream ran dry. A hard I/O failure
    /// reports 0 even if some bytes were already copied into `buf`.
    ///
    /// A prior end of stream does not stop the call: it issues a fresh block
    /// read, which on a terminal or pipe may block until more data arrives.
    pub fn read_elements(&mut self, buf: &mut [u8], size: usize, count: usize) -> usize {
        let wanted = transfer_len(buf.len(), size, count);
        if wanted == 0 || self.has_error() {
            return 0;
        }

        let mut moved = 0;
        while moved < wanted {
            match self.get_byte() {
                Ok(byte) => {
                    buf[moved] = byte;
                    moved += 1;
                }
                Err(_) => break,
            }
        }

        if self.has_error() {
            return 0;
        }
        moved / size
    }

    /// Write up to `count` elements of `size` bytes from `buf`.
    ///
    /// Same accounting as [`Self::read_elements`]: a hard I/O failure
    /// reports 0 elements.
    pub fn write_elements(&mut self, buf: &[u8], size: usize, count: usize) -> usize {
        let wanted = transfer_len(buf.len(), size, count);
        if wanted == 0 || self.has_error() {
            return 0;
        }

        let mut moved = 0;
        for &byte in &buf[..wanted] {
            if self.put_byte(byte).is_err() {
                break;
            }
            moved += 1;
        }

        if self.has_error() {
            return 0;
        }
        moved / size
    }

    /// Write every pending byte to the backend.
    ///
    /// A no-op unless the buffer holds pending writes. Partial writes are
    /// retried until the buffer is drained; any failed write drops the pending
    /// bytes and puts the stream in its error state.
    pub fn flush(&mut self) -> Result<()> {
        let pending = match self.state {
            BufferState::Writing { cursor } if cursor > 0 => cursor,
            BufferState::Writing { .. } => {
                self.state = BufferState::Idle;
                return Ok(());
            }
            _ => return Ok(()),
        };

        let mut written = 0;
        while written < pending {
            let result = match self.backend.write(&self.buffer[written..pending]) {
                Ok(0) => Err(io::Error::from(io::ErrorKind::WriteZero)),
                other => other,
            };
            match result {
                Ok(n) => written += n,
                Err(e) => {
                    debug!("Flush failed after {} of {} bytes: {}", written, pending, e);
                    self.state = BufferState::Idle;
                    self.error = ErrorState::Io;
                    return Err(e.into());
                }
            }
        }

        trace!("Flushed {} bytes", pending);
        self.state = BufferState::Idle;
        Ok(())
    }

    /// Move the backend back over read-ahead the caller has not consumed.
    fn discard_read_ahead(&mut self) -> Result<()> {
        if let BufferState::Reading { cursor, valid } = self.state {
            let unread = (valid - cursor) as i64;
            if unread > 0 {
                trace!("Rewinding {} unread bytes", unread);
                self.backend.seek(SeekFrom::Current(-unread))?;
            }
            self.state = BufferState::Idle;
        }
        Ok(())
    }

    fn reposition(&mut self, pos: SeekFrom) -> Result<u64> {
        match self.state {
            BufferState::Writing { .. } => self.flush()?,
            BufferState::Reading { .. } => self.discard_read_ahead()?,
            BufferState::Idle => {}
        }
        self.state = BufferState::Idle;

        let position = self.backend.seek(pos)?;
        trace!("Seek {:?} -> {}", pos, position);
        Ok(position)
    }

    /// Reconcile the buffer, then seek the backend.
    ///
    /// Returns the new absolute position. A successful seek clears end of
    /// stream; a recorded I/O failure stays.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        let position = self.reposition(pos)?;
        if self.error == ErrorState::EndOfStream {
            self.error = ErrorState::None;
        }
        Ok(position)
    }

    /// Logical position of the stream, accounting for buffered state.
    pub fn tell(&mut self) -> Result<u64> {
        self.reposition(SeekFrom::Current(0))
    }

    /// Flush, release the backend and free the buffer.
    ///
    /// Both steps always run. Returns the flush result and the release
    /// result so callers can decide how to report them.
    pub(crate) fn shutdown(&mut self) -> (Result<()>, io::Result<()>) {
        let flushed = self.flush();
        let released = self.backend.release();
        self.buffer = Box::default();
        self.state = BufferState::Idle;
        self.closed = true;
        (flushed, released)
    }

    /// Flush pending writes and close the backend.
    ///
    /// The backend is released even when the flush fails; the first failure
    /// is returned.
    pub fn close(mut self) -> Result<()> {
        let (flushed, released) = self.shutdown();
        debug!(
            "Closed stream (flush ok: {}, release ok: {})",
            flushed.is_ok(),
            released.is_ok()
        );

        match (flushed, released) {
            (Err(e), Err(release_err)) => {
                warn!("Release also failed after flush error: {}", release_err);
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), Err(e)) => Err(e.into()),
            (Ok(()), Ok(())) => Ok(()),
        }
    }
}

/// Bytes a block transfer may move: `size * count`, capped by the slice.
fn transfer_len(available: usize, size: usize, count: usize) -> usize {
    if size == 0 {
        return 0;
    }
    size.checked_mul(count).map_or(available, |total| total.min(available))
}

impl<B: Backend> Drop for Stream<B> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.flush() {
            warn!("Dropping stream lost pending writes: {}", e);
        }
    }
}

impl<B: Backend> fmt::Debug for Stream<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("fd", &self.backend.raw_fd())
            .field("capacity", &self.buffer.len())
            .field("state", &self.state)
            .field("error", &self.error)
            .finish()
    }
}

impl<B: Backend> Read for Stream<B> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            // Return what we have rather than block on another refill.
            if n > 0 && self.buffered_len() == 0 {
                break;
            }
            match self.get_byte() {
                Ok(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                Err(StreamError::EndOfStream) => break,
                Err(_) if n > 0 => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(n)
    }
}

impl<B: Backend> Write for Stream<B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut n = 0;
        for &byte in buf {
            match self.put_byte(byte) {
                Ok(_) => n += 1,
                Err(_) if n > 0 => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Stream::flush(self).map_err(Into::into)
    }
}

impl<B: Backend> Seek for Stream<B> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Stream::seek(self, pos).map_err(Into::into)
    }
}
