//! Primitive operations a stream is layered on.
//!
//! A [`Backend`] is one open handle: a regular file, one end of a pipe, or the
//! in-memory [`MockBackend`] used by tests. The buffered core never touches a
//! descriptor directly; it only issues whole-block reads and writes, seeks and
//! a final release through this trait.

pub mod mock;

pub use mock::{MockBackend, MockCall};

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

pub trait Backend {
    /// Read up to `buf.len()` bytes. `Ok(0)` means end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write some prefix of `buf`, returning how much was accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Move the handle's position, returning the new absolute offset.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64>;

    /// Close the handle. Only the first call can succeed.
    fn release(&mut self) -> io::Result<()>;

    /// Descriptor backing this handle, `None` once released.
    fn raw_fd(&self) -> Option<RawFd>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdKind {
    File,
    Pipe,
}

/// A backend that owns exactly one descriptor.
#[derive(Debug)]
pub struct FdBackend {
    file: Option<File>,
    kind: FdKind,
}

impl FdBackend {
    pub fn from_file(file: File) -> Self {
        Self {
            file: Some(file),
            kind: FdKind::File,
        }
    }

    /// Wrap one end of a pipe, e.g. a `ChildStdin` or `ChildStdout`.
    pub fn from_pipe(end: impl Into<OwnedFd>) -> Self {
        Self {
            file: Some(File::from(end.into())),
            kind: FdKind::Pipe,
        }
    }

    pub fn kind(&self) -> FdKind {
        self.kind
    }

    fn handle(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_handle)
    }
}

fn closed_handle() -> io::Error {
    io::Error::from_raw_os_error(libc::EBADF)
}

impl Backend for FdBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle()?.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle()?.write(buf)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.handle()?.seek(pos)
    }

    fn release(&mut self) -> io::Result<()> {
        let fd = self.file.take().ok_or_else(closed_handle)?.into_raw_fd();
        // SAFETY: `fd` was just detached from its `File`, nothing else owns it
        // and it is closed exactly once here.
        if unsafe { libc::close(fd) } == -1 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    fn raw_fd(&self) -> Option<RawFd> {
        self.file.as_ref().map(AsRawFd::as_raw_fd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fd_backend_read_write_seek() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.bin");
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .unwrap();

        let mut backend = FdBackend::from_file(file);
        assert_eq!(backend.kind(), FdKind::File);
        assert_eq!(backend.write(b"hello").unwrap(), 5);
        assert_eq!(backend.seek(SeekFrom::Start(1)).unwrap(), 1);

        let mut buf = [0u8; 8];
        let n = backend.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"ello");
    }

    #[test]
    fn test_release_is_single_shot() {
        let temp_dir = TempDir::new().unwrap();
        let file = fs::File::create(temp_dir.path().join("f")).unwrap();
        let mut backend = FdBackend::from_file(file);

        assert!(backend.raw_fd().is_some());
        backend.release().unwrap();
        assert!(backend.raw_fd().is_none());

        let err = backend.release().unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::EBADF));
        assert!(backend.write(b"x").is_err());
    }

    #[test]
    fn test_pipe_end_cannot_seek() {
        let mut child = std::process::Command::new("true")
            .stdout(std::process::Stdio::piped())
            .spawn()
            .unwrap();
        let stdout = child.stdout.take().unwrap();
        let mut backend = FdBackend::from_pipe(stdout);

        assert_eq!(backend.kind(), FdKind::Pipe);
        assert!(backend.seek(SeekFrom::Current(0)).is_err());
        backend.release().unwrap();
        child.wait().unwrap();
    }
}
