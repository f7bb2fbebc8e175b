use std::io::{self, SeekFrom};
use std::os::fd::RawFd;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Backend;

/// One primitive call observed by a [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Read(usize),
    Write(usize),
    Seek(SeekFrom),
    Release,
}

/// In-memory backend with injectable failures.
///
/// Clones share state, so a test can keep a handle after moving the backend
/// into a stream and inspect the written contents or call history later.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    data: Vec<u8>,
    position: usize,
    max_write: Option<usize>,
    fail_reads: bool,
    fail_writes: bool,
    fail_seeks: bool,
    fail_release: bool,
    released: bool,
    calls: Vec<MockCall>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        let mock = Self::new();
        mock.lock().data = data.into();
        mock
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept at most `limit` bytes per write call.
    pub fn set_max_write(&self, limit: usize) {
        self.lock().max_write = Some(limit);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_seeks(&self, fail: bool) {
        self.lock().fail_seeks = fail;
    }

    pub fn set_fail_release(&self, fail: bool) {
        self.lock().fail_release = fail;
    }

    pub fn contents(&self) -> Vec<u8> {
        self.lock().data.clone()
    }

    pub fn position(&self) -> usize {
        self.lock().position
    }

    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn read_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Read(_)))
            .count()
    }

    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Write(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }
}

fn injected(what: &str) -> io::Error {
    io::Error::other(format!("injected {what} failure"))
}

impl MockState {
    fn check_open(&self) -> io::Result<()> {
        if self.released {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.lock();
        state.calls.push(MockCall::Read(buf.len()));
        state.check_open()?;
        if state.fail_reads {
            return Err(injected("read"));
        }

        let start = state.position.min(state.data.len());
        let n = buf.len().min(state.data.len() - start);
        buf[..n].copy_from_slice(&state.data[start..start + n]);
        state.position = start + n;
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock();
        state.calls.push(MockCall::Write(buf.len()));
        state.check_open()?;
        if state.fail_writes {
            return Err(injected("write"));
        }

        let n = state.max_write.map_or(buf.len(), |limit| limit.min(buf.len()));
        let start = state.position;
        let end = start + n;
        if state.data.len() < end {
            state.data.resize(end, 0);
        }
        state.data[start..end].copy_from_slice(&buf[..n]);
        state.position = end;
        Ok(n)
    }

    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let mut state = self.lock();
        state.calls.push(MockCall::Seek(pos));
        state.check_open()?;
        if state.fail_seeks {
            return Err(injected("seek"));
        }

        let target = match pos {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(delta) => state.position as i128 + delta as i128,
            SeekFrom::End(delta) => state.data.len() as i128 + delta as i128,
        };
        if target < 0 {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        state.position = target as usize;
        Ok(target as u64)
    }

    fn release(&mut self) -> io::Result<()> {
        let mut state = self.lock();
        state.calls.push(MockCall::Release);
        state.check_open()?;
        state.released = true;
        if state.fail_release {
            return Err(injected("release"));
        }
        Ok(())
    }

    fn raw_fd(&self) -> Option<RawFd> {
        None
    }
}
