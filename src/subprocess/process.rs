use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};
use std::process::{Child, Stdio};
use tracing::{debug, warn};

use super::{Direction, ProcessExit, ShellCommand};
use crate::backend::FdBackend;
use crate::config::StreamConfig;
use crate::error::{Result, StreamError};
use crate::stream::Stream;

/// A buffered stream connected to a shell subprocess through a pipe.
///
/// The stream owns the parent's end of the pipe; the child's end lives only
/// in the child. Data operations go through the inner [`Stream`] via
/// `Deref`, and [`ProcessStream::close`] reaps the child.
#[derive(Debug)]
pub struct ProcessStream {
    stream: Stream<FdBackend>,
    child: Child,
    direction: Direction,
    reaped: bool,
}

impl ProcessStream {
    /// Run `command_line` through `/bin/sh` with a `r` or `w` pipe.
    pub fn spawn(command_line: &str, direction: &str) -> Result<Self> {
        let direction = Direction::parse(direction)?;
        Self::spawn_with(ShellCommand::new(command_line), direction, &StreamConfig::default())
    }

    pub fn spawn_with(
        command: ShellCommand,
        direction: Direction,
        config: &StreamConfig,
    ) -> Result<Self> {
        let mut cmd = command.to_command(&config.shell);
        match direction {
            Direction::Read => cmd.stdout(Stdio::piped()),
            Direction::Write => cmd.stdin(Stdio::piped()),
        };

        let mut child = cmd.spawn().map_err(|source| StreamError::Spawn {
            command: command.command_line.clone(),
            source,
        })?;

        let end = match direction {
            Direction::Read => child.stdout.take().map(FdBackend::from_pipe),
            Direction::Write => child.stdin.take().map(FdBackend::from_pipe),
        };
        let Some(backend) = end else {
            reap_quietly(&mut child);
            return Err(StreamError::unavailable(
                "pipe",
                io::Error::other("child pipe end missing"),
            ));
        };

        debug!(
            "Spawned pid {} for '{}' ({} pipe)",
            child.id(),
            command.command_line,
            direction
        );
        Ok(Self {
            stream: Stream::with_backend(backend, config.buffer_capacity),
            child,
            direction,
            reaped: false,
        })
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Deliver `signal` to the child, e.g. to end it before [`Self::close`].
    pub fn send_signal(&self, signal: Signal) -> Result<()> {
        let pid = Pid::from_raw(self.child.id() as i32);
        kill(pid, signal).map_err(|errno| StreamError::Io(errno.into()))
    }

    /// Flush, close the pipe end, then block until the child exits.
    ///
    /// The child is always reaped. A flush failure takes precedence over a
    /// pipe close failure, which takes precedence over a failed wait.
    pub fn close(mut self) -> Result<ProcessExit> {
        let (flushed, released) = self.stream.shutdown();
        let waited = self.child.wait();
        self.reaped = true;

        flushed?;
        released?;
        let exit = ProcessExit::from(waited.map_err(StreamError::Wait)?);
        debug!("Child {} {}", self.child.id(), exit);
        Ok(exit)
    }
}

fn reap_quietly(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("Kill of pid {} failed: {}", child.id(), e);
    }
    if let Err(e) = child.wait() {
        warn!("Could not reap pid {}: {}", child.id(), e);
    }
}

impl Deref for ProcessStream {
    type Target = Stream<FdBackend>;

    fn deref(&self) -> &Self::Target {
        &self.stream
    }
}

impl DerefMut for ProcessStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.stream
    }
}

impl Read for ProcessStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ProcessStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.stream)
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        if self.reaped {
            return;
        }
        let (flushed, released) = self.stream.shutdown();
        if let Err(e) = flushed {
            warn!("Dropping process stream lost pending writes: {}", e);
        }
        if let Err(e) = released {
            warn!("Closing pipe to pid {} failed: {}", self.child.id(), e);
        }
        if let Err(e) = self.child.wait() {
            warn!("Could not reap pid {}: {}", self.child.id(), e);
        }
    }
}
