use nix::sys::signal::Signal;
use std::fmt;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Raw termination status of a reaped child, as returned by `waitpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    raw: i32,
}

impl ProcessExit {
    pub fn from_raw(raw: i32) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> i32 {
        self.raw
    }

    fn status(&self) -> ExitStatus {
        ExitStatus::from_raw(self.raw)
    }

    pub fn success(&self) -> bool {
        self.status().success()
    }

    /// Exit code for a normal exit, `None` if a signal ended the child.
    pub fn code(&self) -> Option<i32> {
        self.status().code()
    }

    pub fn signal_number(&self) -> Option<i32> {
        self.status().signal()
    }

    pub fn signal(&self) -> Option<Signal> {
        self.signal_number().and_then(|sig| Signal::try_from(sig).ok())
    }
}

impl From<ExitStatus> for ProcessExit {
    fn from(status: ExitStatus) -> Self {
        Self::from_raw(status.into_raw())
    }
}

impl fmt::Display for ProcessExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(code) = self.code() {
            return write!(f, "exited with code {}", code);
        }
        match self.signal() {
            Some(signal) => write!(f, "terminated by {}", signal.as_str()),
            None => write!(f, "raw wait status {:#x}", self.raw),
        }
    }
}
