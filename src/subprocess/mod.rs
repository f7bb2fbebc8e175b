//! Streams connected to shell subprocesses (`popen`/`pclose`).

pub mod builder;
pub mod exit;
pub mod process;


pub use builder::{ShellCommand, ShellCommandBuilder};
pub use exit::ProcessExit;
pub use process::ProcessStream;

use std::fmt;
use std::str::FromStr;

use crate::error::StreamError;

/// Which way data flows between the parent stream and the child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `r`: the parent reads what the child writes to its stdout.
    Read,
    /// `w`: the parent writes what the child reads from its stdin.
    Write,
}

impl Direction {
    pub fn parse(token: &str) -> Result<Self, StreamError> {
        match token {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            other => Err(StreamError::InvalidDirection(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
        }
    }
}

impl FromStr for Direction {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
