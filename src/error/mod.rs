use std::io;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

/// The error type shared by file streams and process streams.
///
/// `EndOfStream` and `Io` mirror the two sticky stream states; the stream
/// also records them so callers can query them after a short transfer.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("invalid open mode {0:?}")]
    InvalidMode(String),

    #[error("invalid pipe direction {0:?}")]
    InvalidDirection(String),

    #[error("{what} unavailable: {source}")]
    ResourceUnavailable {
        what: String,
        #[source]
        source: io::Error,
    },

    #[error("end of stream")]
    EndOfStream,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stream is in an error state")]
    Faulted,

    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for child process: {0}")]
    Wait(#[source] io::Error),

    #[error("configuration error: {message}")]
    Config { code: u16, message: String },
}

impl StreamError {
    pub fn unavailable(what: impl Into<String>, source: io::Error) -> Self {
        Self::ResourceUnavailable {
            what: what.into(),
            source,
        }
    }

    /// Create a configuration error with a specific `CONFIG_*` code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidMode(_) => ErrorCode::OPEN_INVALID_MODE,
            Self::InvalidDirection(_) => ErrorCode::OPEN_INVALID_DIRECTION,
            Self::ResourceUnavailable { .. } => ErrorCode::OPEN_RESOURCE_UNAVAILABLE,
            Self::EndOfStream => ErrorCode::IO_END_OF_STREAM,
            Self::Io(_) => ErrorCode::IO_FAILED,
            Self::Faulted => ErrorCode::IO_FAULTED,
            Self::Spawn { .. } => ErrorCode::PROC_SPAWN_FAILED,
            Self::Wait(_) => ErrorCode::PROC_WAIT_FAILED,
            Self::Config { code, .. } => *code,
        }
    }

    /// Message prefixed with the `[E####]` code, for user-facing output
    pub fn user_message(&self) -> String {
        format!("[E{:04}] {}", self.code(), self)
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::EndOfStream)
    }

    /// True for the failures that leave a stream in its sticky error state
    pub fn is_io_fault(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Faulted)
    }
}

/// Result alias used across the crate
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Convert a stream error back into `io::Error` for the `std::io` trait impls
impl From<StreamError> for io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Io(e) => e,
            StreamError::EndOfStream => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            StreamError::InvalidMode(_) | StreamError::InvalidDirection(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            other => io::Error::other(other),
        }
    }
}
