//! # streamio
//!
//! Buffered stdio-style streams over regular files and shell subprocess
//! pipes.
//!
//! ## Usage
//!
//! ```no_run
//! use streamio::{ProcessStream, Stream};
//!
//! # fn main() -> streamio::Result<()> {
//! let mut out = Stream::open("greeting.txt", "w")?;
//! out.write_elements(b"hello\n", 1, 6);
//! out.close()?;
//!
//! let mut child = ProcessStream::spawn("wc -c < greeting.txt", "r")?;
//! while let Ok(byte) = child.get_byte() {
//!     print!("{}", byte as char);
//! }
//! let exit = child.close()?;
//! assert_eq!(exit.code(), Some(0));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `backend` - Primitive read/write/seek/release operations a stream is built on
//! - `config` - Buffer capacity, shell and log level from TOML and environment
//! - `error` - Error type and numeric error codes
//! - `logging` - tracing subscriber setup for the binary
//! - `stream` - The buffered stream core
//! - `subprocess` - Streams connected to shell subprocesses
pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod stream;
pub mod subprocess;

pub use backend::{Backend, FdBackend, MockBackend};
pub use config::StreamConfig;
pub use error::{Result, StreamError};
pub use stream::{BufferState, ErrorState, OpenMode, Stream};
pub use subprocess::{Direction, ProcessExit, ProcessStream, ShellCommand, ShellCommandBuilder};
