use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

use crate::error::StreamError;

/// The six stdio open modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// `r`: read an existing file
    Read,
    /// `w`: write, creating or truncating
    Write,
    /// `a`: append, creating if missing
    Append,
    /// `r+`: read and write an existing file
    ReadUpdate,
    /// `w+`: read and write, creating or truncating
    WriteUpdate,
    /// `a+`: read anywhere, append writes, creating if missing
    AppendUpdate,
}

impl OpenMode {
    pub const ALL: [OpenMode; 6] = [
        OpenMode::Read,
        OpenMode::Write,
        OpenMode::Append,
        OpenMode::ReadUpdate,
        OpenMode::WriteUpdate,
        OpenMode::AppendUpdate,
    ];

    pub fn parse(token: &str) -> Result<Self, StreamError> {
        match token {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            "a" => Ok(Self::Append),
            "r+" => Ok(Self::ReadUpdate),
            "w+" => Ok(Self::WriteUpdate),
            "a+" => Ok(Self::AppendUpdate),
            other => Err(StreamError::InvalidMode(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
            Self::Append => "a",
            Self::ReadUpdate => "r+",
            Self::WriteUpdate => "w+",
            Self::AppendUpdate => "a+",
        }
    }

    pub fn readable(&self) -> bool {
        !matches!(self, Self::Write | Self::Append)
    }

    pub fn writable(&self) -> bool {
        !matches!(self, Self::Read)
    }

    /// Access and creation flags for this mode.
    pub fn options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            Self::Read => options.read(true),
            Self::Write => options.write(true).create(true).truncate(true),
            Self::Append => options.append(true).create(true),
            Self::ReadUpdate => options.read(true).write(true),
            Self::WriteUpdate => options.read(true).write(true).create(true).truncate(true),
            Self::AppendUpdate => options.read(true).append(true).create(true),
        };
        options
    }
}

impl FromStr for OpenMode {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_tokens() {
        for mode in OpenMode::ALL {
            assert_eq!(OpenMode::parse(mode.as_str()).unwrap(), mode);
        }
    }

    #[test]
    fn test_rejects_unknown_tokens() {
        for token in ["", "rw", "x", "R", "r+b", "wa"] {
            let err = OpenMode::parse(token).unwrap_err();
            assert!(matches!(err, StreamError::InvalidMode(ref t) if t == token));
        }
    }

    #[test]
    fn test_access_flags() {
        assert!(OpenMode::Read.readable() && !OpenMode::Read.writable());
        assert!(!OpenMode::Write.readable() && OpenMode::Write.writable());
        assert!(!OpenMode::Append.readable());
        assert!(OpenMode::AppendUpdate.readable() && OpenMode::AppendUpdate.writable());
    }

    #[test]
    fn test_from_str_and_display() {
        let mode: OpenMode = "w+".parse().unwrap();
        assert_eq!(mode, OpenMode::WriteUpdate);
        assert_eq!(mode.to_string(), "w+");
    }
}
