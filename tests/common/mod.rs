//! Common test utilities and helpers
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory holding the files a test streams through
pub struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("create temp dir"),
        }
    }

    /// Get the path to the test directory
    pub fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `name` inside the test directory
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Create a file in the test directory
    pub fn create_file(&self, name: impl AsRef<Path>, content: &[u8]) -> PathBuf {
        let full_path = self.path(name);
        fs::write(&full_path, content).expect("write fixture");
        full_path
    }

    /// Read a file from the test directory
    pub fn read_file(&self, name: impl AsRef<Path>) -> Vec<u8> {
        fs::read(self.path(name)).expect("read fixture")
    }
}

/// Deterministic non-repeating-looking bytes, so offsets are easy to check
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}
