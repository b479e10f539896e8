//! Destinations for generated files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::CodegenError;

/// Accepts generated files.
pub trait FileSink {
    /// Writes `contents` to `path`, creating or truncating it.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the file cannot be written.
    fn save_file(&mut self, path: &Path, contents: &str) -> Result<(), CodegenError>;
}

/// Writes files to disk, creating parent directories as needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl FileSink for FsSink {
    fn save_file(&mut self, path: &Path, contents: &str) -> Result<(), CodegenError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| CodegenError::io(path, e))
    }
}

/// Keeps files in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contents written to `path`.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    /// Returns the number of files written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no file was written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over written files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.files.iter().map(|(p, c)| (p.as_path(), c.as_str()))
    }
}

impl FileSink for MemorySink {
    fn save_file(&mut self, path: &Path, contents: &str) -> Result<(), CodegenError> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_sink_creates_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("MyGame").join("Example").join("Monster.py");
        FsSink.save_file(&path, "x = 1\n").expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "x = 1\n");
    }

    #[test]
    fn test_fs_sink_reports_path_on_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").expect("write");
        let err = FsSink
            .save_file(&blocker.join("child.py"), "")
            .expect_err("parent is a file");
        assert!(matches!(err, CodegenError::Io { .. }));
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.save_file(Path::new("a/b.go"), "package b\n").expect("write");
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.get("a/b.go"), Some("package b\n"));
        assert!(sink.get("missing").is_none());
    }
}
