//! Test helpers shared across sync unit tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::external::FileSystem;

/// In-memory files for engine tests.
#[derive(Debug, Default)]
pub(crate) struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryFileSystem {
    pub(crate) fn with_file(self, path: &str, contents: &str) -> Self {
        self.files
            .lock()
            .insert(PathBuf::from(path), contents.to_string());
        self
    }

    pub(crate) fn contents(&self, path: &str) -> Option<String> {
        self.files.lock().get(Path::new(path)).cloned()
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.files
            .lock()
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }
}
