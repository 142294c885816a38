//! Linked external JSON files.
//!
//! A region may hand its records off to a separate file, either through an
//! `#include "file.json"` directive or, when the inline records carry no
//! form, through a sibling file with the document's base name.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::region::RegionContent;

/// File access used for external record files.
pub trait FileSystem: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// External file that receives merges for `document`, if any.
pub fn external_target(
    document: &Path,
    content: &RegionContent,
    fallback_extension: &str,
    fs: &dyn FileSystem,
) -> Option<PathBuf> {
    match content {
        RegionContent::Include(path) => Some(resolve_include(document, path)),
        RegionContent::Records(_) if content.has_form() => None,
        RegionContent::Records(_) => {
            let sibling = document.with_extension(fallback_extension);
            (sibling != document && fs.exists(&sibling)).then_some(sibling)
        }
    }
}

/// Relative include paths resolve against the document's directory.
pub fn resolve_include(document: &Path, include: &Path) -> PathBuf {
    if include.is_absolute() {
        return include.to_path_buf();
    }
    document
        .parent()
        .map_or_else(|| include.to_path_buf(), |dir| dir.join(include))
}
