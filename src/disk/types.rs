//! Disk entry types
//!
//! These types represent filesystem entries produced by directory listings.
//! Items are created fresh for every listing call.

use std::fs;
use std::path::{Path, PathBuf};

/// Type of filesystem entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Anything else (device, fifo, socket)
    Other,
}

impl EntryType {
    /// Classify a file type as reported by the OS
    ///
    /// Symbolic links are expected to be resolved by the caller; an
    /// unresolved link classifies as `Other`.
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_file() {
            EntryType::File
        } else if file_type.is_dir() {
            EntryType::Directory
        } else {
            EntryType::Other
        }
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        *self == EntryType::File
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }

    /// One-character marker used in listings
    pub fn marker(&self) -> char {
        match self {
            EntryType::File => 'f',
            EntryType::Directory => 'd',
            EntryType::Other => '?',
        }
    }
}

/// One entry produced by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskItem {
    /// Final path segment
    name: String,

    /// Full path as seen by the walker
    path: PathBuf,

    /// Entry type
    entry_type: EntryType,
}

impl DiskItem {
    /// Create a new item
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, entry_type: EntryType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            entry_type,
        }
    }

    /// Entry name (not full path)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path, joined with the platform separator
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entry type
    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Check if this item is a regular file
    pub fn is_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// Check if this item is a directory
    pub fn is_directory(&self) -> bool {
        self.entry_type.is_dir()
    }
}
