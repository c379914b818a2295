//! Error types for disk-walker
//!
//! This module defines the error hierarchy for:
//! - Pool lifecycle errors (factory failures, foreign leases, locked config)
//! - Disk connection errors (stat, readdir, open/read, disposed use)
//! - Configuration and CLI errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Errors carry the path or pool name they relate to
//! - "Does not exist" is not an error for metadata queries; those return
//!   `false` or `None` instead

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the disk-walker crate
#[derive(Error, Debug)]
pub enum Error {
    /// Disk connection errors
    #[error("Disk error: {0}")]
    Disk(#[from] DiskError),

    /// Pool errors
    #[error("Pool error: {0}")]
    Pool(#[from] PoolError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors outside of a connection (stdout, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors raised by a disk connection
#[derive(Error, Debug)]
pub enum DiskError {
    /// The connection was disposed and can no longer touch the filesystem
    #[error("Connection has been disposed")]
    Disposed,

    /// Root path of a listing does not exist
    #[error("Path not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Root path of a listing is not a directory
    #[error("Not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Reading a directory failed
    #[error("Failed to read directory '{path}': {source}")]
    ReadDirFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Stat operation failed for a reason other than the entry being missing
    #[error("Failed to stat '{path}': {source}")]
    StatFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Opening or reading a file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The input processor passed to `read_file` failed
    #[error("Processor failed while reading '{path}': {source}")]
    Processor {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Operation not available on this platform
    #[error("Unsupported operation '{operation}' on this platform")]
    Unsupported { operation: &'static str },
}

impl DiskError {
    /// Check if this error only affects a single entry of a walk
    ///
    /// Recoverable errors are recorded as skipped entries by the lister
    /// instead of aborting the whole listing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DiskError::NotFound { .. }
                | DiskError::StatFailed { .. }
                | DiskError::ReadDirFailed { .. }
        )
    }

    /// The path this error refers to, if any
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            DiskError::NotFound { path }
            | DiskError::NotADirectory { path }
            | DiskError::ReadDirFailed { path, .. }
            | DiskError::StatFailed { path, .. }
            | DiskError::Io { path, .. }
            | DiskError::Processor { path, .. } => Some(path),
            DiskError::Disposed | DiskError::Unsupported { .. } => None,
        }
    }
}

/// Errors raised by the resource pool
#[derive(Error, Debug)]
pub enum PoolError {
    /// The factory failed to produce a connection
    #[error("Pool '{pool}' failed to create a connection: {source}")]
    Factory {
        pool: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A lease from another pool was handed to this pool
    #[error("Connection {id} does not belong to pool '{pool}'")]
    ForeignConnection { pool: String, id: u64 },

    /// The pool configuration is immutable
    #[error("Pool '{pool}' has an immutable configuration")]
    ConfigLocked { pool: String },

    /// Invalid pool capacity
    #[error("Invalid max size {size} for pool '{pool}': must be at least 1")]
    InvalidMaxSize { pool: String, size: usize },
}

impl PoolError {
    /// Wrap an arbitrary factory failure
    pub fn factory<E>(pool: impl Into<String>, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        PoolError::Factory {
            pool: pool.into(),
            source: source.into(),
        }
    }
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid connection count
    #[error("Invalid connection count {count}: must be between 1 and {max}")]
    InvalidConnectionCount { count: usize, max: usize },

    /// Invalid read buffer size
    #[error("Invalid buffer size {size}: must be between {min} and {max}")]
    InvalidBufferSize { size: usize, min: usize, max: usize },

    /// Invalid depth value
    #[error("Invalid depth {depth}: use -1 for unlimited or a value >= 0")]
    InvalidDepth { depth: i64 },

    /// Invalid name pattern
    #[error("Invalid name pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type alias for Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for DiskError
pub type DiskResult<T> = std::result::Result<T, DiskError>;

/// Result type alias for PoolError
pub type PoolResult<T> = std::result::Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disk_error_recoverable() {
        let stat_failed = DiskError::StatFailed {
            path: "/test".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(stat_failed.is_recoverable());

        assert!(!DiskError::Disposed.is_recoverable());
        let not_dir = DiskError::NotADirectory {
            path: "/test".into(),
        };
        assert!(!not_dir.is_recoverable());
    }

    #[test]
    fn test_error_conversion() {
        let disk_err = DiskError::NotFound {
            path: "/missing".into(),
        };
        let err: Error = disk_err.into();
        assert!(matches!(err, Error::Disk(_)));

        let pool_err = PoolError::ConfigLocked { pool: "p".into() };
        let err: Error = pool_err.into();
        assert!(matches!(err, Error::Pool(_)));
    }

    #[test]
    fn test_factory_error_message() {
        let err = PoolError::factory("disks", "no handles left");
        assert_eq!(
            err.to_string(),
            "Pool 'disks' failed to create a connection: no handles left"
        );
    }

    #[test]
    fn test_error_path() {
        let err = DiskError::Io {
            path: "/data/file.txt".into(),
            source: io::Error::from(io::ErrorKind::UnexpectedEof),
        };
        assert_eq!(err.path(), Some(std::path::Path::new("/data/file.txt")));
        assert_eq!(DiskError::Disposed.path(), None);
    }
}
