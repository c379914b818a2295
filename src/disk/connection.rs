//! Read-only disk connection
//!
//! A `ReadOnlyDiskConnection` is a pooled, stateful handle over the local
//! filesystem. It is bound to no root: every operation takes a full or
//! relative path, resolved against the process working directory.
//!
//! Key considerations:
//! - Query operations hold no native handle; each is a single stat
//! - `read_file` owns the only handle it opens and always closes it
//! - After disposal every filesystem operation fails with
//!   [`DiskError::Disposed`]

use crate::disk::filter::{AcceptAll, EntryFilter};
use crate::disk::space::volume_space;
use crate::disk::stream::{CloseGuard, InputProcessor, ScopedStream};
use crate::disk::types::DiskItem;
use crate::error::{DiskError, DiskResult};
use crate::pool::{ConnectionFactory, FactoryError, PooledResource};
use crate::walker::{lister, Depth, Listing};
use std::fs::{self, File, Metadata};
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

/// Default buffer size for `read_file` streams
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Capabilities shared by every disk connection variant
///
/// Callers branch on [`is_read_write`](Self::is_read_write) instead of
/// downcasting.
pub trait DiskConnection: PooledResource {
    /// Whether this connection can modify the filesystem
    fn is_read_write(&self) -> bool;

    fn check_if_file_exists(&self, path: &Path) -> DiskResult<bool>;

    fn check_if_directory_exists(&self, path: &Path) -> DiskResult<bool>;

    fn check_if_hidden(&self, path: &Path) -> DiskResult<bool>;

    fn get_modified_time(&self, path: &Path) -> DiskResult<Option<i64>>;

    fn get_free_space(&self, path: &Path) -> DiskResult<Option<u64>>;

    fn get_usable_space(&self, path: &Path) -> DiskResult<Option<u64>>;

    fn list_contents_report(
        &self,
        path: &Path,
        filter: &dyn EntryFilter,
        depth: Depth,
    ) -> DiskResult<Listing>;
}

/// Read-only connection to the local filesystem
#[derive(Debug, Clone)]
pub struct ReadOnlyDiskConnection {
    /// Set once the connection has been disposed
    disposed: bool,

    /// Buffer size for `read_file` streams
    buffer_size: usize,
}

impl ReadOnlyDiskConnection {
    /// Create a connection with the default buffer size
    pub fn new() -> Self {
        Self::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a connection with a custom `read_file` buffer size
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            disposed: false,
            buffer_size: buffer_size.max(1),
        }
    }

    /// Always `false` for this variant
    pub fn is_read_write(&self) -> bool {
        false
    }

    /// Buffer size used for `read_file` streams
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Check whether `path` exists and is a regular file
    pub fn check_if_file_exists(&self, path: impl AsRef<Path>) -> DiskResult<bool> {
        Ok(self.stat(path.as_ref())?.is_some_and(|m| m.is_file()))
    }

    /// Check whether `path` exists and is a directory
    pub fn check_if_directory_exists(&self, path: impl AsRef<Path>) -> DiskResult<bool> {
        Ok(self.stat(path.as_ref())?.is_some_and(|m| m.is_dir()))
    }

    /// Check whether `path` exists and is hidden
    ///
    /// On Unix an entry is hidden when its name starts with a dot; on
    /// Windows the hidden attribute is checked.
    pub fn check_if_hidden(&self, path: impl AsRef<Path>) -> DiskResult<bool> {
        let path = path.as_ref();
        self.ensure_open()?;
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(is_hidden(path, &meta)),
            Err(e) if is_missing(&e) => Ok(false),
            Err(source) => Err(DiskError::StatFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Last modification time in milliseconds since the Unix epoch
    ///
    /// Returns `None` if the entry does not exist.
    pub fn get_modified_time(&self, path: impl AsRef<Path>) -> DiskResult<Option<i64>> {
        let path = path.as_ref();
        let Some(meta) = self.stat(path)? else {
            return Ok(None);
        };

        let modified = meta.modified().map_err(|source| DiskError::StatFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(system_time_millis(modified)))
    }

    /// Free bytes on the volume containing `path`, or `None` if it is missing
    pub fn get_free_space(&self, path: impl AsRef<Path>) -> DiskResult<Option<u64>> {
        let path = path.as_ref();
        if self.stat(path)?.is_none() {
            return Ok(None);
        }
        Ok(Some(volume_space(path)?.free))
    }

    /// Bytes usable by this process on the volume containing `path`, or
    /// `None` if it is missing
    pub fn get_usable_space(&self, path: impl AsRef<Path>) -> DiskResult<Option<u64>> {
        let path = path.as_ref();
        if self.stat(path)?.is_none() {
            return Ok(None);
        }
        Ok(Some(volume_space(path)?.usable))
    }

    /// Read a file through a scoped stream
    ///
    /// Opens `path`, invokes `processor` exactly once with a stream at
    /// offset 0 and the file's byte length, then closes the stream no matter
    /// how the processor finished. Reads through a stream handle kept past
    /// the processor fail with a "stream closed" error.
    pub fn read_file<P>(&self, path: impl AsRef<Path>, processor: P) -> DiskResult<P::Output>
    where
        P: InputProcessor,
    {
        let path = path.as_ref();
        self.ensure_open()?;

        let io_error = |source: io::Error| DiskError::Io {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(io_error)?;
        let byte_length = file.metadata().map_err(io_error)?.len();

        let mut stream = ScopedStream::new(path, file, self.buffer_size);
        let guard = CloseGuard::new(&stream);

        trace!(path = %path.display(), byte_length, "Invoking input processor");
        let result = processor.process(&mut stream, byte_length);
        drop(guard);

        result.map_err(|source| {
            debug!(path = %path.display(), error = %source, "Input processor failed");
            DiskError::Processor {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// List the contents of `path` without filtering
    ///
    /// See [`list_contents_report`](Self::list_contents_report).
    pub fn list_contents(&self, path: impl AsRef<Path>, depth: Depth) -> DiskResult<Vec<DiskItem>> {
        self.list_contents_filtered(path, &AcceptAll, depth)
    }

    /// List the contents of `path`, keeping only items accepted by `filter`
    pub fn list_contents_filtered<F>(
        &self,
        path: impl AsRef<Path>,
        filter: &F,
        depth: Depth,
    ) -> DiskResult<Vec<DiskItem>>
    where
        F: EntryFilter + ?Sized,
    {
        Ok(self.list_contents_report(path, filter, depth)?.items)
    }

    /// List the contents of `path` along with the entries that were skipped
    ///
    /// Items come out in pre-order with siblings sorted by name. A missing
    /// root is reported as [`DiskError::NotFound`].
    pub fn list_contents_report<F>(
        &self,
        path: impl AsRef<Path>,
        filter: &F,
        depth: Depth,
    ) -> DiskResult<Listing>
    where
        F: EntryFilter + ?Sized,
    {
        self.ensure_open()?;
        lister::list(path.as_ref(), filter, depth)
    }

    fn ensure_open(&self) -> DiskResult<()> {
        if self.disposed {
            Err(DiskError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Stat `path`, mapping "does not exist" to `None`
    fn stat(&self, path: &Path) -> DiskResult<Option<Metadata>> {
        self.ensure_open()?;
        match fs::metadata(path) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if is_missing(&e) => Ok(None),
            Err(source) => Err(DiskError::StatFailed {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl Default for ReadOnlyDiskConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl PooledResource for ReadOnlyDiskConnection {
    fn mark_disposed(&mut self) {
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl DiskConnection for ReadOnlyDiskConnection {
    fn is_read_write(&self) -> bool {
        false
    }

    fn check_if_file_exists(&self, path: &Path) -> DiskResult<bool> {
        ReadOnlyDiskConnection::check_if_file_exists(self, path)
    }

    fn check_if_directory_exists(&self, path: &Path) -> DiskResult<bool> {
        ReadOnlyDiskConnection::check_if_directory_exists(self, path)
    }

    fn check_if_hidden(&self, path: &Path) -> DiskResult<bool> {
        ReadOnlyDiskConnection::check_if_hidden(self, path)
    }

    fn get_modified_time(&self, path: &Path) -> DiskResult<Option<i64>> {
        ReadOnlyDiskConnection::get_modified_time(self, path)
    }

    fn get_free_space(&self, path: &Path) -> DiskResult<Option<u64>> {
        ReadOnlyDiskConnection::get_free_space(self, path)
    }

    fn get_usable_space(&self, path: &Path) -> DiskResult<Option<u64>> {
        ReadOnlyDiskConnection::get_usable_space(self, path)
    }

    fn list_contents_report(
        &self,
        path: &Path,
        filter: &dyn EntryFilter,
        depth: Depth,
    ) -> DiskResult<Listing> {
        ReadOnlyDiskConnection::list_contents_report(self, path, filter, depth)
    }
}

/// Factory producing read-only connections for a pool
#[derive(Debug, Clone)]
pub struct ReadOnlyDiskConnectionFactory {
    buffer_size: usize,
}

impl ReadOnlyDiskConnectionFactory {
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the `read_file` buffer size of created connections
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }
}

impl Default for ReadOnlyDiskConnectionFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionFactory<ReadOnlyDiskConnection> for ReadOnlyDiskConnectionFactory {
    fn create(&self) -> Result<ReadOnlyDiskConnection, FactoryError> {
        Ok(ReadOnlyDiskConnection::with_buffer_size(self.buffer_size))
    }
}

fn is_missing(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::NotFound {
        return true;
    }
    // A path component that is a file ("file.txt/child")
    #[cfg(unix)]
    if err.raw_os_error() == Some(libc::ENOTDIR) {
        return true;
    }
    false
}

#[cfg(unix)]
fn is_hidden(path: &Path, _meta: &Metadata) -> bool {
    use std::os::unix::ffi::OsStrExt;

    path.file_name()
        .is_some_and(|name| name.as_bytes().starts_with(b"."))
}

#[cfg(windows)]
fn is_hidden(_path: &Path, meta: &Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(any(unix, windows)))]
fn is_hidden(path: &Path, _meta: &Metadata) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}

fn system_time_millis(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_millis() as i64,
        Err(before) => -(before.duration().as_millis() as i64),
    }
}
