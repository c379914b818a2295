//! Scoped input streams for `read_file`
//!
//! A [`ScopedStream`] is only valid while the input processor runs. The
//! connection closes it afterwards through a [`CloseGuard`], whether the
//! processor returned normally, failed, or panicked. Any handle kept past
//! that point (the stream is cheaply cloneable) fails every read with a
//! "stream closed" error.

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Message carried by reads on a closed stream
pub const STREAM_CLOSED: &str = "stream closed";

/// Readable handle over a file opened by a disk connection
#[derive(Clone)]
pub struct ScopedStream {
    /// Open reader; `None` once closed
    reader: Arc<Mutex<Option<BufReader<File>>>>,
    path: Arc<PathBuf>,
}

impl ScopedStream {
    pub(crate) fn new(path: &Path, file: File, buffer_size: usize) -> Self {
        Self {
            reader: Arc::new(Mutex::new(Some(BufReader::with_capacity(buffer_size, file)))),
            path: Arc::new(path.to_path_buf()),
        }
    }

    /// Path of the file behind this stream
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the owning connection has closed the stream
    pub fn is_closed(&self) -> bool {
        self.reader.lock().is_none()
    }

    /// Close the stream, releasing the file handle
    pub(crate) fn close(&self) {
        self.reader.lock().take();
    }
}

impl Read for ScopedStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.reader.lock().as_mut() {
            Some(reader) => reader.read(buf),
            None => Err(closed_error()),
        }
    }
}

impl std::fmt::Debug for ScopedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedStream")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::Other, STREAM_CLOSED)
}

/// Closes a stream when dropped
pub(crate) struct CloseGuard(ScopedStream);

impl CloseGuard {
    pub(crate) fn new(stream: &ScopedStream) -> Self {
        Self(stream.clone())
    }
}

impl Drop for CloseGuard {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Consumer of a file's contents, invoked exactly once per `read_file`
pub trait InputProcessor {
    type Output;

    fn process(self, stream: &mut ScopedStream, byte_length: u64) -> io::Result<Self::Output>;
}

impl<F, T> InputProcessor for F
where
    F: FnOnce(&mut ScopedStream, u64) -> io::Result<T>,
{
    type Output = T;

    fn process(self, stream: &mut ScopedStream, byte_length: u64) -> io::Result<T> {
        self(stream, byte_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn stream_over(contents: &[u8]) -> (tempfile::NamedTempFile, ScopedStream) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        let handle = File::open(file.path()).unwrap();
        let stream = ScopedStream::new(file.path(), handle, 64);
        (file, stream)
    }

    #[test]
    fn test_read_until_closed() {
        let (_file, mut stream) = stream_over(b"abc");
        let mut buf = String::new();
        stream.read_to_string(&mut buf).unwrap();
        assert_eq!(buf, "abc");
        assert!(!stream.is_closed());

        stream.close();
        assert!(stream.is_closed());
        let err = stream.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.to_string(), STREAM_CLOSED);
    }

    #[test]
    fn test_guard_closes_all_clones() {
        let (_file, stream) = stream_over(b"abc");
        let mut kept = stream.clone();
        {
            let _guard = CloseGuard::new(&stream);
        }
        assert!(kept.is_closed());
        assert!(kept.read(&mut [0u8; 1]).is_err());
    }
}
