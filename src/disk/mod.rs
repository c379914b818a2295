//! Disk access module
//!
//! This module provides read-only, pooled access to the local filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │               ReadOnlyDiskConnection                │
//! │  - Leased from a Pool, one holder at a time         │
//! │  - Stat-based queries (exists, hidden, mtime)       │
//! │  - Sorted, depth-limited listings                   │
//! │  - read_file with a guaranteed-closing stream       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                  std::fs + statvfs                  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use disk_walker::disk::{read_only_pool, NameContains};
//! use disk_walker::walker::Depth;
//!
//! let pool = read_only_pool("disks", 4).unwrap();
//! let conn = pool.get_connection().unwrap();
//!
//! let items = conn
//!     .list_contents_filtered("/var/log", &NameContains::new(".log"), Depth::Unlimited)
//!     .unwrap();
//! for item in items {
//!     println!("{}", item.path().display());
//! }
//!
//! conn.return_to_pool();
//! ```

mod connection;
pub mod filter;
pub mod space;
pub mod stream;
pub mod types;

pub use connection::{
    DiskConnection, ReadOnlyDiskConnection, ReadOnlyDiskConnectionFactory, DEFAULT_BUFFER_SIZE,
};
pub use filter::{AcceptAll, AllOf, EntryFilter, NameContains, NamePattern};
pub use space::VolumeSpace;
pub use stream::{InputProcessor, ScopedStream, STREAM_CLOSED};
pub use types::{DiskItem, EntryType};

use crate::error::PoolResult;
use crate::pool::{Pool, PoolConfig};

/// Create a pool of read-only connections with default settings
pub fn read_only_pool(name: &str, max_size: usize) -> PoolResult<Pool<ReadOnlyDiskConnection>> {
    Pool::new(PoolConfig::new(
        name,
        ReadOnlyDiskConnectionFactory::new(),
        max_size,
    ))
}
