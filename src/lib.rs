//! disk-walker - Pooled, Read-Only Disk Access
//!
//! A library for querying, listing and reading the local filesystem through
//! a bounded pool of stateful connections.
//!
//! # Features
//!
//! - **Bounded Pool**: A generic resource pool hands out exclusive leases,
//!   blocks callers when exhausted and recycles connections on return.
//!
//! - **Read-Only Connections**: Stat-based queries (exists, hidden, mtime,
//!   free and usable space) that never modify the filesystem.
//!
//! - **Deterministic Listings**: Pre-order, depth-limited listings with
//!   siblings sorted by name and optional name filters.
//!
//! - **Scoped Reads**: `read_file` hands a processor a buffered stream that
//!   is guaranteed to be closed when the processor returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Callers                                │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ get_connection / return_to_pool
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Pool<ReadOnlyDiskConnection>                 │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────┐     │
//! │  │  Idle (LIFO) │   │   In use     │   │  Factory         │     │
//! │  └──────────────┘   └──────────────┘   └──────────────────┘     │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ Leased<C>
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ReadOnlyDiskConnection                      │
//! │   stat queries  │  list_contents (walker)  │  read_file         │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────┐
//!                    │   Local disk     │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Direct children of a directory
//! disk-walker list ./data
//!
//! # Every .txt file below it
//! disk-walker list ./data -d -1 --contains .txt
//!
//! # Metadata for one path
//! disk-walker stat ./data/read/hello.txt
//! ```

pub mod config;
pub mod disk;
pub mod error;
pub mod pool;
pub mod report;
pub mod walker;

pub use config::{CliArgs, WalkConfig};
pub use disk::{
    read_only_pool, DiskConnection, DiskItem, EntryFilter, EntryType, ReadOnlyDiskConnection,
    ScopedStream,
};
pub use error::{DiskError, Error, PoolError, Result};
pub use pool::{Leased, Pool, PoolConfig, PoolStats};
pub use walker::{Depth, Listing};
