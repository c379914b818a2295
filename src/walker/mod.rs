//! Directory walking
//!
//! This module implements the depth-limited lister used by disk
//! connections. A listing is single-threaded and deterministic: for the
//! same tree it always yields the same items in the same order.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────────────────┐
//!              │   list(root, filter, d)  │
//!              └────────────┬─────────────┘
//!                           │
//!              ┌────────────▼─────────────┐
//!              │  Stack of DirWork frames │
//!              │  - sorted children       │
//!              │  - remaining depth       │
//!              └────────────┬─────────────┘
//!                           │ stat (follows links)
//!              ┌────────────▼─────────────┐
//!              │  filter → Listing.items  │
//!              │  errors → Listing.skipped│
//!              └──────────────────────────┘
//! ```

pub mod lister;

pub use lister::{list, Depth, Listing, SkippedEntry};
