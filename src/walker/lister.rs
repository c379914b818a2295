//! Depth-limited, order-deterministic directory lister
//!
//! Produces a pre-order, depth-first listing where siblings are sorted by
//! name (byte-wise, case-sensitive). The filter only decides which entries
//! appear in the output; directories rejected by the filter are still
//! descended into when the depth budget allows.
//!
//! ```text
//! root/
//! ├── a/          1. a
//! │   ├── x       2. a/x
//! │   └── y       3. a/y
//! └── b           4. b
//! ```
//!
//! The walk uses an explicit stack of directory frames rather than
//! recursion, so deep trees do not grow the call stack.

use crate::disk::filter::EntryFilter;
use crate::disk::types::{DiskItem, EntryType};
use crate::error::{ConfigError, DiskError, DiskResult};
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// How many directory levels a listing may descend below its root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    /// Recurse at most this many additional levels (0 = direct children)
    Limited(u32),
    /// Recurse until the tree is exhausted
    Unlimited,
}

impl Depth {
    /// Direct children only
    pub const CHILDREN: Depth = Depth::Limited(0);

    /// Convert from the raw form: `-1` is unlimited, `n >= 0` is limited
    pub fn from_raw(raw: i64) -> Result<Self, ConfigError> {
        match raw {
            -1 => Ok(Depth::Unlimited),
            n if n >= 0 => u32::try_from(n)
                .map(Depth::Limited)
                .map_err(|_| ConfigError::InvalidDepth { depth: raw }),
            _ => Err(ConfigError::InvalidDepth { depth: raw }),
        }
    }

    /// Raw form of this depth (`-1` for unlimited)
    pub fn as_raw(self) -> i64 {
        match self {
            Depth::Limited(n) => i64::from(n),
            Depth::Unlimited => -1,
        }
    }

    /// Budget left for the children of a directory at this depth, if any
    fn descend(self) -> Option<Depth> {
        match self {
            Depth::Unlimited => Some(Depth::Unlimited),
            Depth::Limited(0) => None,
            Depth::Limited(n) => Some(Depth::Limited(n - 1)),
        }
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth::CHILDREN
    }
}

impl TryFrom<i32> for Depth {
    type Error = ConfigError;

    fn try_from(raw: i32) -> Result<Self, Self::Error> {
        Depth::from_raw(i64::from(raw))
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Limited(n) => write!(f, "{}", n),
            Depth::Unlimited => f.write_str("unlimited"),
        }
    }
}

/// An entry the lister could not classify or descend into
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub error: DiskError,
}

/// Result of a listing: ordered items plus per-entry problems
#[derive(Debug, Default)]
pub struct Listing {
    /// Items accepted by the filter, in traversal order
    pub items: Vec<DiskItem>,
    /// Entries skipped because of I/O errors
    pub skipped: Vec<SkippedEntry>,
}

impl Listing {
    /// True if no entry was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Number of directories among the items
    pub fn dir_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_directory()).count()
    }

    /// Number of regular files among the items
    pub fn file_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_file()).count()
    }
}

/// A child read from a directory, before it has been stat'd
struct Child {
    name: OsString,
    path: PathBuf,
}

/// Directory work item: remaining children and their depth budget
struct DirWork {
    children: std::vec::IntoIter<Child>,
    depth: Depth,
}

/// List the contents of `root`
///
/// Errors reading `root` itself abort the listing; errors on individual
/// entries below it are recorded in [`Listing::skipped`].
pub fn list<F>(root: &Path, filter: &F, depth: Depth) -> DiskResult<Listing>
where
    F: EntryFilter + ?Sized,
{
    let start = Instant::now();

    let meta = fs::metadata(root).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            DiskError::NotFound {
                path: root.to_path_buf(),
            }
        } else {
            DiskError::StatFailed {
                path: root.to_path_buf(),
                source,
            }
        }
    })?;

    if !meta.is_dir() {
        return Err(DiskError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let children = read_sorted(root).map_err(|source| DiskError::ReadDirFailed {
        path: root.to_path_buf(),
        source,
    })?;

    let mut listing = Listing::default();
    let mut stack = vec![DirWork {
        children: children.into_iter(),
        depth,
    }];

    while let Some(work) = stack.last_mut() {
        let Some(child) = work.children.next() else {
            stack.pop();
            continue;
        };
        let depth = work.depth;

        let item = match classify(child) {
            Ok(item) => item,
            Err(skipped) => {
                warn!("Skipping '{}': {}", skipped.path.display(), skipped.error);
                listing.skipped.push(skipped);
                continue;
            }
        };

        let recurse = if item.is_directory() {
            depth.descend().map(|next| (item.path().to_path_buf(), next))
        } else {
            None
        };

        if filter.accept(&item) {
            trace!(path = %item.path().display(), "Accepted entry");
            listing.items.push(item);
        }

        if let Some((dir, next)) = recurse {
            match read_sorted(&dir) {
                Ok(children) => stack.push(DirWork {
                    children: children.into_iter(),
                    depth: next,
                }),
                Err(source) => {
                    let error = DiskError::ReadDirFailed {
                        path: dir.clone(),
                        source,
                    };
                    warn!("Skipping contents of '{}': {}", dir.display(), error);
                    listing.skipped.push(SkippedEntry { path: dir, error });
                }
            }
        }
    }

    debug!(
        root = %root.display(),
        depth = %depth,
        items = listing.items.len(),
        skipped = listing.skipped.len(),
        elapsed = ?start.elapsed(),
        "Listed contents"
    );

    Ok(listing)
}

/// Read the direct children of `dir`, sorted by name
fn read_sorted(dir: &Path) -> io::Result<Vec<Child>> {
    let mut children = fs::read_dir(dir)?
        .map(|entry| {
            entry.map(|e| Child {
                name: e.file_name(),
                path: e.path(),
            })
        })
        .collect::<io::Result<Vec<_>>>()?;

    children.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(children)
}

/// Stat a child, following symbolic links
fn classify(child: Child) -> Result<DiskItem, SkippedEntry> {
    match fs::metadata(&child.path) {
        Ok(meta) => Ok(DiskItem::new(
            child.name.to_string_lossy(),
            child.path,
            EntryType::from_file_type(meta.file_type()),
        )),
        Err(source) => {
            let error = if source.kind() == io::ErrorKind::NotFound {
                DiskError::NotFound {
                    path: child.path.clone(),
                }
            } else {
                DiskError::StatFailed {
                    path: child.path.clone(),
                    source,
                }
            };
            Err(SkippedEntry {
                path: child.path,
                error,
            })
        }
    }
}
