//! Inclusion filters for directory listings
//!
//! A filter decides whether a traversed entry appears in the output. It
//! never controls traversal: the lister still descends into directories
//! that a filter rejects.

use crate::disk::types::DiskItem;
use regex::Regex;

/// Inclusion predicate applied to every traversed entry
pub trait EntryFilter {
    fn accept(&self, item: &DiskItem) -> bool;
}

impl<F> EntryFilter for F
where
    F: Fn(&DiskItem) -> bool,
{
    fn accept(&self, item: &DiskItem) -> bool {
        self(item)
    }
}

/// Accepts every entry (the default filter)
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl EntryFilter for AcceptAll {
    fn accept(&self, _item: &DiskItem) -> bool {
        true
    }
}

/// Accepts entries whose name contains a substring (case-sensitive)
#[derive(Debug, Clone)]
pub struct NameContains {
    needle: String,
}

impl NameContains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }
}

impl EntryFilter for NameContains {
    fn accept(&self, item: &DiskItem) -> bool {
        item.name().contains(self.needle.as_str())
    }
}

/// Accepts entries whose name matches a regular expression
#[derive(Debug, Clone)]
pub struct NamePattern {
    pattern: Regex,
}

impl NamePattern {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }
}

impl EntryFilter for NamePattern {
    fn accept(&self, item: &DiskItem) -> bool {
        self.pattern.is_match(item.name())
    }
}

/// Accepts entries that pass every filter in the chain
#[derive(Default)]
pub struct AllOf {
    filters: Vec<Box<dyn EntryFilter + Send + Sync>>,
}

impl AllOf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter to the chain
    pub fn with<F>(mut self, filter: F) -> Self
    where
        F: EntryFilter + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl EntryFilter for AllOf {
    fn accept(&self, item: &DiskItem) -> bool {
        self.filters.iter().all(|f| f.accept(item))
    }
}
