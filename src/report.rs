//! Terminal output for the disk-walker CLI
//!
//! Renders listings, listing summaries and path metadata using console
//! styling and human-readable sizes.

use crate::disk::{DiskConnection, DiskItem};
use crate::error::DiskResult;
use crate::walker::{Depth, Listing};
use console::style;
use humansize::{format_size, BINARY};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Metadata collected for a single path by `stat`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathStat {
    pub path: PathBuf,
    pub is_file: bool,
    pub is_directory: bool,
    pub hidden: bool,
    /// Milliseconds since the Unix epoch
    pub modified: Option<i64>,
    pub free_space: Option<u64>,
    pub usable_space: Option<u64>,
}

impl PathStat {
    /// Query every metadata operation of `conn` for `path`
    pub fn collect(conn: &dyn DiskConnection, path: &Path) -> DiskResult<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            is_file: conn.check_if_file_exists(path)?,
            is_directory: conn.check_if_directory_exists(path)?,
            hidden: conn.check_if_hidden(path)?,
            modified: conn.get_modified_time(path)?,
            free_space: conn.get_free_space(path)?,
            usable_space: conn.get_usable_space(path)?,
        })
    }

    /// True if the path exists as a file or directory
    pub fn exists(&self) -> bool {
        self.is_file || self.is_directory || self.modified.is_some()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// One listing line: type marker and the path relative to the listing root
pub fn format_item(root: &Path, item: &DiskItem) -> String {
    let shown = item.path().strip_prefix(root).unwrap_or(item.path());
    let suffix = if item.is_directory() { "/" } else { "" };
    format!(
        "{} {}{}",
        item.entry_type().marker(),
        shown.display(),
        suffix
    )
}

/// Print a header before a listing
pub fn print_header(root: &Path, depth: Depth, connections: usize) {
    println!();
    println!(
        "{} {}",
        style("disk-walker").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Root:").bold(), root.display());
    println!("  {} {}", style("Depth:").bold(), depth);
    println!("  {} {}", style("Connections:").bold(), connections);
    println!();
}

/// Print every item of a listing, one per line
pub fn print_listing(root: &Path, listing: &Listing) {
    for item in &listing.items {
        let line = format_item(root, item);
        if item.is_directory() {
            println!("{}", style(line).blue());
        } else {
            println!("{}", line);
        }
    }
}

/// Print a summary of a listing
pub fn print_summary(listing: &Listing, duration: Duration) {
    println!();
    println!("{}", style("Listing Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Directories:").bold(),
        format_number(listing.dir_count() as u64)
    );
    println!(
        "  {} {}",
        style("Files:").bold(),
        format_number(listing.file_count() as u64)
    );
    println!(
        "  {} {:.3}s",
        style("Duration:").bold(),
        duration.as_secs_f64()
    );
    if !listing.is_complete() {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(listing.skipped.len() as u64)
        );
        for skipped in &listing.skipped {
            println!("    {} {}", style("!").yellow(), skipped.error);
        }
    }
    println!();
}

/// Print the metadata of a path
pub fn print_stat(stat: &PathStat) {
    println!("{}", style(stat.path.display()).cyan().bold());
    println!("{}", style("─".repeat(50)).dim());

    if !stat.exists() {
        println!("  {}", style("does not exist").yellow());
        return;
    }

    let kind = if stat.is_directory {
        "directory"
    } else if stat.is_file {
        "file"
    } else {
        "other"
    };
    println!("  {} {}", style("Type:").bold(), kind);
    println!("  {} {}", style("Hidden:").bold(), stat.hidden);
    if let Some(ms) = stat.modified {
        println!("  {} {} ms since epoch", style("Modified:").bold(), ms);
    }
    if let Some(free) = stat.free_space {
        println!("  {} {}", style("Free:").bold(), format_size(free, BINARY));
    }
    if let Some(usable) = stat.usable_space {
        println!("  {} {}", style("Usable:").bold(), format_size(usable, BINARY));
    }
}
