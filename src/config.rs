//! Configuration types for disk-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::disk::{
    AllOf, NameContains, NamePattern, ReadOnlyDiskConnection, ReadOnlyDiskConnectionFactory,
};
use crate::error::{ConfigError, PoolResult};
use crate::pool::{Pool, PoolConfig};
use crate::walker::Depth;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;

/// Maximum reasonable pool size
const MAX_CONNECTIONS: usize = 64;

/// Read buffer limits
const MIN_BUFFER_SIZE: usize = 512;
const MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;

/// Pooled, read-only disk walker
#[derive(Parser, Debug, Clone)]
#[command(
    name = "disk-walker",
    version,
    about = "Pooled, read-only disk walker",
    long_about = "Queries, lists and reads a local filesystem through a bounded pool of\n\
                  read-only disk connections.\n\n\
                  Listings are pre-order and sorted by name at every level.",
    after_help = "EXAMPLES:\n    \
        disk-walker list ./data\n    \
        disk-walker list ./data -d -1 --contains .txt\n    \
        disk-walker list /var/log -d 2 --pattern '\\.log$'\n    \
        disk-walker stat ./data/read/.hidden\n    \
        disk-walker cat ./data/read/hello.txt"
)]
pub struct CliArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (pool and walker debug logs)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Number of pooled connections
    #[arg(long, default_value = "1", value_name = "NUM", global = true)]
    pub connections: usize,

    /// Read buffer size in bytes for `cat`
    #[arg(long, default_value = "8192", value_name = "BYTES", global = true)]
    pub buffer_size: usize,
}

/// Subcommands
#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// List the contents of a directory
    List {
        /// Directory to list
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Levels to descend below PATH (-1 for unlimited)
        #[arg(short = 'd', long, default_value = "0", allow_negative_numbers = true)]
        depth: i64,

        /// Only show entries whose name contains this text
        #[arg(long, value_name = "TEXT")]
        contains: Option<String>,

        /// Only show entries whose name matches this regex
        #[arg(long, value_name = "REGEX")]
        pattern: Option<String>,
    },

    /// Show existence, metadata and volume space for a path
    Stat {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Print a file to stdout
    Cat {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

/// Validated listing options
#[derive(Debug)]
pub struct ListOptions {
    pub path: PathBuf,
    pub depth: Depth,
    pub contains: Option<String>,
    pub pattern: Option<Regex>,
}

impl ListOptions {
    /// Combine the configured name filters
    pub fn filter(&self) -> AllOf {
        let mut filter = AllOf::new();
        if let Some(text) = &self.contains {
            filter = filter.with(NameContains::new(text.clone()));
        }
        if let Some(pattern) = &self.pattern {
            filter = filter.with(NamePattern::new(pattern.clone()));
        }
        filter
    }
}

/// Validated operation to run
#[derive(Debug)]
pub enum Operation {
    List(ListOptions),
    Stat(PathBuf),
    Cat(PathBuf),
}

/// Validated runtime configuration
#[derive(Debug)]
pub struct WalkConfig {
    /// Operation requested on the command line
    pub operation: Operation,

    /// Pool size
    pub connection_count: usize,

    /// `read_file` buffer size
    pub buffer_size: usize,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.connections == 0 || args.connections > MAX_CONNECTIONS {
            return Err(ConfigError::InvalidConnectionCount {
                count: args.connections,
                max: MAX_CONNECTIONS,
            });
        }

        if !(MIN_BUFFER_SIZE..=MAX_BUFFER_SIZE).contains(&args.buffer_size) {
            return Err(ConfigError::InvalidBufferSize {
                size: args.buffer_size,
                min: MIN_BUFFER_SIZE,
                max: MAX_BUFFER_SIZE,
            });
        }

        let operation = match args.command {
            Command::List {
                path,
                depth,
                contains,
                pattern,
            } => {
                let depth = Depth::from_raw(depth)?;
                let pattern = pattern
                    .map(|p| {
                        Regex::new(&p).map_err(|e| ConfigError::InvalidPattern {
                            pattern: p.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .transpose()?;

                Operation::List(ListOptions {
                    path,
                    depth,
                    contains,
                    pattern,
                })
            }
            Command::Stat { path } => Operation::Stat(path),
            Command::Cat { path } => Operation::Cat(path),
        };

        Ok(Self {
            operation,
            connection_count: args.connections,
            buffer_size: args.buffer_size,
            verbose: args.verbose,
        })
    }

    /// Build the connection pool described by this configuration
    pub fn build_pool(&self) -> PoolResult<Pool<ReadOnlyDiskConnection>> {
        let factory = ReadOnlyDiskConnectionFactory::new().buffer_size(self.buffer_size);
        Pool::new(PoolConfig::new("disk-walker", factory, self.connection_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{DiskItem, EntryFilter, EntryType};

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_list_defaults() {
        let config = WalkConfig::from_args(parse(&["disk-walker", "list", "data"])).unwrap();
        assert_eq!(config.connection_count, 1);
        assert_eq!(config.buffer_size, 8192);
        match config.operation {
            Operation::List(opts) => {
                assert_eq!(opts.path, PathBuf::from("data"));
                assert_eq!(opts.depth, Depth::CHILDREN);
                assert!(opts.filter().is_empty());
            }
            other => panic!("unexpected operation {:?}", other),
        }
    }

    #[test]
    fn test_unlimited_depth_and_filters() {
        let args = parse(&[
            "disk-walker",
            "list",
            "data",
            "-d",
            "-1",
            "--contains",
            "hello",
            "--pattern",
            r"\.txt$",
        ]);
        let config = WalkConfig::from_args(args).unwrap();
        let Operation::List(opts) = config.operation else {
            panic!("expected list");
        };
        assert_eq!(opts.depth, Depth::Unlimited);

        let filter = opts.filter();
        assert!(filter.accept(&DiskItem::new("hello.txt", "data/hello.txt", EntryType::File)));
        assert!(!filter.accept(&DiskItem::new("hello.md", "data/hello.md", EntryType::File)));
    }

    #[test]
    fn test_invalid_depth() {
        let args = parse(&["disk-walker", "list", "data", "-d", "-5"]);
        assert!(matches!(
            WalkConfig::from_args(args),
            Err(ConfigError::InvalidDepth { depth: -5 })
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let args = parse(&["disk-walker", "list", "data", "--pattern", "("]);
        assert!(matches!(
            WalkConfig::from_args(args),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_invalid_connection_count() {
        let args = parse(&["disk-walker", "--connections", "0", "stat", "data"]);
        assert!(matches!(
            WalkConfig::from_args(args),
            Err(ConfigError::InvalidConnectionCount { count: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_buffer_size() {
        let args = parse(&["disk-walker", "cat", "f", "--buffer-size", "1"]);
        assert!(matches!(
            WalkConfig::from_args(args),
            Err(ConfigError::InvalidBufferSize { size: 1, .. })
        ));
    }

    #[test]
    fn test_build_pool() {
        let args = parse(&["disk-walker", "--connections", "3", "stat", "data"]);
        let config = WalkConfig::from_args(args).unwrap();
        let pool = config.build_pool().unwrap();
        assert_eq!(pool.max_size(), 3);
        assert_eq!(pool.name(), "disk-walker");
    }
}
