//! disk-walker - Pooled, Read-Only Disk Access
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use disk_walker::config::{CliArgs, ListOptions, Operation, WalkConfig};
use disk_walker::disk::{ReadOnlyDiskConnection, ScopedStream};
use disk_walker::pool::Pool;
use disk_walker::report::{print_header, print_listing, print_stat, print_summary, PathStat};
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = WalkConfig::from_args(args).context("Invalid configuration")?;

    // One pool serves every subcommand
    let pool = config
        .build_pool()
        .context("Failed to create connection pool")?;

    let result = match &config.operation {
        Operation::List(opts) => run_list(&pool, opts, config.connection_count),
        Operation::Stat(path) => run_stat(&pool, path),
        Operation::Cat(path) => run_cat(&pool, path),
    };

    debug!(stats = ?pool.stats(), "Pool state at exit");
    result
}

fn run_list(
    pool: &Pool<ReadOnlyDiskConnection>,
    opts: &ListOptions,
    connections: usize,
) -> Result<()> {
    let conn = pool.get_connection().context("Failed to lease connection")?;

    print_header(&opts.path, opts.depth, connections);

    // Run the listing
    let start = Instant::now();
    let listing = conn
        .list_contents_report(&opts.path, &opts.filter(), opts.depth)
        .with_context(|| format!("Failed to list '{}'", opts.path.display()))?;
    let duration = start.elapsed();

    pool.return_to_pool(conn)?;

    // Print results
    print_listing(&opts.path, &listing);
    print_summary(&listing, duration);

    if !listing.is_complete() {
        info!(
            skipped = listing.skipped.len(),
            "Listing completed with skipped entries"
        );
    }

    Ok(())
}

fn run_stat(pool: &Pool<ReadOnlyDiskConnection>, path: &Path) -> Result<()> {
    let conn = pool.get_connection().context("Failed to lease connection")?;

    let stat = PathStat::collect(&*conn, path)
        .with_context(|| format!("Failed to stat '{}'", path.display()))?;

    pool.return_to_pool(conn)?;

    print_stat(&stat);
    Ok(())
}

fn run_cat(pool: &Pool<ReadOnlyDiskConnection>, path: &Path) -> Result<()> {
    let conn = pool.get_connection().context("Failed to lease connection")?;

    let copied = conn
        .read_file(path, |stream: &mut ScopedStream, len: u64| -> io::Result<u64> {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let copied = io::copy(stream, &mut out)?;
            out.flush()?;
            debug!(expected = len, copied, "Copied file to stdout");
            Ok(copied)
        })
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    pool.return_to_pool(conn)?;

    debug!(bytes = copied, path = %path.display(), "cat finished");
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("disk_walker=debug,warn")
    } else {
        EnvFilter::new("disk_walker=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
