//! # Main — CLI Entry Point
//!
//! Parses the interval from the command line, runs the segmented counter, and
//! reports the count and wall-clock time on stdout. Handles the shared
//! concerns: structured logging, the global allocator, and the Rayon thread
//! pool configuration.
//!
//! ## Arguments and Options
//!
//! - Positional `start length`: the half-open interval `[start, start+length)`.
//! - `--verify`: recount with trial division and fail on any mismatch.
//! - `--threads` / `PRIMESPAN_THREADS`: 1 (default) runs the sequential
//!   reference loop; 0 uses every core; any other value fixes the pool size.
//! - `--segment-length` / `PRIMESPAN_SEGMENT_LENGTH`: maximum slots per
//!   segment, bounding peak memory at one bit per slot.
//!
//! Counts go to stdout; logs go to stderr (`LOG_FORMAT=json` for JSON output,
//! `RUST_LOG` to filter), so stdout stays machine-parseable.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use primespan::{count_primes_segmented, trialdiv, MAX_SEGMENT_LENGTH};

#[derive(Parser)]
#[command(
    name = "primespan",
    about = "Count the primes in [start, start+length) with a segmented sieve"
)]
struct Cli {
    /// Low endpoint of the interval (negative values count no primes)
    #[arg(allow_hyphen_values = true)]
    start: i64,

    /// Length of the interval (non-positive means an empty interval)
    #[arg(allow_hyphen_values = true)]
    length: i64,

    /// Verify the result using trial division (slow; short intervals only)
    #[arg(long)]
    verify: bool,

    /// Number of rayon worker threads: 1 = sequential, 0 = all logical cores
    #[arg(long, env = "PRIMESPAN_THREADS", default_value_t = 1)]
    threads: usize,

    /// Maximum slots per segment (one bit of memory each)
    #[arg(
        long,
        env = "PRIMESPAN_SEGMENT_LENGTH",
        default_value_t = MAX_SEGMENT_LENGTH,
        value_parser = clap::value_parser!(i64).range(1..)
    )]
    segment_length: i64,
}

/// Size the global rayon pool. Only relevant when `threads != 1`: 0 leaves
/// rayon's default (all logical cores), any larger value fixes the pool.
fn configure_rayon(threads: usize) {
    if threads > 1 {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            warn!(error = %e, "Could not configure rayon thread pool");
        }
    }
}

fn main() -> Result<()> {
    // Initialize structured logging: LOG_FORMAT=json for K8s, human-readable otherwise
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    configure_rayon(cli.threads);
    let parallel = cli.threads != 1;

    let begin = std::time::Instant::now();
    let num_primes = count_primes_segmented(cli.start, cli.length, cli.segment_length, parallel)?;
    let elapsed = begin.elapsed();

    println!(
        "{} primes found in [{}, {})",
        num_primes,
        cli.start,
        cli.start.saturating_add(cli.length)
    );
    println!("{:.6} seconds", elapsed.as_secs_f64());

    if cli.verify {
        let trialdiv_num_primes = trialdiv::count_primes_in_interval(cli.start, cli.length);
        if trialdiv_num_primes != num_primes {
            bail!(
                "trialdiv_num_primes ({}) does not match num_primes ({})",
                trialdiv_num_primes,
                num_primes
            );
        }
        info!(num_primes, "trial division confirms the segmented count");
    }

    Ok(())
}
