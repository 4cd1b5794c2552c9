//! memoctl - drive a memocache instance from the command line
//!
//! Wraps a factorial function in an LRU memo cache, replays a list of keys
//! from one or more threads and reports hit/miss statistics.

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use memocache::{MemoCache, StatsSnapshot};
use serde::Serialize;
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Cache capacity (number of results)
    #[arg(short, long, default_value_t = 5)]
    capacity: usize,

    /// Worker threads replaying the key list
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Passes over the key list per worker
    #[arg(short, long, default_value_t = 2)]
    repeat: usize,

    /// Print final statistics as JSON
    #[arg(long)]
    json: bool,

    /// Keys to evaluate
    #[arg(default_values_t = [1u64, 2, 3, 4, 5, 6])]
    keys: Vec<u64>,
}

#[derive(Debug, Serialize)]
struct Report {
    capacity: usize,
    cached: Vec<u64>,
    hits: u64,
    misses: u64,
    inserts: u64,
    evictions: u64,
    hit_ratio: f64,
}

impl Report {
    fn new(capacity: usize, cached: Vec<u64>, stats: StatsSnapshot) -> Self {
        Self {
            capacity,
            cached,
            hits: stats.hits,
            misses: stats.misses,
            inserts: stats.inserts,
            evictions: stats.evictions,
            hit_ratio: stats.hit_ratio(),
        }
    }
}

/// Wrapping factorial; 0 maps to 0.
fn factorial(n: u64) -> u64 {
    if n == 0 {
        return 0;
    }
    (1..=n).fold(1u64, |acc, i| acc.wrapping_mul(i))
}

fn main() -> Result<()> {
    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.threads == 0 {
        bail!("--threads must be at least 1");
    }
    if args.capacity == 0 {
        warn!("capacity is 0, every call will recompute");
    }

    info!(
        capacity = args.capacity,
        threads = args.threads,
        repeat = args.repeat,
        keys = args.keys.len(),
        "starting"
    );

    let cache = Arc::new(MemoCache::new(args.capacity, factorial));
    let keys = Arc::new(args.keys);
    let quiet = args.json;

    let handles: Vec<_> = (0..args.threads)
        .map(|worker| {
            let cache = cache.clone();
            let keys = keys.clone();
            let repeat = args.repeat;
            thread::spawn(move || {
                for pass in 0..repeat {
                    for &key in keys.iter() {
                        let value = cache.call(key);
                        if worker == 0 && pass == 0 && !quiet {
                            println!("{} -> {}", key, value);
                        }
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle
            .join()
            .map_err(|_| anyhow!("worker thread panicked"))?;
    }

    cache
        .check_invariants()
        .map_err(|e| anyhow!("cache left inconsistent: {}", e))?;

    let report = Report::new(args.capacity, cache.keys(), cache.stats().snapshot());
    info!(
        hits = report.hits,
        misses = report.misses,
        evictions = report.evictions,
        hit_ratio = report.hit_ratio,
        "done"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("cached (most recent first): {:?}", report.cached);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), 0);
        assert_eq!(factorial(5), 120);
        assert_eq!(factorial(65), 9223372036854775808);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["memoctl"]);
        assert_eq!(args.capacity, 5);
        assert_eq!(args.threads, 1);
        assert_eq!(args.keys, vec![1, 2, 3, 4, 5, 6]);
        assert!(!args.json);
    }

    #[test]
    fn test_args_keys() {
        let args = Args::parse_from(["memoctl", "-c", "2", "--json", "7", "8"]);
        assert_eq!(args.capacity, 2);
        assert_eq!(args.keys, vec![7, 8]);
        assert!(args.json);
    }

    #[test]
    fn test_report_json() {
        let stats = StatsSnapshot {
            hits: 3,
            misses: 1,
            evictions: 0,
            inserts: 1,
        };
        let report = Report::new(5, vec![5], stats);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["hits"], 3);
        assert_eq!(json["cached"][0], 5);
        assert_eq!(json["hit_ratio"], 0.75);
    }
}
