use clap::Parser;
use std::path::PathBuf;

use crate::aggregate::AggregationStrategy;
use crate::fingerprint::FingerprintWidth;

#[derive(Parser, Debug)]
#[command(
    name = "domain-tally",
    about = "Count distinct customer email addresses per domain in a CSV file",
    version,
    long_about = None
)]
pub struct Args {
    /// Path to source CSV data
    #[arg(short = 'f', long = "file")]
    pub input: PathBuf,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Maximum lines waiting for a worker, 0 for no limit
    #[arg(long, default_value_t = 4096)]
    pub queue_capacity: usize,

    /// Group domains case-insensitively
    #[arg(long)]
    pub fold_case: bool,

    /// Width of the per-address fingerprint
    #[arg(long, value_enum, default_value_t = FingerprintWidth::Bits32)]
    pub fingerprint_bits: FingerprintWidth,

    /// How the shared domain map is locked
    #[arg(long, value_enum, default_value_t = AggregationStrategy::Locked)]
    pub strategy: AggregationStrategy,

    /// Shard count for the sharded strategy
    #[arg(long, default_value_t = 16)]
    pub shards: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
