use crate::aggregate::AggregationStrategy;
use crate::fingerprint::FingerprintWidth;
use crate::Args;

/// Options for a single import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    /// Bound on queued lines; `None` leaves the queue unbounded.
    pub queue_capacity: Option<usize>,
    pub fold_case: bool,
    pub fingerprint: FingerprintWidth,
    pub strategy: AggregationStrategy,
    pub shards: usize,
    /// Consecutive failed reads after which the source counts as exhausted.
    pub max_consecutive_read_errors: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            queue_capacity: Some(4096),
            fold_case: false,
            fingerprint: FingerprintWidth::default(),
            strategy: AggregationStrategy::default(),
            shards: 16,
            max_consecutive_read_errors: 64,
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        let defaults = Config::default();
        Self {
            workers: args.workers.unwrap_or(defaults.workers),
            queue_capacity: (args.queue_capacity > 0).then_some(args.queue_capacity),
            fold_case: args.fold_case,
            fingerprint: args.fingerprint_bits,
            strategy: args.strategy,
            shards: args.shards,
            ..defaults
        }
    }
}
