pub mod aggregate;
pub mod args;
pub mod config;
pub mod domain;
pub mod error;
pub mod fingerprint;
pub mod header;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod stats;
pub mod tracker;
pub mod utils;

pub use aggregate::{AggregationStrategy, DomainAggregate, LockedAggregate, ShardedAggregate};
pub use args::Args;
pub use config::Config;
pub use error::ImportError;
pub use fingerprint::{Fingerprint, FingerprintWidth};
pub use pipeline::{count_email_domains, count_email_domains_from_reader};
pub use report::{save_report_to_file, save_report_to_stdout, write_report, ReportOutcome};
pub use stats::{DomainCounts, ImportResult, LineStats};
