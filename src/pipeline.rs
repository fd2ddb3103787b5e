use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::thread;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::aggregate::{AggregationStrategy, DomainAggregate, LockedAggregate, ShardedAggregate};
use crate::config::Config;
use crate::domain::{fingerprint_input, normalize_domain, parse_address};
use crate::error::{ImportError, Result};
use crate::fingerprint::{Fingerprint, FingerprintWidth};
use crate::header::read_email_column;
use crate::record::{extract_field, strip_line_terminator, Record};
use crate::stats::{ImportResult, LineCounters};
use crate::tracker::{InFlight, Retirement};

const READ_BUFFER_BYTES: usize = 1 << 16;

/// Open `path` and count distinct email addresses per domain.
pub fn count_email_domains<P: AsRef<Path>>(path: P, config: &Config) -> Result<ImportResult> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;
    info!(action = "open", component = "source", file_path = ?path, "Opened source file");

    count_email_domains_from_reader(BufReader::with_capacity(READ_BUFFER_BYTES, file), config)
}

/// Resolve the header of `reader`, then stream the remaining lines through the worker pool.
///
/// Header problems are returned before any thread starts. Malformed rows and unreadable lines
/// are logged, counted in [`ImportResult::stats`] and skipped.
pub fn count_email_domains_from_reader<R: BufRead + Send>(
    mut reader: R,
    config: &Config,
) -> Result<ImportResult> {
    let start_time = Instant::now();
    info!(
        action = "start",
        component = "pipeline",
        workers = config.workers,
        strategy = ?config.strategy,
        fingerprint = ?config.fingerprint,
        fold_case = config.fold_case,
        "Starting email domain import"
    );

    let email_column = read_email_column(&mut reader)?;

    let result = match (config.fingerprint, config.strategy) {
        (FingerprintWidth::Bits32, AggregationStrategy::Locked) => {
            run::<u32, _, _>(reader, email_column, config, LockedAggregate::new())
        }
        (FingerprintWidth::Bits32, AggregationStrategy::Sharded) => {
            run::<u32, _, _>(reader, email_column, config, ShardedAggregate::new(config.shards))
        }
        (FingerprintWidth::Bits64, AggregationStrategy::Locked) => {
            run::<u64, _, _>(reader, email_column, config, LockedAggregate::new())
        }
        (FingerprintWidth::Bits64, AggregationStrategy::Sharded) => {
            run::<u64, _, _>(reader, email_column, config, ShardedAggregate::new(config.shards))
        }
    }?;

    info!(
        action = "complete",
        component = "pipeline",
        domains = result.domains.len(),
        lines = result.stats.lines_dispatched,
        folded = result.stats.addresses_folded,
        skipped = result.stats.skipped(),
        read_errors = result.stats.read_errors,
        duration_ms = start_time.elapsed().as_millis(),
        "Email domain import completed"
    );
    Ok(result)
}

fn run<F, A, R>(reader: R, email_column: usize, config: &Config, aggregate: A) -> Result<ImportResult>
where
    F: Fingerprint,
    A: DomainAggregate<F>,
    R: BufRead + Send,
{
    let (sender, receiver) = match config.queue_capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    let tracker = InFlight::new();
    let counters = LineCounters::default();
    let workers = config.workers.max(1);

    thread::scope(|s| -> Result<()> {
        let tracker = &tracker;
        let counters = &counters;
        let aggregate = &aggregate;
        let max_read_errors = config.max_consecutive_read_errors;

        let producer = thread::Builder::new()
            .name("line-producer".to_string())
            .spawn_scoped(s, move || {
                produce_lines(reader, sender, tracker, counters, max_read_errors)
            })
            .map_err(ImportError::WorkerSpawn)?;

        for worker in 0..workers {
            let receiver = receiver.clone();
            let fold_case = config.fold_case;
            thread::Builder::new()
                .name(format!("extract-{worker}"))
                .spawn_scoped(s, move || {
                    extract_lines::<F, A>(receiver, email_column, fold_case, aggregate, tracker, counters)
                })
                .map_err(ImportError::WorkerSpawn)?;
        }
        drop(receiver);

        info!(
            action = "configure",
            component = "pipeline",
            worker_count = workers,
            queue_capacity = ?config.queue_capacity,
            "Worker pool running"
        );

        if let Err(panic) = producer.join() {
            std::panic::resume_unwind(panic);
        }
        Ok(())
    })?;

    let freeze_start = Instant::now();
    let domains = aggregate.freeze();
    info!(
        action = "freeze",
        component = "aggregate",
        domains = domains.len(),
        duration_ms = freeze_start.elapsed().as_millis(),
        "Aggregate frozen"
    );

    Ok(ImportResult {
        domains,
        stats: counters.snapshot(),
    })
}

/// Publish every non-empty line after the header, then wait until all of them are retired.
/// Dropping `sender` on return is the completion signal for the workers.
fn produce_lines<R: BufRead>(
    mut reader: R,
    sender: Sender<Record>,
    tracker: &InFlight,
    counters: &LineCounters,
    max_consecutive_errors: usize,
) {
    let start_time = Instant::now();
    // Line 1 is the header.
    let mut line: u64 = 1;
    let mut consecutive_errors = 0;

    loop {
        let mut bytes = Vec::new();
        line += 1;

        match reader.read_until(b'\n', &mut bytes) {
            Ok(0) => break,
            Ok(_) => {
                consecutive_errors = 0;
                let len = strip_line_terminator(&bytes).len();
                if len == 0 {
                    continue;
                }
                bytes.truncate(len);

                tracker.dispatch();
                if sender.send(Record { line, bytes }).is_err() {
                    tracker.retire();
                    error!(
                        action = "dispatch",
                        component = "line_producer",
                        line,
                        "Work queue closed before input was exhausted"
                    );
                    break;
                }
                counters.dispatched();
            }
            Err(source) => {
                counters.read_error();
                consecutive_errors += 1;
                let err = ImportError::LineRead { line, source };
                warn!(action = "read", component = "line_producer", error = %err, "Skipping unreadable line");

                if consecutive_errors >= max_consecutive_errors {
                    error!(
                        action = "read",
                        component = "line_producer",
                        consecutive_errors,
                        "Too many consecutive read failures, treating source as exhausted"
                    );
                    break;
                }
            }
        }
    }

    info!(
        action = "drain",
        component = "line_producer",
        outstanding = tracker.outstanding(),
        "Input exhausted, waiting for in-flight lines"
    );
    tracker.wait_drained();
    drop(sender);

    info!(
        action = "complete",
        component = "line_producer",
        duration_ms = start_time.elapsed().as_millis(),
        "All lines retired"
    );
}

fn extract_lines<F, A>(
    receiver: Receiver<Record>,
    email_column: usize,
    fold_case: bool,
    aggregate: &A,
    tracker: &InFlight,
    counters: &LineCounters,
) where
    F: Fingerprint,
    A: DomainAggregate<F>,
{
    for record in receiver {
        let _retired = Retirement::new(tracker);

        match fold_record::<F, A>(&record, email_column, fold_case, aggregate) {
            Ok(()) => counters.folded(),
            Err(err) => {
                match err {
                    ImportError::InvalidRecord { .. } => counters.invalid_record(),
                    _ => counters.invalid_email(),
                }
                warn!(action = "extract", component = "extraction_worker", error = %err, "Skipping record");
            }
        }
    }
}

/// Extract, validate and fingerprint the email field of `record`, then fold it into
/// `aggregate`. Only the final insert runs under the aggregate's lock.
pub fn fold_record<F, A>(
    record: &Record,
    email_column: usize,
    fold_case: bool,
    aggregate: &A,
) -> Result<()>
where
    F: Fingerprint,
    A: DomainAggregate<F> + ?Sized,
{
    let field = extract_field(&record.bytes, email_column).ok_or(ImportError::InvalidRecord {
        line: record.line,
        index: email_column,
    })?;

    let address = parse_address(field).ok_or_else(|| ImportError::InvalidEmail {
        line: record.line,
        value: String::from_utf8_lossy(field).into_owned(),
    })?;

    let domain = normalize_domain(address.domain, fold_case);
    let fingerprint = F::of(&fingerprint_input(&address, &domain));
    aggregate.fold(&domain, fingerprint);
    Ok(())
}
