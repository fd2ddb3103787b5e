use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{ImportError, Result};
use crate::stats::DomainCounts;

/// Lines emitted by [`write_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub written: usize,
    pub failed: usize,
}

/// Flush the sink at least this often so a buffered failure is attributed to few lines.
const FLUSH_EVERY_LINES: usize = 1024;

/// Write one `<domain> <count>` line per domain, domains ascending.
///
/// Each line goes out in a single `write_all`. A failed line is logged and skipped; the
/// remaining domains are still written. When a flush fails, every line accepted since the
/// last good flush is counted as failed.
pub fn write_report<W: Write>(writer: &mut W, domains: &DomainCounts) -> ReportOutcome {
    let start_time = Instant::now();
    let mut outcome = ReportOutcome::default();
    let mut unflushed = 0;
    let mut line = Vec::with_capacity(64);

    for (domain, count) in domains.sorted() {
        line.clear();
        line.extend_from_slice(domain.as_bytes());
        line.push(b' ');
        line.extend_from_slice(count.to_string().as_bytes());
        line.push(b'\n');

        match writer.write_all(&line) {
            Ok(()) => {
                outcome.written += 1;
                unflushed += 1;
            }
            Err(source) => {
                outcome.failed += 1;
                let err = ImportError::ReportWrite {
                    domain: domain.to_string(),
                    source,
                };
                warn!(action = "write", component = "report", error = %err, "Failed to write report line");
            }
        }

        if unflushed >= FLUSH_EVERY_LINES {
            flush_pending(writer, &mut outcome, &mut unflushed);
        }
    }
    flush_pending(writer, &mut outcome, &mut unflushed);

    info!(
        action = "complete",
        component = "report",
        written = outcome.written,
        failed = outcome.failed,
        duration_ms = start_time.elapsed().as_millis(),
        "Report emitted"
    );
    outcome
}

fn flush_pending<W: Write>(writer: &mut W, outcome: &mut ReportOutcome, unflushed: &mut usize) {
    if let Err(e) = writer.flush() {
        outcome.written -= *unflushed;
        outcome.failed += *unflushed;
        warn!(
            action = "flush",
            component = "report",
            lines = *unflushed,
            error = %e,
            "Failed to flush report"
        );
    }
    *unflushed = 0;
}

/// Create (or truncate) `path` and write the report into it.
pub fn save_report_to_file<P: AsRef<Path>>(path: P, domains: &DomainCounts) -> Result<ReportOutcome> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|source| ImportError::ReportOpen {
            path: path.to_path_buf(),
            source,
        })?;

    let outcome = write_report(&mut BufWriter::new(file), domains);
    info!(action = "save", component = "report", file_path = ?path, "Saved report to file");
    Ok(outcome)
}

pub fn save_report_to_stdout(domains: &DomainCounts) -> ReportOutcome {
    let stdout = io::stdout();
    write_report(&mut BufWriter::new(stdout.lock()), domains)
}
