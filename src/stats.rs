use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Distinct address count per domain, frozen after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCounts {
    counts: HashMap<String, usize>,
}

impl DomainCounts {
    pub fn new(counts: HashMap<String, usize>) -> Self {
        Self { counts }
    }

    /// Distinct addresses seen for `domain`, 0 if the domain never appeared.
    pub fn count(&self, domain: &str) -> usize {
        self.counts.get(domain).copied().unwrap_or(0)
    }

    /// Number of distinct domains.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All domains with their counts, ascending by byte order of the domain.
    pub fn sorted(&self) -> Vec<(&str, usize)> {
        let mut domains: Vec<(&str, usize)> = self
            .counts
            .iter()
            .map(|(domain, count)| (domain.as_str(), *count))
            .collect();
        domains.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
        domains
    }
}

impl From<HashMap<String, usize>> for DomainCounts {
    fn from(counts: HashMap<String, usize>) -> Self {
        Self::new(counts)
    }
}

impl FromIterator<(String, usize)> for DomainCounts {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Line-level outcome of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    pub lines_dispatched: u64,
    pub addresses_folded: u64,
    pub invalid_records: u64,
    pub invalid_emails: u64,
    pub read_errors: u64,
}

impl LineStats {
    pub fn skipped(&self) -> u64 {
        self.invalid_records + self.invalid_emails
    }
}

/// Shared counters behind [`LineStats`], bumped from the producer and every worker.
#[derive(Debug, Default)]
pub struct LineCounters {
    lines_dispatched: AtomicU64,
    addresses_folded: AtomicU64,
    invalid_records: AtomicU64,
    invalid_emails: AtomicU64,
    read_errors: AtomicU64,
}

impl LineCounters {
    pub fn dispatched(&self) {
        self.lines_dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub fn folded(&self) {
        self.addresses_folded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invalid_record(&self) {
        self.invalid_records.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invalid_email(&self) {
        self.invalid_emails.fetch_add(1, Ordering::Relaxed);
    }

    pub fn read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LineStats {
        LineStats {
            lines_dispatched: self.lines_dispatched.load(Ordering::Relaxed),
            addresses_folded: self.addresses_folded.load(Ordering::Relaxed),
            invalid_records: self.invalid_records.load(Ordering::Relaxed),
            invalid_emails: self.invalid_emails.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug)]
pub struct ImportResult {
    pub domains: DomainCounts,
    pub stats: LineStats,
}
