use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use clap::ValueEnum;
use rayon::prelude::*;
use xxhash_rust::xxh3::xxh3_64;

use crate::fingerprint::Fingerprint;
use crate::stats::DomainCounts;

type FingerprintSets<F> = HashMap<String, HashSet<F>>;

/// Shared mapping from domain to the fingerprints seen for it.
///
/// Sets only grow. Once the pipeline has drained, `freeze` turns the aggregate into plain
/// per-domain counts and releases the fingerprints.
pub trait DomainAggregate<F: Fingerprint>: Sync {
    /// Record `fingerprint` under `domain`. Inserting a fingerprint twice is a no-op.
    fn fold(&self, domain: &str, fingerprint: F);

    /// Distinct fingerprints recorded for `domain`, 0 if absent.
    fn count(&self, domain: &str) -> usize;

    fn freeze(self) -> DomainCounts;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AggregationStrategy {
    /// One lock over the whole map.
    #[default]
    Locked,
    /// Independently locked shards keyed by a hash of the domain.
    Sharded,
}

fn insert<F: Fingerprint>(sets: &mut FingerprintSets<F>, domain: &str, fingerprint: F) {
    match sets.get_mut(domain) {
        Some(set) => {
            set.insert(fingerprint);
        }
        None => {
            sets.insert(domain.to_owned(), HashSet::from([fingerprint]));
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn into_counts<F: Fingerprint>(sets: FingerprintSets<F>) -> DomainCounts {
    sets.into_par_iter()
        .map(|(domain, set)| (domain, set.len()))
        .collect::<HashMap<_, _>>()
        .into()
}

/// Single exclusive lock over every domain.
#[derive(Debug)]
pub struct LockedAggregate<F> {
    sets: Mutex<FingerprintSets<F>>,
}

impl<F: Fingerprint> LockedAggregate<F> {
    pub fn new() -> Self {
        Self {
            sets: Mutex::new(HashMap::new()),
        }
    }
}

impl<F: Fingerprint> Default for LockedAggregate<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fingerprint> DomainAggregate<F> for LockedAggregate<F> {
    fn fold(&self, domain: &str, fingerprint: F) {
        insert(&mut lock(&self.sets), domain, fingerprint);
    }

    fn count(&self, domain: &str) -> usize {
        lock(&self.sets).get(domain).map_or(0, HashSet::len)
    }

    fn freeze(self) -> DomainCounts {
        into_counts(self.sets.into_inner().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Domain-hashed shards, each behind its own lock. A domain always lands in the same shard,
/// so shards never share keys and freezing is a plain union.
#[derive(Debug)]
pub struct ShardedAggregate<F> {
    shards: Vec<Mutex<FingerprintSets<F>>>,
}

impl<F: Fingerprint> ShardedAggregate<F> {
    pub fn new(shards: usize) -> Self {
        let shards = shards.max(1);
        Self {
            shards: (0..shards).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    #[cfg(test)]
    fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, domain: &str) -> &Mutex<FingerprintSets<F>> {
        let index = (xxh3_64(domain.as_bytes()) % self.shards.len() as u64) as usize;
        &self.shards[index]
    }
}

impl<F: Fingerprint> DomainAggregate<F> for ShardedAggregate<F> {
    fn fold(&self, domain: &str, fingerprint: F) {
        insert(&mut lock(self.shard(domain)), domain, fingerprint);
    }

    fn count(&self, domain: &str) -> usize {
        lock(self.shard(domain)).get(domain).map_or(0, HashSet::len)
    }

    fn freeze(self) -> DomainCounts {
        self.shards
            .into_par_iter()
            .flat_map_iter(|shard| {
                shard
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner)
                    .into_iter()
                    .map(|(domain, set)| (domain, set.len()))
            })
            .collect::<HashMap<_, _>>()
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn exercise<A: DomainAggregate<u32>>(aggregate: A) -> DomainCounts {
        aggregate.fold("example.com", u32::of(b"test@example.com"));
        aggregate.fold("example.com", u32::of(b"test@example.com"));
        aggregate.fold("example.com", u32::of(b"other@example.com"));
        aggregate.fold("test.com", u32::of(b"test2@test.com"));

        assert_eq!(aggregate.count("example.com"), 2);
        assert_eq!(aggregate.count("test.com"), 1);
        assert_eq!(aggregate.count("absent.org"), 0);
        aggregate.freeze()
    }

    #[test]
    fn locked_deduplicates_within_domain() {
        let counts = exercise(LockedAggregate::new());
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.count("example.com"), 2);
    }

    #[test]
    fn sharded_matches_locked() {
        assert_eq!(
            exercise(ShardedAggregate::new(4)),
            exercise(LockedAggregate::new())
        );
    }

    #[test]
    fn same_fingerprint_in_two_domains_counts_twice() {
        let aggregate = LockedAggregate::<u64>::new();
        aggregate.fold("a.com", 7);
        aggregate.fold("b.com", 7);
        let counts = aggregate.freeze();
        assert_eq!(counts.count("a.com"), 1);
        assert_eq!(counts.count("b.com"), 1);
    }

    #[test]
    fn zero_shards_is_one_shard() {
        assert_eq!(ShardedAggregate::<u32>::new(0).shard_count(), 1);
    }

    #[test]
    fn concurrent_folds_are_not_lost() {
        let aggregate = ShardedAggregate::<u32>::new(8);
        thread::scope(|s| {
            for worker in 0..4u32 {
                let aggregate = &aggregate;
                s.spawn(move || {
                    for n in 0..250u32 {
                        let domain = format!("d{}.com", n % 10);
                        aggregate.fold(&domain, worker * 1000 + n);
                    }
                });
            }
        });
        let counts = aggregate.freeze();
        assert_eq!(counts.len(), 10);
        assert_eq!(counts.sorted().iter().map(|(_, c)| c).sum::<usize>(), 1000);
    }
}
