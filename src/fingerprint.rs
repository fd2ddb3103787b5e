use std::fmt::Debug;
use std::hash::Hash;

use clap::ValueEnum;
use xxhash_rust::xxh3::xxh3_64;
use xxhash_rust::xxh32::xxh32;

/// Compact stand-in for a full address string.
///
/// Not collision resistant: two distinct addresses in the same domain that hash alike are
/// counted once. Widening to 64 bits makes that practically impossible at the cost of twice
/// the memory per address.
pub trait Fingerprint: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    fn of(bytes: &[u8]) -> Self;
}

impl Fingerprint for u32 {
    fn of(bytes: &[u8]) -> Self {
        xxh32(bytes, 0)
    }
}

impl Fingerprint for u64 {
    fn of(bytes: &[u8]) -> Self {
        xxh3_64(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FingerprintWidth {
    #[default]
    #[value(name = "32")]
    Bits32,
    #[value(name = "64")]
    Bits64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_empty_input_vectors() {
        assert_eq!(u32::of(b""), 0x02cc_5d05);
        assert_eq!(u64::of(b""), 0x2d06_8005_38d3_94c2);
    }

    #[test]
    fn byte_exact() {
        assert_ne!(
            u32::of(b"test@example.com"),
            u32::of(b"Test@example.com")
        );
        assert_eq!(
            u64::of(b"test@example.com"),
            u64::of(b"test@example.com")
        );
    }
}
