//! Chooser Module
//!
//! Maps an arbitrary key to exactly one named bucket (shard).
//!
//! ## Algorithm
//! 1. Hash the key with a fixed, seedless 64-bit hash (FNV-1a followed by the
//!    MurmurHash3 `fmix64` finalizer)
//! 2. Feed the hash into jump consistent hash over `len(buckets)`
//!
//! The hash never depends on process state, so a key resolves to the same
//! bucket across restarts. Growing the bucket list from N to N+1 moves about
//! 1/(N+1) of keys, and every moved key lands in the new bucket.

use std::collections::HashSet;

use crate::error::{Result, StoreError};

/// Maps keys to shards
pub trait Chooser: Send + Sync {
    /// Install the ordered list of known buckets
    fn set_buckets(&mut self, buckets: Vec<String>) -> Result<()>;

    /// Return the bucket owning `key`
    fn choose(&self, key: &str) -> Result<&str>;

    /// The current bucket list, in installation order
    fn buckets(&self) -> &[String];
}

/// Hash function signature used by [`JumpChooser`]
pub type HashFn = fn(&[u8]) -> u64;

/// Jump consistent hash chooser
#[derive(Debug, Clone)]
pub struct JumpChooser {
    hasher: HashFn,
    buckets: Vec<String>,
}

impl JumpChooser {
    /// A chooser using [`hash64`] with no buckets installed yet
    pub fn new() -> Self {
        Self::with_hasher(hash64)
    }

    pub fn with_hasher(hasher: HashFn) -> Self {
        Self {
            hasher,
            buckets: Vec::new(),
        }
    }

    /// Index of the bucket owning `key`
    pub fn choose_index(&self, key: &str) -> Result<usize> {
        if self.buckets.is_empty() {
            return Err(StoreError::Routing("chooser has no buckets".to_string()));
        }
        Ok(jump_hash((self.hasher)(key.as_bytes()), self.buckets.len()))
    }
}

impl Default for JumpChooser {
    fn default() -> Self {
        Self::new()
    }
}

impl Chooser for JumpChooser {
    fn set_buckets(&mut self, buckets: Vec<String>) -> Result<()> {
        if buckets.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "bucket list must not be empty".to_string(),
            ));
        }
        if buckets.len() > i32::MAX as usize {
            return Err(StoreError::InvalidConfiguration(format!(
                "too many buckets: {}",
                buckets.len()
            )));
        }

        let mut seen = HashSet::with_capacity(buckets.len());
        for name in &buckets {
            if !seen.insert(name.as_str()) {
                return Err(StoreError::InvalidConfiguration(format!(
                    "duplicate bucket name '{}'",
                    name
                )));
            }
        }

        self.buckets = buckets;
        Ok(())
    }

    fn choose(&self, key: &str) -> Result<&str> {
        let index = self.choose_index(key)?;
        Ok(self.buckets[index].as_str())
    }

    fn buckets(&self) -> &[String] {
        &self.buckets
    }
}

// =============================================================================
// Hashing
// =============================================================================

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Default key hash: FNV-1a 64 with an `fmix64` avalanche
pub fn hash64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    fmix64(hash)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// Jump consistent hash (Lamping & Veach)
///
/// `num_buckets` must be in `1..=i32::MAX`.
pub fn jump_hash(mut key: u64, num_buckets: usize) -> usize {
    let mut b: i64 = -1;
    let mut j: i64 = 0;
    while j < num_buckets as i64 {
        b = j;
        key = key.wrapping_mul(2_862_933_555_777_941_757).wrapping_add(1);
        j = ((b + 1) as f64 * ((1i64 << 31) as f64 / ((key >> 33) + 1) as f64)) as i64;
    }
    b as usize
}
