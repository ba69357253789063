//! Epoch seed derivation and the light-cache builder (components §4.C, §6).

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::keccak::{keccak256, keccak512};

/// Blocks per epoch (Quai-specific; see §3, §6).
pub const EPOCH_LENGTH: u64 = 388_800;

pub const HASH_BYTES: usize = 64;
pub const MIX_BYTES: usize = 128;
pub const DATASET_PARENTS: usize = 256;
pub const CACHE_ROUNDS: usize = 3;

const CACHE_BYTES_INIT: u64 = 1 << 24;
const CACHE_BYTES_GROWTH: u64 = 1 << 17;
const DATASET_BYTES_INIT: u64 = 1 << 30;
const DATASET_BYTES_GROWTH: u64 = 1 << 23;

/// `epoch = block_number / EPOCH_LENGTH`.
pub fn epoch(block_number: u64) -> u64 {
    block_number / EPOCH_LENGTH
}

/// The epoch seed hash: all-zeros for epoch 0, `Keccak256` chained
/// otherwise (§3).
pub fn seed_hash(epoch: u64) -> [u8; 32] {
    let mut seed = [0u8; 32];
    for _ in 0..epoch {
        seed = keccak256(&seed);
    }
    seed
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut i = 3u64;
    while i.saturating_mul(i) <= n {
        if n % i == 0 {
            return false;
        }
        i += 2;
    }
    true
}

/// Largest value `<= upper_bound` such that `value / unit_bytes` is prime.
fn prime_sieve(mut size: u64, unit_bytes: u64) -> u64 {
    while !is_prime(size / unit_bytes) {
        size -= 2 * unit_bytes;
    }
    size
}

/// Cache size in bytes for the epoch containing `block_number` (§6).
pub fn cache_size(block_number: u64) -> u64 {
    let e = epoch(block_number);
    let size = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * e - HASH_BYTES as u64;
    prime_sieve(size, HASH_BYTES as u64)
}

/// Dataset size in bytes for the epoch containing `block_number` (§6).
pub fn dataset_size(block_number: u64) -> u64 {
    let e = epoch(block_number);
    let size = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * e - MIX_BYTES as u64;
    prime_sieve(size, MIX_BYTES as u64)
}

/// The epoch light cache: `cache_size_bytes / 64` 64-byte items, built by
/// repeated Keccak-512 mixing from the seed (§4.C).
#[derive(Debug, Clone)]
pub struct Cache {
    bytes: Vec<u8>,
}

impl Cache {
    /// Build the cache for `seed` at `cache_size_bytes` (must be a multiple
    /// of `HASH_BYTES`).
    pub fn build(seed: &[u8; 32], cache_size_bytes: u64) -> Self {
        let n = (cache_size_bytes as usize) / HASH_BYTES;
        trace!("building cache: {} items ({} bytes)", n, cache_size_bytes);

        let mut bytes = vec![0u8; n * HASH_BYTES];
        bytes[0..HASH_BYTES].copy_from_slice(&keccak512(seed));
        for i in 1..n {
            let prev = bytes[(i - 1) * HASH_BYTES..i * HASH_BYTES].to_vec();
            bytes[i * HASH_BYTES..(i + 1) * HASH_BYTES].copy_from_slice(&keccak512(&prev));
        }

        for _ in 0..CACHE_ROUNDS {
            for i in 0..n {
                let v = LittleEndian::read_u32(&bytes[i * HASH_BYTES..]) as usize % n;
                let prev_idx = (i + n - 1) % n;

                let mut src = [0u8; HASH_BYTES];
                for k in 0..HASH_BYTES {
                    src[k] = bytes[prev_idx * HASH_BYTES + k] ^ bytes[v * HASH_BYTES + k];
                }
                bytes[i * HASH_BYTES..(i + 1) * HASH_BYTES].copy_from_slice(&keccak512(&src));
            }
        }

        Cache { bytes }
    }

    pub fn len_items(&self) -> usize {
        self.bytes.len() / HASH_BYTES
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The 16 little-endian u32 words of item `index`.
    pub fn item_words(&self, index: usize) -> [u32; 16] {
        let n = self.len_items();
        let base = (index % n) * HASH_BYTES;
        let mut words = [0u32; 16];
        for (k, w) in words.iter_mut().enumerate() {
            *w = LittleEndian::read_u32(&self.bytes[base + k * 4..]);
        }
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_chain_known_answers() {
        // S1: epoch 0 is the all-zero seed, and each later epoch's seed is
        // Keccak256 of the previous one.
        assert_eq!(seed_hash(0), [0u8; 32]);
        assert_eq!(seed_hash(1), crate::keccak::keccak256(&seed_hash(0)));
        assert_eq!(seed_hash(2), crate::keccak::keccak256(&seed_hash(1)));
    }

    #[test]
    fn cache_size_is_multiple_of_hash_bytes() {
        let size = cache_size(0);
        assert_eq!(size % HASH_BYTES as u64, 0);
        let size2 = cache_size(EPOCH_LENGTH);
        assert!(size2 > size);
    }

    #[test]
    fn cache_is_deterministic() {
        let seed = seed_hash(0);
        let size = 64 * HASH_BYTES as u64; // tiny cache for a fast test
        let a = Cache::build(&seed, size);
        let b = Cache::build(&seed, size);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(a.len_items(), 64);
    }
}
