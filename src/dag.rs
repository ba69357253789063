//! On-demand DAG item generation from the light cache (§4.E).

use byteorder::{ByteOrder, LittleEndian};

use crate::bits::fnv1;
use crate::cache::{Cache, DATASET_PARENTS, HASH_BYTES};
use crate::keccak::keccak512;

/// Compute the 64-byte DAG item at `index` from `cache`.
pub fn calculate_dag_item(cache: &Cache, index: u32) -> [u8; HASH_BYTES] {
    let n = cache.len_items() as u32;
    let mut mix_words = cache.item_words(index as usize % n as usize);
    mix_words[0] ^= index;

    let mut mix_bytes = words_to_bytes(&mix_words);
    mix_bytes = keccak512(&mix_bytes);
    mix_words = bytes_to_words(&mix_bytes);

    for j in 0..DATASET_PARENTS as u32 {
        let parent_index = fnv1(index ^ j, mix_words[(j % 16) as usize]) % n;
        let parent = cache.item_words(parent_index as usize);
        for k in 0..16 {
            mix_words[k] = fnv1(mix_words[k], parent[k]);
        }
    }

    let mix_bytes = words_to_bytes(&mix_words);
    keccak512(&mix_bytes)
}

fn words_to_bytes(words: &[u32; 16]) -> [u8; 64] {
    let mut out = [0u8; 64];
    for (i, w) in words.iter().enumerate() {
        LittleEndian::write_u32(&mut out[i * 4..], *w);
    }
    out
}

fn bytes_to_words(bytes: &[u8; 64]) -> [u32; 16] {
    let mut out = [0u32; 16];
    for (i, w) in out.iter_mut().enumerate() {
        *w = LittleEndian::read_u32(&bytes[i * 4..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::seed_hash;

    #[test]
    fn dag_item_is_deterministic() {
        let seed = seed_hash(0);
        let cache = Cache::build(&seed, 64 * HASH_BYTES as u64);
        let a = calculate_dag_item(&cache, 5);
        let b = calculate_dag_item(&cache, 5);
        assert_eq!(a, b);
        assert_ne!(a, calculate_dag_item(&cache, 6));
    }
}
