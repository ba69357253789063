//! The cDAG: a fixed 16 KiB / 4096-word table derived per-epoch from the
//! cache, read by the ProgPoW loop's cache ops (§4.D).

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::cache::Cache;
use crate::dag::calculate_dag_item;

/// `PROGPOW_CACHE_BYTES / 4`.
pub const CDAG_WORDS: usize = 4096;
const CDAG_ITEMS: usize = CDAG_WORDS / 16;

#[derive(Debug, Clone)]
pub struct CDag {
    words: Vec<u32>,
}

impl CDag {
    /// Build the cDAG from `cache`: the first `CDAG_WORDS / 16` DAG items,
    /// 16 words each, fixed at 16 KiB total regardless of epoch.
    pub fn build(cache: &Cache) -> Self {
        trace!("building cdag: {} items", CDAG_ITEMS);
        let mut words = vec![0u32; CDAG_WORDS];
        for i in 0..CDAG_ITEMS {
            let item = calculate_dag_item(cache, i as u32);
            for k in 0..16 {
                words[i * 16 + k] = LittleEndian::read_u32(&item[k * 4..]);
            }
        }
        CDag { words }
    }

    #[inline]
    pub fn word(&self, index: usize) -> u32 {
        self.words[index % CDAG_WORDS]
    }

    pub fn as_words(&self) -> &[u32] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{seed_hash, HASH_BYTES};

    #[test]
    fn cdag_has_4096_words_and_is_deterministic() {
        // S5
        let seed = seed_hash(0);
        let cache = Cache::build(&seed, 64 * HASH_BYTES as u64);
        let a = CDag::build(&cache);
        let b = CDag::build(&cache);
        assert_eq!(a.as_words().len(), CDAG_WORDS);
        assert_eq!(a.as_words(), b.as_words());
    }
}
