//! The ProgPoW main loop (§4.G) and the final merge/output reduction
//! (§4.H): sixteen lanes of thirty-two registers, mutated by a
//! deterministic random program keyed on `(prog_seed, loop_index)`.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::bits::{clz32, fnv1a, popcount32, rotl32, rotr32, FNV_OFFSET_BASIS};
use crate::cache::{Cache, HASH_BYTES};
use crate::cdag::{CDag, CDAG_WORDS};
use crate::dag::calculate_dag_item;
use crate::kiss99::{fill_mix, program_rng, PROGPOW_REGS};
use crate::keccak::keccak256;

pub const PROGPOW_LANES: usize = 16;
pub const PROGPOW_PERIOD: u64 = 10;
pub const PROGPOW_CNT_DAG: usize = 64;
pub const PROGPOW_CNT_CACHE: usize = 11;
pub const PROGPOW_CNT_MATH: usize = 18;
const DAG_FOLD_STEPS: usize = 4;
const DAG_FOLD_WORDS: usize = 16 / DAG_FOLD_STEPS;

type Mix = [[u32; PROGPOW_REGS]; PROGPOW_LANES];

/// A random-math operator, selected by `selector % 11` (§4.G).
fn progpow_math(a: u32, b: u32, selector: u32) -> u32 {
    match selector % 11 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_mul(b),
        2 => (((a as u64).wrapping_mul(b as u64)) >> 32) as u32,
        3 => a.min(b),
        4 => rotl32(a, b),
        5 => rotr32(a, b),
        6 => a & b,
        7 => a | b,
        8 => a ^ b,
        9 => clz32(a) + clz32(b),
        10 => popcount32(a) + popcount32(b),
        _ => unreachable!(),
    }
}

/// Fold new data `b` into the entropy-bearing register `a`, selected by
/// `selector % 4` (§4.G).
fn merge(a: &mut u32, b: u32, selector: u32) {
    match selector % 4 {
        0 => *a = a.wrapping_mul(33).wrapping_add(b),
        1 => *a = (*a ^ b).wrapping_mul(33),
        2 => *a = rotl32(*a, (selector >> 16) % 31 + 1) ^ b,
        3 => *a = rotr32(*a, (selector >> 16) % 31 + 1) ^ b,
        _ => unreachable!(),
    }
}

/// A Fisher-Yates-shuffled permutation of `0..PROGPOW_REGS`, consumed
/// round-robin across a full outer iteration (cache ops, math ops, and the
/// DAG-fold merges all draw from the same sequence).
fn shuffled_dst_sequence(rng: &mut crate::kiss99::Kiss99) -> [u32; PROGPOW_REGS] {
    let mut seq = [0u32; PROGPOW_REGS];
    for (i, slot) in seq.iter_mut().enumerate() {
        *slot = i as u32;
    }
    for i in (1..PROGPOW_REGS).rev() {
        let j = (rng.next_u32() as usize) % (i + 1);
        seq.swap(i, j);
    }
    seq
}

struct DstCursor<'a> {
    seq: &'a [u32; PROGPOW_REGS],
    cnt: usize,
}

impl<'a> DstCursor<'a> {
    fn next(&mut self) -> usize {
        let d = self.seq[self.cnt % PROGPOW_REGS] as usize;
        self.cnt += 1;
        d
    }
}

/// One DAG access (outer iteration `loop_index` of `PROGPOW_CNT_DAG`):
/// loads one 64-byte DAG item per lane, then runs the interleaved
/// cache/math/merge random program shared by all lanes.
fn progpow_loop(
    mix: &mut Mix,
    loop_index: u32,
    prog_seed: u64,
    cache: &Cache,
    cdag: &CDag,
    dag_items: u64,
) {
    let lanes = PROGPOW_LANES as u32;
    let l0 = (loop_index % lanes) as usize;
    let item_index = (mix[l0][0] as u64 % (dag_items / lanes as u64)) * lanes as u64;

    let mut dag_words_per_lane = [[0u32; 16]; PROGPOW_LANES];
    for (l, words) in dag_words_per_lane.iter_mut().enumerate() {
        let idx = item_index + u64::from((l as u32 ^ loop_index) % lanes);
        let item = calculate_dag_item(cache, idx as u32);
        for (k, w) in words.iter_mut().enumerate() {
            *w = LittleEndian::read_u32(&item[k * 4..]);
        }
    }

    let mut rng = program_rng(prog_seed, loop_index);
    let dst_seq = shuffled_dst_sequence(&mut rng);
    let mut dst = DstCursor {
        seq: &dst_seq,
        cnt: 0,
    };

    let max_i = PROGPOW_CNT_CACHE.max(PROGPOW_CNT_MATH);
    for i in 0..max_i {
        if i < PROGPOW_CNT_CACHE {
            let src = (rng.next_u32() as usize) % PROGPOW_REGS;
            let d = dst.next();
            let selector = rng.next_u32();
            for lane in mix.iter_mut() {
                let offset = (lane[src] as usize) % CDAG_WORDS;
                let data = cdag.word(offset);
                merge(&mut lane[d], data, selector);
            }
        }
        if i < PROGPOW_CNT_MATH {
            let src_rnd = rng.next_u32() % (PROGPOW_REGS as u32 * (PROGPOW_REGS as u32 - 1));
            let src1 = (src_rnd % PROGPOW_REGS as u32) as usize;
            let mut src2 = (src_rnd / PROGPOW_REGS as u32) as usize;
            if src2 >= src1 {
                src2 += 1;
            }
            let d = dst.next();
            let selector = rng.next_u32();
            for lane in mix.iter_mut() {
                let data = progpow_math(lane[src1], lane[src2], selector);
                merge(&mut lane[d], data, selector);
            }
        }
    }

    for step in 0..DAG_FOLD_STEPS {
        let d = dst.next();
        let selector = rng.next_u32();
        for (lane, words) in mix.iter_mut().zip(dag_words_per_lane.iter()) {
            let mut folded = FNV_OFFSET_BASIS;
            for w in &words[step * DAG_FOLD_WORDS..(step + 1) * DAG_FOLD_WORDS] {
                fnv1a(&mut folded, *w);
            }
            merge(&mut lane[d], folded, selector);
        }
    }
}

/// The two outputs of one ProgPoW run: the 32-byte mix hash committed to
/// in the header, and the final 32-byte PoW hash compared to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgPowOutput {
    pub mix_hash: [u8; 32],
    pub pow_hash: [u8; 32],
}

/// Run ProgPoW end to end for one `(header_hash, nonce)` pair against the
/// epoch `cache`/`cdag`, with program seed `prog_seed` (§4.F-§4.H).
pub fn progpow_hash(
    header_hash: &[u8; 32],
    nonce: u64,
    prog_seed: u64,
    cache: &Cache,
    cdag: &CDag,
    dataset_size_bytes: u64,
) -> ProgPowOutput {
    trace!(
        "progpow_hash: prog_seed={} dataset_bytes={}",
        prog_seed,
        dataset_size_bytes
    );
    let mut seed_input = [0u8; 40];
    seed_input[..32].copy_from_slice(header_hash);
    seed_input[32..].copy_from_slice(&nonce.to_le_bytes());
    let seed_digest = keccak256(&seed_input);
    let seed_head = LittleEndian::read_u64(&seed_digest[..8]);

    let mut mix: Mix = [[0u32; PROGPOW_REGS]; PROGPOW_LANES];
    for (lane_id, lane) in mix.iter_mut().enumerate() {
        *lane = fill_mix(seed_head, lane_id as u32);
    }

    let dag_items = dataset_size_bytes / HASH_BYTES as u64;
    for i in 0..PROGPOW_CNT_DAG as u32 {
        progpow_loop(&mut mix, i, prog_seed, cache, cdag, dag_items);
    }

    let mut lane_results = [FNV_OFFSET_BASIS; PROGPOW_LANES];
    for (lane, result) in mix.iter().zip(lane_results.iter_mut()) {
        for reg in lane.iter() {
            fnv1a(result, *reg);
        }
    }

    let mut result = [FNV_OFFSET_BASIS; 8];
    for (l, lane_result) in lane_results.iter().enumerate() {
        fnv1a(&mut result[l % 8], *lane_result);
    }

    let mut mix_hash = [0u8; 32];
    for (i, w) in result.iter().enumerate() {
        LittleEndian::write_u32(&mut mix_hash[i * 4..], *w);
    }

    let mut pow_input = [0u8; 72];
    pow_input[..32].copy_from_slice(header_hash);
    pow_input[32..40].copy_from_slice(&nonce.to_le_bytes());
    pow_input[40..].copy_from_slice(&mix_hash);
    let pow_hash = keccak256(&pow_input);

    ProgPowOutput { mix_hash, pow_hash }
}
