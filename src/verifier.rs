//! The verifier facade (§4.J): parses inputs, builds/looks up the epoch
//! cache and cDAG, runs ProgPoW, and enforces the difficulty target.

use log::{debug, warn};
use primitive_types::U256;

use crate::cache::{cache_size, dataset_size, epoch, seed_hash, Cache, EPOCH_LENGTH};
use crate::cache_store::{CacheStore, EpochCache};
use crate::cdag::CDag;
use crate::error::VerifierError;
use crate::progpow::{progpow_hash, ProgPowOutput, PROGPOW_PERIOD};
use crate::sealhash::{self, SealHashOutput, WorkObjectHeader};

/// Output of [`compute`]: the recomputed hashes plus the epoch sizing that
/// produced them.
#[derive(Debug, Clone)]
pub struct ComputeOutput {
    pub mix_hash: [u8; 32],
    pub pow_hash: [u8; 32],
    pub epoch: u64,
    pub cache_size: u64,
    pub dataset_size: u64,
}

/// Output of [`verify`]: the pass/fail sub-flags plus everything needed to
/// explain the verdict.
#[derive(Debug, Clone)]
pub struct VerifyOutput {
    pub valid: bool,
    pub mix_hash_valid: bool,
    pub pow_valid: bool,
    pub computed_mix_hash: [u8; 32],
    pub pow_hash: [u8; 32],
    pub target: U256,
    pub difficulty: U256,
}

/// The epoch/program sizing the facade derives from
/// `prime_terminus_number`, per the Open Question in §3/§9: cache and
/// seed are keyed off `prime_terminus_number`, not `block_number`.
struct EpochSizing {
    epoch: u64,
    cache_size_bytes: u64,
    dataset_size_bytes: u64,
}

fn epoch_sizing(prime_terminus_number: u64) -> EpochSizing {
    let e = epoch(prime_terminus_number);
    let effective_block = e * EPOCH_LENGTH + 1;
    EpochSizing {
        epoch: e,
        cache_size_bytes: cache_size(effective_block),
        dataset_size_bytes: dataset_size(effective_block),
    }
}

fn build_epoch(prime_terminus_number: u64) -> (EpochSizing, Cache, CDag) {
    let sizing = epoch_sizing(prime_terminus_number);
    let seed = seed_hash(sizing.epoch);
    let cache = Cache::build(&seed, sizing.cache_size_bytes);
    let cdag = CDag::build(&cache);
    (sizing, cache, cdag)
}

fn run_progpow(
    header_hash: &[u8; 32],
    nonce: u64,
    block_number: u64,
    prime_terminus_number: u64,
    cache: &Cache,
    cdag: &CDag,
    dataset_size_bytes: u64,
) -> ProgPowOutput {
    debug!(
        "compute: block={} prime_terminus={} epoch={}",
        block_number,
        prime_terminus_number,
        epoch(prime_terminus_number)
    );
    let prog_seed = prime_terminus_number / PROGPOW_PERIOD;
    progpow_hash(header_hash, nonce, prog_seed, cache, cdag, dataset_size_bytes)
}

/// Recompute the mix hash and PoW hash for `(header_hash, nonce)`, keying
/// the epoch cache off `prime_terminus_number` (§4.J).
pub fn compute(
    header_hash: &[u8; 32],
    nonce: u64,
    block_number: u64,
    prime_terminus_number: u64,
) -> ComputeOutput {
    let (sizing, cache, cdag) = build_epoch(prime_terminus_number);
    let out = run_progpow(
        header_hash,
        nonce,
        block_number,
        prime_terminus_number,
        &cache,
        &cdag,
        sizing.dataset_size_bytes,
    );
    ComputeOutput {
        mix_hash: out.mix_hash,
        pow_hash: out.pow_hash,
        epoch: sizing.epoch,
        cache_size: sizing.cache_size_bytes,
        dataset_size: sizing.dataset_size_bytes,
    }
}

/// As [`compute`], but looks the epoch cache/cDAG up in (and, on miss,
/// builds and stores it into) `store` instead of rebuilding every call.
pub fn compute_with_cache(
    store: &CacheStore,
    header_hash: &[u8; 32],
    nonce: u64,
    block_number: u64,
    prime_terminus_number: u64,
) -> ComputeOutput {
    let e = epoch(prime_terminus_number);
    let epoch_cache: std::sync::Arc<EpochCache> = store.ensure_epoch(e);
    let out = run_progpow(
        header_hash,
        nonce,
        block_number,
        prime_terminus_number,
        &epoch_cache.cache,
        &epoch_cache.cdag,
        dataset_size(e * EPOCH_LENGTH + 1),
    );
    ComputeOutput {
        mix_hash: out.mix_hash,
        pow_hash: out.pow_hash,
        epoch: e,
        cache_size: epoch_cache.cache_size_bytes,
        dataset_size: dataset_size(e * EPOCH_LENGTH + 1),
    }
}

fn target_from_difficulty(difficulty: U256) -> Result<U256, VerifierError> {
    if difficulty.is_zero() {
        warn!("verify: difficulty is zero");
        return Err(VerifierError::BadDifficulty);
    }
    Ok(U256::MAX / difficulty)
}

fn pow_hash_as_u256(pow_hash: &[u8; 32]) -> U256 {
    U256::from_big_endian(pow_hash)
}

fn finish_verify(
    claimed_mix_hash: &[u8; 32],
    target: U256,
    difficulty: U256,
    computed: ComputeOutput,
) -> VerifyOutput {
    let mix_hash_valid = &computed.mix_hash == claimed_mix_hash;
    let pow_valid = pow_hash_as_u256(&computed.pow_hash) <= target;
    VerifyOutput {
        valid: mix_hash_valid && pow_valid,
        mix_hash_valid,
        pow_valid,
        computed_mix_hash: computed.mix_hash,
        pow_hash: computed.pow_hash,
        target,
        difficulty,
    }
}

/// Recompute and check a claimed `(mix_hash, difficulty)` pair (§4.J).
/// A `false` `valid` is a successful call, not an error; only malformed
/// input (e.g. zero difficulty) returns `Err`. Difficulty is validated
/// before the expensive cache/cDAG build runs.
pub fn verify(
    header_hash: &[u8; 32],
    nonce: u64,
    block_number: u64,
    prime_terminus_number: u64,
    claimed_mix_hash: &[u8; 32],
    difficulty: U256,
) -> Result<VerifyOutput, VerifierError> {
    let target = target_from_difficulty(difficulty)?;
    let computed = compute(header_hash, nonce, block_number, prime_terminus_number);
    Ok(finish_verify(claimed_mix_hash, target, difficulty, computed))
}

/// As [`verify`], backed by a shared [`CacheStore`].
pub fn verify_with_cache(
    store: &CacheStore,
    header_hash: &[u8; 32],
    nonce: u64,
    block_number: u64,
    prime_terminus_number: u64,
    claimed_mix_hash: &[u8; 32],
    difficulty: U256,
) -> Result<VerifyOutput, VerifierError> {
    let target = target_from_difficulty(difficulty)?;
    let computed = compute_with_cache(
        store,
        header_hash,
        nonce,
        block_number,
        prime_terminus_number,
    );
    Ok(finish_verify(claimed_mix_hash, target, difficulty, computed))
}

/// Compute the seal hash of `header` (§4.I).
pub fn seal_hash(header: &WorkObjectHeader) -> Result<SealHashOutput, VerifierError> {
    sealhash::seal_hash(header)
}

/// Everything `verify_full` needs beyond the header itself: the fields
/// ProgPoW commits to and checks but the seal-hash encoding omits.
#[derive(Debug, Clone)]
pub struct VerifyFullInput {
    pub nonce: u64,
    pub block_number: u64,
    pub prime_terminus_number: u64,
    pub claimed_mix_hash: [u8; 32],
    pub difficulty: U256,
}

/// Compute `header`'s seal hash, then verify it as that hash's
/// `header_hash` (§4.J).
pub fn verify_full(
    header: &WorkObjectHeader,
    input: &VerifyFullInput,
) -> Result<VerifyOutput, VerifierError> {
    let sealed = seal_hash(header)?;
    verify(
        &sealed.seal_hash,
        input.nonce,
        input.block_number,
        input.prime_terminus_number,
        &input.claimed_mix_hash,
        input.difficulty,
    )
}

/// As [`verify_full`], backed by a shared [`CacheStore`].
pub fn verify_full_with_cache(
    store: &CacheStore,
    header: &WorkObjectHeader,
    input: &VerifyFullInput,
) -> Result<VerifyOutput, VerifierError> {
    let sealed = seal_hash(header)?;
    verify_with_cache(
        store,
        &sealed.seal_hash,
        input.nonce,
        input.block_number,
        input.prime_terminus_number,
        &input.claimed_mix_hash,
        input.difficulty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_difficulty_is_an_error() {
        let header_hash = [1u8; 32];
        let mix_hash = [2u8; 32];
        let err = verify(&header_hash, 0, 0, 0, &mix_hash, U256::zero()).unwrap_err();
        assert_eq!(err, VerifierError::BadDifficulty);
    }

    #[test]
    fn target_monotonicity() {
        // S8 invariant 4: smaller difficulty -> larger target -> a pass at
        // D also passes at every D' < D.
        let big = target_from_difficulty(U256::from(1000u64)).unwrap();
        let small_difficulty = target_from_difficulty(U256::from(10u64)).unwrap();
        assert!(small_difficulty > big);
    }
}
