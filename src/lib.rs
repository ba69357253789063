//! # Quai ProgPoW Verifier
//!
//! A light-client verifier for the ProgPoW proof-of-work used by the Quai
//! network: recompute a mined header's mix hash and PoW hash, and check
//! the claimed mix hash and the difficulty target both hold.
//!
//! ## Note
//! The mixing primitives (Keccak, KISS99, the DAG/cDAG construction, and
//! the main loop) follow the ProgPoW reference design; they are not
//! derived from any particular miner implementation.
//!
//! ## Features
//! - Epoch-keyed light cache and cDAG construction
//! - The ProgPoW main loop and FNV1a final reduction
//! - Canonical header seal hashing via Blake3
//! - A verifier facade tying recomputation to the difficulty check
//!
//! ## Disclaimer
//! This crate verifies proof-of-work; it does not mine. Cache/cDAG
//! construction is CPU-bound and unsuitable for hot request paths without
//! the memoizing [`cache_store::CacheStore`].

pub mod bits;
pub mod cache;
pub mod cache_store;
pub mod cdag;
pub mod dag;
pub mod error;
pub mod hexutil;
pub mod keccak;
pub mod kiss99;
pub mod progpow;
pub mod sealhash;
pub mod verifier;

pub use cache_store::{CacheStore, EpochCache};
pub use error::VerifierError;
pub use progpow::ProgPowOutput;
pub use sealhash::WorkObjectHeader;
pub use verifier::{
    compute, compute_with_cache, seal_hash, verify, verify_full, verify_full_with_cache,
    verify_with_cache, ComputeOutput, VerifyFullInput, VerifyOutput,
};
