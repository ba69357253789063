//! Keccak-256 and Keccak-512 over byte strings.
//!
//! These are the NIST/pre-SHA3 padding variants Ethereum and Quai use, not
//! the final SHA-3 `0x06` padding. `sha3::Keccak256`/`Keccak512` are exactly
//! that legacy-padding pair.

use sha3::{Digest, Keccak256, Keccak512};

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut result = [0u8; 32];
    result.copy_from_slice(&out);
    result
}

/// Keccak-512 of `data`.
pub fn keccak512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Keccak512::new();
    hasher.update(data);
    let out = hasher.finalize();
    let mut result = [0u8; 64];
    result.copy_from_slice(&out);
    result
}
