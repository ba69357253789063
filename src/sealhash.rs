//! Canonical work-object header encoding and the Blake3-256 seal hash
//! (§4.I). `mixHash` and `nonce` are never part of this encoding: they are
//! exactly the fields ProgPoW commits to and must not leak into its own
//! input.

use crate::error::VerifierError;

/// Fields the seal-hash encoder accepts, in encoding order. Every field is
/// optional; an absent field encodes as its zero value (§4.I). Variable
/// length fields get a big-endian `u32` length prefix; fixed-length fields
/// (hashes, `lock`, `time`) do not.
#[derive(Debug, Clone, Default)]
pub struct WorkObjectHeader {
    pub header_hash: Option<[u8; 32]>,
    pub parent_hash: Option<[u8; 32]>,
    pub number: Option<Vec<u8>>,
    pub difficulty: Option<Vec<u8>>,
    pub tx_hash: Option<[u8; 32]>,
    pub prime_terminus_number: Option<Vec<u8>>,
    pub location: Option<Vec<u8>>,
    pub lock: Option<u32>,
    pub primary_coinbase: Option<Vec<u8>>,
    pub time: Option<u64>,
    pub data: Option<Vec<u8>>,
}

fn write_fixed32(out: &mut Vec<u8>, field: &Option<[u8; 32]>) {
    out.extend_from_slice(&field.unwrap_or([0u8; 32]));
}

fn write_varlen(out: &mut Vec<u8>, field: &Option<Vec<u8>>) -> Result<(), VerifierError> {
    let bytes: &[u8] = field.as_deref().unwrap_or(&[]);
    let len: u32 = bytes
        .len()
        .try_into()
        .map_err(|_| VerifierError::BadHeader("field exceeds u32::MAX bytes".into()))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

/// Canonical encoding of `header` per §4.I, with `mixHash`/`nonce` omitted.
pub fn encode(header: &WorkObjectHeader) -> Result<Vec<u8>, VerifierError> {
    let mut out = Vec::new();
    write_fixed32(&mut out, &header.header_hash);
    write_fixed32(&mut out, &header.parent_hash);
    write_varlen(&mut out, &header.number)?;
    write_varlen(&mut out, &header.difficulty)?;
    write_fixed32(&mut out, &header.tx_hash);
    write_varlen(&mut out, &header.prime_terminus_number)?;
    write_varlen(&mut out, &header.location)?;
    out.extend_from_slice(&header.lock.unwrap_or(0).to_be_bytes());
    write_varlen(&mut out, &header.primary_coinbase)?;
    out.extend_from_slice(&header.time.unwrap_or(0).to_be_bytes());
    write_varlen(&mut out, &header.data)?;
    Ok(out)
}

/// The result of one seal-hash computation: the digest, the encoded byte
/// count, and the encoded bytes themselves (so a caller can reproduce the
/// digest externally — invariant 7 in §8).
#[derive(Debug, Clone)]
pub struct SealHashOutput {
    pub seal_hash: [u8; 32],
    pub encoded_size: usize,
    pub encoded_bytes: Vec<u8>,
}

/// Encode `header` and take its Blake3-256 digest.
pub fn seal_hash(header: &WorkObjectHeader) -> Result<SealHashOutput, VerifierError> {
    let encoded_bytes = encode(header)?;
    let seal_hash = *blake3::hash(&encoded_bytes).as_bytes();
    Ok(SealHashOutput {
        encoded_size: encoded_bytes.len(),
        seal_hash,
        encoded_bytes,
    })
}
