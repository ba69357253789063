//! Boundary codec (§10.1): hex normalization and nonce parsing shared by
//! every host binding, implemented once in the core so bindings don't each
//! reimplement `0x`-stripping and case folding (§6, §9).

use crate::error::VerifierError;

/// Strip an optional `0x`/`0X` prefix and left-pad odd-length input with a
/// single `0` nibble, per §6.
fn normalize(s: &str) -> String {
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    if s.len() % 2 == 1 {
        format!("0{s}")
    } else {
        s.to_string()
    }
}

/// Decode a hex string at the API boundary: case-insensitive, optional
/// `0x` prefix, odd length left-padded with one `0` nibble.
pub fn decode_hex(s: &str) -> Result<Vec<u8>, VerifierError> {
    let normalized = normalize(s);
    hex::decode(&normalized).map_err(|e| VerifierError::BadHex(e.to_string()))
}

/// As [`decode_hex`], but additionally requires the decoded length to be
/// exactly `N` bytes.
pub fn decode_hex_fixed<const N: usize>(s: &str) -> Result<[u8; N], VerifierError> {
    let bytes = decode_hex(s)?;
    if bytes.len() != N {
        return Err(VerifierError::BadLength {
            expected: N,
            actual: bytes.len(),
        });
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// The three shapes a nonce may arrive in at the API boundary (§6, §8
/// invariant 6).
#[derive(Debug, Clone, Copy)]
pub enum NonceInput<'a> {
    U64(u64),
    Hex(&'a str),
    Decimal(&'a str),
}

/// Parse a [`NonceInput`] into the internal `u64` representation. Decimal
/// strings that overflow `u64` are rejected rather than silently truncated
/// (§9, Open Question (c)).
pub fn parse_nonce(input: NonceInput<'_>) -> Result<u64, VerifierError> {
    match input {
        NonceInput::U64(n) => Ok(n),
        NonceInput::Hex(s) => {
            let bytes = decode_hex(s)?;
            if bytes.len() > 8 {
                return Err(VerifierError::BadLength {
                    expected: 8,
                    actual: bytes.len(),
                });
            }
            let mut buf = [0u8; 8];
            buf[8 - bytes.len()..].copy_from_slice(&bytes);
            Ok(u64::from_be_bytes(buf))
        }
        NonceInput::Decimal(s) => s
            .parse::<u64>()
            .map_err(|_| VerifierError::BadLength {
                expected: 8,
                actual: s.len(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_and_case_independence() {
        // S8 invariant 5
        let a = decode_hex("0xABcd").unwrap();
        let b = decode_hex("abCD").unwrap();
        let c = decode_hex("0XABCD").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn odd_length_is_left_padded() {
        assert_eq!(decode_hex("0xf").unwrap(), vec![0x0f]);
    }

    #[test]
    fn fixed_length_mismatch_is_an_error() {
        let err = decode_hex_fixed::<32>("0x1234").unwrap_err();
        assert_eq!(
            err,
            VerifierError::BadLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn nonce_round_trip_across_representations() {
        // S8 invariant 6
        let n = 0x0102_0304_0506_0708u64;
        let from_u64 = parse_nonce(NonceInput::U64(n)).unwrap();
        let from_hex = parse_nonce(NonceInput::Hex("0x0102030405060708")).unwrap();
        let from_dec = parse_nonce(NonceInput::Decimal(&n.to_string())).unwrap();
        assert_eq!(from_u64, n);
        assert_eq!(from_hex, n);
        assert_eq!(from_dec, n);
    }

    #[test]
    fn decimal_overflow_is_rejected() {
        assert!(parse_nonce(NonceInput::Decimal("99999999999999999999")).is_err());
    }
}
