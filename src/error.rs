//! Typed errors surfaced by the boundary codec and the verifier facade
//! (§7, §10.2).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifierError {
    #[error("malformed hex input: {0}")]
    BadHex(String),

    #[error("expected {expected} bytes, got {actual}")]
    BadLength { expected: usize, actual: usize },

    #[error("wrong number of arguments: {0}")]
    BadArity(String),

    #[error("difficulty must be nonzero")]
    BadDifficulty,

    #[error("seal-hash encoding failed: {0}")]
    BadHeader(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}
